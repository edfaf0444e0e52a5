use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use strum_macros::Display;

/// Two pools quoting the same token pair in the same direction.
/// `token0 < token1` and `edge1 < edge2`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cycle2 {
    pub token0: Address,
    pub token1: Address,
    pub edge1: Address,
    pub edge2: Address,
}

impl Cycle2 {
    pub fn tokens(&self) -> [Address; 2] {
        [self.token0, self.token1]
    }

    pub fn edges(&self) -> [Address; 2] {
        [self.edge1, self.edge2]
    }
}

impl Display for Cycle2 {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <-> {} via {} / {}", self.token0, self.token1, self.edge1, self.edge2)
    }
}

/// Directed triangle `token1 -> token2 -> token3 -> token1`; `edgeN` is the
/// pool of the leg leaving `tokenN`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cycle3 {
    pub token1: Address,
    pub token2: Address,
    pub token3: Address,
    pub edge1: Address,
    pub edge2: Address,
    pub edge3: Address,
}

impl Cycle3 {
    pub fn tokens(&self) -> [Address; 3] {
        [self.token1, self.token2, self.token3]
    }

    pub fn edges(&self) -> [Address; 3] {
        [self.edge1, self.edge2, self.edge3]
    }

    /// `(from, to, pool)` per leg, in trading order.
    pub fn legs(&self) -> [(Address, Address, Address); 3] {
        [(self.token1, self.token2, self.edge1), (self.token2, self.token3, self.edge2), (self.token3, self.token1, self.edge3)]
    }
}

impl Display for Cycle3 {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} -[{}]-> {} -[{}]-> {} -[{}]-> {}",
            self.token1, self.edge1, self.token2, self.edge2, self.token3, self.edge3, self.token1
        )
    }
}

#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CycleArity {
    #[strum(serialize = "2")]
    Two,
    #[strum(serialize = "3")]
    Three,
}

/// Position of a cycle in the Cycle-2 or Cycle-3 list.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CycleRef {
    pub arity: CycleArity,
    pub index: usize,
}

/// Canonical token-set key. Addresses are stored ascending, so every rotation
/// and direction of the same node-cycle maps to one key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CycleKey {
    Pair([Address; 2]),
    Triangle([Address; 3]),
}

impl CycleKey {
    pub fn pair(a: Address, b: Address) -> Self {
        let mut tokens = [a, b];
        tokens.sort_unstable();
        CycleKey::Pair(tokens)
    }

    pub fn triangle(a: Address, b: Address, c: Address) -> Self {
        let mut tokens = [a, b, c];
        tokens.sort_unstable();
        CycleKey::Triangle(tokens)
    }
}
