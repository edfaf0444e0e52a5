use crate::Token;
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::str::FromStr;
use std::sync::Arc;
use strum_macros::{Display, EnumIter, EnumString, VariantNames};

/// Provider / DEX family. Names double as provider labels.
#[derive(Copy, Clone, Debug, Display, PartialEq, Hash, Eq, EnumString, VariantNames, Deserialize, Serialize, EnumIter)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PoolProtocol {
    UniswapV2,
    PancakeswapV2,
    SushiswapV2,
    FraxswapV2,
    ShibaswapV2,
    UniswapV3,
    PancakeswapV3,
    SushiswapV3,
}

impl PoolProtocol {
    /// Constant-product (x * y = k) families that get a pool simulator.
    pub fn is_constant_product(&self) -> bool {
        matches!(self, Self::UniswapV2 | Self::PancakeswapV2 | Self::SushiswapV2 | Self::FraxswapV2 | Self::ShibaswapV2)
    }

    /// Resolve a provider label such as `uniswap_v2` or `uniswap_v2-arbitrum`.
    pub fn from_provider_name(provider: &str) -> Option<Self> {
        let family = provider.split('-').next().unwrap_or(provider);
        Self::from_str(&family.to_ascii_lowercase()).ok()
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CalculationError {
    #[error("token {0} is not traded by this pool")]
    UnknownToken(Address),
    #[error("pool has no liquidity")]
    ZeroReserves,
    #[error("amount must be positive")]
    ZeroAmount,
    #[error("requested {requested} but only {available} available")]
    InsufficientLiquidity { requested: U256, available: U256 },
    #[error("arithmetic overflow")]
    Overflow,
}

/// Outcome of one simulated swap. Prices are spot prices of the input token
/// quoted in the output token, decimal adjusted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SwapResult {
    pub amount_in: U256,
    pub amount_out: U256,
    pub price_before: f64,
    pub price_after: f64,
    pub slippage_percent: f64,
}

#[typetag::serde(tag = "type")]
pub trait PoolSimulator: Sync + Send {
    fn get_protocol(&self) -> PoolProtocol;

    fn get_address(&self) -> Address;

    fn get_token0(&self) -> &Token;

    fn get_token1(&self) -> &Token;

    /// Fee as a fraction, 0.003 for 0.3%.
    fn get_fee(&self) -> f64;

    /// Integer reserves scaled by `10^decimals`.
    fn get_reserves(&self) -> (U256, U256);

    fn get_tokens(&self) -> Vec<Address> {
        vec![self.get_token0().get_address(), self.get_token1().get_address()]
    }

    fn get_decimals(&self) -> (u8, u8) {
        (self.get_token0().get_decimals(), self.get_token1().get_decimals())
    }

    /// Price of token0 in token1.
    fn price0(&self) -> f64;

    /// Price of token1 in token0.
    fn price1(&self) -> f64;

    fn calculate_out_amount(&self, token_address_from: &Address, token_address_to: &Address, in_amount: U256) -> Result<U256, CalculationError>;

    fn calculate_in_amount(&self, token_address_from: &Address, token_address_to: &Address, out_amount: U256) -> Result<U256, CalculationError>;

    fn simulate_swap(&self, token_address_from: &Address, in_amount: U256) -> Result<SwapResult, CalculationError>;
}

#[derive(Serialize, Deserialize)]
pub struct PoolWrapper {
    pub pool: Arc<dyn PoolSimulator>,
}

impl PoolWrapper {
    pub fn new(pool: Arc<dyn PoolSimulator>) -> Self {
        PoolWrapper { pool }
    }
}

impl Clone for PoolWrapper {
    fn clone(&self) -> Self {
        Self { pool: self.pool.clone() }
    }
}

impl Deref for PoolWrapper {
    type Target = dyn PoolSimulator;

    fn deref(&self) -> &Self::Target {
        self.pool.deref()
    }
}

impl<T: 'static + PoolSimulator> From<T> for PoolWrapper {
    fn from(pool: T) -> Self {
        Self { pool: Arc::new(pool) }
    }
}

impl PartialEq for PoolWrapper {
    fn eq(&self, other: &Self) -> bool {
        self.pool.get_address() == other.pool.get_address()
    }
}

impl Eq for PoolWrapper {}

impl Hash for PoolWrapper {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.get_address().hash(state)
    }
}

impl Ord for PoolWrapper {
    fn cmp(&self, other: &Self) -> Ordering {
        self.get_address().cmp(&other.get_address())
    }
}

impl PartialOrd for PoolWrapper {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for PoolWrapper {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}(fee={})@{}", self.get_protocol(), self.get_fee(), self.get_address())
    }
}

impl Debug for PoolWrapper {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}(fee={})@{:?}", self.get_protocol(), self.get_fee(), self.get_address())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", PoolProtocol::UniswapV2), "uniswap_v2");
        assert_eq!(format!("{}", PoolProtocol::PancakeswapV2), "pancakeswap_v2");
    }

    #[test]
    fn test_constant_product_set() {
        let v2: Vec<String> = PoolProtocol::iter().filter(PoolProtocol::is_constant_product).map(|p| p.to_string()).collect();
        assert_eq!(v2, vec!["uniswap_v2", "pancakeswap_v2", "sushiswap_v2", "fraxswap_v2", "shibaswap_v2"]);
    }

    #[test]
    fn test_from_provider_name() {
        assert_eq!(PoolProtocol::from_provider_name("uniswap_v2"), Some(PoolProtocol::UniswapV2));
        assert_eq!(PoolProtocol::from_provider_name("sushiswap_v2-arbitrum"), Some(PoolProtocol::SushiswapV2));
        assert_eq!(PoolProtocol::from_provider_name("Uniswap_V3"), Some(PoolProtocol::UniswapV3));
        assert_eq!(PoolProtocol::from_provider_name("local"), None);
    }
}
