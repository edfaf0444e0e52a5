use super::pool::PoolWrapper;
use crate::logic::graph::FastHashMap;
use alloy_primitives::Address;

// Token pair in ascending order, a fee slot and the provider label.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct PoolPairKey {
    tokens: (Address, Address),
    fee: u32,
    provider: String,
}

impl PoolPairKey {
    // Constant-product pools are keyed with fee slot 0.
    fn v2(token0: Address, token1: Address, provider: &str) -> Self {
        let tokens = if token0 <= token1 { (token0, token1) } else { (token1, token0) };
        Self { tokens, fee: 0, provider: provider.to_string() }
    }
}

/// Pool simulators of the current graph build, keyed by pool address.
#[derive(Clone, Debug, Default)]
pub struct PoolSimulatorRegistry {
    pool_simulators: FastHashMap<Address, PoolWrapper>,
    v2_pool_address_cache: FastHashMap<PoolPairKey, Address>,
}

impl PoolSimulatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.pool_simulators.clear();
        self.v2_pool_address_cache.clear();
    }

    /// Store a constant-product simulator and index it by its token pair.
    /// A simulator already stored under the same address is replaced.
    pub fn add_v2_pool(&mut self, pool: PoolWrapper, provider: &str) -> Option<PoolWrapper> {
        let address = pool.get_address();
        let key = PoolPairKey::v2(pool.get_token0().get_address(), pool.get_token1().get_address(), provider);
        self.v2_pool_address_cache.insert(key, address);
        self.pool_simulators.insert(address, pool)
    }

    pub fn get_simulator(&self, pool_address: &Address) -> Option<&PoolWrapper> {
        self.pool_simulators.get(pool_address)
    }

    /// Pool address of the `provider` constant-product pool trading this pair,
    /// in either token order.
    pub fn get_v2_pool_address(&self, token0: Address, token1: Address, provider: &str) -> Option<Address> {
        self.v2_pool_address_cache.get(&PoolPairKey::v2(token0, token1, provider)).copied()
    }

    pub fn len(&self) -> usize {
        self.pool_simulators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool_simulators.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Address, &PoolWrapper)> {
        self.pool_simulators.iter()
    }
}
