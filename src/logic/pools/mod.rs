pub mod pool;
pub mod registry;
pub mod uniswap_v2;

pub use pool::{CalculationError, PoolProtocol, PoolSimulator, PoolWrapper, SwapResult};
pub use registry::PoolSimulatorRegistry;
pub use uniswap_v2::UniswapV2Pool;
