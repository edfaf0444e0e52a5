// Layers
pub mod data_sync; // Data Layer: pair records and market data providers
pub mod logic; // Logic Layer: price graph, pool simulators, cycle cache

// Common utilities and types
pub mod utils;

pub use data_sync::{MarketDataProvider, MarketPairRecord, PairToken, SnapshotMarketDataProvider, SubgraphMarketDataProvider, TradingPairFilter};
pub use logic::{
    ArbitrageDetector, ArbitrageDetectorBuilder, BuildReport, Cycle2, Cycle3, CycleArity, CycleCache, CycleKey, CycleRef, DetectorConfigRoot, DetectorConfigSection,
    PoolProtocol, PoolSimulator, PoolSimulatorRegistry, PoolWrapper, PriceGraph, QuoteEdge, UniswapV2Pool,
};
pub use utils::{Token, TokenWrapper};
