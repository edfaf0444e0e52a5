//! Logic layer: price graph, pool simulators and cycle enumeration.
//!
//! The [`ArbitrageDetector`] owns all state. A build clears the graph, the
//! simulator registry and the cycle cache, merges provider pairs, and leaves
//! the graph read-only until the next build.

pub mod arbitrage_detector;
pub mod cycles;
pub mod detector_config;
pub mod error;
pub mod graph;
pub mod pools;


pub use arbitrage_detector::{
    ArbitrageDetector, ArbitrageDetectorBuilder, BuildReport, DetectorStatistics, EdgeOutcome, PairOutcome, ProviderReport, RejectedRecord,
    quote_weight,
};
pub use cycles::{Cycle2, Cycle3, CycleArity, CycleCache, CycleKey, CycleRef, EnumerationReport, cache_cycles};
pub use detector_config::{DetectorConfigRoot, DetectorConfigSection};
pub use error::{ExpansionError, RecordError};
pub use graph::{FastHashMap, PriceGraph, QuoteEdge, TokenNode};
pub use pools::{CalculationError, PoolProtocol, PoolSimulator, PoolSimulatorRegistry, PoolWrapper, SwapResult, UniswapV2Pool};
