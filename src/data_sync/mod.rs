//! Data layer: where pair records come from.
//!
//! Providers fetch [`MarketPairRecord`]s for one DEX and network. The detector
//! merges them into the price graph, so nothing here knows about graphs.

pub mod config;
pub mod pair;
pub mod pool_log;
pub mod provider;
pub mod snapshot;
pub mod subgraph;

pub use config::{ProviderConfigSection, ProviderKind, ProvidersConfigRoot};
pub use pair::{MarketPairRecord, PairToken, TradingPairFilter, select_pairs};
pub use pool_log::{NoopPoolLogger, PoolLogSink, TracingPoolLogger};
pub use provider::{AmmType, MarketDataProvider, ProviderError};
pub use snapshot::SnapshotMarketDataProvider;
pub use subgraph::{SubgraphMarketDataProvider, parse_top_pairs};
