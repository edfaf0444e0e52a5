use super::cycles::{CycleCache, EnumerationReport, cache_cycles};
use super::detector_config::DetectorConfigSection;
use super::error::RecordError;
use super::graph::{PriceGraph, QuoteEdge};
use super::pools::{PoolProtocol, PoolSimulatorRegistry, PoolWrapper, UniswapV2Pool};
use crate::Token;
use crate::data_sync::{MarketDataProvider, MarketPairRecord, PairToken, PoolLogSink, TracingPoolLogger};
use crate::utils::constants::FEE_TIER_SCALE;
use alloy_primitives::Address;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Result of merging one direction of a pair into the graph.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EdgeOutcome {
    Inserted,
    /// The quoted price was zero or negative; no edge exists for this direction.
    NonPositivePrice,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PairOutcome {
    pub token0_to_token1: EdgeOutcome,
    pub token1_to_token0: EdgeOutcome,
}

impl PairOutcome {
    pub fn edges_inserted(&self) -> usize {
        [self.token0_to_token1, self.token1_to_token0].iter().filter(|o| **o == EdgeOutcome::Inserted).count()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RejectedRecord {
    pub pair_address: String,
    pub error: RecordError,
}

/// What one provider contributed to a graph build.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProviderReport {
    pub provider: String,
    pub pairs_fetched: usize,
    pub pairs_inserted: usize,
    pub edges_inserted: usize,
    pub non_positive_skipped: usize,
    pub rejected: Vec<RejectedRecord>,
    /// Pairs whose edges were merged but whose simulator could not be built.
    pub simulator_failures: Vec<RejectedRecord>,
    pub simulators: usize,
    pub provider_error: Option<String>,
}

impl ProviderReport {
    fn new(provider: &str) -> Self {
        Self { provider: provider.to_string(), ..Self::default() }
    }

    fn merge(&mut self, chunk: ProviderReport) {
        self.pairs_inserted += chunk.pairs_inserted;
        self.edges_inserted += chunk.edges_inserted;
        self.non_positive_skipped += chunk.non_positive_skipped;
        self.rejected.extend(chunk.rejected);
        self.simulator_failures.extend(chunk.simulator_failures);
        self.simulators += chunk.simulators;
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BuildReport {
    pub providers: Vec<ProviderReport>,
}

impl BuildReport {
    pub fn pairs_inserted(&self) -> usize {
        self.providers.iter().map(|p| p.pairs_inserted).sum()
    }

    pub fn failed_providers(&self) -> impl Iterator<Item = &ProviderReport> {
        self.providers.iter().filter(|p| p.provider_error.is_some())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetectorStatistics {
    pub tokens: usize,
    pub quote_edges: usize,
    pub token_pairs: usize,
    pub pool_simulators: usize,
    pub cycles2: usize,
    pub cycles3: usize,
    pub indexed_vertices: usize,
    /// Token sets already expanded into cycles.
    pub cached_token_sets: usize,
}

// Everything a chunk mutates, guarded by one lock during a build.
#[derive(Default)]
struct GraphState {
    price_graph: PriceGraph,
    pool_simulators: PoolSimulatorRegistry,
}

// A record validated and converted off-lock.
struct PreparedPair {
    token0: Token,
    token1: Token,
    forward: Option<QuoteEdge>,
    backward: Option<QuoteEdge>,
    simulator: Option<Result<PoolWrapper, RecordError>>,
    block_number: u64,
}

/// Builds the price graph from its providers and caches the 2- and 3-cycles in it.
///
/// All state is owned by the detector and rebuilt from scratch by
/// [`build_graph`](Self::build_graph). Cycle state is only refreshed by
/// [`cache_arbitrage_cycles`](Self::cache_arbitrage_cycles).
pub struct ArbitrageDetector {
    config: DetectorConfigSection,
    providers: Vec<(String, Arc<dyn MarketDataProvider>)>,
    pool_log: Arc<dyn PoolLogSink>,
    price_graph: PriceGraph,
    pool_simulators: PoolSimulatorRegistry,
    cycle_cache: CycleCache,
}

impl ArbitrageDetector {
    pub fn builder() -> ArbitrageDetectorBuilder {
        ArbitrageDetectorBuilder::new()
    }

    pub fn config(&self) -> &DetectorConfigSection {
        &self.config
    }

    pub fn provider_names(&self) -> impl Iterator<Item = &str> {
        self.providers.iter().map(|(name, _)| name.as_str())
    }

    /// Rebuild using the configured pair count and concurrency width.
    pub async fn build_graph_from_config(&mut self) -> BuildReport {
        self.build_graph(self.config.top_pairs_count, self.config.effective_width()).await
    }

    /// Clear every structure, then fetch up to `limit` pairs from each provider
    /// in registration order and merge them into the graph.
    ///
    /// Provider and record failures are logged and reported, never returned.
    pub async fn build_graph(&mut self, limit: usize, concurrency_width: usize) -> BuildReport {
        self.price_graph.clear();
        self.pool_simulators.clear();
        self.cycle_cache.clear();

        let filter = self.config.pair_filter();
        let order_by_liquidity = self.config.order_by_liquidity;
        let providers = self.providers.clone();
        let mut report = BuildReport::default();

        for (name, provider) in providers {
            info!(provider = %name, limit, "Fetching top pairs");
            let provider_report = match provider.get_all_pairs(Some(limit), Some(&filter), order_by_liquidity).await {
                Ok(pairs) => {
                    let provider_report = self.add_pairs(&name, pairs, concurrency_width).await;
                    info!(
                        provider = %name,
                        pairs = provider_report.pairs_fetched,
                        inserted = provider_report.pairs_inserted,
                        rejected = provider_report.rejected.len(),
                        simulators = provider_report.simulators,
                        "Merged provider pairs"
                    );
                    provider_report
                }
                Err(e) => {
                    error!(provider = %name, error = %e, "Error fetching pairs");
                    ProviderReport { provider_error: Some(e.to_string()), ..ProviderReport::new(&name) }
                }
            };
            report.providers.push(provider_report);
        }

        info!(
            tokens = self.price_graph.node_count(),
            quote_edges = self.price_graph.edge_count(),
            pool_simulators = self.pool_simulators.len(),
            "Price graph built"
        );
        report
    }

    /// Merge `pairs` into the current graph under `provider_name`.
    ///
    /// Pairs are split into contiguous chunks of `len / concurrency_width`
    /// (at least 1) that run as separate tasks. Validation and conversion
    /// happen outside the lock; only graph and registry mutation is serialized.
    pub async fn add_pairs(&mut self, provider_name: &str, pairs: Vec<MarketPairRecord>, concurrency_width: usize) -> ProviderReport {
        let mut report = ProviderReport::new(provider_name);
        report.pairs_fetched = pairs.len();
        if pairs.is_empty() {
            debug!(provider = %provider_name, "No pairs to add");
            return report;
        }

        let protocol = PoolProtocol::from_provider_name(provider_name).filter(PoolProtocol::is_constant_product);
        let chunk_size = (pairs.len() / concurrency_width.max(1)).max(1);
        let provider: Arc<str> = Arc::from(provider_name);

        let state = Arc::new(Mutex::new(GraphState {
            price_graph: std::mem::take(&mut self.price_graph),
            pool_simulators: std::mem::take(&mut self.pool_simulators),
        }));

        let mut tasks = JoinSet::new();
        let mut remaining = pairs.into_iter().peekable();
        while remaining.peek().is_some() {
            let chunk: Vec<MarketPairRecord> = remaining.by_ref().take(chunk_size).collect();
            tasks.spawn(process_chunk(state.clone(), provider.clone(), protocol, self.pool_log.clone(), chunk));
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(chunk_report) => report.merge(chunk_report),
                Err(e) => error!(provider = %provider_name, error = %e, "Chunk task failed"),
            }
        }

        let state = match Arc::try_unwrap(state) {
            Ok(mutex) => mutex.into_inner(),
            Err(shared) => std::mem::take(&mut *shared.lock().await),
        };
        self.price_graph = state.price_graph;
        self.pool_simulators = state.pool_simulators;

        report
    }

    /// Expand every not yet cached 2- and 3-cycle of the current graph.
    pub fn cache_arbitrage_cycles(&mut self) -> EnumerationReport {
        let report = cache_cycles(&self.price_graph, &mut self.cycle_cache);
        info!(
            cycles2 = self.cycle_cache.cycles2().len(),
            cycles3 = self.cycle_cache.cycles3().len(),
            added = report.cycles_added(),
            anomalies = report.anomalies.len(),
            "Arbitrage cycles cached"
        );
        report
    }

    pub fn price_graph(&self) -> &PriceGraph {
        &self.price_graph
    }

    pub fn pool_simulators(&self) -> &PoolSimulatorRegistry {
        &self.pool_simulators
    }

    pub fn cycles(&self) -> &CycleCache {
        &self.cycle_cache
    }

    pub fn statistics(&self) -> DetectorStatistics {
        DetectorStatistics {
            tokens: self.price_graph.node_count(),
            quote_edges: self.price_graph.edge_count(),
            token_pairs: self.price_graph.token_pair_count(),
            pool_simulators: self.pool_simulators.len(),
            cycles2: self.cycle_cache.cycles2().len(),
            cycles3: self.cycle_cache.cycles3().len(),
            indexed_vertices: self.cycle_cache.vertex_count(),
            cached_token_sets: self.cycle_cache.cached_keys(),
        }
    }
}

async fn process_chunk(
    state: Arc<Mutex<GraphState>>,
    provider: Arc<str>,
    protocol: Option<PoolProtocol>,
    pool_log: Arc<dyn PoolLogSink>,
    chunk: Vec<MarketPairRecord>,
) -> ProviderReport {
    let mut report = ProviderReport::new(&provider);
    let mut simulators: Vec<(PoolWrapper, u64)> = Vec::new();

    for record in chunk {
        let prepared = match prepare_pair(&record, &provider, protocol) {
            Ok(prepared) => prepared,
            Err(e) => {
                warn!(provider = %provider, pair = %record.pair_address, error = %e, "Skipping malformed pair");
                report.rejected.push(RejectedRecord { pair_address: record.pair_address, error: e });
                continue;
            }
        };

        let outcome = {
            let mut guard = state.lock().await;
            merge_pair(&mut guard.price_graph, prepared.token0, prepared.token1, prepared.forward, prepared.backward)
        };
        report.pairs_inserted += 1;
        report.edges_inserted += outcome.edges_inserted();
        report.non_positive_skipped += 2 - outcome.edges_inserted();

        match prepared.simulator {
            Some(Ok(pool)) => simulators.push((pool, prepared.block_number)),
            Some(Err(e)) => {
                warn!(provider = %provider, pair = %record.pair_address, error = %e, "Cannot create pool simulator");
                report.simulator_failures.push(RejectedRecord { pair_address: record.pair_address, error: e });
            }
            None => {}
        }
    }

    if !simulators.is_empty() {
        let mut guard = state.lock().await;
        for (pool, _) in &simulators {
            guard.pool_simulators.add_v2_pool(pool.clone(), &provider);
        }
    }
    report.simulators = simulators.len();
    for (pool, block_number) in &simulators {
        debug!(provider = %provider, pool = %pool.get_address(), "Created pool simulator");
        pool_log.log_pool_creation(pool, *block_number);
    }

    report
}

fn merge_pair(graph: &mut PriceGraph, token0: Token, token1: Token, forward: Option<QuoteEdge>, backward: Option<QuoteEdge>) -> PairOutcome {
    let idx0 = graph.add_or_get_token(token0);
    let idx1 = graph.add_or_get_token(token1);

    let mut insert = |from, to, quote: Option<QuoteEdge>| match quote {
        Some(quote) => {
            graph.upsert_quote(from, to, quote);
            EdgeOutcome::Inserted
        }
        None => EdgeOutcome::NonPositivePrice,
    };
    let token0_to_token1 = insert(idx0, idx1, forward);
    let token1_to_token0 = insert(idx1, idx0, backward);
    PairOutcome { token0_to_token1, token1_to_token0 }
}

fn prepare_pair(record: &MarketPairRecord, provider: &str, protocol: Option<PoolProtocol>) -> Result<PreparedPair, RecordError> {
    let pool = parse_address("pair_address", &record.pair_address)?;
    let token0 = parse_token("token0", &record.token0)?;
    let token1 = parse_token("token1", &record.token1)?;
    if token0.get_address() == token1.get_address() {
        return Err(RecordError::IdenticalTokens(token0.get_address()));
    }

    let fee = f64::from(record.fee_tier) / FEE_TIER_SCALE;
    let quote = |price: Decimal| -> Result<Option<QuoteEdge>, RecordError> {
        Ok(quote_weight(price)?.map(|weight| QuoteEdge { pool, weight, price, provider: provider.to_string(), fee }))
    };
    // token1_price quotes token0 -> token1, token0_price the way back
    let forward = quote(record.token1_price)?;
    let backward = quote(record.token0_price)?;

    let simulator = protocol.map(|protocol| {
        UniswapV2Pool::from_human_reserves(pool, token0.clone(), token1.clone(), record.reserve0, record.reserve1, fee, protocol)
            .map(PoolWrapper::from)
    });

    Ok(PreparedPair { token0, token1, forward, backward, simulator, block_number: record.block_number })
}

/// `ln(price)` for a strictly positive price, `None` otherwise.
pub fn quote_weight(price: Decimal) -> Result<Option<f64>, RecordError> {
    if price <= Decimal::ZERO {
        return Ok(None);
    }
    let value = price.to_f64().filter(|v| v.is_finite() && *v > 0.0).ok_or(RecordError::PriceOutOfRange(price))?;
    Ok(Some(value.ln()))
}

fn parse_address(field: &'static str, value: &str) -> Result<Address, RecordError> {
    Address::from_str(value.trim()).map_err(|_| RecordError::InvalidAddress { field, value: value.to_string() })
}

fn parse_token(field: &'static str, token: &PairToken) -> Result<Token, RecordError> {
    let address = parse_address(field, &token.address)?;
    Ok(Token::new_with_data(address, Some(token.symbol.clone()), Some(token.decimals)))
}

pub struct ArbitrageDetectorBuilder {
    config: DetectorConfigSection,
    providers: Vec<(String, Arc<dyn MarketDataProvider>)>,
    pool_log: Arc<dyn PoolLogSink>,
}

impl ArbitrageDetectorBuilder {
    pub fn new() -> Self {
        Self { config: DetectorConfigSection::default(), providers: Vec::new(), pool_log: Arc::new(TracingPoolLogger) }
    }

    pub fn with_config(mut self, config: DetectorConfigSection) -> Self {
        self.config = config;
        self
    }

    /// Register a provider under `name`. The name labels its quote edges and
    /// decides whether its pairs get constant-product simulators.
    pub fn with_provider(mut self, name: impl Into<String>, provider: Arc<dyn MarketDataProvider>) -> Self {
        self.providers.push((name.into(), provider));
        self
    }

    pub fn with_providers<I>(mut self, providers: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn MarketDataProvider>>,
    {
        for provider in providers {
            self.providers.push((provider.market_id(), provider));
        }
        self
    }

    pub fn with_pool_log(mut self, pool_log: Arc<dyn PoolLogSink>) -> Self {
        self.pool_log = pool_log;
        self
    }

    pub fn build(self) -> ArbitrageDetector {
        ArbitrageDetector {
            config: self.config,
            providers: self.providers,
            pool_log: self.pool_log,
            price_graph: PriceGraph::new(),
            pool_simulators: PoolSimulatorRegistry::new(),
            cycle_cache: CycleCache::new(),
        }
    }
}

impl Default for ArbitrageDetectorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
