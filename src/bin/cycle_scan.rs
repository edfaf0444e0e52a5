use clap::Parser;
use eyre::Result;
use price_cycles::data_sync::ProvidersConfigRoot;
use price_cycles::utils::config_loader::load_from_file;
use price_cycles::{ArbitrageDetector, DetectorConfigRoot};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cycle-scan")]
#[command(about = "Build the price graph from configured providers and cache its 2- and 3-cycles", long_about = None)]
struct Cli {
    /// Path to the TOML config with [detector] and [[providers]] sections
    #[arg(long, default_value = "config.toml")]
    config: String,

    /// Pairs requested per provider, overrides `top_pairs_count`
    #[arg(long)]
    limit: Option<usize>,

    /// Concurrent chunks per provider, overrides `concurrency_width`
    #[arg(long)]
    width: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let detector_root: DetectorConfigRoot = load_from_file(cli.config.clone()).await?;
    let providers_root: ProvidersConfigRoot = load_from_file(cli.config.clone()).await?;
    let providers = providers_root.build_providers()?;
    if providers.is_empty() {
        warn!(config = %cli.config, "No providers configured");
    }

    let config = detector_root.detector;
    let limit = cli.limit.unwrap_or(config.top_pairs_count);
    let width = cli.width.unwrap_or(config.concurrency_width);

    let mut builder = ArbitrageDetector::builder().with_config(config);
    for (section, provider) in providers_root.providers.iter().zip(providers) {
        builder = builder.with_provider(section.name.clone(), provider);
    }
    let mut detector = builder.build();

    let report = detector.build_graph(limit, width).await;
    for provider in &report.providers {
        info!(
            provider = %provider.provider,
            fetched = provider.pairs_fetched,
            inserted = provider.pairs_inserted,
            edges = provider.edges_inserted,
            rejected = provider.rejected.len(),
            simulators = provider.simulators,
            "Provider loaded"
        );
    }
    for failed in report.failed_providers() {
        error!(provider = %failed.provider, error = failed.provider_error.as_deref().unwrap_or_default(), "Provider failed");
    }

    let enumeration = detector.cache_arbitrage_cycles();
    let stats = detector.statistics();
    info!(
        tokens = stats.tokens,
        quote_edges = stats.quote_edges,
        token_pairs = stats.token_pairs,
        pool_simulators = stats.pool_simulators,
        cycles2 = stats.cycles2,
        cycles3 = stats.cycles3,
        indexed_vertices = stats.indexed_vertices,
        cached_token_sets = stats.cached_token_sets,
        anomalies = enumeration.anomalies.len(),
        "Cycle scan finished"
    );

    Ok(())
}
