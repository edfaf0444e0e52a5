use super::pair::{MarketPairRecord, TradingPairFilter, select_pairs};
use super::provider::{AmmType, MarketDataProvider, ProviderError};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

#[derive(Clone, Debug)]
enum SnapshotSource {
    Memory(Vec<MarketPairRecord>),
    // JSON array of records, re-read on every fetch
    File(PathBuf),
}

/// Serves pair records from memory or from a JSON snapshot on disk.
#[derive(Clone, Debug)]
pub struct SnapshotMarketDataProvider {
    market_id: String,
    amm_type: AmmType,
    source: SnapshotSource,
}

impl SnapshotMarketDataProvider {
    pub fn from_pairs(market_id: impl Into<String>, pairs: Vec<MarketPairRecord>) -> Self {
        Self { market_id: market_id.into(), amm_type: AmmType::UniswapV2, source: SnapshotSource::Memory(pairs) }
    }

    pub fn from_file(market_id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self { market_id: market_id.into(), amm_type: AmmType::UniswapV2, source: SnapshotSource::File(path.into()) }
    }

    pub fn with_amm_type(mut self, amm_type: AmmType) -> Self {
        self.amm_type = amm_type;
        self
    }

    async fn load(&self) -> Result<Vec<MarketPairRecord>, ProviderError> {
        match &self.source {
            SnapshotSource::Memory(pairs) => Ok(pairs.clone()),
            SnapshotSource::File(path) => {
                let contents = tokio::fs::read_to_string(path).await?;
                let pairs: Vec<MarketPairRecord> = serde_json::from_str(&contents)?;
                debug!(market_id = %self.market_id, path = %path.display(), pairs = pairs.len(), "Loaded pair snapshot");
                Ok(pairs)
            }
        }
    }
}

#[async_trait]
impl MarketDataProvider for SnapshotMarketDataProvider {
    fn market_id(&self) -> String {
        self.market_id.clone()
    }

    fn amm_type(&self) -> AmmType {
        self.amm_type
    }

    async fn get_all_pairs(
        &self,
        limit: Option<usize>,
        filter_options: Option<&TradingPairFilter>,
        order_by_liquidity: bool,
    ) -> Result<Vec<MarketPairRecord>, ProviderError> {
        let pairs = self.load().await?;
        Ok(select_pairs(pairs, limit, filter_options, order_by_liquidity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_sync::pair::test_helpers::*;

    #[tokio::test]
    async fn test_memory_snapshot_applies_filter_and_limit() -> eyre::Result<()> {
        let mut thin = pair(1, 2, 3, "1", "1");
        thin.total_liquidity_usd = dec("1");
        let provider = SnapshotMarketDataProvider::from_pairs("uniswap_v2-test", vec![thin, pair(4, 2, 3, "1", "1"), pair(5, 3, 6, "1", "1")]);

        let filter = TradingPairFilter::default().with_min_liquidity_usd(dec("10"));
        let pairs = provider.get_all_pairs(Some(1), Some(&filter), true).await?;
        assert_eq!(pairs.len(), 1);
        assert_eq!(provider.get_all_pairs(None, Some(&filter), true).await?.len(), 2);
        assert_eq!(provider.amm_type(), AmmType::UniswapV2);
        Ok(())
    }

    #[tokio::test]
    async fn test_file_snapshot_round_trip() -> eyre::Result<()> {
        let path = std::env::temp_dir().join(format!("price-cycles-snapshot-{}.json", std::process::id()));
        let pairs = vec![pair(1, 2, 3, "0.5", "2"), pair(4, 3, 5, "1", "1")];
        tokio::fs::write(&path, serde_json::to_string(&pairs)?).await?;

        let provider = SnapshotMarketDataProvider::from_file("uniswap_v2-file", &path);
        let loaded = provider.get_all_pairs(None, None, false).await?;
        tokio::fs::remove_file(&path).await?;

        assert_eq!(loaded, pairs);
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_file_is_provider_error() {
        let provider = SnapshotMarketDataProvider::from_file("uniswap_v2-missing", "/nonexistent/price-cycles/pairs.json");
        let result = provider.get_all_pairs(None, None, true).await;
        assert!(matches!(result, Err(ProviderError::Io(_))));
    }
}
