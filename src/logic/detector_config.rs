use crate::data_sync::TradingPairFilter;
use crate::utils::config_loader::{ConfigLoader, ConfigLoaderSync, LoadConfigError, load_from_file, load_from_file_sync};
use crate::utils::constants::{DEFAULT_CONCURRENCY_WIDTH, DEFAULT_MIN_LIQUIDITY_USD, DEFAULT_TOP_PAIRS_COUNT};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Clone, Deserialize, Debug)]
pub struct DetectorConfigRoot {
    #[serde(default)]
    pub detector: DetectorConfigSection,
}

#[derive(Clone, Deserialize, Debug, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct DetectorConfigSection {
    /// Pairs requested from each provider.
    pub top_pairs_count: usize,
    /// Chunks processed concurrently per provider.
    pub concurrency_width: usize,
    pub min_liquidity_usd: Decimal,
    pub min_volume_24h_usd: Option<Decimal>,
    pub assets: Option<Vec<String>>,
    pub order_by_liquidity: bool,
}

impl Default for DetectorConfigSection {
    fn default() -> Self {
        Self {
            top_pairs_count: DEFAULT_TOP_PAIRS_COUNT,
            concurrency_width: DEFAULT_CONCURRENCY_WIDTH,
            min_liquidity_usd: DEFAULT_MIN_LIQUIDITY_USD,
            min_volume_24h_usd: None,
            assets: None,
            order_by_liquidity: true,
        }
    }
}

impl DetectorConfigSection {
    pub fn with_top_pairs_count(mut self, top_pairs_count: usize) -> Self {
        self.top_pairs_count = top_pairs_count;
        self
    }

    pub fn with_concurrency_width(mut self, concurrency_width: usize) -> Self {
        self.concurrency_width = concurrency_width;
        self
    }

    /// Never below 1.
    pub fn effective_width(&self) -> usize {
        self.concurrency_width.max(1)
    }

    pub fn pair_filter(&self) -> TradingPairFilter {
        let mut filter = TradingPairFilter::default().with_min_liquidity_usd(self.min_liquidity_usd);
        if let Some(min_volume) = self.min_volume_24h_usd {
            filter = filter.with_min_volume_24h_usd(min_volume);
        }
        if let Some(assets) = &self.assets {
            filter = filter.with_assets(assets.iter().cloned());
        }
        filter
    }
}

#[async_trait]
impl ConfigLoader for DetectorConfigSection {
    type SectionType = DetectorConfigSection;

    async fn load_section_from_file(file_name: String) -> Result<Self::SectionType, LoadConfigError> {
        let root: DetectorConfigRoot = load_from_file(file_name).await?;
        Ok(root.detector)
    }
}

impl ConfigLoaderSync for DetectorConfigSection {
    type SectionType = DetectorConfigSection;

    fn load_section_from_file_sync(file_name: String) -> Result<Self::SectionType, LoadConfigError> {
        let root: DetectorConfigRoot = load_from_file_sync(file_name)?;
        Ok(root.detector)
    }
}
