use super::provider::{MarketDataProvider, ProviderError};
use super::snapshot::SnapshotMarketDataProvider;
use super::subgraph::SubgraphMarketDataProvider;
use crate::utils::config_loader::{ConfigLoader, ConfigLoaderSync, LoadConfigError, load_from_file, load_from_file_sync};
use crate::utils::constants::DEFAULT_V2_FEE_TIER;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Clone, Deserialize, Debug)]
pub struct ProvidersConfigRoot {
    #[serde(default)]
    pub providers: Vec<ProviderConfigSection>,
}

#[derive(Copy, Clone, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Subgraph,
    Snapshot,
}

/// One `[[providers]]` entry.
#[derive(Clone, Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfigSection {
    pub name: String,
    pub kind: ProviderKind,
    /// Subgraph endpoint, required for `subgraph`.
    pub url: Option<String>,
    /// JSON snapshot path, required for `snapshot`.
    pub path: Option<String>,
    #[serde(default = "default_network")]
    pub network: String,
    #[serde(default = "default_fee_tier")]
    pub fee_tier: u32,
}

fn default_network() -> String {
    "arbitrum".to_string()
}

fn default_fee_tier() -> u32 {
    DEFAULT_V2_FEE_TIER
}

impl ProviderConfigSection {
    pub fn build(&self) -> Result<Arc<dyn MarketDataProvider>, LoadConfigError> {
        match self.kind {
            ProviderKind::Subgraph => {
                let url = self.url.clone().ok_or_else(|| self.missing("url"))?;
                let provider = SubgraphMarketDataProvider::new(url, self.network.clone())
                    .map_err(|e: ProviderError| LoadConfigError::ConfigError(format!("provider {}: {e}", self.name)))?
                    .with_market_id(self.name.clone())
                    .with_fee_tier(self.fee_tier);
                Ok(Arc::new(provider))
            }
            ProviderKind::Snapshot => {
                let path = self.path.clone().ok_or_else(|| self.missing("path"))?;
                Ok(Arc::new(SnapshotMarketDataProvider::from_file(self.name.clone(), path)))
            }
        }
    }

    fn missing(&self, field: &str) -> LoadConfigError {
        LoadConfigError::ConfigError(format!("provider {} ({:?}) requires `{field}`", self.name, self.kind))
    }
}

impl ProvidersConfigRoot {
    pub fn build_providers(&self) -> Result<Vec<Arc<dyn MarketDataProvider>>, LoadConfigError> {
        self.providers.iter().map(ProviderConfigSection::build).collect()
    }
}

#[async_trait]
impl ConfigLoader for ProvidersConfigRoot {
    type SectionType = ProvidersConfigRoot;

    async fn load_section_from_file(file_name: String) -> Result<Self::SectionType, LoadConfigError> {
        load_from_file(file_name).await
    }
}

impl ConfigLoaderSync for ProvidersConfigRoot {
    type SectionType = ProvidersConfigRoot;

    fn load_section_from_file_sync(file_name: String) -> Result<Self::SectionType, LoadConfigError> {
        load_from_file_sync(file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::config_loader::load_from_str;

    // Sibling sections such as [detector] are ignored by this root.
    const CONFIG: &str = r#"
        [detector]
        top_pairs_count = 10

        [[providers]]
        name = "uniswap_v2-arbitrum"
        kind = "subgraph"
        url = "https://example.invalid/subgraphs/uniswap-v2"

        [[providers]]
        name = "local"
        kind = "snapshot"
        path = "pairs.json"
        fee_tier = 2500
    "#;

    #[test]
    fn test_parse_providers() -> eyre::Result<()> {
        let root: ProvidersConfigRoot = load_from_str(CONFIG)?;
        assert_eq!(root.providers.len(), 2);
        assert_eq!(root.providers[0].kind, ProviderKind::Subgraph);
        assert_eq!(root.providers[0].fee_tier, 3000);
        assert_eq!(root.providers[0].network, "arbitrum");
        assert_eq!(root.providers[1].fee_tier, 2500);

        let providers = root.build_providers()?;
        assert_eq!(providers[0].market_id(), "uniswap_v2-arbitrum");
        assert_eq!(providers[1].market_id(), "local");
        Ok(())
    }

    #[test]
    fn test_missing_url_is_config_error() -> eyre::Result<()> {
        let root: ProvidersConfigRoot = load_from_str("[[providers]]\nname = \"x\"\nkind = \"subgraph\"\n")?;
        assert!(matches!(root.build_providers(), Err(LoadConfigError::ConfigError(_))));
        Ok(())
    }

    #[test]
    fn test_unknown_provider_field_rejected() {
        let result: Result<ProvidersConfigRoot, _> = load_from_str("[[providers]]\nname = \"x\"\nkind = \"snapshot\"\nbogus = 1\n");
        assert!(result.is_err());
    }
}
