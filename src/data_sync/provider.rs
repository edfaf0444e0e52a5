use super::pair::{MarketPairRecord, TradingPairFilter};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use thiserror::Error;

#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum AmmType {
    UniswapV2,
    UniswapV3,
    UniswapV4,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected HTTP status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("GraphQL error: {0}")]
    GraphQl(String),
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Source of trading pair records for one DEX / provider.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Unique identifier of the market, e.g. `uniswap_v2-arbitrum`.
    fn market_id(&self) -> String;

    fn amm_type(&self) -> AmmType;

    /// All pairs passing `filter_options`, descending by liquidity when
    /// `order_by_liquidity` is set, truncated to `limit`.
    async fn get_all_pairs(
        &self,
        limit: Option<usize>,
        filter_options: Option<&TradingPairFilter>,
        order_by_liquidity: bool,
    ) -> Result<Vec<MarketPairRecord>, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_amm_type_names() -> eyre::Result<()> {
        assert_eq!(AmmType::UniswapV2.to_string(), "uniswap-v2");
        assert_eq!(AmmType::from_str("uniswap-v3")?, AmmType::UniswapV3);
        Ok(())
    }
}
