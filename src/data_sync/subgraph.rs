//! Uniswap V2 style subgraph client.
//!
//! Pairs are requested ordered by volume, pre-filtered server side by reserve
//! size and recent swap activity. Volume and asset filters, liquidity ordering
//! and truncation run locally through [`select_pairs`].

use super::pair::{MarketPairRecord, PairToken, TradingPairFilter, select_pairs};
use super::provider::{AmmType, MarketDataProvider, ProviderError};
use crate::utils::constants::DEFAULT_V2_FEE_TIER;
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use std::str::FromStr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

pub const GET_TOP_PAIRS: &str = r#"
query GetTopPairs($first: Int!, $minLiquidityUSD: BigDecimal!, $lastTransactionTimestamp: BigInt!) {
  pairs(
    first: $first,
    orderBy: volumeUSD,
    orderDirection: desc,
    where: {
      reserveUSD_gt: $minLiquidityUSD,
      token0_: {derivedETH_gt: "0"},
      token1_: {derivedETH_gt: "0"},
      swaps_: {timestamp_gt: $lastTransactionTimestamp}
    }
  ) {
    id
    token0 { id symbol decimals derivedETH }
    token1 { id symbol decimals derivedETH }
    token0Price
    token1Price
    reserve0
    reserve1
    reserveUSD
    volumeUSD
    txCount
  }
  _meta { block { number } }
}
"#;

const DEFAULT_PAGE_SIZE: usize = 1000;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const ACTIVITY_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<TopPairsData>,
    #[serde(default)]
    errors: Vec<GraphQlErrorMessage>,
}

#[derive(Debug, Deserialize)]
struct GraphQlErrorMessage {
    message: String,
}

#[derive(Debug, Deserialize)]
struct TopPairsData {
    pairs: Vec<RawPair>,
    #[serde(rename = "_meta")]
    meta: Option<RawMeta>,
}

#[derive(Debug, Deserialize)]
struct RawMeta {
    block: RawBlock,
}

#[derive(Debug, Deserialize)]
struct RawBlock {
    number: u64,
}

// BigDecimal / BigInt fields arrive as JSON strings.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPair {
    id: String,
    token0: RawToken,
    token1: RawToken,
    token0_price: String,
    token1_price: String,
    reserve0: String,
    reserve1: String,
    #[serde(rename = "reserveUSD")]
    reserve_usd: String,
    #[serde(rename = "volumeUSD")]
    volume_usd: String,
}

#[derive(Debug, Deserialize)]
struct RawToken {
    id: String,
    symbol: String,
    decimals: String,
}

fn parse_decimal(field: &'static str, value: &str) -> Result<Decimal, String> {
    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .map_err(|e| format!("{field}={value}: {e}"))
}

fn parse_token(raw: RawToken) -> Result<PairToken, String> {
    let decimals = raw.decimals.parse::<u8>().map_err(|e| format!("decimals={}: {e}", raw.decimals))?;
    Ok(PairToken::new(raw.id, raw.symbol, decimals))
}

fn convert_pair(raw: RawPair, fee_tier: u32, block_number: u64, network: &str) -> Result<MarketPairRecord, String> {
    Ok(MarketPairRecord {
        token0_price: parse_decimal("token0Price", &raw.token0_price)?,
        token1_price: parse_decimal("token1Price", &raw.token1_price)?,
        reserve0: parse_decimal("reserve0", &raw.reserve0)?,
        reserve1: parse_decimal("reserve1", &raw.reserve1)?,
        total_liquidity_usd: parse_decimal("reserveUSD", &raw.reserve_usd)?,
        volume_24h_usd: parse_decimal("volumeUSD", &raw.volume_usd)?,
        token0: parse_token(raw.token0)?,
        token1: parse_token(raw.token1)?,
        pair_address: raw.id,
        fee_tier,
        block_number,
        network: network.to_string(),
    })
}

/// Decode a `GetTopPairs` response body. Pairs whose numeric fields cannot be
/// decoded are skipped with a warning.
pub fn parse_top_pairs(body: &str, network: &str, fee_tier: u32) -> Result<Vec<MarketPairRecord>, ProviderError> {
    let response: GraphQlResponse = serde_json::from_str(body)?;
    if !response.errors.is_empty() {
        let messages: Vec<String> = response.errors.into_iter().map(|e| e.message).collect();
        return Err(ProviderError::GraphQl(messages.join("; ")));
    }
    let data = response.data.ok_or_else(|| ProviderError::GraphQl("response carries no data".to_string()))?;
    let block_number = data.meta.map(|meta| meta.block.number).unwrap_or_default();

    let mut pairs = Vec::with_capacity(data.pairs.len());
    for raw in data.pairs {
        let pair_id = raw.id.clone();
        match convert_pair(raw, fee_tier, block_number, network) {
            Ok(pair) => pairs.push(pair),
            Err(e) => warn!(pair = %pair_id, error = %e, "Skipping undecodable subgraph pair"),
        }
    }
    Ok(pairs)
}

pub struct SubgraphMarketDataProvider {
    client: Client,
    url: String,
    network: String,
    fee_tier: u32,
    market_id: String,
}

impl SubgraphMarketDataProvider {
    pub fn new(url: impl Into<String>, network: impl Into<String>) -> Result<Self, ProviderError> {
        let network = network.into();
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            url: url.into(),
            market_id: format!("uniswap_v2-{network}"),
            network,
            fee_tier: DEFAULT_V2_FEE_TIER,
        })
    }

    pub fn with_market_id(mut self, market_id: impl Into<String>) -> Self {
        self.market_id = market_id.into();
        self
    }

    pub fn with_fee_tier(mut self, fee_tier: u32) -> Self {
        self.fee_tier = fee_tier;
        self
    }

    fn request_body(limit: Option<usize>, filter_options: Option<&TradingPairFilter>) -> serde_json::Value {
        let min_liquidity = filter_options.and_then(|f| f.min_liquidity_usd).unwrap_or_default();
        let since = SystemTime::now().checked_sub(ACTIVITY_WINDOW).unwrap_or(UNIX_EPOCH);
        let since_secs = since.duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or_default();
        json!({
            "query": GET_TOP_PAIRS,
            "variables": {
                "first": limit.unwrap_or(DEFAULT_PAGE_SIZE),
                "minLiquidityUSD": min_liquidity.to_string(),
                "lastTransactionTimestamp": since_secs.to_string(),
            }
        })
    }
}

#[async_trait]
impl MarketDataProvider for SubgraphMarketDataProvider {
    fn market_id(&self) -> String {
        self.market_id.clone()
    }

    fn amm_type(&self) -> AmmType {
        AmmType::UniswapV2
    }

    async fn get_all_pairs(
        &self,
        limit: Option<usize>,
        filter_options: Option<&TradingPairFilter>,
        order_by_liquidity: bool,
    ) -> Result<Vec<MarketPairRecord>, ProviderError> {
        let body = Self::request_body(limit, filter_options);
        debug!(market_id = %self.market_id, url = %self.url, "Querying subgraph for top pairs");

        let response = self.client.post(&self.url).json(&body).send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ProviderError::Status { status: status.as_u16(), body: text });
        }

        let pairs = parse_top_pairs(&text, &self.network, self.fee_tier)?;
        debug!(market_id = %self.market_id, pairs = pairs.len(), "Subgraph returned pairs");
        Ok(select_pairs(pairs, limit, filter_options, order_by_liquidity))
    }
}
