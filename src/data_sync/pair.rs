use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::HashSet;

/// One side of a trading pair as reported by a market data provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairToken {
    pub address: String,
    pub symbol: String,
    pub decimals: u8,
}

impl PairToken {
    pub fn new(address: impl Into<String>, symbol: impl Into<String>, decimals: u8) -> Self {
        Self { address: address.into(), symbol: symbol.into(), decimals }
    }
}

/// A trading pair record as delivered by a market data provider.
///
/// Addresses stay textual here. They are validated when the record is merged
/// into the price graph, so a malformed record only costs that one pair.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketPairRecord {
    pub pair_address: String,
    pub token0: PairToken,
    pub token1: PairToken,
    /// Quote of token0, used for the token1 -> token0 edge.
    pub token0_price: Decimal,
    /// Quote of token1, used for the token0 -> token1 edge.
    pub token1_price: Decimal,
    /// Parts-per-million (3000 = 0.3%).
    pub fee_tier: u32,
    /// Human-scaled reserve of token0.
    pub reserve0: Decimal,
    /// Human-scaled reserve of token1.
    pub reserve1: Decimal,
    #[serde(default)]
    pub total_liquidity_usd: Decimal,
    #[serde(default)]
    pub volume_24h_usd: Decimal,
    #[serde(default)]
    pub block_number: u64,
    #[serde(default)]
    pub network: String,
}

/// Filter options understood by every [`MarketDataProvider`](super::MarketDataProvider).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TradingPairFilter {
    pub min_liquidity_usd: Option<Decimal>,
    pub min_volume_24h_usd: Option<Decimal>,
    /// Keep only pairs where at least one side's symbol is in this set.
    pub assets: Option<HashSet<String>>,
}

impl TradingPairFilter {
    pub fn with_min_liquidity_usd(mut self, min_liquidity_usd: Decimal) -> Self {
        self.min_liquidity_usd = Some(min_liquidity_usd);
        self
    }

    pub fn with_min_volume_24h_usd(mut self, min_volume_24h_usd: Decimal) -> Self {
        self.min_volume_24h_usd = Some(min_volume_24h_usd);
        self
    }

    pub fn with_assets<I: IntoIterator<Item = S>, S: Into<String>>(mut self, assets: I) -> Self {
        self.assets = Some(assets.into_iter().map(Into::into).collect());
        self
    }

    pub fn matches(&self, record: &MarketPairRecord) -> bool {
        if let Some(min_liquidity) = self.min_liquidity_usd {
            if record.total_liquidity_usd < min_liquidity {
                return false;
            }
        }
        if let Some(min_volume) = self.min_volume_24h_usd {
            if record.volume_24h_usd < min_volume {
                return false;
            }
        }
        if let Some(assets) = &self.assets {
            if !assets.contains(&record.token0.symbol) && !assets.contains(&record.token1.symbol) {
                return false;
            }
        }
        true
    }
}

/// Filter, order (descending liquidity) and truncate a listing of pairs.
pub fn select_pairs(
    pairs: impl IntoIterator<Item = MarketPairRecord>,
    limit: Option<usize>,
    filter_options: Option<&TradingPairFilter>,
    order_by_liquidity: bool,
) -> Vec<MarketPairRecord> {
    let mut selected: Vec<MarketPairRecord> =
        pairs.into_iter().filter(|pair| filter_options.is_none_or(|filter| filter.matches(pair))).collect();

    if order_by_liquidity {
        selected.sort_by_key(|pair| Reverse(pair.total_liquidity_usd));
    }
    if let Some(limit) = limit {
        selected.truncate(limit);
    }
    selected
}
