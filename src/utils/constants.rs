use rust_decimal::Decimal;

/// Fee tiers are quoted in parts-per-million (3000 = 0.3%).
pub const FEE_TIER_SCALE: f64 = 1_000_000.0;

/// Denominator of the integer fee multiplier used by constant-product math.
pub const FEE_MULTIPLIER_SCALE: u64 = 10_000;

/// Fee tier of a plain Uniswap V2 fork.
pub const DEFAULT_V2_FEE_TIER: u32 = 3000;

pub const DEFAULT_TOP_PAIRS_COUNT: usize = 100;

pub const DEFAULT_CONCURRENCY_WIDTH: usize = 4;

pub const DEFAULT_MIN_LIQUIDITY_USD: Decimal = Decimal::TEN;
