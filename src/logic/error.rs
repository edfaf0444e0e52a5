use alloy_primitives::Address;
use rust_decimal::Decimal;
use thiserror::Error;

/// Why a pair record could not be merged into the price graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("invalid {field} address: {value:?}")]
    InvalidAddress { field: &'static str, value: String },
    #[error("token0 and token1 are both {0}")]
    IdenticalTokens(Address),
    #[error("price {0} has no finite logarithm")]
    PriceOutOfRange(Decimal),
    #[error("negative reserve {0}")]
    NegativeReserve(Decimal),
    #[error("reserve {reserve} overflows when scaled by 10^{decimals}")]
    ReserveOverflow { reserve: Decimal, decimals: u8 },
}

/// Structural anomaly found while expanding a node-cycle into concrete cycles.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpansionError {
    #[error("no quote edge on leg {from} -> {to}")]
    MissingLeg { from: Address, to: Address },
    #[error("2-cycle needs at least two parallel pools, found {found}")]
    InsufficientParallelEdges { found: usize },
    #[error("triangle repeats a token")]
    DegenerateTriangle,
}
