use super::pool::{CalculationError, PoolProtocol, PoolSimulator, SwapResult};
use crate::Token;
use crate::logic::error::RecordError;
use crate::utils::constants::FEE_MULTIPLIER_SCALE;
use alloy_primitives::{Address, U256};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Constant-product pool with integer reserves and a fee expressed as a
/// multiplier out of 10 000 (9970 for a 0.3% fee).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UniswapV2Pool {
    address: Address,
    token0: Token,
    token1: Token,
    reserve0: U256,
    reserve1: U256,
    fee: f64,
    fee_multiplier: u64,
    protocol: PoolProtocol,
}

impl UniswapV2Pool {
    pub fn new(address: Address, token0: Token, token1: Token, reserve0: U256, reserve1: U256, fee: f64, protocol: PoolProtocol) -> Self {
        let scale = FEE_MULTIPLIER_SCALE as f64;
        let fee_multiplier = ((1.0 - fee) * scale).round().clamp(0.0, scale) as u64;
        Self { address, token0, token1, reserve0, reserve1, fee, fee_multiplier, protocol }
    }

    /// Build from human-scaled reserves, converting each to `reserve * 10^decimals`
    /// truncated to an integer.
    pub fn from_human_reserves(
        address: Address,
        token0: Token,
        token1: Token,
        reserve0: Decimal,
        reserve1: Decimal,
        fee: f64,
        protocol: PoolProtocol,
    ) -> Result<Self, RecordError> {
        let reserve0 = scale_reserve(reserve0, token0.get_decimals())?;
        let reserve1 = scale_reserve(reserve1, token1.get_decimals())?;
        Ok(Self::new(address, token0, token1, reserve0, reserve1, fee, protocol))
    }

    pub fn fee_multiplier(&self) -> u64 {
        self.fee_multiplier
    }

    // (reserve_in, reserve_out, decimals_in, decimals_out)
    fn direction(&self, token_from: &Address, token_to: &Address) -> Result<(U256, U256, u8, u8), CalculationError> {
        let t0 = self.token0.get_address();
        let t1 = self.token1.get_address();
        if *token_from == t0 && *token_to == t1 {
            Ok((self.reserve0, self.reserve1, self.token0.get_decimals(), self.token1.get_decimals()))
        } else if *token_from == t1 && *token_to == t0 {
            Ok((self.reserve1, self.reserve0, self.token1.get_decimals(), self.token0.get_decimals()))
        } else if *token_from != t0 && *token_from != t1 {
            Err(CalculationError::UnknownToken(*token_from))
        } else {
            Err(CalculationError::UnknownToken(*token_to))
        }
    }

    fn other_token(&self, token: &Address) -> Result<Address, CalculationError> {
        if *token == self.token0.get_address() {
            Ok(self.token1.get_address())
        } else if *token == self.token1.get_address() {
            Ok(self.token0.get_address())
        } else {
            Err(CalculationError::UnknownToken(*token))
        }
    }

    fn amount_out(&self, reserve_in: U256, reserve_out: U256, in_amount: U256) -> Result<U256, CalculationError> {
        if in_amount.is_zero() {
            return Err(CalculationError::ZeroAmount);
        }
        if reserve_in.is_zero() || reserve_out.is_zero() {
            return Err(CalculationError::ZeroReserves);
        }
        let multiplier = U256::from(self.fee_multiplier);
        let scale = U256::from(FEE_MULTIPLIER_SCALE);

        let amount_in_with_fee = in_amount.checked_mul(multiplier).ok_or(CalculationError::Overflow)?;
        let numerator = amount_in_with_fee.checked_mul(reserve_out).ok_or(CalculationError::Overflow)?;
        let denominator = reserve_in
            .checked_mul(scale)
            .and_then(|scaled| scaled.checked_add(amount_in_with_fee))
            .ok_or(CalculationError::Overflow)?;
        Ok(numerator / denominator)
    }

    fn amount_in(&self, reserve_in: U256, reserve_out: U256, out_amount: U256) -> Result<U256, CalculationError> {
        if out_amount.is_zero() {
            return Err(CalculationError::ZeroAmount);
        }
        if reserve_in.is_zero() || reserve_out.is_zero() {
            return Err(CalculationError::ZeroReserves);
        }
        if out_amount >= reserve_out || self.fee_multiplier == 0 {
            return Err(CalculationError::InsufficientLiquidity { requested: out_amount, available: reserve_out });
        }
        let multiplier = U256::from(self.fee_multiplier);
        let scale = U256::from(FEE_MULTIPLIER_SCALE);

        let numerator = reserve_in
            .checked_mul(out_amount)
            .and_then(|n| n.checked_mul(scale))
            .ok_or(CalculationError::Overflow)?;
        let denominator = (reserve_out - out_amount).checked_mul(multiplier).ok_or(CalculationError::Overflow)?;
        Ok(numerator / denominator + U256::from(1))
    }
}

#[typetag::serde]
impl PoolSimulator for UniswapV2Pool {
    fn get_protocol(&self) -> PoolProtocol {
        self.protocol
    }

    fn get_address(&self) -> Address {
        self.address
    }

    fn get_token0(&self) -> &Token {
        &self.token0
    }

    fn get_token1(&self) -> &Token {
        &self.token1
    }

    fn get_fee(&self) -> f64 {
        self.fee
    }

    fn get_reserves(&self) -> (U256, U256) {
        (self.reserve0, self.reserve1)
    }

    fn price0(&self) -> f64 {
        spot_price(self.reserve0, self.reserve1, self.token0.get_decimals(), self.token1.get_decimals())
    }

    fn price1(&self) -> f64 {
        spot_price(self.reserve1, self.reserve0, self.token1.get_decimals(), self.token0.get_decimals())
    }

    fn calculate_out_amount(&self, token_address_from: &Address, token_address_to: &Address, in_amount: U256) -> Result<U256, CalculationError> {
        let (reserve_in, reserve_out, _, _) = self.direction(token_address_from, token_address_to)?;
        self.amount_out(reserve_in, reserve_out, in_amount)
    }

    fn calculate_in_amount(&self, token_address_from: &Address, token_address_to: &Address, out_amount: U256) -> Result<U256, CalculationError> {
        let (reserve_in, reserve_out, _, _) = self.direction(token_address_from, token_address_to)?;
        self.amount_in(reserve_in, reserve_out, out_amount)
    }

    fn simulate_swap(&self, token_address_from: &Address, in_amount: U256) -> Result<SwapResult, CalculationError> {
        let token_address_to = self.other_token(token_address_from)?;
        let (reserve_in, reserve_out, decimals_in, decimals_out) = self.direction(token_address_from, &token_address_to)?;
        let amount_out = self.amount_out(reserve_in, reserve_out, in_amount)?;

        let price_before = spot_price(reserve_in, reserve_out, decimals_in, decimals_out);
        let reserve_in_after = reserve_in.checked_add(in_amount).ok_or(CalculationError::Overflow)?;
        let price_after = spot_price(reserve_in_after, reserve_out - amount_out, decimals_in, decimals_out);
        let slippage_percent = if price_before > 0.0 { (price_before - price_after) / price_before * 100.0 } else { 0.0 };

        Ok(SwapResult { amount_in: in_amount, amount_out, price_before, price_after, slippage_percent })
    }
}

/// `reserve * 10^decimals`, truncated.
pub fn scale_reserve(reserve: Decimal, decimals: u8) -> Result<U256, RecordError> {
    if reserve.is_sign_negative() && !reserve.is_zero() {
        return Err(RecordError::NegativeReserve(reserve));
    }
    let overflow = || RecordError::ReserveOverflow { reserve, decimals };
    let mantissa = U256::from(reserve.mantissa().unsigned_abs());
    let scale = reserve.scale();
    let decimals_u32 = u32::from(decimals);

    if decimals_u32 >= scale {
        let factor = pow10(decimals_u32 - scale).ok_or_else(overflow)?;
        mantissa.checked_mul(factor).ok_or_else(overflow)
    } else {
        let divisor = pow10(scale - decimals_u32).ok_or_else(overflow)?;
        Ok(mantissa / divisor)
    }
}

fn pow10(exp: u32) -> Option<U256> {
    U256::from(10).checked_pow(U256::from(exp))
}

// Price of the `in` token quoted in the `out` token.
fn spot_price(reserve_in: U256, reserve_out: U256, decimals_in: u8, decimals_out: u8) -> f64 {
    if reserve_in.is_zero() {
        return 0.0;
    }
    let adjustment = 10_f64.powi(i32::from(decimals_in) - i32::from(decimals_out));
    u256_to_f64(reserve_out) / u256_to_f64(reserve_in) * adjustment
}

fn u256_to_f64(value: U256) -> f64 {
    if value <= U256::from(u128::MAX) {
        return value.to::<u128>() as f64;
    }
    // keep the 64 most significant bits
    let bits = 256 - value.leading_zeros();
    let shift = bits.saturating_sub(64);
    let mantissa = (value >> shift).to::<u64>() as f64;
    mantissa * 2_f64.powi(shift as i32)
}
