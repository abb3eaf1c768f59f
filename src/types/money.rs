//! Fixed-point money helpers
//!
//! Balances and amounts carry exactly two fractional digits. Every arithmetic
//! result is rounded half-to-even before it is stored or returned.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of fractional digits kept for every balance and amount
pub const SCALE: u32 = 2;

/// Round to [`SCALE`] digits (half to even) and pad to exactly [`SCALE`] digits
///
/// `10` becomes `10.00`, `0.125` becomes `0.12`, `0.135` becomes `0.14`.
pub fn normalize(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(SCALE, RoundingStrategy::MidpointNearestEven);
    // round_dp never increases the scale, so pad short values like `10` or `10.5`
    if rounded.scale() < SCALE {
        rounded.rescale(SCALE);
    }
    rounded
}
