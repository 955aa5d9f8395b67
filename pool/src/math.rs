use alloy_primitives::U256;

/// Direction to round the result of a fixed-point operation
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Rounding {
    Floor,
    Ceil,
}

/// Fixed-point arithmetic for token amounts, indexes and rates.
///
/// Intermediate products are computed with 256 bits, so only results that do not fit back
/// into the value type return `None`.
pub trait FixedPoint: Sized {
    /// Safely calculates floor(x * y / denominator). Returns None if a phantom overflow occurs
    /// or if the denominator is 0.
    fn fixed_mul_floor(self, y: Self, denominator: Self) -> Option<Self>;

    /// Safely calculates ceil(x * y / denominator). Returns None if a phantom overflow occurs
    /// or if the denominator is 0.
    fn fixed_mul_ceil(self, y: Self, denominator: Self) -> Option<Self>;

    /// Safely calculates floor(x * denominator / y). Returns None if a phantom overflow occurs
    /// or if y is 0.
    fn fixed_div_floor(self, y: Self, denominator: Self) -> Option<Self>;

    /// Safely calculates ceil(x * denominator / y). Returns None if a phantom overflow occurs
    /// or if y is 0.
    fn fixed_div_ceil(self, y: Self, denominator: Self) -> Option<Self>;
}

impl FixedPoint for u128 {
    fn fixed_mul_floor(self, y: u128, denominator: u128) -> Option<u128> {
        mul_div(&[self, y], &[denominator], Rounding::Floor)
    }

    fn fixed_mul_ceil(self, y: u128, denominator: u128) -> Option<u128> {
        mul_div(&[self, y], &[denominator], Rounding::Ceil)
    }

    fn fixed_div_floor(self, y: u128, denominator: u128) -> Option<u128> {
        mul_div(&[self, denominator], &[y], Rounding::Floor)
    }

    fn fixed_div_ceil(self, y: u128, denominator: u128) -> Option<u128> {
        mul_div(&[self, denominator], &[y], Rounding::Ceil)
    }
}

/// Multiply all `factors` and divide the product by the product of all `divisors`, rounding
/// in the given direction.
///
/// Returns None if any intermediate product exceeds 256 bits, if a divisor is 0, or if the
/// result does not fit into a u128.
pub fn mul_div(factors: &[u128], divisors: &[u128], rounding: Rounding) -> Option<u128> {
    let numerator = product(factors)?;
    let denominator = product(divisors)?;
    if denominator.is_zero() {
        return None;
    }
    let mut result = numerator / denominator;
    if rounding == Rounding::Ceil && !(numerator % denominator).is_zero() {
        result = result.checked_add(U256::from(1u8))?;
    }
    u128::try_from(result).ok()
}

fn product(values: &[u128]) -> Option<U256> {
    values
        .iter()
        .try_fold(U256::from(1u8), |acc, value| acc.checked_mul(U256::from(*value)))
}
