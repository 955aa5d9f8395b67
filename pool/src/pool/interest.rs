use crate::{
    constants::{SCALAR_24, SCALAR_6},
    errors::PoolError,
    math::{mul_div, FixedPoint, Rounding},
};

/// The utilization rates, expressed in 6 decimals, at which the interest rate model
/// defines the borrow rate
pub const UTILIZATION_BREAKPOINTS_E6: [u128; 7] = [
    0, 500_000, 600_000, 700_000, 800_000, 900_000, 1_000_000,
];

/// Calculate the utilization of a reserve, expressed in 6 decimals
///
/// ### Arguments
/// * `total_debt` - The variable and stable debt of the reserve
/// * `available` - The liquidity the pool holds for the reserve
pub fn calc_utilization(total_debt: u128, available: u128) -> Result<u128, PoolError> {
    let total = total_debt
        .checked_add(available)
        .ok_or(PoolError::OverflowError)?;
    if total == 0 {
        return Ok(0);
    }
    total_debt
        .fixed_div_floor(total, SCALAR_6)
        .ok_or(PoolError::OverflowError)
}

/// Calculate the variable borrow rate per second for a utilization by interpolating
/// linearly between the two breakpoints bracketing it. The rate is rounded up.
///
/// ### Arguments
/// * `model` - The borrow rate at each utilization breakpoint, expressed in 24 decimals
/// * `util_e6` - The utilization, expressed in 6 decimals. Values above 100% are clamped.
///
/// ### Errors
/// If the model decreases between two breakpoints
pub fn calc_borrow_rate(model: &[u128; 7], util_e6: u128) -> Result<u128, PoolError> {
    let util = util_e6.min(SCALAR_6);
    let mut upper = 1;
    while upper < UTILIZATION_BREAKPOINTS_E6.len() - 1 && util > UTILIZATION_BREAKPOINTS_E6[upper]
    {
        upper += 1;
    }
    let lower = upper - 1;
    let rate_delta = model[upper]
        .checked_sub(model[lower])
        .ok_or(PoolError::InvalidReserveMetadata)?;
    let util_delta = util - UTILIZATION_BREAKPOINTS_E6[lower];
    let step = UTILIZATION_BREAKPOINTS_E6[upper] - UTILIZATION_BREAKPOINTS_E6[lower];
    let increase = rate_delta
        .fixed_mul_ceil(util_delta, step)
        .ok_or(PoolError::OverflowError)?;
    model[lower]
        .checked_add(increase)
        .ok_or(PoolError::OverflowError)
}

/// Calculate the rate per second the suppliers earn. Informational only, suppliers are
/// credited from the interest the debt actually accrues.
///
/// ### Arguments
/// * `variable_rate_e24` - The variable borrow rate
/// * `total_variable_borrowed` - The variable debt of the reserve
/// * `avg_stable_rate_e24` - The average stable rate
/// * `sum_stable_debt` - The stable debt of the reserve
/// * `income_for_suppliers_part_e6` - The part of the interest suppliers earn
/// * `total_supplied` - The supply of the reserve
pub fn calc_supply_rate(
    variable_rate_e24: u128,
    total_variable_borrowed: u128,
    avg_stable_rate_e24: u128,
    sum_stable_debt: u128,
    income_for_suppliers_part_e6: u128,
    total_supplied: u128,
) -> Result<u128, PoolError> {
    if total_supplied == 0 {
        return Ok(0);
    }
    let variable_part = mul_div(
        &[variable_rate_e24, total_variable_borrowed, income_for_suppliers_part_e6],
        &[SCALAR_6, total_supplied],
        Rounding::Floor,
    )
    .ok_or(PoolError::OverflowError)?;
    let stable_part = mul_div(
        &[avg_stable_rate_e24, sum_stable_debt, income_for_suppliers_part_e6],
        &[SCALAR_6, total_supplied],
        Rounding::Floor,
    )
    .ok_or(PoolError::OverflowError)?;
    variable_part
        .checked_add(stable_part)
        .ok_or(PoolError::OverflowError)
}

/// Calculate the interest an amount accrues at a rate per second over elapsed seconds
///
/// ### Arguments
/// * `amount` - The principal
/// * `rate_e24` - The rate per second, expressed in 24 decimals
/// * `elapsed` - The elapsed seconds
/// * `rounding` - Round down when crediting, up when charging
pub fn calc_interest(
    amount: u128,
    rate_e24: u128,
    elapsed: u64,
    rounding: Rounding,
) -> Result<u128, PoolError> {
    if amount == 0 || rate_e24 == 0 || elapsed == 0 {
        return Ok(0);
    }
    mul_div(
        &[amount, rate_e24, u128::from(elapsed)],
        &[SCALAR_24],
        rounding,
    )
    .ok_or(PoolError::OverflowError)
}
