use crate::errors::PoolError;

/// Require that an incoming amount is greater than zero
///
/// ### Arguments
/// * `amount` - The amount to check
///
/// ### Errors
/// If the amount is zero
pub fn require_positive(amount: u128) -> Result<u128, PoolError> {
    if amount == 0 {
        return Err(PoolError::AmountNotGreaterThanZero);
    }
    Ok(amount)
}

/// Require that an incoming amount is given and greater than zero
///
/// ### Errors
/// If the amount is missing or zero
pub fn require_some_positive(amount: Option<u128>) -> Result<u128, PoolError> {
    require_positive(amount.ok_or(PoolError::BadRequest)?)
}
