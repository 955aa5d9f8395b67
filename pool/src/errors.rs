use thiserror::Error;

#[derive(Error, Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
/// Error codes for the pool. Common errors are codes that match up with the built-in
/// host error reporting. Pool specific errors start at 1200.
pub enum PoolError {
    // Common Errors
    #[error("internal error")]
    InternalError = 1,
    #[error("caller is not authorized")]
    UnauthorizedError = 4,
    #[error("amount must be greater than zero")]
    AmountNotGreaterThanZero = 8,
    #[error("arithmetic overflow")]
    OverflowError = 12,

    // Pool Request Errors (start at 1200)
    #[error("bad request")]
    BadRequest = 1200,
    #[error("asset is not registered")]
    AssetNotRegistered = 1201,
    #[error("asset is already registered")]
    AlreadyRegistered = 1202,
    #[error("invalid reserve metadata")]
    InvalidReserveMetadata = 1203,
    #[error("reserve is inactive")]
    Inactive = 1204,
    #[error("reserve is freezed")]
    Freezed = 1205,
    #[error("borrowing is disabled for the reserve")]
    BorrowingDisabled = 1206,
    #[error("reserve can not be used as collateral")]
    CollateralDisabled = 1207,
    #[error("maximum number of reserves exceeded")]
    MaxPositionsExceeded = 1208,
    #[error("no price for asset")]
    PriceMissing = 1210,

    // Pool State Errors
    #[error("insufficient balance")]
    InsufficientBalance = 1220,
    #[error("insufficient allowance")]
    InsufficientAllowance = 1221,
    #[error("position is undercollateralized")]
    Undercollateralized = 1222,
    #[error("balance below the reserve minimum")]
    BelowMinimum = 1223,
    #[error("maximal total supply exceeded")]
    SupplyCapExceeded = 1224,
    #[error("maximal total debt exceeded")]
    DebtCapExceeded = 1225,

    // Liquidation Errors
    #[error("borrower is collateralized")]
    Collaterized = 1230,
    #[error("nothing to repay")]
    NothingToRepay = 1231,
    #[error("taken asset is not a collateral of the borrower")]
    TakingNotACollateral = 1232,
    #[error("received collateral below the minimum")]
    MinimumReceived = 1233,

    // Flash Loan Errors
    #[error("flash loan receiver failed to execute operation")]
    ExecuteOperationFailed = 1240,
    #[error("flash loan already in progress for reserve")]
    FlashLoanInProgress = 1241,
}

impl PoolError {
    /// The stable numeric code of the error
    pub fn code(&self) -> u32 {
        *self as u32
    }
}

/// Errors a flash loan receiver reports back from its callback
#[derive(Error, Clone, Debug, Eq, PartialEq)]
pub enum FlashLoanReceiverError {
    #[error("execute operation failed: {0}")]
    ExecuteOperationFailed(String),
    #[error("receiver pool error: {0}")]
    Pool(#[from] PoolError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(PoolError::OverflowError.code(), 12);
        assert_eq!(PoolError::InsufficientBalance.code(), 1220);
        assert_eq!(PoolError::MinimumReceived.code(), 1233);
        assert_eq!(PoolError::FlashLoanInProgress.code(), 1241);
    }

    #[test]
    fn test_receiver_error_from_pool_error() {
        let error: FlashLoanReceiverError = PoolError::InsufficientBalance.into();
        assert_eq!(
            error,
            FlashLoanReceiverError::Pool(PoolError::InsufficientBalance)
        );
        assert_eq!(
            error.to_string(),
            "receiver pool error: insufficient balance"
        );
    }
}
