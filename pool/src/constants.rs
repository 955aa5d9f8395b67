/********** Numbers **********/

/// Fixed-point scalar for 6 decimal numbers (coefficients, utilization, fees)
pub const SCALAR_6: u128 = 1_000_000;

/// Fixed-point scalar for 8 decimal numbers (prices)
pub const SCALAR_8: u128 = 100_000_000;

/// Fixed-point scalar for 18 decimal numbers (cumulative indexes)
pub const SCALAR_18: u128 = 1_000_000_000_000_000_000;

/// Fixed-point scalar for 24 decimal numbers (per second interest rates)
pub const SCALAR_24: u128 = 1_000_000_000_000_000_000_000_000;

// seconds per year
pub const SECONDS_PER_YEAR: u64 = 31_536_000;

/// The largest token decimals a reserve may be listed with
pub const MAX_DECIMALS: u32 = 36;

/// Flash borrowers pay this fraction of the flash loan fee, expressed in 6 decimals
pub const FLASH_BORROWER_FEE_PART_E6: u128 = 100_000;
