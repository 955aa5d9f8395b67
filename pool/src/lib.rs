mod constants;
mod contract;
mod errors;
mod events;
mod market;
mod math;
mod pool;
mod storage;
mod token;
mod validator;

#[cfg(any(test, feature = "testutils"))]
pub mod testutils;

pub use constants::{SCALAR_18, SCALAR_24, SCALAR_6, SCALAR_8, SECONDS_PER_YEAR};
pub use contract::{transition, Operation, PoolContract};
pub use errors::{FlashLoanReceiverError, PoolError};
pub use events::PoolEvent;
pub use market::{MarketConfig, ReserveListing};
pub use math::{mul_div, FixedPoint, Rounding};
pub use pool::{
    calc_borrow_rate, Actions, FlashLoanReceiver, Pool, PositionData, Positions, RateMode,
    Request, RequestType, Reserve, User, UTILIZATION_BREAKPOINTS_E6,
};
pub use storage::{
    Address, AllowanceKey, AllowanceKind, AssetRules, Ledger, PoolConfig, ReserveConfig,
    ReserveData, ReserveMetadata, ReserveParameters, ReserveRestrictions, Role, UserConfig,
    UserReserveData, MAX_RESERVES,
};
pub use token::TokenBook;
