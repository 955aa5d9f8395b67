mod actions;
pub use actions::{Actions, Request, RequestType};

mod collateral;
pub use collateral::execute_set_as_collateral;

mod config;
pub use config::{
    execute_accumulate_interest, execute_grant_role, execute_insert_reserve_token_price,
    execute_register_asset, execute_revoke_role, execute_set_asset_rules,
    execute_set_reserve_is_active, execute_set_reserve_is_freezed, execute_set_reserve_parameters,
    execute_set_reserve_restrictions, execute_take_protocol_income,
};

mod flash_loan;
pub use flash_loan::{execute_flash_loan, FlashLoanReceiver};

mod health_factor;
pub use health_factor::PositionData;

mod interest;
pub use interest::{calc_borrow_rate, UTILIZATION_BREAKPOINTS_E6};

mod liquidation;
pub use liquidation::{execute_liquidate, RateMode};

mod submit;
pub use submit::execute_submit;

mod transfer;
pub use transfer::{execute_transfer_supply, execute_transfer_variable_debt};

#[allow(clippy::module_inception)]
mod pool;
pub use pool::Pool;

mod reserve;
pub use reserve::Reserve;

mod user;
pub use user::{Positions, User};

mod view;
pub use view::{
    get_reserve_token_price_e8, get_user_free_collateral_coefficient, view_protocol_income,
    view_registered_assets, view_reserve_config, view_reserve_data, view_unupdated_reserve_data,
    view_user_config, view_user_reserve_data,
};
