use crate::{
    errors::PoolError,
    storage::{Address, Ledger, ReserveConfig, ReserveData, UserConfig, UserReserveData},
};

use super::{health_factor::PositionData, pool::Pool, reserve::Reserve, user::User};

/// Fetch the registered assets, ordered by reserve index
pub fn view_registered_assets(ledger: &Ledger) -> Vec<Address> {
    ledger.get_res_list().to_vec()
}

pub fn view_reserve_config(ledger: &Ledger, asset: &Address) -> Result<ReserveConfig, PoolError> {
    ledger.get_res_config(asset)
}

/// Fetch the reserve data accrued to the current timestamp
pub fn view_reserve_data(ledger: &Ledger, asset: &Address) -> Result<ReserveData, PoolError> {
    Ok(Reserve::load(ledger, asset)?.data)
}

/// Fetch the reserve data as it was last stored
pub fn view_unupdated_reserve_data(
    ledger: &Ledger,
    asset: &Address,
) -> Result<ReserveData, PoolError> {
    ledger.get_res_data(asset)
}

/// Fetch a user's position in a reserve, realized to the current timestamp
pub fn view_user_reserve_data(
    ledger: &Ledger,
    asset: &Address,
    user: &Address,
) -> Result<UserReserveData, PoolError> {
    let reserve = Reserve::load(ledger, asset)?;
    let mut user_state = User::load(ledger, user);
    Ok(user_state.realize(&reserve)?.clone())
}

pub fn view_user_config(ledger: &Ledger, user: &Address) -> UserConfig {
    ledger.get_user_config(user)
}

/// Fetch whether a user is healthy and the distance between their weighted collateral and
/// weighted debt, in USD with 6 decimals
///
/// ### Errors
/// If a price is missing for a reserve the user holds value in
pub fn get_user_free_collateral_coefficient(
    ledger: &Ledger,
    user: &Address,
) -> Result<(bool, u128), PoolError> {
    let mut pool = Pool::load(ledger);
    let user_state = User::load(ledger, user);
    Ok(PositionData::calculate_from_positions(ledger, &mut pool, &user_state)?.free_collateral())
}

/// Fetch the stored price of an asset, expressed in 8 decimals
///
/// ### Errors
/// If no price is stored for the asset
pub fn get_reserve_token_price_e8(ledger: &Ledger, asset: &Address) -> Result<u128, PoolError> {
    ledger.get_price(asset).ok_or(PoolError::PriceMissing)
}

/// Fetch the protocol income of each asset at the current timestamp
///
/// ### Arguments
/// * assets - The assets to report, or `None` for all registered assets
pub fn view_protocol_income(
    ledger: &Ledger,
    assets: Option<&[Address]>,
) -> Result<Vec<(Address, i128)>, PoolError> {
    let assets = match assets {
        Some(assets) => assets.to_vec(),
        None => ledger.get_res_list().to_vec(),
    };
    assets
        .into_iter()
        .map(|asset| {
            let income = Reserve::load(ledger, &asset)?.protocol_income()?;
            Ok((asset, income))
        })
        .collect()
}
