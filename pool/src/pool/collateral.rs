use tracing::info;

use crate::{
    errors::PoolError,
    events::PoolEvent,
    storage::{Address, Ledger},
};

use super::{actions::Actions, health_factor::PositionData, pool::Pool, user::User};

/// Mark or unmark a user's supply in a reserve as collateral
///
/// ### Arguments
/// * user - The user changing their collateral
/// * asset - The asset of the reserve
/// * use_as_collateral - If the supply should count as collateral
///
/// ### Returns
/// True if the collateral flag changed, false if it already had the requested value
///
/// ### Errors
/// If the reserve can not be used as collateral, if the supply is below the reserve's
/// minimal collateral, or if removing the collateral leaves the user undercollateralized
pub fn execute_set_as_collateral(
    ledger: &mut Ledger,
    user: &Address,
    asset: &Address,
    use_as_collateral: bool,
) -> Result<bool, PoolError> {
    let mut pool = Pool::load(ledger);
    let mut user_state = User::load(ledger, user);
    let reserve = pool.load_reserve(ledger, asset)?;
    reserve.require_active()?;

    let index = reserve.index();
    if user_state.config.is_collateral(index) == use_as_collateral {
        return Ok(false);
    }

    let supplied = user_state.realize(&reserve)?.supplied;
    if use_as_collateral {
        if reserve.config.rules.collateral_coefficient_e6.is_none() {
            return Err(PoolError::CollateralDisabled);
        }
        if supplied < reserve.config.restrictions.minimal_collateral {
            return Err(PoolError::BelowMinimum);
        }
    }
    user_state.config.set_collateral(index, use_as_collateral);
    pool.cache_reserve(reserve, true);

    if !use_as_collateral && user_state.config.has_debt() {
        PositionData::calculate_from_positions(ledger, &mut pool, &user_state)?
            .require_healthy(user)?;
    }

    info!(asset = %asset, user = %user, set = use_as_collateral, "collateral flag changed");
    pool.publish(PoolEvent::CollateralSet {
        asset: asset.clone(),
        user: user.clone(),
        set: use_as_collateral,
    });
    pool.commit(ledger, Actions::new(user, user), &[user_state])?;
    Ok(true)
}
