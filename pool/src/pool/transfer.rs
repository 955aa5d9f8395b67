use tracing::info;

use crate::{
    errors::PoolError,
    events::PoolEvent,
    storage::{Address, AllowanceKind, Ledger},
    validator::require_positive,
};

use super::{actions::Actions, health_factor::PositionData, pool::Pool, user::User};

/// Move supply of a reserve from one user to another
///
/// ### Arguments
/// * caller - The account moving the supply. Consumes the supply allowance `from` granted
///   it unless it is `from`.
/// * asset - The asset of the reserve
/// * from - The user whose supply is moved
/// * to - The user receiving the supply
/// * amount - The amount of supply to move
///
/// ### Errors
/// If `from` holds less than `amount`, if either side ends below the reserve's minimal
/// collateral, or if `from` is left undercollateralized
pub fn execute_transfer_supply(
    ledger: &mut Ledger,
    caller: &Address,
    asset: &Address,
    from: &Address,
    to: &Address,
    amount: u128,
) -> Result<(), PoolError> {
    if from == to {
        return Err(PoolError::BadRequest);
    }
    require_positive(amount)?;
    let mut pool = Pool::load(ledger);
    let mut reserve = pool.load_reserve(ledger, asset)?;
    reserve.require_active()?;

    let mut from_state = User::load(ledger, from);
    let mut to_state = User::load(ledger, to);
    let mut actions = Actions::new(caller, caller);
    if caller != from {
        actions.spend_allowance(ledger, asset, from, caller, AllowanceKind::Supply, amount)?;
    }

    from_state.remove_supply(&mut reserve, amount)?;
    to_state.add_supply(&mut reserve, amount)?;
    let index = reserve.index();
    reserve.require_minimal_collateral(from_state.get_position(index).supplied)?;
    reserve.require_minimal_collateral(to_state.get_position(index).supplied)?;
    pool.cache_reserve(reserve, true);

    if from_state.config.is_collateral(index) {
        PositionData::calculate_from_positions(ledger, &mut pool, &from_state)?
            .require_healthy(from)?;
    }

    info!(asset = %asset, from = %from, to = %to, amount, "transferred supply");
    pool.publish(PoolEvent::SupplyTransferred {
        asset: asset.clone(),
        from: from.clone(),
        to: to.clone(),
        amount,
    });
    pool.commit(ledger, actions, &[from_state, to_state])
}

/// Move variable debt of a reserve from one user to another
///
/// ### Arguments
/// * caller - The account moving the debt. Consumes the debt allowance `to` granted it
///   unless it is `to`.
/// * asset - The asset of the reserve
/// * from - The user whose debt is moved
/// * to - The user taking on the debt
/// * amount - The amount of debt to move
///
/// ### Errors
/// If the reserve is freezed, if `from` owes less than `amount`, if either side ends below
/// the reserve's minimal debt, or if `to` is left undercollateralized
pub fn execute_transfer_variable_debt(
    ledger: &mut Ledger,
    caller: &Address,
    asset: &Address,
    from: &Address,
    to: &Address,
    amount: u128,
) -> Result<(), PoolError> {
    if from == to {
        return Err(PoolError::BadRequest);
    }
    require_positive(amount)?;
    let mut pool = Pool::load(ledger);
    let mut reserve = pool.load_reserve(ledger, asset)?;
    reserve.require_active()?;
    reserve.require_not_freezed()?;
    reserve.require_borrowable()?;

    let mut from_state = User::load(ledger, from);
    let mut to_state = User::load(ledger, to);
    let mut actions = Actions::new(caller, caller);
    if caller != to {
        actions.spend_allowance(ledger, asset, to, caller, AllowanceKind::Debt, amount)?;
    }

    from_state.remove_variable_debt(&mut reserve, amount)?;
    to_state.add_variable_debt(&mut reserve, amount)?;
    let index = reserve.index();
    reserve.require_minimal_debt(from_state.get_position(index).variable_borrowed)?;
    reserve.require_minimal_debt(to_state.get_position(index).variable_borrowed)?;
    pool.cache_reserve(reserve, true);

    PositionData::calculate_from_positions(ledger, &mut pool, &to_state)?.require_healthy(to)?;

    info!(asset = %asset, from = %from, to = %to, amount, "transferred variable debt");
    pool.publish(PoolEvent::VariableDebtTransferred {
        asset: asset.clone(),
        from: from.clone(),
        to: to.clone(),
        amount,
    });
    pool.commit(ledger, actions, &[from_state, to_state])
}
