use tracing::info;

use crate::{
    constants::{MAX_DECIMALS, SCALAR_6},
    errors::PoolError,
    events::PoolEvent,
    storage::{
        Address, AssetRules, Ledger, ReserveConfig, ReserveData, ReserveMetadata,
        ReserveParameters, ReserveRestrictions, Role,
    },
    validator::require_positive,
};

use super::{actions::Actions, pool::Pool};

/// Require that the caller is the pool admin
fn require_admin(ledger: &Ledger, caller: &Address) -> Result<(), PoolError> {
    if caller != ledger.get_admin() {
        return Err(PoolError::UnauthorizedError);
    }
    Ok(())
}

/// Register a new reserve with the pool. The reserve starts active with its indexes at one.
///
/// ### Arguments
/// * caller - The pool admin
/// * asset - The underlying asset
/// * metadata - The decimals, rules, parameters and restrictions of the reserve
///
/// ### Returns
/// The index of the new reserve
///
/// ### Errors
/// If the asset is already registered, if the metadata is invalid, or if the pool already
/// lists the maximum number of reserves
pub fn execute_register_asset(
    ledger: &mut Ledger,
    caller: &Address,
    asset: &Address,
    metadata: &ReserveMetadata,
) -> Result<u32, PoolError> {
    require_admin(ledger, caller)?;
    if ledger.has_res(asset) {
        return Err(PoolError::AlreadyRegistered);
    }
    if metadata.decimals > MAX_DECIMALS {
        return Err(PoolError::InvalidReserveMetadata);
    }
    require_valid_rules(&metadata.rules)?;
    require_valid_parameters(&metadata.parameters)?;

    let index = ledger.push_res_list(asset)?;
    ledger.set_res_config(
        asset,
        &ReserveConfig {
            index,
            decimals: metadata.decimals,
            activated: true,
            freezed: false,
            rules: metadata.rules.clone(),
            parameters: metadata.parameters.clone(),
            restrictions: metadata.restrictions.clone(),
        },
    );
    ledger.set_res_data(asset, &ReserveData::new(ledger.timestamp()));

    info!(asset = %asset, index, decimals = metadata.decimals, "registered asset");
    ledger.push_events([
        PoolEvent::AssetRegistered {
            asset: asset.clone(),
            index,
            decimals: metadata.decimals,
        },
        PoolEvent::ReserveParametersChanged {
            asset: asset.clone(),
            parameters: metadata.parameters.clone(),
        },
        PoolEvent::AssetRulesChanged {
            asset: asset.clone(),
            rules: metadata.rules.clone(),
        },
        PoolEvent::ReserveRestrictionsChanged {
            asset: asset.clone(),
            restrictions: metadata.restrictions.clone(),
        },
    ]);
    Ok(index)
}

/// Activate or deactivate a reserve. Inactive reserves reject every operation.
pub fn execute_set_reserve_is_active(
    ledger: &mut Ledger,
    caller: &Address,
    asset: &Address,
    active: bool,
) -> Result<(), PoolError> {
    require_admin(ledger, caller)?;
    let mut config = ledger.get_res_config(asset)?;
    config.activated = active;
    ledger.set_res_config(asset, &config);
    info!(asset = %asset, active, "reserve activation changed");
    ledger.push_events([PoolEvent::ReserveActivated {
        asset: asset.clone(),
        active,
    }]);
    Ok(())
}

/// Freeze or unfreeze a reserve. Freezed reserves reject deposits, borrows and variable debt
/// transfers.
pub fn execute_set_reserve_is_freezed(
    ledger: &mut Ledger,
    caller: &Address,
    asset: &Address,
    freezed: bool,
) -> Result<(), PoolError> {
    require_admin(ledger, caller)?;
    let mut config = ledger.get_res_config(asset)?;
    config.freezed = freezed;
    ledger.set_res_config(asset, &config);
    info!(asset = %asset, freezed, "reserve freeze changed");
    ledger.push_events([PoolEvent::ReserveFreezed {
        asset: asset.clone(),
        freezed,
    }]);
    Ok(())
}

/// Set the caps and floors of a reserve. Existing positions are not checked against them.
pub fn execute_set_reserve_restrictions(
    ledger: &mut Ledger,
    caller: &Address,
    asset: &Address,
    restrictions: &ReserveRestrictions,
) -> Result<(), PoolError> {
    require_admin(ledger, caller)?;
    let mut config = ledger.get_res_config(asset)?;
    config.restrictions = restrictions.clone();
    ledger.set_res_config(asset, &config);
    info!(asset = %asset, "reserve restrictions changed");
    ledger.push_events([PoolEvent::ReserveRestrictionsChanged {
        asset: asset.clone(),
        restrictions: restrictions.clone(),
    }]);
    Ok(())
}

/// Set the interest parameters of a reserve. The reserve is accrued under its old parameters
/// first, and re-rated under the new ones.
///
/// ### Errors
/// If the caller is not the admin, or if the parameters are invalid
pub fn execute_set_reserve_parameters(
    ledger: &mut Ledger,
    caller: &Address,
    asset: &Address,
    parameters: &ReserveParameters,
) -> Result<(), PoolError> {
    require_admin(ledger, caller)?;
    require_valid_parameters(parameters)?;

    let mut pool = Pool::load(ledger);
    let mut reserve = pool.load_reserve(ledger, asset)?;
    reserve.config.parameters = parameters.clone();
    let config = reserve.config.clone();
    pool.cache_reserve(reserve, true);
    pool.publish(PoolEvent::ReserveParametersChanged {
        asset: asset.clone(),
        parameters: parameters.clone(),
    });
    pool.commit(ledger, Actions::new(caller, caller), &[])?;

    ledger.set_res_config(asset, &config);
    info!(asset = %asset, "reserve parameters changed");
    Ok(())
}

/// Set the risk rules of a reserve
///
/// ### Errors
/// If the caller is not the admin, or if the rules are invalid
pub fn execute_set_asset_rules(
    ledger: &mut Ledger,
    caller: &Address,
    asset: &Address,
    rules: &AssetRules,
) -> Result<(), PoolError> {
    require_admin(ledger, caller)?;
    require_valid_rules(rules)?;
    let mut config = ledger.get_res_config(asset)?;
    config.rules = rules.clone();
    ledger.set_res_config(asset, &config);
    info!(asset = %asset, "asset rules changed");
    ledger.push_events([PoolEvent::AssetRulesChanged {
        asset: asset.clone(),
        rules: rules.clone(),
    }]);
    Ok(())
}

/// Store the price of a registered asset, expressed in 8 decimals
pub fn execute_insert_reserve_token_price(
    ledger: &mut Ledger,
    caller: &Address,
    asset: &Address,
    price_e8: u128,
) -> Result<(), PoolError> {
    require_admin(ledger, caller)?;
    if !ledger.has_res(asset) {
        return Err(PoolError::AssetNotRegistered);
    }
    require_positive(price_e8)?;
    ledger.set_price(asset, price_e8);
    ledger.push_events([PoolEvent::PriceInserted {
        asset: asset.clone(),
        price_e8,
    }]);
    Ok(())
}

/// Grant a role to an account
pub fn execute_grant_role(
    ledger: &mut Ledger,
    caller: &Address,
    account: &Address,
    role: Role,
) -> Result<(), PoolError> {
    require_admin(ledger, caller)?;
    ledger.set_role(account, role, true);
    info!(account = %account, ?role, "granted role");
    Ok(())
}

/// Revoke a role from an account
pub fn execute_revoke_role(
    ledger: &mut Ledger,
    caller: &Address,
    account: &Address,
    role: Role,
) -> Result<(), PoolError> {
    require_admin(ledger, caller)?;
    ledger.set_role(account, role, false);
    info!(account = %account, ?role, "revoked role");
    Ok(())
}

/// Advance a reserve's indexes to the current timestamp and store them
///
/// ### Errors
/// If the asset is not registered
pub fn execute_accumulate_interest(ledger: &mut Ledger, asset: &Address) -> Result<(), PoolError> {
    let mut pool = Pool::load(ledger);
    let reserve = pool.load_reserve(ledger, asset)?;
    pool.cache_reserve(reserve, true);
    pool.publish(PoolEvent::AccumulateInterest {
        asset: asset.clone(),
        timestamp: pool.timestamp,
    });
    let pool_address = pool.config.address.clone();
    pool.commit(ledger, Actions::new(&pool_address, &pool_address), &[])
}

/// Send the protocol's positive income of each asset to `to`. The income sent is capped at
/// the liquidity the pool holds.
///
/// ### Arguments
/// * caller - An account with the treasury role
/// * assets - The assets to take the income of, or `None` for all registered assets
/// * to - The account receiving the income
///
/// ### Returns
/// The amount taken per asset
///
/// ### Errors
/// If the caller does not hold the treasury role
pub fn execute_take_protocol_income(
    ledger: &mut Ledger,
    caller: &Address,
    assets: Option<&[Address]>,
    to: &Address,
) -> Result<Vec<(Address, u128)>, PoolError> {
    if !ledger.has_role(caller, Role::Treasury) {
        return Err(PoolError::UnauthorizedError);
    }
    let assets = match assets {
        Some(assets) => assets.to_vec(),
        None => ledger.get_res_list().to_vec(),
    };

    let mut pool = Pool::load(ledger);
    let mut actions = Actions::new(caller, to);
    let mut taken = Vec::with_capacity(assets.len());
    for asset in assets.iter() {
        let reserve = pool.load_reserve(ledger, asset)?;
        let income = u128::try_from(reserve.protocol_income()?.max(0))
            .map_err(|_| PoolError::OverflowError)?
            .min(reserve.pool_balance);
        if income > 0 {
            actions.add_for_pool_transfer(asset, income);
            info!(asset = %asset, to = %to, amount = income, "took protocol income");
            pool.publish(PoolEvent::IncomeTaken {
                asset: asset.clone(),
                to: to.clone(),
                amount: income,
            });
        }
        pool.cache_reserve(reserve, true);
        taken.push((asset.clone(), income));
    }
    pool.commit(ledger, actions, &[])?;
    Ok(taken)
}

/// Require that the risk rules are consistent. Collateral can not be worth more than it is
/// supplied for even after the liquidation bonus, and debt can not be weighted below its value.
fn require_valid_rules(rules: &AssetRules) -> Result<(), PoolError> {
    if let Some(collateral_coefficient) = rules.collateral_coefficient_e6 {
        let bonus = SCALAR_6
            .checked_add(rules.penalty_e6)
            .ok_or(PoolError::InvalidReserveMetadata)?;
        let weighted = collateral_coefficient
            .checked_mul(bonus)
            .ok_or(PoolError::InvalidReserveMetadata)?;
        if collateral_coefficient > SCALAR_6 || weighted > SCALAR_6 * SCALAR_6 {
            return Err(PoolError::InvalidReserveMetadata);
        }
    }
    if let Some(borrow_coefficient) = rules.borrow_coefficient_e6 {
        if borrow_coefficient < SCALAR_6 {
            return Err(PoolError::InvalidReserveMetadata);
        }
    }
    Ok(())
}

fn require_valid_parameters(parameters: &ReserveParameters) -> Result<(), PoolError> {
    if parameters.income_for_suppliers_part_e6 > SCALAR_6
        || parameters.flash_loan_fee_e6 > SCALAR_6
        || parameters
            .interest_rate_model
            .windows(2)
            .any(|pair| pair[0] > pair[1])
    {
        return Err(PoolError::InvalidReserveMetadata);
    }
    Ok(())
}
