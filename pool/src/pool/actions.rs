use std::collections::BTreeMap;

use tracing::info;

use crate::{
    errors::PoolError,
    events::PoolEvent,
    storage::{Address, AllowanceKey, AllowanceKind, Ledger},
    validator::{require_positive, require_some_positive},
};

use super::{pool::Pool, User};

/// The type of request a user makes against the pool
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RequestType {
    Deposit,
    Redeem,
    BorrowVariable,
    RepayVariable,
    BorrowStable,
    RepayStable,
}

/// An request a user makes against the pool
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    pub request_type: RequestType,
    pub asset: Address,
    /// `None` redeems the full supply or repays the full debt
    pub amount: Option<u128>,
}

/// Transfer actions to be taken by the sender and pool, and the position allowances the
/// requests spend
pub struct Actions {
    pub spender: Address,
    pub to: Address,
    pub spender_transfer: BTreeMap<Address, u128>,
    pub pool_transfer: BTreeMap<Address, u128>,
    pub allowances: BTreeMap<AllowanceKey, u128>,
}

impl Actions {
    /// Create an empty set of actions
    ///
    /// ### Arguments
    /// * spender - The account sending tokens to the pool
    /// * to - The account receiving tokens from the pool
    pub fn new(spender: &Address, to: &Address) -> Self {
        Actions {
            spender: spender.clone(),
            to: to.clone(),
            spender_transfer: BTreeMap::new(),
            pool_transfer: BTreeMap::new(),
            allowances: BTreeMap::new(),
        }
    }

    /// Add tokens the sender needs to transfer to the pool
    pub fn add_for_spender_transfer(&mut self, asset: &Address, amount: u128) {
        let total = self.spender_transfer.entry(asset.clone()).or_insert(0);
        *total = total.saturating_add(amount);
    }

    // Add tokens the pool needs to transfer to "to"
    pub fn add_for_pool_transfer(&mut self, asset: &Address, amount: u128) {
        let total = self.pool_transfer.entry(asset.clone()).or_insert(0);
        *total = total.saturating_add(amount);
    }

    /// Spend a position allowance `owner` granted `spender`. Earlier spends of the same
    /// allowance by these actions are taken into account.
    ///
    /// ### Errors
    /// If the remaining allowance is below `amount`
    pub fn spend_allowance(
        &mut self,
        ledger: &Ledger,
        asset: &Address,
        owner: &Address,
        spender: &Address,
        kind: AllowanceKind,
        amount: u128,
    ) -> Result<(), PoolError> {
        let key = AllowanceKey {
            asset: asset.clone(),
            owner: owner.clone(),
            spender: spender.clone(),
            kind,
        };
        let allowance = match self.allowances.get(&key) {
            Some(remaining) => *remaining,
            None => ledger.get_allowance(asset, owner, spender, kind),
        };
        let remaining = allowance
            .checked_sub(amount)
            .ok_or(PoolError::InsufficientAllowance)?;
        self.allowances.insert(key, remaining);
        Ok(())
    }
}

/// Build a set of pool actions and the new positions from the supplied requests. Validates that
/// the requests are valid based on the reserves' state and restrictions.
///
/// Tokens are sent to the pool by `caller` and sent from the pool to `caller`, while the
/// positions of `on_behalf_of` change.
///
/// ### Arguments
/// * pool - The pool
/// * caller - The sender of the requests
/// * on_behalf_of - The user whose positions change
/// * requests - The requests to be processed
///
/// ### Returns
/// A tuple of (actions, user, check_health, amounts) where:
/// * actions - A actions to be taken by the pool
/// * user - The state of the "on_behalf_of" user after the requests have been processed
/// * check_health - A bool indicating if a health factor check should be performed
/// * amounts - The amount each request moved
///
/// ### Errors
/// If a request is invalid
pub fn build_actions_from_request(
    ledger: &Ledger,
    pool: &mut Pool,
    caller: &Address,
    on_behalf_of: &Address,
    requests: &[Request],
) -> Result<(Actions, User, bool, Vec<u128>), PoolError> {
    let mut actions = Actions::new(caller, caller);
    let mut user = User::load(ledger, on_behalf_of);
    let mut check_health = false;
    let mut amounts = Vec::with_capacity(requests.len());
    for request in requests.iter() {
        let mut reserve = pool.load_reserve(ledger, &request.asset)?;
        reserve.require_active()?;
        let amount = match request.request_type {
            RequestType::Deposit => {
                let amount = require_some_positive(request.amount)?;
                reserve.require_not_freezed()?;
                user.add_supply(&mut reserve, amount)?;
                reserve.require_supply_cap()?;
                reserve.require_minimal_collateral(user.get_position(reserve.index()).supplied)?;
                actions.add_for_spender_transfer(&reserve.asset, amount);
                pool.publish(PoolEvent::Deposit {
                    asset: reserve.asset.clone(),
                    caller: caller.clone(),
                    on_behalf_of: on_behalf_of.clone(),
                    amount,
                });
                amount
            }
            RequestType::Redeem => {
                let supplied = user.realize(&reserve)?.supplied;
                if supplied == 0 {
                    return Err(PoolError::InsufficientBalance);
                }
                let amount = request.amount.unwrap_or(supplied);
                require_positive(amount)?;
                if amount > supplied {
                    return Err(PoolError::InsufficientBalance);
                }
                if caller != on_behalf_of {
                    actions.spend_allowance(
                        ledger,
                        &reserve.asset,
                        on_behalf_of,
                        caller,
                        AllowanceKind::Supply,
                        amount,
                    )?;
                }
                user.remove_supply(&mut reserve, amount)?;
                reserve.require_minimal_collateral(user.get_position(reserve.index()).supplied)?;
                actions.add_for_pool_transfer(&reserve.asset, amount);
                check_health = true;
                pool.publish(PoolEvent::Redeem {
                    asset: reserve.asset.clone(),
                    caller: caller.clone(),
                    on_behalf_of: on_behalf_of.clone(),
                    amount,
                });
                amount
            }
            RequestType::BorrowVariable => {
                let amount = require_some_positive(request.amount)?;
                reserve.require_not_freezed()?;
                reserve.require_borrowable()?;
                if caller != on_behalf_of {
                    actions.spend_allowance(
                        ledger,
                        &reserve.asset,
                        on_behalf_of,
                        caller,
                        AllowanceKind::Debt,
                        amount,
                    )?;
                }
                user.add_variable_debt(&mut reserve, amount)?;
                reserve.require_debt_cap()?;
                reserve.require_minimal_debt(
                    user.get_position(reserve.index()).variable_borrowed,
                )?;
                actions.add_for_pool_transfer(&reserve.asset, amount);
                check_health = true;
                pool.publish(PoolEvent::BorrowVariable {
                    asset: reserve.asset.clone(),
                    caller: caller.clone(),
                    on_behalf_of: on_behalf_of.clone(),
                    amount,
                });
                amount
            }
            RequestType::RepayVariable => {
                if let Some(amount) = request.amount {
                    require_positive(amount)?;
                }
                let debt = user.realize(&reserve)?.variable_borrowed;
                let amount = request.amount.unwrap_or(debt).min(debt);
                if amount > 0 {
                    user.remove_variable_debt(&mut reserve, amount)?;
                    reserve.require_minimal_debt(
                        user.get_position(reserve.index()).variable_borrowed,
                    )?;
                    actions.add_for_spender_transfer(&reserve.asset, amount);
                    pool.publish(PoolEvent::RepayVariable {
                        asset: reserve.asset.clone(),
                        caller: caller.clone(),
                        on_behalf_of: on_behalf_of.clone(),
                        amount,
                    });
                }
                amount
            }
            RequestType::BorrowStable => {
                let amount = require_some_positive(request.amount)?;
                reserve.require_not_freezed()?;
                reserve.require_borrowable()?;
                if caller != on_behalf_of {
                    actions.spend_allowance(
                        ledger,
                        &reserve.asset,
                        on_behalf_of,
                        caller,
                        AllowanceKind::Debt,
                        amount,
                    )?;
                }
                let rate_e24 = reserve.stable_rate_after_borrow(amount)?;
                user.add_stable_debt(&mut reserve, amount, rate_e24)?;
                reserve.require_debt_cap()?;
                reserve.require_minimal_debt(user.get_position(reserve.index()).stable_borrowed)?;
                actions.add_for_pool_transfer(&reserve.asset, amount);
                check_health = true;
                pool.publish(PoolEvent::BorrowStable {
                    asset: reserve.asset.clone(),
                    caller: caller.clone(),
                    on_behalf_of: on_behalf_of.clone(),
                    amount,
                    rate_e24,
                });
                amount
            }
            RequestType::RepayStable => {
                if let Some(amount) = request.amount {
                    require_positive(amount)?;
                }
                let debt = user.realize(&reserve)?.stable_borrowed;
                let amount = request.amount.unwrap_or(debt).min(debt);
                if amount > 0 {
                    user.remove_stable_debt(&mut reserve, amount)?;
                    reserve.require_minimal_debt(
                        user.get_position(reserve.index()).stable_borrowed,
                    )?;
                    actions.add_for_spender_transfer(&reserve.asset, amount);
                    pool.publish(PoolEvent::RepayStable {
                        asset: reserve.asset.clone(),
                        caller: caller.clone(),
                        on_behalf_of: on_behalf_of.clone(),
                        amount,
                    });
                }
                amount
            }
        };
        info!(
            request = ?request.request_type,
            asset = %reserve.asset,
            caller = %caller,
            on_behalf_of = %on_behalf_of,
            amount,
            "processed request"
        );
        pool.cache_reserve(reserve, true);
        amounts.push(amount);
    }
    Ok((actions, user, check_health, amounts))
}
