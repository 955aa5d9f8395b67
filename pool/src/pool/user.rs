use std::collections::BTreeMap;

use tracing::debug;

use crate::{
    errors::PoolError,
    math::{mul_div, Rounding},
    storage::{Address, Ledger, UserConfig, UserReserveData},
};

use super::{
    interest::calc_interest,
    reserve::{apply_index, Reserve},
};

/// A user's positions with the pool, keyed by reserve index
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Positions {
    pub reserves: BTreeMap<u32, UserReserveData>,
}

/// Fold the interest a position accrued since its last snapshot into its principals, and
/// snapshot it at the reserve's current indexes. The reserve must already be accrued.
///
/// Supply interest rounds down and debt interest rounds up.
///
/// ### Arguments
/// * `position` - The position to realize
/// * `reserve` - The reserve the position is in
pub fn realize(position: &mut UserReserveData, reserve: &Reserve) -> Result<(), PoolError> {
    let data = &reserve.data;
    let supplied = apply_index(
        position.supplied,
        data.cumulative_supply_index_e18,
        position.applied_supply_index_e18,
        Rounding::Floor,
    )?;
    let variable_borrowed = apply_index(
        position.variable_borrowed,
        data.cumulative_variable_borrow_index_e18,
        position.applied_variable_borrow_index_e18,
        Rounding::Ceil,
    )?;
    let elapsed = data.last_time.saturating_sub(position.update_timestamp);
    let stable_interest = calc_interest(
        position.stable_borrowed,
        position.stable_borrow_rate_e24,
        elapsed,
        Rounding::Ceil,
    )?;
    let stable_borrowed = position
        .stable_borrowed
        .checked_add(stable_interest)
        .ok_or(PoolError::OverflowError)?;

    if supplied != position.supplied
        || variable_borrowed != position.variable_borrowed
        || stable_interest != 0
    {
        debug!(
            asset = %reserve.asset,
            supply_interest = supplied.saturating_sub(position.supplied),
            variable_interest = variable_borrowed.saturating_sub(position.variable_borrowed),
            stable_interest,
            "realized position interest"
        );
    }

    position.supplied = supplied;
    position.variable_borrowed = variable_borrowed;
    position.stable_borrowed = stable_borrowed;
    position.applied_supply_index_e18 = data.cumulative_supply_index_e18;
    position.applied_variable_borrow_index_e18 = data.cumulative_variable_borrow_index_e18;
    position.update_timestamp = data.last_time;
    Ok(())
}

/// A user / contracts position's with the pool
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub address: Address,
    pub config: UserConfig,
    pub positions: Positions,
}

impl User {
    /// Load a user from the ledger
    pub fn load(ledger: &Ledger, address: &Address) -> Self {
        User {
            address: address.clone(),
            config: ledger.get_user_config(address),
            positions: ledger.get_user_positions(address),
        }
    }

    /// Store the user's config and positions to the ledger. Empty positions are dropped.
    pub fn store(&self, ledger: &mut Ledger) {
        let mut positions = self.positions.clone();
        positions.reserves.retain(|_, position| !position.is_empty());
        ledger.set_user_positions(&self.address, &positions);
        ledger.set_user_config(&self.address, &self.config);
    }

    /// Get the position for the reserve at the given index as it was last realized
    pub fn get_position(&self, reserve_index: u32) -> UserReserveData {
        self.positions
            .reserves
            .get(&reserve_index)
            .cloned()
            .unwrap_or_default()
    }

    /// Realize the position in the reserve and return it
    ///
    /// ### Arguments
    /// * `reserve` - The reserve, accrued to the current timestamp
    pub fn realize(&mut self, reserve: &Reserve) -> Result<&mut UserReserveData, PoolError> {
        let position = self.positions.reserves.entry(reserve.index()).or_default();
        realize(position, reserve)?;
        Ok(position)
    }

    /// Add supply to the position and the reserve's total supply
    pub fn add_supply(&mut self, reserve: &mut Reserve, amount: u128) -> Result<(), PoolError> {
        let position = self.realize(reserve)?;
        position.supplied = position
            .supplied
            .checked_add(amount)
            .ok_or(PoolError::OverflowError)?;
        reserve.data.total_supplied = reserve
            .data
            .total_supplied
            .checked_add(amount)
            .ok_or(PoolError::OverflowError)?;
        self.config.set_deposit(reserve.index(), true);
        Ok(())
    }

    /// Remove supply from the position and the reserve's total supply. The reserve's total
    /// supply is floored at zero.
    ///
    /// ### Errors
    /// If the position holds less than `amount`
    pub fn remove_supply(&mut self, reserve: &mut Reserve, amount: u128) -> Result<(), PoolError> {
        let position = self.realize(reserve)?;
        position.supplied = position
            .supplied
            .checked_sub(amount)
            .ok_or(PoolError::InsufficientBalance)?;
        let emptied = position.supplied == 0;
        reserve.data.total_supplied = reserve.data.total_supplied.saturating_sub(amount);
        if emptied {
            self.config.set_deposit(reserve.index(), false);
        }
        Ok(())
    }

    /// Add variable debt to the position and the reserve's total variable debt
    pub fn add_variable_debt(
        &mut self,
        reserve: &mut Reserve,
        amount: u128,
    ) -> Result<(), PoolError> {
        let position = self.realize(reserve)?;
        position.variable_borrowed = position
            .variable_borrowed
            .checked_add(amount)
            .ok_or(PoolError::OverflowError)?;
        reserve.data.total_variable_borrowed = reserve
            .data
            .total_variable_borrowed
            .checked_add(amount)
            .ok_or(PoolError::OverflowError)?;
        self.config.set_borrowing_variable(reserve.index(), true);
        Ok(())
    }

    /// Remove variable debt from the position and the reserve's total variable debt. The
    /// reserve's total is floored at zero.
    ///
    /// ### Errors
    /// If the position owes less than `amount`
    pub fn remove_variable_debt(
        &mut self,
        reserve: &mut Reserve,
        amount: u128,
    ) -> Result<(), PoolError> {
        let position = self.realize(reserve)?;
        position.variable_borrowed = position
            .variable_borrowed
            .checked_sub(amount)
            .ok_or(PoolError::InsufficientBalance)?;
        let repaid = position.variable_borrowed == 0;
        reserve.data.total_variable_borrowed =
            reserve.data.total_variable_borrowed.saturating_sub(amount);
        if repaid {
            self.config.set_borrowing_variable(reserve.index(), false);
        }
        Ok(())
    }

    /// Add stable debt at `rate_e24` to the position. The position's rate becomes the principal
    /// weighted average of its rate and `rate_e24`, rounded up, and the reserve's average rate
    /// the principal weighted average over all stable debt, rounded down.
    ///
    /// ### Arguments
    /// * `reserve` - The reserve
    /// * `amount` - The amount borrowed
    /// * `rate_e24` - The stable rate the new debt is borrowed at
    pub fn add_stable_debt(
        &mut self,
        reserve: &mut Reserve,
        amount: u128,
        rate_e24: u128,
    ) -> Result<(), PoolError> {
        let position = self.realize(reserve)?;
        let opened = position.stable_borrowed == 0;
        let new_principal = position
            .stable_borrowed
            .checked_add(amount)
            .ok_or(PoolError::OverflowError)?;
        position.stable_borrow_rate_e24 = weighted_rate(
            position.stable_borrowed,
            position.stable_borrow_rate_e24,
            amount,
            rate_e24,
            Rounding::Ceil,
        )?;
        position.stable_borrowed = new_principal;

        let data = &mut reserve.data;
        data.avg_stable_rate_e24 = weighted_rate(
            data.sum_stable_debt,
            data.avg_stable_rate_e24,
            amount,
            rate_e24,
            Rounding::Floor,
        )?;
        data.sum_stable_debt = data
            .sum_stable_debt
            .checked_add(amount)
            .ok_or(PoolError::OverflowError)?;
        if opened {
            data.stable_borrowers = data
                .stable_borrowers
                .checked_add(1)
                .ok_or(PoolError::OverflowError)?;
        }
        self.config.set_borrowing_stable(reserve.index(), true);
        Ok(())
    }

    /// Remove stable debt from the position. The repaid principal leaves the reserve's average
    /// rate at the rate the position holds. A fully repaid position drops its rate.
    ///
    /// The reserve compounds its stable debt on every accrual while positions accrue simple
    /// interest, so once the last stable position closes the reserve's stable debt is cleared.
    ///
    /// ### Errors
    /// If the position owes less than `amount`
    pub fn remove_stable_debt(
        &mut self,
        reserve: &mut Reserve,
        amount: u128,
    ) -> Result<(), PoolError> {
        let position = self.realize(reserve)?;
        position.stable_borrowed = position
            .stable_borrowed
            .checked_sub(amount)
            .ok_or(PoolError::InsufficientBalance)?;
        let user_rate = position.stable_borrow_rate_e24;
        let repaid = position.stable_borrowed == 0;
        if repaid {
            position.stable_borrow_rate_e24 = 0;
        }

        let data = &mut reserve.data;
        if repaid {
            data.stable_borrowers = data.stable_borrowers.saturating_sub(1);
        }
        let remaining = if data.stable_borrowers == 0 {
            0
        } else {
            data.sum_stable_debt.saturating_sub(amount)
        };
        data.avg_stable_rate_e24 = if remaining == 0 {
            0
        } else {
            let total_weight = mul_div(
                &[data.avg_stable_rate_e24, data.sum_stable_debt],
                &[1],
                Rounding::Floor,
            )
            .ok_or(PoolError::OverflowError)?;
            let repaid_weight =
                mul_div(&[user_rate, amount], &[1], Rounding::Floor).ok_or(PoolError::OverflowError)?;
            total_weight.saturating_sub(repaid_weight) / remaining
        };
        data.sum_stable_debt = remaining;
        if repaid {
            self.config.set_borrowing_stable(reserve.index(), false);
        }
        Ok(())
    }
}

/// The principal weighted average of two rates
fn weighted_rate(
    principal: u128,
    rate_e24: u128,
    amount: u128,
    new_rate_e24: u128,
    rounding: Rounding,
) -> Result<u128, PoolError> {
    let total = principal
        .checked_add(amount)
        .ok_or(PoolError::OverflowError)?;
    if total == 0 {
        return Ok(0);
    }
    let old_weight =
        mul_div(&[principal, rate_e24], &[1], Rounding::Floor).ok_or(PoolError::OverflowError)?;
    let new_weight =
        mul_div(&[amount, new_rate_e24], &[1], Rounding::Floor).ok_or(PoolError::OverflowError)?;
    let weight = old_weight
        .checked_add(new_weight)
        .ok_or(PoolError::OverflowError)?;
    mul_div(&[weight], &[total], rounding).ok_or(PoolError::OverflowError)
}
