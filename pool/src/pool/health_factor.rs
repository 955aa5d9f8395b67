use tracing::warn;

use crate::{
    constants::{SCALAR_6, SCALAR_8},
    errors::PoolError,
    math::{mul_div, Rounding},
    storage::{Address, Ledger},
};

use super::{pool::Pool, user::realize, User};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PositionData {
    /// The collateral value weighted by the collateral coefficients, in USD with 14 decimals
    pub collateral_value: u128,
    /// The debt value weighted by the borrow coefficients, in USD with 14 decimals
    pub debt_value: u128,
}

impl PositionData {
    /// Calculate the position data for a user's positions, realized to the current timestamp
    ///
    /// Only supply the user marked as collateral in a reserve with a collateral coefficient
    /// counts as collateral. Collateral values round down and debt values round up.
    ///
    /// ### Arguments
    /// * pool - The pool
    /// * user - The user to calculate the position data for
    ///
    /// ### Errors
    /// If a price is missing for a reserve the user holds value in
    pub fn calculate_from_positions(
        ledger: &Ledger,
        pool: &mut Pool,
        user: &User,
    ) -> Result<Self, PoolError> {
        let reserve_list = ledger.get_res_list();
        let mut collateral_value: u128 = 0;
        let mut debt_value: u128 = 0;
        for (index, position) in user.positions.reserves.iter() {
            let asset = reserve_list
                .get(cast::usize(*index))
                .ok_or(PoolError::InternalError)?;
            let reserve = pool.load_reserve(ledger, asset)?;
            let mut position = position.clone();
            realize(&mut position, &reserve)?;

            let is_collateral = user.config.is_collateral(*index) && position.supplied > 0;
            let debt = position
                .variable_borrowed
                .checked_add(position.stable_borrowed)
                .ok_or(PoolError::OverflowError)?;
            let collateral_coefficient = reserve.config.rules.collateral_coefficient_e6;

            if (is_collateral && collateral_coefficient.is_some()) || debt > 0 {
                let price = pool.load_price(ledger, asset)?;
                let scalar = reserve.scalar()?;
                if let (true, Some(coefficient)) = (is_collateral, collateral_coefficient) {
                    let value = mul_div(
                        &[position.supplied, price, coefficient],
                        &[scalar],
                        Rounding::Floor,
                    )
                    .ok_or(PoolError::OverflowError)?;
                    collateral_value = collateral_value
                        .checked_add(value)
                        .ok_or(PoolError::OverflowError)?;
                }
                if debt > 0 {
                    let coefficient = reserve
                        .config
                        .rules
                        .borrow_coefficient_e6
                        .unwrap_or(SCALAR_6);
                    let value = mul_div(&[debt, price, coefficient], &[scalar], Rounding::Ceil)
                        .ok_or(PoolError::OverflowError)?;
                    debt_value = debt_value
                        .checked_add(value)
                        .ok_or(PoolError::OverflowError)?;
                }
            }
            pool.cache_reserve(reserve, false);
        }
        Ok(PositionData {
            collateral_value,
            debt_value,
        })
    }

    /// Check if the weighted collateral covers the weighted debt
    pub fn is_healthy(&self) -> bool {
        self.collateral_value >= self.debt_value
    }

    /// Return whether the position is healthy and the distance between its weighted
    /// collateral and weighted debt, in USD with 6 decimals
    pub fn free_collateral(&self) -> (bool, u128) {
        let healthy = self.is_healthy();
        let difference = if healthy {
            self.collateral_value - self.debt_value
        } else {
            self.debt_value - self.collateral_value
        };
        (healthy, difference / SCALAR_8)
    }

    /// Check if the position data is healthy
    ///
    /// ### Errors
    /// If the weighted debt exceeds the weighted collateral
    pub fn require_healthy(&self, user: &Address) -> Result<(), PoolError> {
        if !self.is_healthy() {
            warn!(
                user = %user,
                collateral_value = self.collateral_value,
                debt_value = self.debt_value,
                "rejected undercollateralized position"
            );
            return Err(PoolError::Undercollateralized);
        }
        Ok(())
    }
}
