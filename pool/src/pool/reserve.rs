use tracing::debug;

use crate::{
    constants::SCALAR_6,
    errors::PoolError,
    math::{mul_div, FixedPoint, Rounding},
    storage::{Address, Ledger, ReserveConfig, ReserveData},
};

use super::interest::{calc_borrow_rate, calc_interest, calc_supply_rate, calc_utilization};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reserve {
    pub asset: Address,        // the underlying asset address
    pub config: ReserveConfig, // the reserve configuration
    pub data: ReserveData,     // the reserve totals, indexes and rates
    pub pool_balance: u128,    // the liquidity the pool holds of the asset
}

impl Reserve {
    /// Load a Reserve from the ledger and update to the current ledger timestamp.
    ///
    /// **NOTE**: This function is not cached, and should be called from the Pool.
    ///
    /// ### Arguments
    /// * ledger - The ledger
    /// * asset - The address of the underlying asset
    ///
    /// ### Errors
    /// If the asset is not registered, or if the accrual overflows
    pub fn load(ledger: &Ledger, asset: &Address) -> Result<Reserve, PoolError> {
        let mut reserve = Reserve::load_unupdated(ledger, asset)?;
        reserve.accrue(ledger.timestamp())?;
        Ok(reserve)
    }

    /// Load a Reserve from the ledger as it was last stored
    pub fn load_unupdated(ledger: &Ledger, asset: &Address) -> Result<Reserve, PoolError> {
        let config = ledger.get_res_config(asset)?;
        let data = ledger.get_res_data(asset)?;
        let pool_balance = ledger
            .tokens()
            .balance(asset, ledger.get_pool_address());
        Ok(Reserve {
            asset: asset.clone(),
            config,
            data,
            pool_balance,
        })
    }

    /// Store the updated reserve data to the ledger.
    pub fn store(&self, ledger: &mut Ledger) {
        ledger.set_res_data(&self.asset, &self.data);
    }

    /// The index of the reserve in the reserve list
    pub fn index(&self) -> u32 {
        self.config.index
    }

    /// The scalar of the asset's raw units
    pub fn scalar(&self) -> Result<u128, PoolError> {
        10u128
            .checked_pow(self.config.decimals)
            .ok_or(PoolError::OverflowError)
    }

    /// Advance the indexes of the reserve to `timestamp`, accruing the debt interest and
    /// crediting the suppliers' part of it. Does nothing if the reserve is already updated
    /// to `timestamp` or later.
    ///
    /// ### Arguments
    /// * timestamp - The current timestamp
    pub fn accrue(&mut self, timestamp: u64) -> Result<(), PoolError> {
        if timestamp <= self.data.last_time {
            return Ok(());
        }
        let elapsed = timestamp - self.data.last_time;
        let data = &mut self.data;

        // the variable debt compounds through the variable index
        let variable_interest = calc_interest(
            data.total_variable_borrowed,
            data.current_variable_borrow_rate_e24,
            elapsed,
            Rounding::Ceil,
        )?;
        let variable_index_increase = calc_interest(
            data.cumulative_variable_borrow_index_e18,
            data.current_variable_borrow_rate_e24,
            elapsed,
            Rounding::Ceil,
        )?;

        let stable_interest = calc_interest(
            data.sum_stable_debt,
            data.avg_stable_rate_e24,
            elapsed,
            Rounding::Ceil,
        )?;

        let debt_interest = variable_interest
            .checked_add(stable_interest)
            .ok_or(PoolError::OverflowError)?;
        let supply_interest = debt_interest
            .fixed_mul_floor(self.config.parameters.income_for_suppliers_part_e6, SCALAR_6)
            .ok_or(PoolError::OverflowError)?;

        data.total_variable_borrowed = data
            .total_variable_borrowed
            .checked_add(variable_interest)
            .ok_or(PoolError::OverflowError)?;
        data.cumulative_variable_borrow_index_e18 = data
            .cumulative_variable_borrow_index_e18
            .checked_add(variable_index_increase)
            .ok_or(PoolError::OverflowError)?;
        data.sum_stable_debt = data
            .sum_stable_debt
            .checked_add(stable_interest)
            .ok_or(PoolError::OverflowError)?;
        data.accumulated_stable_interest = data
            .accumulated_stable_interest
            .checked_add(stable_interest)
            .ok_or(PoolError::OverflowError)?;

        // suppliers are only credited if someone can receive the interest
        if data.total_supplied > 0 && supply_interest > 0 {
            let supply_index_increase = data
                .cumulative_supply_index_e18
                .fixed_mul_floor(supply_interest, data.total_supplied)
                .ok_or(PoolError::OverflowError)?;
            data.cumulative_supply_index_e18 = data
                .cumulative_supply_index_e18
                .checked_add(supply_index_increase)
                .ok_or(PoolError::OverflowError)?;
            data.total_supplied = data
                .total_supplied
                .checked_add(supply_interest)
                .ok_or(PoolError::OverflowError)?;
        }
        data.last_time = timestamp;

        debug!(
            asset = %self.asset,
            elapsed,
            variable_interest,
            stable_interest,
            supply_interest,
            supply_index = data.cumulative_supply_index_e18,
            variable_index = data.cumulative_variable_borrow_index_e18,
            "accrued reserve interest"
        );
        Ok(())
    }

    /// Recalculate the current rates of the reserve from its utilization. Should be called
    /// after `pool_balance` reflects the liquidity the operation leaves in the pool.
    pub fn recalculate_rates(&mut self) -> Result<(), PoolError> {
        let util = self.utilization()?;
        let variable_rate = calc_borrow_rate(&self.config.parameters.interest_rate_model, util)?;
        self.data.current_variable_borrow_rate_e24 = variable_rate;
        self.data.current_supply_rate_e24 = calc_supply_rate(
            variable_rate,
            self.data.total_variable_borrowed,
            self.data.avg_stable_rate_e24,
            self.data.sum_stable_debt,
            self.config.parameters.income_for_suppliers_part_e6,
            self.data.total_supplied,
        )?;
        Ok(())
    }

    /// Fetch the variable and stable debt of the reserve
    pub fn total_debt(&self) -> Result<u128, PoolError> {
        self.data
            .total_variable_borrowed
            .checked_add(self.data.sum_stable_debt)
            .ok_or(PoolError::OverflowError)
    }

    /// Fetch the current utilization of the reserve, expressed in 6 decimals
    pub fn utilization(&self) -> Result<u128, PoolError> {
        calc_utilization(self.total_debt()?, self.pool_balance)
    }

    /// Calculate the stable rate a new stable borrow of `amount` locks. The rate is the curve
    /// rate at the utilization after the borrow plus the reserve's stable base rate.
    ///
    /// ### Arguments
    /// * `amount` - The amount about to be borrowed
    pub fn stable_rate_after_borrow(&self, amount: u128) -> Result<u128, PoolError> {
        let total_debt = self.total_debt()?;
        let debt_after = total_debt
            .checked_add(amount)
            .ok_or(PoolError::OverflowError)?;
        let total = total_debt
            .checked_add(self.pool_balance)
            .ok_or(PoolError::OverflowError)?;
        let util = if total == 0 {
            SCALAR_6
        } else {
            debt_after
                .fixed_div_ceil(total, SCALAR_6)
                .ok_or(PoolError::OverflowError)?
        };
        calc_borrow_rate(&self.config.parameters.interest_rate_model, util)?
            .checked_add(self.config.parameters.stable_rate_base_e24)
            .ok_or(PoolError::OverflowError)
    }

    /// Calculate the flash loan fee for an amount, rounded up
    ///
    /// ### Arguments
    /// * `amount` - The amount loaned
    /// * `fee_part_e6` - The part of the fee the borrower pays
    pub fn flash_loan_fee(&self, amount: u128, fee_part_e6: u128) -> Result<u128, PoolError> {
        mul_div(
            &[amount, self.config.parameters.flash_loan_fee_e6, fee_part_e6],
            &[SCALAR_6, SCALAR_6],
            Rounding::Ceil,
        )
        .ok_or(PoolError::OverflowError)
    }

    /// Fetch the income the protocol holds for the reserve. Negative if the reserve owes
    /// more to its suppliers than it holds and is owed.
    pub fn protocol_income(&self) -> Result<i128, PoolError> {
        let assets = self
            .pool_balance
            .checked_add(self.total_debt()?)
            .ok_or(PoolError::OverflowError)?;
        let assets = cast::i128(assets).map_err(|_| PoolError::OverflowError)?;
        let supplied = cast::i128(self.data.total_supplied).map_err(|_| PoolError::OverflowError)?;
        assets
            .checked_sub(supplied)
            .ok_or(PoolError::OverflowError)
    }

    /********** Validation **********/

    /// Require that the reserve is active
    pub fn require_active(&self) -> Result<(), PoolError> {
        if !self.config.activated {
            return Err(PoolError::Inactive);
        }
        Ok(())
    }

    /// Require that the reserve accepts new deposits and borrows
    pub fn require_not_freezed(&self) -> Result<(), PoolError> {
        if self.config.freezed {
            return Err(PoolError::Freezed);
        }
        Ok(())
    }

    /// Require that the reserve lets its asset be borrowed
    pub fn require_borrowable(&self) -> Result<(), PoolError> {
        if self.config.rules.borrow_coefficient_e6.is_none() {
            return Err(PoolError::BorrowingDisabled);
        }
        Ok(())
    }

    /// Require that the total supply is within the reserve's maximal total supply
    pub fn require_supply_cap(&self) -> Result<(), PoolError> {
        match self.config.restrictions.maximal_total_supply {
            Some(max) if self.data.total_supplied > max => Err(PoolError::SupplyCapExceeded),
            _ => Ok(()),
        }
    }

    /// Require that the total debt is within the reserve's maximal total debt
    pub fn require_debt_cap(&self) -> Result<(), PoolError> {
        match self.config.restrictions.maximal_total_debt {
            Some(max) if self.total_debt()? > max => Err(PoolError::DebtCapExceeded),
            _ => Ok(()),
        }
    }

    /// Require that a supply balance is either empty or at least the reserve's minimal collateral
    pub fn require_minimal_collateral(&self, supplied: u128) -> Result<(), PoolError> {
        if supplied != 0 && supplied < self.config.restrictions.minimal_collateral {
            return Err(PoolError::BelowMinimum);
        }
        Ok(())
    }

    /// Require that a debt balance is either empty or at least the reserve's minimal debt
    pub fn require_minimal_debt(&self, debt: u128) -> Result<(), PoolError> {
        if debt != 0 && debt < self.config.restrictions.minimal_debt {
            return Err(PoolError::BelowMinimum);
        }
        Ok(())
    }
}

/// Scale an amount realized at `applied_index_e18` to `current_index_e18`. Amounts that were
/// never realized against an index are returned unchanged.
pub(crate) fn apply_index(
    amount: u128,
    current_index_e18: u128,
    applied_index_e18: u128,
    rounding: Rounding,
) -> Result<u128, PoolError> {
    if amount == 0 || applied_index_e18 == 0 {
        return Ok(amount);
    }
    mul_div(&[amount, current_index_e18], &[applied_index_e18], rounding)
        .ok_or(PoolError::OverflowError)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        constants::{SCALAR_18, SECONDS_PER_YEAR},
        testutils,
    };

    #[test]
    fn test_load_accrues_to_ledger_timestamp() {
        let mut ledger = testutils::create_ledger();
        let dai = testutils::create_reserve(&mut ledger, "DAI", testutils::dai_metadata());
        let mut data = ledger.get_res_data(&dai).unwrap();
        data.total_supplied = 10_000_000_000;
        data.total_variable_borrowed = 5_000_000_000;
        data.current_variable_borrow_rate_e24 = 500_000_000_000_000;
        ledger.set_res_data(&dai, &data);

        ledger.set_timestamp(SECONDS_PER_YEAR);
        let reserve = Reserve::load(&ledger, &dai).unwrap();
        assert_eq!(reserve.data.total_variable_borrowed, 5_078_840_000);
        assert_eq!(
            reserve.data.cumulative_variable_borrow_index_e18,
            1_015_768_000_000_000_000
        );
        assert_eq!(reserve.data.total_supplied, 10_078_839_211);
        assert_eq!(
            reserve.data.cumulative_supply_index_e18,
            1_007_883_921_100_000_000
        );
        assert_eq!(reserve.data.last_time, SECONDS_PER_YEAR);

        // the ledger is not written by a load
        let stored = ledger.get_res_data(&dai).unwrap();
        assert_eq!(stored.last_time, 0);
        assert_eq!(stored.total_supplied, 10_000_000_000);
    }

    #[test]
    fn test_accrue_same_timestamp_is_noop() {
        let mut ledger = testutils::create_ledger();
        let dai = testutils::create_reserve(&mut ledger, "DAI", testutils::dai_metadata());
        let mut reserve = Reserve::load(&ledger, &dai).unwrap();
        reserve.data.total_supplied = 1_000;
        reserve.data.total_variable_borrowed = 1_000;
        reserve.data.current_variable_borrow_rate_e24 = 1_000_000_000_000_000;

        reserve.accrue(1000).unwrap();
        let first = reserve.clone();
        reserve.accrue(1000).unwrap();
        assert_eq!(reserve, first);
        // going back in time does nothing
        reserve.accrue(10).unwrap();
        assert_eq!(reserve, first);
    }

    #[test]
    fn test_accrue_stable_interest() {
        let mut ledger = testutils::create_ledger();
        let dai = testutils::create_reserve(&mut ledger, "DAI", testutils::dai_metadata());
        let mut reserve = Reserve::load(&ledger, &dai).unwrap();
        reserve.data.total_supplied = 10_000_000_000;
        reserve.data.sum_stable_debt = 1_000_000_000;
        reserve.data.avg_stable_rate_e24 = 1_000_000_000_000_000;

        reserve.accrue(1_000_000).unwrap();
        // 1e9 * 1e15 * 1e6 / 1e24 = 1e6
        assert_eq!(reserve.data.sum_stable_debt, 1_001_000_000);
        assert_eq!(reserve.data.accumulated_stable_interest, 1_000_000);
        assert_eq!(reserve.data.total_supplied, 10_000_999_990);
        assert_eq!(
            reserve.data.cumulative_variable_borrow_index_e18,
            SCALAR_18
        );
        assert_eq!(
            reserve.data.cumulative_supply_index_e18,
            1_000_099_999_000_000_000
        );
    }

    #[test]
    fn test_accrue_without_suppliers_keeps_supply_index() {
        let mut ledger = testutils::create_ledger();
        let dai = testutils::create_reserve(&mut ledger, "DAI", testutils::dai_metadata());
        let mut reserve = Reserve::load(&ledger, &dai).unwrap();
        reserve.data.current_variable_borrow_rate_e24 = 1_000_000_000_000_000;

        reserve.accrue(1_000_000).unwrap();
        assert_eq!(reserve.data.cumulative_supply_index_e18, SCALAR_18);
        assert_eq!(reserve.data.total_supplied, 0);
        // the variable index still grows with the rate
        assert_eq!(
            reserve.data.cumulative_variable_borrow_index_e18,
            SCALAR_18 + 1_000_000_000_000_000
        );
    }

    #[test]
    fn test_recalculate_rates() {
        let mut ledger = testutils::create_ledger();
        let dai = testutils::create_reserve(&mut ledger, "DAI", testutils::dai_metadata());
        let mut reserve = Reserve::load(&ledger, &dai).unwrap();
        reserve.data.total_supplied = 10_000_000_000;
        reserve.data.total_variable_borrowed = 5_000_000_000;
        reserve.pool_balance = 5_000_000_000;

        reserve.recalculate_rates().unwrap();
        assert_eq!(
            reserve.data.current_variable_borrow_rate_e24,
            500_000_000_000_000
        );
        assert_eq!(reserve.data.current_supply_rate_e24, 249_997_500_000_000);
    }

    #[test]
    fn test_stable_rate_after_borrow() {
        let mut ledger = testutils::create_ledger();
        let dai = testutils::create_reserve(&mut ledger, "DAI", testutils::dai_metadata());
        let mut reserve = Reserve::load(&ledger, &dai).unwrap();
        reserve.pool_balance = 10_000_000_000;
        reserve.config.parameters.stable_rate_base_e24 = 1_000;

        // borrowing half of the liquidity prices the debt at 50% utilization
        let rate = reserve.stable_rate_after_borrow(5_000_000_000).unwrap();
        assert_eq!(rate, 500_000_000_000_000 + 1_000);
    }

    #[test]
    fn test_flash_loan_fee_rounds_up() {
        let mut ledger = testutils::create_ledger();
        let weth = testutils::create_reserve(&mut ledger, "WETH", testutils::weth_metadata());
        let reserve = Reserve::load(&ledger, &weth).unwrap();
        assert_eq!(
            reserve.flash_loan_fee(5_000_000_000_000_000_000, SCALAR_6),
            Ok(5_000_000_000_000_000)
        );
        assert_eq!(reserve.flash_loan_fee(1, SCALAR_6), Ok(1));
        assert_eq!(
            reserve.flash_loan_fee(5_000_000_000_000_000_000, 100_000),
            Ok(500_000_000_000_000)
        );
    }

    #[test]
    fn test_protocol_income() {
        let mut ledger = testutils::create_ledger();
        let dai = testutils::create_reserve(&mut ledger, "DAI", testutils::dai_metadata());
        let mut reserve = Reserve::load(&ledger, &dai).unwrap();
        reserve.pool_balance = 100;
        reserve.data.total_variable_borrowed = 50;
        reserve.data.total_supplied = 140;
        assert_eq!(reserve.protocol_income(), Ok(10));
        reserve.data.total_supplied = 160;
        assert_eq!(reserve.protocol_income(), Ok(-10));
    }

    #[test]
    fn test_restrictions() {
        let mut ledger = testutils::create_ledger();
        let dai = testutils::create_reserve(&mut ledger, "DAI", testutils::dai_metadata());
        let mut reserve = Reserve::load(&ledger, &dai).unwrap();
        assert_eq!(reserve.require_minimal_collateral(0), Ok(()));
        assert_eq!(
            reserve.require_minimal_collateral(1_999_999),
            Err(PoolError::BelowMinimum)
        );
        assert_eq!(reserve.require_minimal_collateral(2_000_000), Ok(()));
        assert_eq!(
            reserve.require_minimal_debt(999_999),
            Err(PoolError::BelowMinimum)
        );

        reserve.config.restrictions.maximal_total_supply = Some(100);
        reserve.data.total_supplied = 101;
        assert_eq!(
            reserve.require_supply_cap(),
            Err(PoolError::SupplyCapExceeded)
        );
        reserve.config.restrictions.maximal_total_debt = Some(100);
        reserve.data.sum_stable_debt = 60;
        reserve.data.total_variable_borrowed = 40;
        assert_eq!(reserve.require_debt_cap(), Ok(()));
        reserve.data.total_variable_borrowed = 41;
        assert_eq!(reserve.require_debt_cap(), Err(PoolError::DebtCapExceeded));
    }
}
