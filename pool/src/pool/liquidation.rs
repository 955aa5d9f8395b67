use alloy_primitives::U256;
use tracing::info;

use crate::{
    constants::{SCALAR_18, SCALAR_6},
    errors::PoolError,
    events::PoolEvent,
    math::{mul_div, Rounding},
    storage::{Address, Ledger},
    validator::require_positive,
};

use super::{actions::Actions, health_factor::PositionData, pool::Pool, user::User};

/// The kind of debt a liquidation repays
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RateMode {
    Variable,
    Stable,
}

/// Liquidate an undercollateralized borrower. The liquidator repays the borrower's debt in
/// `asset_to_repay` and receives the borrower's supply of `asset_to_take` at the price ratio
/// plus the penalties of both reserves.
///
/// ### Arguments
/// * liquidator - The account repaying the debt and receiving the collateral
/// * borrower - The undercollateralized borrower
/// * asset_to_repay - The asset of the debt being repaid
/// * asset_to_take - The asset of the collateral being taken
/// * rate_mode - Whether the variable or the stable debt is repaid
/// * amount_to_repay - The amount to repay, or `None` to repay all of the debt
/// * min_collateral_received_e18 - The minimal amount of collateral received per unit of
///   debt repaid, expressed in 18 decimals
///
/// ### Returns
/// The amount repaid and the amount of collateral taken
///
/// ### Errors
/// If the borrower is collateralized, if there is nothing to repay, if the taken asset is not
/// a collateral of the borrower, or if the collateral received is below the minimum
#[allow(clippy::too_many_arguments)]
pub fn execute_liquidate(
    ledger: &mut Ledger,
    liquidator: &Address,
    borrower: &Address,
    asset_to_repay: &Address,
    asset_to_take: &Address,
    rate_mode: RateMode,
    amount_to_repay: Option<u128>,
    min_collateral_received_e18: u128,
) -> Result<(u128, u128), PoolError> {
    if liquidator == borrower {
        return Err(PoolError::BadRequest);
    }
    if let Some(amount) = amount_to_repay {
        require_positive(amount)?;
    }
    let mut pool = Pool::load(ledger);
    let mut borrower_state = User::load(ledger, borrower);

    if PositionData::calculate_from_positions(ledger, &mut pool, &borrower_state)?.is_healthy() {
        return Err(PoolError::Collaterized);
    }

    let mut debt_reserve = pool.load_reserve(ledger, asset_to_repay)?;
    debt_reserve.require_active()?;
    let debt = {
        let position = borrower_state.realize(&debt_reserve)?;
        match rate_mode {
            RateMode::Variable => position.variable_borrowed,
            RateMode::Stable => position.stable_borrowed,
        }
    };
    if debt == 0 {
        return Err(PoolError::NothingToRepay);
    }

    let collateral_reserve = pool.load_reserve(ledger, asset_to_take)?;
    collateral_reserve.require_active()?;
    let collateral_index = collateral_reserve.index();
    let supplied = borrower_state.realize(&collateral_reserve)?.supplied;
    if !borrower_state.config.is_collateral(collateral_index)
        || collateral_reserve.config.rules.collateral_coefficient_e6.is_none()
        || supplied == 0
    {
        return Err(PoolError::TakingNotACollateral);
    }

    let debt_price = pool.load_price(ledger, asset_to_repay)?;
    let collateral_price = pool.load_price(ledger, asset_to_take)?;
    let debt_scalar = debt_reserve.scalar()?;
    let collateral_scalar = collateral_reserve.scalar()?;
    let bonus_e6 = SCALAR_6
        .checked_add(collateral_reserve.config.rules.penalty_e6)
        .and_then(|bonus| bonus.checked_add(debt_reserve.config.rules.penalty_e6))
        .ok_or(PoolError::OverflowError)?;

    let mut amount_repaid = amount_to_repay.unwrap_or(debt).min(debt);
    let mut amount_taken = mul_div(
        &[amount_repaid, debt_price, collateral_scalar, bonus_e6],
        &[collateral_price, debt_scalar, SCALAR_6],
        Rounding::Floor,
    )
    .ok_or(PoolError::OverflowError)?;
    if amount_taken > supplied {
        amount_taken = supplied;
        amount_repaid = mul_div(
            &[supplied, collateral_price, debt_scalar, SCALAR_6],
            &[debt_price, collateral_scalar, bonus_e6],
            Rounding::Ceil,
        )
        .ok_or(PoolError::OverflowError)?
        .min(debt);
    }

    // collateral_taken / repaid >= min_collateral_received_e18 / 1e18
    let received = U256::from(amount_taken) * U256::from(SCALAR_18);
    let required = U256::from(min_collateral_received_e18) * U256::from(amount_repaid);
    if received < required {
        return Err(PoolError::MinimumReceived);
    }

    match rate_mode {
        RateMode::Variable => borrower_state.remove_variable_debt(&mut debt_reserve, amount_repaid)?,
        RateMode::Stable => borrower_state.remove_stable_debt(&mut debt_reserve, amount_repaid)?,
    }
    pool.cache_reserve(debt_reserve, true);

    // reload through the cache in case the debt and collateral reserves are the same
    let mut collateral_reserve = pool.load_reserve(ledger, asset_to_take)?;
    let mut liquidator_state = User::load(ledger, liquidator);
    borrower_state.remove_supply(&mut collateral_reserve, amount_taken)?;
    liquidator_state.add_supply(&mut collateral_reserve, amount_taken)?;
    pool.cache_reserve(collateral_reserve, true);

    let mut actions = Actions::new(liquidator, liquidator);
    actions.add_for_spender_transfer(asset_to_repay, amount_repaid);

    info!(
        liquidator = %liquidator,
        borrower = %borrower,
        asset_to_repay = %asset_to_repay,
        asset_to_take = %asset_to_take,
        amount_repaid,
        amount_taken,
        "liquidated borrower"
    );
    pool.publish(PoolEvent::Liquidation {
        liquidator: liquidator.clone(),
        borrower: borrower.clone(),
        asset_to_repay: asset_to_repay.clone(),
        asset_to_take: asset_to_take.clone(),
        amount_repaid,
        amount_taken,
    });
    pool.commit(ledger, actions, &[borrower_state, liquidator_state])?;
    Ok((amount_repaid, amount_taken))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{storage::Ledger, testutils};

    /// Samwise borrows 1000 DAI against 1 WETH, then WETH drops to $1280
    fn setup_underwater() -> (Ledger, testutils::MarketAssets) {
        let (mut ledger, assets) = testutils::create_market();
        let (samwise, frodo, merry) = (testutils::samwise(), testutils::frodo(), testutils::merry());
        testutils::supply_collateral(&mut ledger, &assets.weth, &samwise, 1_000_000_000_000_000_000);
        testutils::supply(&mut ledger, &assets.dai, &frodo, 10_000_000_000);
        testutils::borrow_variable(&mut ledger, &assets.dai, &samwise, 1_000_000_000);
        ledger.set_price(&assets.weth, 128_000_000_000);
        ledger
            .tokens_mut()
            .mint(&assets.dai, &merry, 10_000_000_000)
            .unwrap();
        (ledger, assets)
    }

    #[test]
    fn test_liquidate() {
        let (mut ledger, assets) = setup_underwater();
        let (samwise, merry) = (testutils::samwise(), testutils::merry());

        let result = execute_liquidate(
            &mut ledger,
            &merry,
            &samwise,
            &assets.dai,
            &assets.weth,
            RateMode::Variable,
            Some(1_000_000_000),
            871_093_750_000_000_000_000_000_000,
        );
        assert_eq!(result, Ok((1_000_000_000, 871_093_750_000_000_000)));

        let borrower = ledger.get_user_positions(&samwise);
        assert_eq!(borrower.reserves.get(&0), None);
        assert_eq!(
            borrower.reserves.get(&2).unwrap().supplied,
            128_906_250_000_000_000
        );
        assert!(!ledger.get_user_config(&samwise).is_borrowing_variable(0));
        assert_eq!(
            ledger
                .get_user_positions(&merry)
                .reserves
                .get(&2)
                .unwrap()
                .supplied,
            871_093_750_000_000_000
        );
        assert_eq!(
            ledger.get_res_data(&assets.weth).unwrap().total_supplied,
            1_000_000_000_000_000_000
        );
        assert_eq!(ledger.get_res_data(&assets.dai).unwrap().total_variable_borrowed, 0);
        assert_eq!(ledger.tokens().balance(&assets.dai, &merry), 9_000_000_000);
    }

    #[test]
    fn test_liquidate_minimum_received() {
        let (mut ledger, assets) = setup_underwater();
        let (samwise, merry) = (testutils::samwise(), testutils::merry());
        let before = ledger.clone();

        let result = execute_liquidate(
            &mut ledger,
            &merry,
            &samwise,
            &assets.dai,
            &assets.weth,
            RateMode::Variable,
            Some(1_000_000_000),
            871_093_750_000_000_000_000_000_001,
        );
        assert_eq!(result, Err(PoolError::MinimumReceived));
        assert_eq!(ledger.tokens(), before.tokens());
        assert_eq!(
            ledger.get_user_positions(&samwise),
            before.get_user_positions(&samwise)
        );
    }

    #[test]
    fn test_liquidate_collateralized() {
        let (mut ledger, assets) = setup_underwater();
        let (samwise, merry) = (testutils::samwise(), testutils::merry());
        ledger.set_price(&assets.weth, 150_000_000_000);

        let result = execute_liquidate(
            &mut ledger,
            &merry,
            &samwise,
            &assets.dai,
            &assets.weth,
            RateMode::Variable,
            None,
            0,
        );
        assert_eq!(result, Err(PoolError::Collaterized));
    }

    #[test]
    fn test_liquidate_nothing_to_repay() {
        let (mut ledger, assets) = setup_underwater();
        let (samwise, merry) = (testutils::samwise(), testutils::merry());

        let result = execute_liquidate(
            &mut ledger,
            &merry,
            &samwise,
            &assets.dai,
            &assets.weth,
            RateMode::Stable,
            None,
            0,
        );
        assert_eq!(result, Err(PoolError::NothingToRepay));
    }

    #[test]
    fn test_liquidate_taking_not_a_collateral() {
        let (mut ledger, assets) = setup_underwater();
        let (samwise, merry) = (testutils::samwise(), testutils::merry());

        let result = execute_liquidate(
            &mut ledger,
            &merry,
            &samwise,
            &assets.dai,
            &assets.usdc,
            RateMode::Variable,
            None,
            0,
        );
        assert_eq!(result, Err(PoolError::TakingNotACollateral));
    }

    #[test]
    fn test_liquidate_caps_to_borrower_supply() {
        let (mut ledger, assets) = setup_underwater();
        let (samwise, merry) = (testutils::samwise(), testutils::merry());
        // at $900 the full debt is worth more than the collateral
        ledger.set_price(&assets.weth, 90_000_000_000);

        let (repaid, taken) = execute_liquidate(
            &mut ledger,
            &merry,
            &samwise,
            &assets.dai,
            &assets.weth,
            RateMode::Variable,
            None,
            0,
        )
        .unwrap();
        assert_eq!(taken, 1_000_000_000_000_000_000);
        // 1 WETH * $900 / 1.115, rounded up
        assert_eq!(repaid, 807_174_888);
        let borrower = ledger.get_user_positions(&samwise);
        assert_eq!(borrower.reserves.get(&2), None);
        assert_eq!(
            borrower.reserves.get(&0).unwrap().variable_borrowed,
            1_000_000_000 - 807_174_888
        );
    }

    #[test]
    fn test_liquidate_self() {
        let (mut ledger, assets) = setup_underwater();
        let samwise = testutils::samwise();
        let result = execute_liquidate(
            &mut ledger,
            &samwise,
            &samwise,
            &assets.dai,
            &assets.weth,
            RateMode::Variable,
            None,
            0,
        );
        assert_eq!(result, Err(PoolError::BadRequest));
    }
}
