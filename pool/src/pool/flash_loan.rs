use std::collections::BTreeSet;

use tracing::{info, warn};

use crate::{
    constants::{FLASH_BORROWER_FEE_PART_E6, SCALAR_6},
    errors::{FlashLoanReceiverError, PoolError},
    events::PoolEvent,
    storage::{Address, Ledger, Role},
    validator::require_positive,
};

use super::{actions::Actions, pool::Pool, reserve::Reserve};

/// An account that receives a flash loan and repays it within the same transition
pub trait FlashLoanReceiver {
    /// The account the loaned tokens are sent to and repaid from
    fn address(&self) -> Address;

    /// Use the loaned tokens. Before returning, the receiver must hold `amounts[i] + fees[i]`
    /// of each asset and have approved the pool account to pull it.
    ///
    /// ### Arguments
    /// * `ledger` - The live ledger, with the loaned tokens already sent
    /// * `assets` - The loaned assets
    /// * `amounts` - The loaned amounts
    /// * `fees` - The fee owed on each loan
    /// * `params` - Opaque data forwarded from the caller
    fn execute_operation(
        &mut self,
        ledger: &mut Ledger,
        assets: &[Address],
        amounts: &[u128],
        fees: &[u128],
        params: &[u8],
    ) -> Result<(), FlashLoanReceiverError>;
}

/// Loan the pool's liquidity to a receiver for the duration of its callback
///
/// The loan and the receiver's callback run against the live ledger. If anything fails,
/// including the callback, the ledger is restored to its state before the loan.
///
/// ### Arguments
/// * caller - The account requesting the loan. Accounts with the flash borrower role pay
///   a reduced fee.
/// * receiver - The receiver of the loaned tokens
/// * assets - The assets to loan
/// * amounts - The amount of each asset to loan
/// * params - Data forwarded to the receiver
///
/// ### Errors
/// If the request is malformed, if a loan on one of the reserves is already in flight, if the
/// pool lacks the liquidity, if the callback fails, or if the receiver does not repay the
/// loan and its fee
pub fn execute_flash_loan(
    ledger: &mut Ledger,
    caller: &Address,
    receiver: &mut dyn FlashLoanReceiver,
    assets: &[Address],
    amounts: &[u128],
    params: &[u8],
) -> Result<(), PoolError> {
    let snapshot = ledger.clone();
    match flash_loan(ledger, caller, receiver, assets, amounts, params) {
        Ok(()) => Ok(()),
        Err(error) => {
            warn!(caller = %caller, receiver = %receiver.address(), %error, "flash loan reverted");
            *ledger = snapshot;
            Err(error)
        }
    }
}

fn flash_loan(
    ledger: &mut Ledger,
    caller: &Address,
    receiver: &mut dyn FlashLoanReceiver,
    assets: &[Address],
    amounts: &[u128],
    params: &[u8],
) -> Result<(), PoolError> {
    if assets.is_empty() || assets.len() != amounts.len() {
        return Err(PoolError::BadRequest);
    }
    let unique: BTreeSet<&Address> = assets.iter().collect();
    if unique.len() != assets.len() {
        return Err(PoolError::BadRequest);
    }

    let pool_address = ledger.get_pool_address().clone();
    let receiver_address = receiver.address();
    let fee_part_e6 = if ledger.has_role(caller, Role::FlashBorrower) {
        FLASH_BORROWER_FEE_PART_E6
    } else {
        SCALAR_6
    };

    let mut fees = Vec::with_capacity(assets.len());
    for (asset, amount) in assets.iter().zip(amounts.iter()) {
        let reserve = Reserve::load(ledger, asset)?;
        reserve.require_active()?;
        require_positive(*amount)?;
        if ledger.is_flash_loan_in_flight(asset) {
            return Err(PoolError::FlashLoanInProgress);
        }
        if *amount > reserve.pool_balance {
            return Err(PoolError::InsufficientBalance);
        }
        fees.push(reserve.flash_loan_fee(*amount, fee_part_e6)?);
    }

    for (asset, amount) in assets.iter().zip(amounts.iter()) {
        ledger.set_flash_loan_in_flight(asset, true);
        ledger
            .tokens_mut()
            .transfer(asset, &pool_address, &receiver_address, *amount)?;
    }

    receiver
        .execute_operation(ledger, assets, amounts, &fees, params)
        .map_err(|error| {
            warn!(receiver = %receiver_address, %error, "flash loan receiver failed");
            PoolError::ExecuteOperationFailed
        })?;

    for ((asset, amount), fee) in assets.iter().zip(amounts.iter()).zip(fees.iter()) {
        let repayment = amount.checked_add(*fee).ok_or(PoolError::OverflowError)?;
        ledger.tokens_mut().transfer_from(
            asset,
            &pool_address,
            &receiver_address,
            &pool_address,
            repayment,
        )?;
        ledger.set_flash_loan_in_flight(asset, false);
    }

    // the fees grow the pool's liquidity, so the reserves are re-rated on commit
    let mut pool = Pool::load(ledger);
    for ((asset, amount), fee) in assets.iter().zip(amounts.iter()).zip(fees.iter()) {
        let reserve = pool.load_reserve(ledger, asset)?;
        pool.cache_reserve(reserve, true);
        info!(
            caller = %caller,
            receiver = %receiver_address,
            asset = %asset,
            amount,
            fee,
            "flash loan repaid"
        );
        pool.publish(PoolEvent::FlashLoan {
            receiver: receiver_address.clone(),
            caller: caller.clone(),
            asset: asset.clone(),
            amount: *amount,
            fee: *fee,
        });
    }
    pool.commit(ledger, Actions::new(&pool_address, &pool_address), &[])
}
