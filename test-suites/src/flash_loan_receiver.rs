use reserve_pool::{Address, FlashLoanReceiver, FlashLoanReceiverError, Ledger};
use tracing::debug;

/// A flash loan receiver that repays its loans, unless told otherwise
pub struct MockFlashLoanReceiver {
    address: Address,
    /// Fail the callback
    pub fail_execute_operation: bool,
    /// Approve this amount of every asset instead of `amount + fee`
    pub custom_amount_to_approve: Option<u128>,
    /// Mint the fee to the receiver so it can repay the loan
    pub simulate_balance_to_cover_fee: bool,
    /// The (assets, amounts, fees) of every callback
    pub calls: Vec<(Vec<Address>, Vec<u128>, Vec<u128>)>,
}

impl MockFlashLoanReceiver {
    pub fn new(name: &str) -> Self {
        MockFlashLoanReceiver {
            address: Address::from(name),
            fail_execute_operation: false,
            custom_amount_to_approve: None,
            simulate_balance_to_cover_fee: true,
            calls: vec![],
        }
    }
}

impl FlashLoanReceiver for MockFlashLoanReceiver {
    fn address(&self) -> Address {
        self.address.clone()
    }

    fn execute_operation(
        &mut self,
        ledger: &mut Ledger,
        assets: &[Address],
        amounts: &[u128],
        fees: &[u128],
        _params: &[u8],
    ) -> Result<(), FlashLoanReceiverError> {
        self.calls
            .push((assets.to_vec(), amounts.to_vec(), fees.to_vec()));
        if self.fail_execute_operation {
            return Err(FlashLoanReceiverError::ExecuteOperationFailed(
                "mock failure".to_string(),
            ));
        }

        let pool = ledger.get_pool_address().clone();
        for ((asset, amount), fee) in assets.iter().zip(amounts).zip(fees) {
            if self.simulate_balance_to_cover_fee {
                ledger.tokens_mut().mint(asset, &self.address, *fee)?;
            }
            let to_approve = self.custom_amount_to_approve.unwrap_or(amount + fee);
            debug!(asset = %asset, to_approve, "mock receiver approving repayment");
            ledger
                .tokens_mut()
                .approve(asset, &self.address, &pool, to_approve);
        }
        Ok(())
    }
}
