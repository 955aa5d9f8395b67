use tracing::info;

use crate::{
    errors::PoolError,
    market::MarketConfig,
    pool::{self, FlashLoanReceiver, RateMode, Request, RequestType},
    storage::{
        Address, AllowanceKind, AssetRules, Ledger, ReserveConfig, ReserveData,
        ReserveMetadata, ReserveParameters, ReserveRestrictions, Role, UserConfig,
        UserReserveData,
    },
    validator::require_positive,
};

/// ### Pool
///
/// A lending pool over a set of reserves. Every mutating method is one atomic transition of
/// the pool's ledger: it either commits entirely or returns an error and leaves the ledger
/// unchanged.
#[derive(Clone, Debug)]
pub struct PoolContract {
    ledger: Ledger,
}

impl PoolContract {
    /// Create a pool without any reserves
    ///
    /// ### Arguments
    /// * `admin` - The account allowed to manage reserves
    /// * `pool` - The account holding the pool's liquidity
    pub fn new(admin: Address, pool: Address) -> Self {
        PoolContract {
            ledger: Ledger::new(admin, pool),
        }
    }

    /// Create a pool from a market config. Reserves are registered in the listed order, their
    /// prices stored, and the flash borrower and treasury roles granted.
    ///
    /// ### Errors
    /// If a reserve is listed twice, has invalid metadata, or has a zero price
    pub fn from_market_config(market: &MarketConfig) -> Result<Self, PoolError> {
        let mut contract = PoolContract::new(market.admin.clone(), market.pool.clone());
        let admin = market.admin.clone();
        for listing in market.reserves.iter() {
            contract.register_asset(&admin, &listing.asset, &listing.metadata)?;
            if let Some(price_e8) = listing.price_e8 {
                contract.insert_reserve_token_price(&admin, &listing.asset, price_e8)?;
            }
        }
        for account in market.flash_borrowers.iter() {
            contract.grant_role(&admin, account, Role::FlashBorrower)?;
        }
        for account in market.treasury.iter() {
            contract.grant_role(&admin, account, Role::Treasury)?;
        }
        info!(
            admin = %market.admin,
            pool = %market.pool,
            reserves = market.reserves.len(),
            "created pool from market config"
        );
        Ok(contract)
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Mutable access to the ledger, for the host to move the clock and the token book
    pub fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }

    pub fn into_ledger(self) -> Ledger {
        self.ledger
    }

    /// Set the current host timestamp
    pub fn set_timestamp(&mut self, timestamp: u64) {
        self.ledger.set_timestamp(timestamp);
    }

    /********** Admin **********/

    /// (Admin only) Register a new reserve
    ///
    /// ### Arguments
    /// * `asset` - The underlying asset
    /// * `metadata` - The metadata of the reserve
    ///
    /// ### Errors
    /// If the caller is not the admin, the asset is already registered or the metadata
    /// is invalid
    pub fn register_asset(
        &mut self,
        caller: &Address,
        asset: &Address,
        metadata: &ReserveMetadata,
    ) -> Result<u32, PoolError> {
        pool::execute_register_asset(&mut self.ledger, caller, asset, metadata)
    }

    /// (Admin only) Activate or deactivate a reserve
    pub fn set_reserve_is_active(
        &mut self,
        caller: &Address,
        asset: &Address,
        active: bool,
    ) -> Result<(), PoolError> {
        pool::execute_set_reserve_is_active(&mut self.ledger, caller, asset, active)
    }

    /// (Admin only) Freeze or unfreeze a reserve
    pub fn set_reserve_is_freezed(
        &mut self,
        caller: &Address,
        asset: &Address,
        freezed: bool,
    ) -> Result<(), PoolError> {
        pool::execute_set_reserve_is_freezed(&mut self.ledger, caller, asset, freezed)
    }

    /// (Admin only) Set the caps and floors of a reserve
    pub fn set_reserve_restrictions(
        &mut self,
        caller: &Address,
        asset: &Address,
        restrictions: &ReserveRestrictions,
    ) -> Result<(), PoolError> {
        pool::execute_set_reserve_restrictions(&mut self.ledger, caller, asset, restrictions)
    }

    /// (Admin only) Set the interest parameters of a reserve
    pub fn set_reserve_parameters(
        &mut self,
        caller: &Address,
        asset: &Address,
        parameters: &ReserveParameters,
    ) -> Result<(), PoolError> {
        pool::execute_set_reserve_parameters(&mut self.ledger, caller, asset, parameters)
    }

    /// (Admin only) Set the risk rules of a reserve
    pub fn set_asset_rules(
        &mut self,
        caller: &Address,
        asset: &Address,
        rules: &AssetRules,
    ) -> Result<(), PoolError> {
        pool::execute_set_asset_rules(&mut self.ledger, caller, asset, rules)
    }

    /// (Admin only) Store the price of an asset, expressed in 8 decimals
    pub fn insert_reserve_token_price(
        &mut self,
        caller: &Address,
        asset: &Address,
        price_e8: u128,
    ) -> Result<(), PoolError> {
        pool::execute_insert_reserve_token_price(&mut self.ledger, caller, asset, price_e8)
    }

    /// (Admin only) Grant a role to an account
    pub fn grant_role(
        &mut self,
        caller: &Address,
        account: &Address,
        role: Role,
    ) -> Result<(), PoolError> {
        pool::execute_grant_role(&mut self.ledger, caller, account, role)
    }

    /// (Admin only) Revoke a role from an account
    pub fn revoke_role(
        &mut self,
        caller: &Address,
        account: &Address,
        role: Role,
    ) -> Result<(), PoolError> {
        pool::execute_revoke_role(&mut self.ledger, caller, account, role)
    }

    /// (Treasury only) Send the protocol income of the assets to `to`
    ///
    /// ### Arguments
    /// * `assets` - The assets to take the income of, or `None` for every reserve
    /// * `to` - The account receiving the income
    pub fn take_protocol_income(
        &mut self,
        caller: &Address,
        assets: Option<&[Address]>,
        to: &Address,
    ) -> Result<Vec<(Address, u128)>, PoolError> {
        pool::execute_take_protocol_income(&mut self.ledger, caller, assets, to)
    }

    /********** Users **********/

    /// Submit a set of requests to the pool where `on_behalf_of` takes on the positions and
    /// `caller` sends and receives the tokens
    ///
    /// ### Returns
    /// The amount each request moved
    ///
    /// ### Errors
    /// If the requests are not able to be completed for cases like insufficient funds or an
    /// undercollateralized position
    pub fn submit(
        &mut self,
        caller: &Address,
        on_behalf_of: &Address,
        requests: &[Request],
    ) -> Result<Vec<u128>, PoolError> {
        pool::execute_submit(&mut self.ledger, caller, on_behalf_of, requests)
    }

    pub fn deposit(
        &mut self,
        caller: &Address,
        on_behalf_of: &Address,
        asset: &Address,
        amount: u128,
    ) -> Result<u128, PoolError> {
        self.submit_one(caller, on_behalf_of, RequestType::Deposit, asset, Some(amount))
    }

    /// Redeem supply. `None` redeems all of it.
    pub fn redeem(
        &mut self,
        caller: &Address,
        on_behalf_of: &Address,
        asset: &Address,
        amount: Option<u128>,
    ) -> Result<u128, PoolError> {
        self.submit_one(caller, on_behalf_of, RequestType::Redeem, asset, amount)
    }

    pub fn borrow_variable(
        &mut self,
        caller: &Address,
        on_behalf_of: &Address,
        asset: &Address,
        amount: u128,
    ) -> Result<u128, PoolError> {
        self.submit_one(caller, on_behalf_of, RequestType::BorrowVariable, asset, Some(amount))
    }

    /// Repay variable debt. `None` repays all of it. Larger amounts are capped at the debt.
    pub fn repay_variable(
        &mut self,
        caller: &Address,
        on_behalf_of: &Address,
        asset: &Address,
        amount: Option<u128>,
    ) -> Result<u128, PoolError> {
        self.submit_one(caller, on_behalf_of, RequestType::RepayVariable, asset, amount)
    }

    pub fn borrow_stable(
        &mut self,
        caller: &Address,
        on_behalf_of: &Address,
        asset: &Address,
        amount: u128,
    ) -> Result<u128, PoolError> {
        self.submit_one(caller, on_behalf_of, RequestType::BorrowStable, asset, Some(amount))
    }

    /// Repay stable debt. `None` repays all of it. Larger amounts are capped at the debt.
    pub fn repay_stable(
        &mut self,
        caller: &Address,
        on_behalf_of: &Address,
        asset: &Address,
        amount: Option<u128>,
    ) -> Result<u128, PoolError> {
        self.submit_one(caller, on_behalf_of, RequestType::RepayStable, asset, amount)
    }

    fn submit_one(
        &mut self,
        caller: &Address,
        on_behalf_of: &Address,
        request_type: RequestType,
        asset: &Address,
        amount: Option<u128>,
    ) -> Result<u128, PoolError> {
        let request = Request {
            request_type,
            asset: asset.clone(),
            amount,
        };
        let amounts = self.submit(caller, on_behalf_of, &[request])?;
        amounts.first().copied().ok_or(PoolError::InternalError)
    }

    /// Mark or unmark the user's supply of an asset as collateral
    ///
    /// ### Returns
    /// True if the flag changed
    pub fn set_as_collateral(
        &mut self,
        user: &Address,
        asset: &Address,
        use_as_collateral: bool,
    ) -> Result<bool, PoolError> {
        pool::execute_set_as_collateral(&mut self.ledger, user, asset, use_as_collateral)
    }

    /// Let `spender` redeem or transfer up to `amount` of the owner's supply of `asset`
    pub fn approve_supply(&mut self, owner: &Address, spender: &Address, asset: &Address, amount: u128) {
        self.ledger
            .set_allowance(asset, owner, spender, AllowanceKind::Supply, amount);
    }

    /// Let `spender` borrow up to `amount` of `asset` against the owner's collateral, or move
    /// up to `amount` of debt onto the owner
    pub fn approve_debt(&mut self, owner: &Address, spender: &Address, asset: &Address, amount: u128) {
        self.ledger
            .set_allowance(asset, owner, spender, AllowanceKind::Debt, amount);
    }

    pub fn transfer_supply(
        &mut self,
        caller: &Address,
        asset: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), PoolError> {
        pool::execute_transfer_supply(&mut self.ledger, caller, asset, from, to, amount)
    }

    pub fn transfer_variable_debt(
        &mut self,
        caller: &Address,
        asset: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), PoolError> {
        pool::execute_transfer_variable_debt(&mut self.ledger, caller, asset, from, to, amount)
    }

    /// Liquidate an undercollateralized borrower
    ///
    /// ### Returns
    /// The amount of debt repaid and the amount of collateral taken
    #[allow(clippy::too_many_arguments)]
    pub fn liquidate(
        &mut self,
        liquidator: &Address,
        borrower: &Address,
        asset_to_repay: &Address,
        asset_to_take: &Address,
        rate_mode: RateMode,
        amount_to_repay: Option<u128>,
        min_collateral_received_e18: u128,
    ) -> Result<(u128, u128), PoolError> {
        pool::execute_liquidate(
            &mut self.ledger,
            liquidator,
            borrower,
            asset_to_repay,
            asset_to_take,
            rate_mode,
            amount_to_repay,
            min_collateral_received_e18,
        )
    }

    /// Loan the pool's liquidity to `receiver` for the duration of its callback
    pub fn flash_loan(
        &mut self,
        caller: &Address,
        receiver: &mut dyn FlashLoanReceiver,
        assets: &[Address],
        amounts: &[u128],
        params: &[u8],
    ) -> Result<(), PoolError> {
        pool::execute_flash_loan(&mut self.ledger, caller, receiver, assets, amounts, params)
    }

    /// Advance a reserve's indexes to the current timestamp
    pub fn accumulate_interest(&mut self, asset: &Address) -> Result<(), PoolError> {
        pool::execute_accumulate_interest(&mut self.ledger, asset)
    }

    /********** Views **********/

    pub fn view_registered_assets(&self) -> Vec<Address> {
        pool::view_registered_assets(&self.ledger)
    }

    pub fn view_reserve_config(&self, asset: &Address) -> Result<ReserveConfig, PoolError> {
        pool::view_reserve_config(&self.ledger, asset)
    }

    /// Fetch the reserve data accrued to the current timestamp
    pub fn view_reserve_data(&self, asset: &Address) -> Result<ReserveData, PoolError> {
        pool::view_reserve_data(&self.ledger, asset)
    }

    pub fn view_unupdated_reserve_data(&self, asset: &Address) -> Result<ReserveData, PoolError> {
        pool::view_unupdated_reserve_data(&self.ledger, asset)
    }

    /// Fetch a user's position realized to the current timestamp
    pub fn view_user_reserve_data(
        &self,
        asset: &Address,
        user: &Address,
    ) -> Result<UserReserveData, PoolError> {
        pool::view_user_reserve_data(&self.ledger, asset, user)
    }

    pub fn view_user_config(&self, user: &Address) -> UserConfig {
        pool::view_user_config(&self.ledger, user)
    }

    /// Fetch whether the user is healthy and their free collateral, in USD with 6 decimals
    pub fn get_user_free_collateral_coefficient(
        &self,
        user: &Address,
    ) -> Result<(bool, u128), PoolError> {
        pool::get_user_free_collateral_coefficient(&self.ledger, user)
    }

    pub fn get_reserve_token_price_e8(&self, asset: &Address) -> Result<u128, PoolError> {
        pool::get_reserve_token_price_e8(&self.ledger, asset)
    }

    pub fn view_protocol_income(
        &self,
        assets: Option<&[Address]>,
    ) -> Result<Vec<(Address, i128)>, PoolError> {
        pool::view_protocol_income(&self.ledger, assets)
    }
}

/// An operation the host applies to a ledger with [`transition`]
pub enum Operation<'a> {
    Submit {
        caller: Address,
        on_behalf_of: Address,
        requests: Vec<Request>,
    },
    SetAsCollateral {
        user: Address,
        asset: Address,
        use_as_collateral: bool,
    },
    Liquidate {
        liquidator: Address,
        borrower: Address,
        asset_to_repay: Address,
        asset_to_take: Address,
        rate_mode: RateMode,
        amount_to_repay: Option<u128>,
        min_collateral_received_e18: u128,
    },
    FlashLoan {
        caller: Address,
        receiver: &'a mut dyn FlashLoanReceiver,
        assets: Vec<Address>,
        amounts: Vec<u128>,
        params: Vec<u8>,
    },
    ApproveSupply {
        owner: Address,
        spender: Address,
        asset: Address,
        amount: u128,
    },
    ApproveDebt {
        owner: Address,
        spender: Address,
        asset: Address,
        amount: u128,
    },
    TransferSupply {
        caller: Address,
        asset: Address,
        from: Address,
        to: Address,
        amount: u128,
    },
    TransferVariableDebt {
        caller: Address,
        asset: Address,
        from: Address,
        to: Address,
        amount: u128,
    },
    AccumulateInterest {
        asset: Address,
    },
    RegisterAsset {
        caller: Address,
        asset: Address,
        metadata: ReserveMetadata,
    },
    SetReserveIsActive {
        caller: Address,
        asset: Address,
        active: bool,
    },
    SetReserveIsFreezed {
        caller: Address,
        asset: Address,
        freezed: bool,
    },
    SetReserveRestrictions {
        caller: Address,
        asset: Address,
        restrictions: ReserveRestrictions,
    },
    SetReserveParameters {
        caller: Address,
        asset: Address,
        parameters: ReserveParameters,
    },
    SetAssetRules {
        caller: Address,
        asset: Address,
        rules: AssetRules,
    },
    InsertReserveTokenPrice {
        caller: Address,
        asset: Address,
        price_e8: u128,
    },
    GrantRole {
        caller: Address,
        account: Address,
        role: Role,
    },
    RevokeRole {
        caller: Address,
        account: Address,
        role: Role,
    },
    TakeProtocolIncome {
        caller: Address,
        assets: Option<Vec<Address>>,
        to: Address,
    },
}

/// Apply an operation to a copy of `ledger` at time `now` with the host's `prices`, and
/// return the new ledger. `ledger` itself is never modified.
///
/// The clock never moves backwards: a `now` before the ledger's timestamp keeps the
/// ledger's timestamp.
///
/// ### Arguments
/// * `ledger` - The ledger before the operation
/// * `operation` - The operation to apply
/// * `now` - The host timestamp in seconds
/// * `prices` - Prices of registered assets, expressed in 8 decimals
///
/// ### Errors
/// If a price is for an unregistered asset or is zero, or if the operation fails
pub fn transition(
    ledger: &Ledger,
    operation: Operation<'_>,
    now: u64,
    prices: &[(Address, u128)],
) -> Result<Ledger, PoolError> {
    let mut contract = PoolContract {
        ledger: ledger.clone(),
    };
    contract.set_timestamp(now.max(ledger.timestamp()));
    for (asset, price_e8) in prices.iter() {
        if !contract.ledger.has_res(asset) {
            return Err(PoolError::AssetNotRegistered);
        }
        require_positive(*price_e8)?;
        contract.ledger.set_price(asset, *price_e8);
    }

    match operation {
        Operation::Submit {
            caller,
            on_behalf_of,
            requests,
        } => {
            contract.submit(&caller, &on_behalf_of, &requests)?;
        }
        Operation::SetAsCollateral {
            user,
            asset,
            use_as_collateral,
        } => {
            contract.set_as_collateral(&user, &asset, use_as_collateral)?;
        }
        Operation::Liquidate {
            liquidator,
            borrower,
            asset_to_repay,
            asset_to_take,
            rate_mode,
            amount_to_repay,
            min_collateral_received_e18,
        } => {
            contract.liquidate(
                &liquidator,
                &borrower,
                &asset_to_repay,
                &asset_to_take,
                rate_mode,
                amount_to_repay,
                min_collateral_received_e18,
            )?;
        }
        Operation::FlashLoan {
            caller,
            receiver,
            assets,
            amounts,
            params,
        } => contract.flash_loan(&caller, receiver, &assets, &amounts, &params)?,
        Operation::ApproveSupply {
            owner,
            spender,
            asset,
            amount,
        } => contract.approve_supply(&owner, &spender, &asset, amount),
        Operation::ApproveDebt {
            owner,
            spender,
            asset,
            amount,
        } => contract.approve_debt(&owner, &spender, &asset, amount),
        Operation::TransferSupply {
            caller,
            asset,
            from,
            to,
            amount,
        } => contract.transfer_supply(&caller, &asset, &from, &to, amount)?,
        Operation::TransferVariableDebt {
            caller,
            asset,
            from,
            to,
            amount,
        } => contract.transfer_variable_debt(&caller, &asset, &from, &to, amount)?,
        Operation::AccumulateInterest { asset } => contract.accumulate_interest(&asset)?,
        Operation::RegisterAsset {
            caller,
            asset,
            metadata,
        } => {
            contract.register_asset(&caller, &asset, &metadata)?;
        }
        Operation::SetReserveIsActive {
            caller,
            asset,
            active,
        } => contract.set_reserve_is_active(&caller, &asset, active)?,
        Operation::SetReserveIsFreezed {
            caller,
            asset,
            freezed,
        } => contract.set_reserve_is_freezed(&caller, &asset, freezed)?,
        Operation::SetReserveRestrictions {
            caller,
            asset,
            restrictions,
        } => contract.set_reserve_restrictions(&caller, &asset, &restrictions)?,
        Operation::SetReserveParameters {
            caller,
            asset,
            parameters,
        } => contract.set_reserve_parameters(&caller, &asset, &parameters)?,
        Operation::SetAssetRules {
            caller,
            asset,
            rules,
        } => contract.set_asset_rules(&caller, &asset, &rules)?,
        Operation::InsertReserveTokenPrice {
            caller,
            asset,
            price_e8,
        } => contract.insert_reserve_token_price(&caller, &asset, price_e8)?,
        Operation::GrantRole {
            caller,
            account,
            role,
        } => contract.grant_role(&caller, &account, role)?,
        Operation::RevokeRole {
            caller,
            account,
            role,
        } => contract.revoke_role(&caller, &account, role)?,
        Operation::TakeProtocolIncome { caller, assets, to } => {
            contract.take_protocol_income(&caller, assets.as_deref(), &to)?;
        }
    }
    Ok(contract.into_ledger())
}
