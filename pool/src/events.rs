use crate::storage::{Address, AssetRules, ReserveParameters, ReserveRestrictions};

/// The events a pool commits together with its state. Amounts are in the asset's raw units.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PoolEvent {
    Deposit {
        asset: Address,
        caller: Address,
        on_behalf_of: Address,
        amount: u128,
    },
    Redeem {
        asset: Address,
        caller: Address,
        on_behalf_of: Address,
        amount: u128,
    },
    BorrowVariable {
        asset: Address,
        caller: Address,
        on_behalf_of: Address,
        amount: u128,
    },
    RepayVariable {
        asset: Address,
        caller: Address,
        on_behalf_of: Address,
        amount: u128,
    },
    BorrowStable {
        asset: Address,
        caller: Address,
        on_behalf_of: Address,
        amount: u128,
        rate_e24: u128, // the rate the new debt is borrowed at
    },
    RepayStable {
        asset: Address,
        caller: Address,
        on_behalf_of: Address,
        amount: u128,
    },
    CollateralSet {
        asset: Address,
        user: Address,
        set: bool,
    },
    Liquidation {
        liquidator: Address,
        borrower: Address,
        asset_to_repay: Address,
        asset_to_take: Address,
        amount_repaid: u128,
        amount_taken: u128,
    },
    FlashLoan {
        receiver: Address,
        caller: Address,
        asset: Address,
        amount: u128,
        fee: u128,
    },
    AccumulateInterest {
        asset: Address,
        timestamp: u64,
    },
    AssetRegistered {
        asset: Address,
        index: u32,
        decimals: u32,
    },
    ReserveActivated {
        asset: Address,
        active: bool,
    },
    ReserveFreezed {
        asset: Address,
        freezed: bool,
    },
    ReserveRestrictionsChanged {
        asset: Address,
        restrictions: ReserveRestrictions,
    },
    ReserveParametersChanged {
        asset: Address,
        parameters: ReserveParameters,
    },
    AssetRulesChanged {
        asset: Address,
        rules: AssetRules,
    },
    PriceInserted {
        asset: Address,
        price_e8: u128,
    },
    IncomeTaken {
        asset: Address,
        to: Address,
        amount: u128,
    },
    SupplyTransferred {
        asset: Address,
        from: Address,
        to: Address,
        amount: u128,
    },
    VariableDebtTransferred {
        asset: Address,
        from: Address,
        to: Address,
        amount: u128,
    },
}
