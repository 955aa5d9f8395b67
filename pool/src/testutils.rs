use crate::{
    pool::{
        execute_insert_reserve_token_price, execute_register_asset, execute_set_as_collateral,
        execute_submit, Request, RequestType,
    },
    storage::{
        Address, AssetRules, Ledger, ReserveMetadata, ReserveParameters, ReserveRestrictions,
    },
};

/// The borrow rate per second at each utilization breakpoint, expressed in 24 decimals
pub const DEFAULT_INTEREST_RATE_MODEL: [u128; 7] = [
    300_000_000_000_000,
    500_000_000_000_000,
    2_000_000_000_000_000,
    4_000_000_000_000_000,
    10_000_000_000_000_000,
    100_000_000_000_000_000,
    300_000_000_000_000_000,
];

//************************************************
//                   Accounts
//************************************************

pub fn bombadil() -> Address {
    Address::from("bombadil")
}

pub fn samwise() -> Address {
    Address::from("samwise")
}

pub fn frodo() -> Address {
    Address::from("frodo")
}

pub fn merry() -> Address {
    Address::from("merry")
}

//************************************************
//                Reserve Helpers
//************************************************

fn default_parameters() -> ReserveParameters {
    ReserveParameters {
        interest_rate_model: DEFAULT_INTEREST_RATE_MODEL,
        income_for_suppliers_part_e6: 999_990,
        flash_loan_fee_e6: 1_000,
        stable_rate_base_e24: 0,
    }
}

pub fn dai_metadata() -> ReserveMetadata {
    ReserveMetadata {
        decimals: 6,
        rules: AssetRules {
            collateral_coefficient_e6: Some(970_000),
            borrow_coefficient_e6: Some(1_030_000),
            penalty_e6: 15_000,
        },
        parameters: default_parameters(),
        restrictions: ReserveRestrictions {
            maximal_total_supply: None,
            maximal_total_debt: None,
            minimal_collateral: 2_000_000,
            minimal_debt: 1_000_000,
        },
    }
}

pub fn usdc_metadata() -> ReserveMetadata {
    ReserveMetadata {
        decimals: 6,
        rules: AssetRules {
            collateral_coefficient_e6: Some(980_000),
            borrow_coefficient_e6: Some(1_020_000),
            penalty_e6: 10_000,
        },
        parameters: default_parameters(),
        restrictions: ReserveRestrictions {
            maximal_total_supply: None,
            maximal_total_debt: None,
            minimal_collateral: 2_000,
            minimal_debt: 1_000,
        },
    }
}

pub fn weth_metadata() -> ReserveMetadata {
    ReserveMetadata {
        decimals: 18,
        rules: AssetRules {
            collateral_coefficient_e6: Some(800_000),
            borrow_coefficient_e6: Some(1_200_000),
            penalty_e6: 100_000,
        },
        parameters: default_parameters(),
        restrictions: ReserveRestrictions {
            maximal_total_supply: None,
            maximal_total_debt: None,
            minimal_collateral: 2_000,
            minimal_debt: 1_000,
        },
    }
}

pub fn link_metadata() -> ReserveMetadata {
    ReserveMetadata {
        decimals: 18,
        rules: AssetRules {
            collateral_coefficient_e6: Some(700_000),
            borrow_coefficient_e6: Some(1_300_000),
            penalty_e6: 150_000,
        },
        parameters: default_parameters(),
        restrictions: ReserveRestrictions {
            maximal_total_supply: Some(1_000_000_000_000_000_000_000_000_000),
            maximal_total_debt: Some(100_000_000_000_000_000_000_000_000),
            minimal_collateral: 2_000,
            minimal_debt: 1_000,
        },
    }
}

/// Create an empty ledger administered by bombadil
pub fn create_ledger() -> Ledger {
    Ledger::new(bombadil(), Address::from("pool"))
}

/// Register a reserve for `symbol` and return its asset address
pub fn create_reserve(ledger: &mut Ledger, symbol: &str, metadata: ReserveMetadata) -> Address {
    let asset = Address::from(symbol);
    let admin = ledger.get_admin().clone();
    execute_register_asset(ledger, &admin, &asset, &metadata).unwrap();
    asset
}

/// The assets of the test market, in reserve index order
#[derive(Clone, Debug)]
pub struct MarketAssets {
    pub dai: Address,
    pub usdc: Address,
    pub weth: Address,
    pub link: Address,
}

/// Create a ledger listing DAI, USDC, WETH and LINK with prices of $1, $1, $1500 and $7
pub fn create_market() -> (Ledger, MarketAssets) {
    let mut ledger = create_ledger();
    let admin = ledger.get_admin().clone();
    let assets = MarketAssets {
        dai: create_reserve(&mut ledger, "DAI", dai_metadata()),
        usdc: create_reserve(&mut ledger, "USDC", usdc_metadata()),
        weth: create_reserve(&mut ledger, "WETH", weth_metadata()),
        link: create_reserve(&mut ledger, "LINK", link_metadata()),
    };
    let prices = [
        (&assets.dai, 100_000_000),
        (&assets.usdc, 100_000_000),
        (&assets.weth, 150_000_000_000),
        (&assets.link, 700_000_000),
    ];
    for (asset, price) in prices {
        execute_insert_reserve_token_price(&mut ledger, &admin, asset, price).unwrap();
    }
    (ledger, assets)
}

//************************************************
//                 User Helpers
//************************************************

/// Mint `amount` of `asset` to `user` and deposit it
pub fn supply(ledger: &mut Ledger, asset: &Address, user: &Address, amount: u128) {
    ledger.tokens_mut().mint(asset, user, amount).unwrap();
    let request = Request {
        request_type: RequestType::Deposit,
        asset: asset.clone(),
        amount: Some(amount),
    };
    execute_submit(ledger, user, user, &[request]).unwrap();
}

/// Mark the user's supply of `asset` as collateral
pub fn set_collateral(ledger: &mut Ledger, asset: &Address, user: &Address) {
    execute_set_as_collateral(ledger, user, asset, true).unwrap();
}

/// Mint, deposit and mark `amount` of `asset` as collateral
pub fn supply_collateral(ledger: &mut Ledger, asset: &Address, user: &Address, amount: u128) {
    supply(ledger, asset, user, amount);
    set_collateral(ledger, asset, user);
}

pub fn borrow_variable(ledger: &mut Ledger, asset: &Address, user: &Address, amount: u128) {
    let request = Request {
        request_type: RequestType::BorrowVariable,
        asset: asset.clone(),
        amount: Some(amount),
    };
    execute_submit(ledger, user, user, &[request]).unwrap();
}

pub fn borrow_stable(ledger: &mut Ledger, asset: &Address, user: &Address, amount: u128) {
    let request = Request {
        request_type: RequestType::BorrowStable,
        asset: asset.clone(),
        amount: Some(amount),
    };
    execute_submit(ledger, user, user, &[request]).unwrap();
}
