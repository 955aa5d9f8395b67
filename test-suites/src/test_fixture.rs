use std::ops::Index;

use reserve_pool::{
    Address, Ledger, MarketConfig, PoolContract, ReserveConfig, ReserveData, UserReserveData,
};
use tracing::debug;

pub const SCALAR_6: u128 = 1_000_000;
pub const SCALAR_18: u128 = 1_000_000_000_000_000_000;

/// The host timestamp the fixture starts at
pub const START_TIMESTAMP: u64 = 1441065600; // Sept 1st, 2015

const MARKET: &str = include_str!("../fixtures/market.toml");

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(usize)]
pub enum TokenIndex {
    DAI = 0,
    USDC = 1,
    WETH = 2,
    LINK = 3,
}

/// The listed assets, indexable by `TokenIndex`
pub struct Tokens(Vec<Address>);

impl Index<TokenIndex> for Tokens {
    type Output = Address;

    fn index(&self, index: TokenIndex) -> &Address {
        &self.0[index as usize]
    }
}

pub struct TestFixture {
    pub pool: PoolContract,
    pub bombadil: Address,
    pub flash_borrower: Address,
    pub treasury: Address,
    pub users: Vec<Address>,
    pub tokens: Tokens,
}

impl TestFixture {
    /// Create a new TestFixture from the market in `fixtures/market.toml`
    ///
    /// Lists DAI (0), USDC (1), WETH (2) and LINK (3) at $1, $1, $1500 and $7, then passes
    /// one day.
    pub fn create() -> TestFixture {
        let market = MarketConfig::from_toml(MARKET).unwrap();
        let mut pool = PoolContract::from_market_config(&market).unwrap();
        pool.set_timestamp(START_TIMESTAMP);

        let tokens = Tokens(
            market
                .reserves
                .iter()
                .map(|listing| listing.asset.clone())
                .collect(),
        );
        let mut fixture = TestFixture {
            pool,
            bombadil: market.admin.clone(),
            flash_borrower: market.flash_borrowers[0].clone(),
            treasury: market.treasury[0].clone(),
            users: vec![],
            tokens,
        };
        fixture.jump(24 * 60 * 60);
        fixture
    }

    /// Create a named user
    pub fn create_user(&mut self, name: &str) -> Address {
        let user = Address::from(name);
        self.users.push(user.clone());
        user
    }

    /********** Ledger Helpers ***********/

    pub fn ledger(&self) -> &Ledger {
        self.pool.ledger()
    }

    pub fn timestamp(&self) -> u64 {
        self.pool.ledger().timestamp()
    }

    /// Move the host clock forward by `time` seconds
    pub fn jump(&mut self, time: u64) {
        let timestamp = self.timestamp() + time;
        debug!(timestamp, "jump");
        self.pool.set_timestamp(timestamp);
    }

    /// Set the price of a token as the admin, expressed in 8 decimals
    pub fn set_price(&mut self, index: TokenIndex, price_e8: u128) {
        let asset = self.tokens[index].clone();
        self.pool
            .insert_reserve_token_price(&self.bombadil, &asset, price_e8)
            .unwrap();
    }

    /********** Token Helpers ***********/

    pub fn mint(&mut self, index: TokenIndex, to: &Address, amount: u128) {
        let asset = self.tokens[index].clone();
        self.pool
            .ledger_mut()
            .tokens_mut()
            .mint(&asset, to, amount)
            .unwrap();
    }

    pub fn balance(&self, index: TokenIndex, id: &Address) -> u128 {
        self.ledger().tokens().balance(&self.tokens[index], id)
    }

    pub fn pool_balance(&self, index: TokenIndex) -> u128 {
        let pool = self.ledger().get_pool_address();
        self.ledger().tokens().balance(&self.tokens[index], pool)
    }

    /********** Pool Helpers ***********/

    pub fn read_reserve_config(&self, index: TokenIndex) -> ReserveConfig {
        self.pool.view_reserve_config(&self.tokens[index]).unwrap()
    }

    /// The reserve data accrued to the current timestamp
    pub fn read_reserve_data(&self, index: TokenIndex) -> ReserveData {
        self.pool.view_reserve_data(&self.tokens[index]).unwrap()
    }

    /// The user's position realized to the current timestamp
    pub fn read_position(&self, index: TokenIndex, user: &Address) -> UserReserveData {
        self.pool
            .view_user_reserve_data(&self.tokens[index], user)
            .unwrap()
    }

    /// Mint and deposit `amount` of a token for `user`
    pub fn supply(&mut self, index: TokenIndex, user: &Address, amount: u128) {
        self.mint(index, user, amount);
        let asset = self.tokens[index].clone();
        self.pool.deposit(user, user, &asset, amount).unwrap();
    }

    /// Mint, deposit and mark `amount` of a token as the user's collateral
    pub fn supply_collateral(&mut self, index: TokenIndex, user: &Address, amount: u128) {
        self.supply(index, user, amount);
        let asset = self.tokens[index].clone();
        self.pool.set_as_collateral(user, &asset, true).unwrap();
    }
}
