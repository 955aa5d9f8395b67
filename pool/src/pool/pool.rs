use std::collections::BTreeMap;

use crate::{
    errors::PoolError,
    events::PoolEvent,
    storage::{Address, Ledger, PoolConfig},
};

use super::{actions::Actions, reserve::Reserve, user::User};

pub struct Pool {
    pub config: PoolConfig,
    pub timestamp: u64,
    pub reserves: BTreeMap<Address, Reserve>,
    reserves_to_store: Vec<Address>,
    prices: BTreeMap<Address, u128>,
    events: Vec<PoolEvent>,
}

impl Pool {
    /// Load the Pool from the ledger
    pub fn load(ledger: &Ledger) -> Self {
        Pool {
            config: ledger.get_pool_config().clone(),
            timestamp: ledger.timestamp(),
            reserves: BTreeMap::new(),
            reserves_to_store: Vec::new(),
            prices: BTreeMap::new(),
            events: Vec::new(),
        }
    }

    /// Load a Reserve from the ledger and update to the current ledger timestamp. Returns
    /// a cached version if it exists.
    ///
    /// ### Arguments
    /// * asset - The address of the underlying asset
    pub fn load_reserve(&self, ledger: &Ledger, asset: &Address) -> Result<Reserve, PoolError> {
        if let Some(reserve) = self.reserves.get(asset) {
            return Ok(reserve.clone());
        }
        Reserve::load(ledger, asset)
    }

    /// Cache the updated reserve in the pool.
    ///
    /// ### Arguments
    /// * reserve - The updated reserve
    /// * write - If the reserve needs to be written to the ledger
    pub fn cache_reserve(&mut self, reserve: Reserve, write: bool) {
        if write && !self.reserves_to_store.contains(&reserve.asset) {
            self.reserves_to_store.push(reserve.asset.clone());
        }
        self.reserves.insert(reserve.asset.clone(), reserve);
    }

    /// Load the price of an asset, expressed in 8 decimals. Returns a cached version if one
    /// already exists.
    ///
    /// ### Arguments
    /// * asset - The address of the underlying asset
    ///
    /// ### Errors
    /// If no price is stored for the asset
    pub fn load_price(&mut self, ledger: &Ledger, asset: &Address) -> Result<u128, PoolError> {
        if let Some(price) = self.prices.get(asset) {
            return Ok(*price);
        }
        let price = ledger.get_price(asset).ok_or(PoolError::PriceMissing)?;
        self.prices.insert(asset.clone(), price);
        Ok(price)
    }

    /// Queue an event to be committed with the pool's state
    pub fn publish(&mut self, event: PoolEvent) {
        self.events.push(event);
    }

    /// Commit the pool's changes to the ledger.
    ///
    /// The token transfers of `actions` are validated first, against a copy of the token book,
    /// and the cached reserves are re-rated on the resulting liquidity. Only then are the
    /// tokens, reserves, users, allowances and events written, so an error leaves the ledger
    /// unchanged.
    ///
    /// ### Arguments
    /// * actions - The token transfers and allowance spends of the operation
    /// * users - The users whose positions changed
    ///
    /// ### Errors
    /// If a transfer can not be covered, or if a reserve's rates overflow
    pub fn commit(
        mut self,
        ledger: &mut Ledger,
        actions: Actions,
        users: &[User],
    ) -> Result<(), PoolError> {
        let mut tokens = ledger.tokens().clone();
        for (asset, amount) in actions.spender_transfer.iter() {
            tokens.transfer(asset, &actions.spender, &self.config.address, *amount)?;
        }
        for (asset, amount) in actions.pool_transfer.iter() {
            tokens.transfer(asset, &self.config.address, &actions.to, *amount)?;
        }

        let mut to_store = Vec::with_capacity(self.reserves_to_store.len());
        for asset in self.reserves_to_store.iter() {
            let mut reserve = self
                .reserves
                .remove(asset)
                .ok_or(PoolError::InternalError)?;
            reserve.pool_balance = tokens.balance(asset, &self.config.address);
            reserve.recalculate_rates()?;
            to_store.push(reserve);
        }

        *ledger.tokens_mut() = tokens;
        for reserve in to_store.iter() {
            reserve.store(ledger);
        }
        for user in users {
            user.store(ledger);
        }
        for (key, amount) in actions.allowances.into_iter() {
            ledger.set_allowance(&key.asset, &key.owner, &key.spender, key.kind, amount);
        }
        ledger.push_events(self.events.drain(..));
        Ok(())
    }
}
