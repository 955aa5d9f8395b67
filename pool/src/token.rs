use std::collections::BTreeMap;

use crate::{errors::PoolError, storage::Address};

/// The balances and allowances of every fungible token the pool holds liquidity in.
///
/// Mirrors the token interface the pool calls: balances per (asset, holder) and allowances
/// per (asset, from, spender).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenBook {
    balances: BTreeMap<(Address, Address), u128>,
    allowances: BTreeMap<(Address, Address, Address), u128>,
}

impl TokenBook {
    /// Fetch the balance of `id` in `asset`
    pub fn balance(&self, asset: &Address, id: &Address) -> u128 {
        self.balances
            .get(&(asset.clone(), id.clone()))
            .copied()
            .unwrap_or(0)
    }

    /// Fetch the amount `spender` can transfer out of `from`'s balance of `asset`
    pub fn allowance(&self, asset: &Address, from: &Address, spender: &Address) -> u128 {
        self.allowances
            .get(&(asset.clone(), from.clone(), spender.clone()))
            .copied()
            .unwrap_or(0)
    }

    /// Set the amount `spender` can transfer out of `from`'s balance of `asset`
    pub fn approve(&mut self, asset: &Address, from: &Address, spender: &Address, amount: u128) {
        let key = (asset.clone(), from.clone(), spender.clone());
        if amount == 0 {
            self.allowances.remove(&key);
        } else {
            self.allowances.insert(key, amount);
        }
    }

    /// Create `amount` of `asset` for `to`
    ///
    /// ### Errors
    /// If the balance overflows
    pub fn mint(&mut self, asset: &Address, to: &Address, amount: u128) -> Result<(), PoolError> {
        self.receive_balance(asset, to, amount)
    }

    /// Transfer `amount` of `asset` from `from` to `to`
    ///
    /// ### Errors
    /// If `from` does not hold `amount`
    pub fn transfer(
        &mut self,
        asset: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), PoolError> {
        self.spend_balance(asset, from, amount)?;
        self.receive_balance(asset, to, amount)
    }

    /// Transfer `amount` of `asset` from `from` to `to` on behalf of `spender`, consuming
    /// `spender`'s allowance
    ///
    /// ### Errors
    /// If the allowance does not cover `amount`, or if `from` does not hold `amount`
    pub fn transfer_from(
        &mut self,
        asset: &Address,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), PoolError> {
        let allowance = self.allowance(asset, from, spender);
        if allowance < amount {
            return Err(PoolError::InsufficientAllowance);
        }
        if self.balance(asset, from) < amount {
            return Err(PoolError::InsufficientBalance);
        }
        self.approve(asset, from, spender, allowance - amount);
        self.transfer(asset, from, to, amount)
    }

    fn spend_balance(
        &mut self,
        asset: &Address,
        id: &Address,
        amount: u128,
    ) -> Result<(), PoolError> {
        let balance = self.balance(asset, id);
        let new_balance = balance
            .checked_sub(amount)
            .ok_or(PoolError::InsufficientBalance)?;
        self.write_balance(asset, id, new_balance);
        Ok(())
    }

    fn receive_balance(
        &mut self,
        asset: &Address,
        id: &Address,
        amount: u128,
    ) -> Result<(), PoolError> {
        let balance = self.balance(asset, id);
        let new_balance = balance
            .checked_add(amount)
            .ok_or(PoolError::OverflowError)?;
        self.write_balance(asset, id, new_balance);
        Ok(())
    }

    fn write_balance(&mut self, asset: &Address, id: &Address, amount: u128) {
        let key = (asset.clone(), id.clone());
        if amount == 0 {
            self.balances.remove(&key);
        } else {
            self.balances.insert(key, amount);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer() {
        let mut tokens = TokenBook::default();
        let (dai, samwise, frodo) = (
            Address::from("DAI"),
            Address::from("samwise"),
            Address::from("frodo"),
        );
        tokens.mint(&dai, &samwise, 100).unwrap();
        tokens.transfer(&dai, &samwise, &frodo, 60).unwrap();
        assert_eq!(tokens.balance(&dai, &samwise), 40);
        assert_eq!(tokens.balance(&dai, &frodo), 60);

        let result = tokens.transfer(&dai, &samwise, &frodo, 41);
        assert_eq!(result, Err(PoolError::InsufficientBalance));
        assert_eq!(tokens.balance(&dai, &samwise), 40);
    }

    #[test]
    fn test_transfer_from_checks_allowance_before_balance() {
        let mut tokens = TokenBook::default();
        let (dai, samwise, frodo, pool) = (
            Address::from("DAI"),
            Address::from("samwise"),
            Address::from("frodo"),
            Address::from("pool"),
        );
        tokens.mint(&dai, &samwise, 10).unwrap();

        let result = tokens.transfer_from(&dai, &pool, &samwise, &frodo, 20);
        assert_eq!(result, Err(PoolError::InsufficientAllowance));

        tokens.approve(&dai, &samwise, &pool, 20);
        let result = tokens.transfer_from(&dai, &pool, &samwise, &frodo, 20);
        assert_eq!(result, Err(PoolError::InsufficientBalance));
        assert_eq!(tokens.allowance(&dai, &samwise, &pool), 20);

        tokens.transfer_from(&dai, &pool, &samwise, &frodo, 8).unwrap();
        assert_eq!(tokens.allowance(&dai, &samwise, &pool), 12);
        assert_eq!(tokens.balance(&dai, &frodo), 8);
        assert_eq!(tokens.balance(&dai, &samwise), 2);
    }

    #[test]
    fn test_mint_overflow() {
        let mut tokens = TokenBook::default();
        let (dai, samwise) = (Address::from("DAI"), Address::from("samwise"));
        tokens.mint(&dai, &samwise, u128::MAX).unwrap();
        assert_eq!(
            tokens.mint(&dai, &samwise, 1),
            Err(PoolError::OverflowError)
        );
    }
}
