use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{errors::PoolError, events::PoolEvent, pool::Positions, token::TokenBook};

/// The maximum number of reserves the pool can list. Reserve ids index the user config bitsets.
pub const MAX_RESERVES: u32 = 128;

/// An account or asset identifier
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(id: impl Into<String>) -> Self {
        Address(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(id: &str) -> Self {
        Address::new(id)
    }
}

/********** Storage Types **********/

/// The pool's config
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolConfig {
    pub address: Address, // the account holding the pool's liquidity
    pub admin: Address,   // the account allowed to manage reserves
}

/// Privileged roles an account can hold
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    /// Pays a reduced flash loan fee
    FlashBorrower,
    /// Can take the protocol income
    Treasury,
}

/// The risk parameters of a reserve
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRules {
    /// the share of the supplied value counted as collateral, expressed in 6 decimals.
    /// `None` if the asset can not be used as collateral.
    #[serde(default, with = "amount_serde::option")]
    pub collateral_coefficient_e6: Option<u128>,
    /// the weight of the debt value, expressed in 6 decimals. `None` if borrowing is disabled.
    #[serde(default, with = "amount_serde::option")]
    pub borrow_coefficient_e6: Option<u128>,
    /// the liquidation bonus when the reserve is taken or repaid, expressed in 6 decimals
    #[serde(with = "amount_serde")]
    pub penalty_e6: u128,
}

/// The interest parameters of a reserve
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveParameters {
    /// the borrow rate per second at each utilization breakpoint, expressed in 24 decimals
    #[serde(with = "amount_serde::array")]
    pub interest_rate_model: [u128; 7],
    /// the part of the debt interest credited to suppliers, expressed in 6 decimals
    #[serde(with = "amount_serde")]
    pub income_for_suppliers_part_e6: u128,
    /// the flash loan fee, expressed in 6 decimals
    #[serde(with = "amount_serde")]
    pub flash_loan_fee_e6: u128,
    /// the premium added to the curve rate for new stable borrows, expressed in 24 decimals
    #[serde(default, with = "amount_serde")]
    pub stable_rate_base_e24: u128,
}

/// The caps and floors of a reserve
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveRestrictions {
    #[serde(default, with = "amount_serde::option")]
    pub maximal_total_supply: Option<u128>,
    #[serde(default, with = "amount_serde::option")]
    pub maximal_total_debt: Option<u128>,
    #[serde(default, with = "amount_serde")]
    pub minimal_collateral: u128,
    #[serde(default, with = "amount_serde")]
    pub minimal_debt: u128,
}

/// The metadata an asset is registered with
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveMetadata {
    pub decimals: u32,
    pub rules: AssetRules,
    pub parameters: ReserveParameters,
    #[serde(default)]
    pub restrictions: ReserveRestrictions,
}

/// The configuration information about a reserve asset
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReserveConfig {
    pub index: u32,      // the index of the reserve in the list
    pub decimals: u32,   // the decimals of the underlying token
    pub activated: bool, // inactive reserves reject every operation
    pub freezed: bool,   // freezed reserves reject new deposits and debt
    pub rules: AssetRules,
    pub parameters: ReserveParameters,
    pub restrictions: ReserveRestrictions,
}

/// The data for a reserve asset
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReserveData {
    pub total_supplied: u128,          // the supplied amount including realized interest
    pub total_variable_borrowed: u128, // the variable debt including accrued interest
    pub sum_stable_debt: u128,         // the stable debt including accrued interest
    pub cumulative_supply_index_e18: u128,
    pub cumulative_variable_borrow_index_e18: u128,
    pub avg_stable_rate_e24: u128, // the principal weighted stable rate per second
    pub accumulated_stable_interest: u128, // stable interest accrued over the reserve's life
    pub current_supply_rate_e24: u128,
    pub current_variable_borrow_rate_e24: u128,
    pub stable_borrowers: u32, // the number of positions holding stable debt
    pub last_time: u64,        // the last time the indexes were updated
}

impl ReserveData {
    /// Create the data of a newly listed reserve
    pub fn new(timestamp: u64) -> Self {
        ReserveData {
            total_supplied: 0,
            total_variable_borrowed: 0,
            sum_stable_debt: 0,
            cumulative_supply_index_e18: crate::constants::SCALAR_18,
            cumulative_variable_borrow_index_e18: crate::constants::SCALAR_18,
            avg_stable_rate_e24: 0,
            accumulated_stable_interest: 0,
            current_supply_rate_e24: 0,
            current_variable_borrow_rate_e24: 0,
            stable_borrowers: 0,
            last_time: timestamp,
        }
    }
}

/// A user's position in a single reserve
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserReserveData {
    pub supplied: u128,
    pub variable_borrowed: u128,
    pub stable_borrowed: u128,
    pub applied_supply_index_e18: u128, // the reserve supply index the position was realized at
    pub applied_variable_borrow_index_e18: u128, // the reserve variable index the position was realized at
    pub stable_borrow_rate_e24: u128, // the stable rate locked by the position
    pub update_timestamp: u64,        // the reserve timestamp the position was realized at
}

impl UserReserveData {
    /// Check if the position holds neither supply nor debt
    pub fn is_empty(&self) -> bool {
        self.supplied == 0 && self.variable_borrowed == 0 && self.stable_borrowed == 0
    }
}

/// Bitsets of the reserves a user interacts with, indexed by reserve id
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct UserConfig {
    pub deposits: u128,
    pub collaterals: u128,
    pub borrows_variable: u128,
    pub borrows_stable: u128,
}

impl UserConfig {
    /// Checks if the user supplies the reserve
    ///
    /// ### Arguments
    /// * `res_index` - The index of the reserve to check
    pub fn is_deposit(&self, res_index: u32) -> bool {
        is_set(self.deposits, res_index)
    }

    /// Checks if the user's supply of the reserve counts as collateral
    ///
    /// ### Arguments
    /// * `res_index` - The index of the reserve to check
    pub fn is_collateral(&self, res_index: u32) -> bool {
        is_set(self.collaterals, res_index)
    }

    pub fn is_borrowing_variable(&self, res_index: u32) -> bool {
        is_set(self.borrows_variable, res_index)
    }

    pub fn is_borrowing_stable(&self, res_index: u32) -> bool {
        is_set(self.borrows_stable, res_index)
    }

    /// Set the deposit flag of the reserve at the res_index
    ///
    /// ### Arguments
    /// * `res_index` - The index of the reserve
    /// * `deposit` - If the user supplies the reserve
    pub fn set_deposit(&mut self, res_index: u32, deposit: bool) {
        set_bit(&mut self.deposits, res_index, deposit);
    }

    /// Set the collateral flag of the reserve at the res_index
    ///
    /// ### Arguments
    /// * `res_index` - The index of the reserve
    /// * `collateral` - If the user uses the reserve as collateral
    pub fn set_collateral(&mut self, res_index: u32, collateral: bool) {
        set_bit(&mut self.collaterals, res_index, collateral);
    }

    pub fn set_borrowing_variable(&mut self, res_index: u32, borrowing: bool) {
        set_bit(&mut self.borrows_variable, res_index, borrowing);
    }

    pub fn set_borrowing_stable(&mut self, res_index: u32, borrowing: bool) {
        set_bit(&mut self.borrows_stable, res_index, borrowing);
    }

    /// Checks if the user has any debt
    pub fn has_debt(&self) -> bool {
        self.borrows_variable != 0 || self.borrows_stable != 0
    }
}

fn is_set(bits: u128, res_index: u32) -> bool {
    res_index < MAX_RESERVES && (bits >> res_index) & 1 != 0
}

fn set_bit(bits: &mut u128, res_index: u32, flag: bool) {
    if res_index >= MAX_RESERVES {
        return;
    }
    let res_bit = 1u128 << res_index;
    if flag {
        *bits |= res_bit;
    } else {
        *bits &= !res_bit;
    }
}

/********** Storage Key Types **********/

/// The kind of position an allowance lets a spender act on
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AllowanceKind {
    /// The spender can redeem or transfer the owner's supply
    Supply,
    /// The spender can borrow against the owner's collateral, or move debt onto the owner
    Debt,
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AllowanceKey {
    pub asset: Address,
    pub owner: Address,
    pub spender: Address,
    pub kind: AllowanceKind,
}

/********** Storage **********/

/// All of the persistent state of a pool
#[derive(Clone, Debug)]
pub struct Ledger {
    timestamp: u64,
    config: PoolConfig,
    roles: BTreeMap<Address, BTreeSet<Role>>,
    res_list: Vec<Address>,
    res_config: BTreeMap<Address, ReserveConfig>,
    res_data: BTreeMap<Address, ReserveData>,
    positions: BTreeMap<Address, Positions>,
    user_config: BTreeMap<Address, UserConfig>,
    prices: BTreeMap<Address, u128>,
    allowances: BTreeMap<AllowanceKey, u128>,
    flash_loans: BTreeSet<Address>,
    tokens: TokenBook,
    events: Vec<PoolEvent>,
}

impl Ledger {
    /// Create an empty ledger for a pool
    ///
    /// ### Arguments
    /// * `admin` - The account allowed to manage reserves
    /// * `pool` - The account holding the pool's liquidity
    pub fn new(admin: Address, pool: Address) -> Self {
        Ledger {
            timestamp: 0,
            config: PoolConfig {
                address: pool,
                admin,
            },
            roles: BTreeMap::new(),
            res_list: Vec::new(),
            res_config: BTreeMap::new(),
            res_data: BTreeMap::new(),
            positions: BTreeMap::new(),
            user_config: BTreeMap::new(),
            prices: BTreeMap::new(),
            allowances: BTreeMap::new(),
            flash_loans: BTreeSet::new(),
            tokens: TokenBook::default(),
            events: Vec::new(),
        }
    }

    /********** Host **********/

    /// The current host timestamp in seconds
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Set the current host timestamp
    pub fn set_timestamp(&mut self, timestamp: u64) {
        self.timestamp = timestamp;
    }

    /********** Pool Config **********/

    pub fn get_pool_config(&self) -> &PoolConfig {
        &self.config
    }

    /// Fetch the account holding the pool's liquidity
    pub fn get_pool_address(&self) -> &Address {
        &self.config.address
    }

    pub fn get_admin(&self) -> &Address {
        &self.config.admin
    }

    /// Check if an account holds a role
    ///
    /// ### Arguments
    /// * `account` - The account
    /// * `role` - The role
    pub fn has_role(&self, account: &Address, role: Role) -> bool {
        self.roles
            .get(account)
            .map_or(false, |roles| roles.contains(&role))
    }

    /// Grant or revoke a role
    ///
    /// ### Arguments
    /// * `account` - The account
    /// * `role` - The role
    /// * `granted` - If the account holds the role afterwards
    pub fn set_role(&mut self, account: &Address, role: Role, granted: bool) {
        if granted {
            self.roles.entry(account.clone()).or_default().insert(role);
        } else if let Some(roles) = self.roles.get_mut(account) {
            roles.remove(&role);
            if roles.is_empty() {
                self.roles.remove(account);
            }
        }
    }

    /********** Reserve Config **********/

    /// Fetch the reserve config for an asset
    ///
    /// ### Arguments
    /// * `asset` - The underlying asset
    ///
    /// ### Errors
    /// If the asset is not registered
    pub fn get_res_config(&self, asset: &Address) -> Result<ReserveConfig, PoolError> {
        self.res_config
            .get(asset)
            .cloned()
            .ok_or(PoolError::AssetNotRegistered)
    }

    /// Set the reserve config for an asset
    ///
    /// ### Arguments
    /// * `asset` - The underlying asset
    /// * `config` - The reserve config
    pub fn set_res_config(&mut self, asset: &Address, config: &ReserveConfig) {
        self.res_config.insert(asset.clone(), config.clone());
    }

    /// Checks if a reserve exists for an asset
    pub fn has_res(&self, asset: &Address) -> bool {
        self.res_config.contains_key(asset)
    }

    /********** Reserve Data **********/

    /// Fetch the reserve data for an asset
    ///
    /// ### Arguments
    /// * `asset` - The underlying asset
    ///
    /// ### Errors
    /// If the asset is not registered
    pub fn get_res_data(&self, asset: &Address) -> Result<ReserveData, PoolError> {
        self.res_data
            .get(asset)
            .cloned()
            .ok_or(PoolError::AssetNotRegistered)
    }

    /// Set the reserve data for an asset
    pub fn set_res_data(&mut self, asset: &Address, data: &ReserveData) {
        self.res_data.insert(asset.clone(), data.clone());
    }

    /********** Reserve List **********/

    /// Fetch the list of reserves. The position of an asset in the list is its reserve id.
    pub fn get_res_list(&self) -> &[Address] {
        &self.res_list
    }

    /// Add a reserve to the back of the list and return its index
    ///
    /// ### Arguments
    /// * `asset` - The underlying asset
    ///
    /// ### Errors
    /// If the list is full
    pub fn push_res_list(&mut self, asset: &Address) -> Result<u32, PoolError> {
        let new_index =
            cast::u32(self.res_list.len()).map_err(|_| PoolError::MaxPositionsExceeded)?;
        if new_index >= MAX_RESERVES {
            return Err(PoolError::MaxPositionsExceeded);
        }
        self.res_list.push(asset.clone());
        Ok(new_index)
    }

    /********** User **********/

    /// Fetch a user's positions, or empty positions if the user never interacted with the pool
    ///
    /// ### Arguments
    /// * `user` - The user
    pub fn get_user_positions(&self, user: &Address) -> Positions {
        self.positions.get(user).cloned().unwrap_or_default()
    }

    /// Set a user's positions
    pub fn set_user_positions(&mut self, user: &Address, positions: &Positions) {
        self.positions.insert(user.clone(), positions.clone());
    }

    /// Fetch a user's config
    pub fn get_user_config(&self, user: &Address) -> UserConfig {
        self.user_config.get(user).copied().unwrap_or_default()
    }

    /// Set a user's config
    pub fn set_user_config(&mut self, user: &Address, config: &UserConfig) {
        self.user_config.insert(user.clone(), *config);
    }

    /********** Prices **********/

    /// Fetch the stored price of an asset, expressed in 8 decimals
    pub fn get_price(&self, asset: &Address) -> Option<u128> {
        self.prices.get(asset).copied()
    }

    /// Store the price of an asset, expressed in 8 decimals
    pub fn set_price(&mut self, asset: &Address, price_e8: u128) {
        self.prices.insert(asset.clone(), price_e8);
    }

    /********** Allowances **********/

    /// Fetch the position allowance an owner granted to a spender
    pub fn get_allowance(
        &self,
        asset: &Address,
        owner: &Address,
        spender: &Address,
        kind: AllowanceKind,
    ) -> u128 {
        let key = AllowanceKey {
            asset: asset.clone(),
            owner: owner.clone(),
            spender: spender.clone(),
            kind,
        };
        self.allowances.get(&key).copied().unwrap_or(0)
    }

    /// Set the position allowance an owner grants to a spender. A zero amount removes it.
    pub fn set_allowance(
        &mut self,
        asset: &Address,
        owner: &Address,
        spender: &Address,
        kind: AllowanceKind,
        amount: u128,
    ) {
        let key = AllowanceKey {
            asset: asset.clone(),
            owner: owner.clone(),
            spender: spender.clone(),
            kind,
        };
        if amount == 0 {
            self.allowances.remove(&key);
        } else {
            self.allowances.insert(key, amount);
        }
    }

    /********** Flash Loans **********/

    /// Checks if a flash loan of the asset is currently in flight
    pub fn is_flash_loan_in_flight(&self, asset: &Address) -> bool {
        self.flash_loans.contains(asset)
    }

    /// Mark or clear an in flight flash loan of the asset
    pub fn set_flash_loan_in_flight(&mut self, asset: &Address, in_flight: bool) {
        if in_flight {
            self.flash_loans.insert(asset.clone());
        } else {
            self.flash_loans.remove(asset);
        }
    }

    /********** Tokens **********/

    pub fn tokens(&self) -> &TokenBook {
        &self.tokens
    }

    pub fn tokens_mut(&mut self) -> &mut TokenBook {
        &mut self.tokens
    }

    /********** Events **********/

    /// The committed event log, oldest first
    pub fn events(&self) -> &[PoolEvent] {
        &self.events
    }

    pub fn push_events(&mut self, events: impl IntoIterator<Item = PoolEvent>) {
        self.events.extend(events);
    }
}

/// (De)serialize token amounts, rates and indexes as decimal strings. Integers are accepted as
/// well when they fit the format's native integer type.
pub(crate) mod amount_serde {
    use std::fmt;

    use serde::{
        de::{self, Visitor},
        Deserialize, Deserializer, Serializer,
    };

    struct Amount(u128);

    struct AmountVisitor;

    impl<'de> Visitor<'de> for AmountVisitor {
        type Value = Amount;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a non-negative integer or a decimal string")
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<Amount, E> {
            Ok(Amount(u128::from(value)))
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<Amount, E> {
            cast::u128(value)
                .map(Amount)
                .map_err(|_| E::invalid_value(de::Unexpected::Signed(value), &self))
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Amount, E> {
            value
                .replace('_', "")
                .parse::<u128>()
                .map(Amount)
                .map_err(|_| E::invalid_value(de::Unexpected::Str(value), &self))
        }
    }

    impl<'de> Deserialize<'de> for Amount {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            deserializer.deserialize_any(AmountVisitor)
        }
    }

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        Amount::deserialize(deserializer).map(|amount| amount.0)
    }

    pub mod option {
        use serde::{Deserialize, Deserializer, Serializer};

        use super::Amount;

        pub fn serialize<S: Serializer>(
            value: &Option<u128>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(value) => serializer.serialize_some(&value.to_string()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<u128>, D::Error> {
            Option::<Amount>::deserialize(deserializer).map(|value| value.map(|amount| amount.0))
        }
    }

    pub mod array {
        use serde::{de, Deserialize, Deserializer, Serializer};

        use super::Amount;

        pub fn serialize<S: Serializer, const N: usize>(
            values: &[u128; N],
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            serializer.collect_seq(values.iter().map(|value| value.to_string()))
        }

        pub fn deserialize<'de, D: Deserializer<'de>, const N: usize>(
            deserializer: D,
        ) -> Result<[u128; N], D::Error> {
            let values = Vec::<Amount>::deserialize(deserializer)?;
            let len = values.len();
            let values: Vec<u128> = values.into_iter().map(|amount| amount.0).collect();
            values.try_into().map_err(|_| {
                <D::Error as de::Error>::invalid_length(len, &"one value per utilization breakpoint")
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_config_bits() {
        let mut config = UserConfig::default();
        config.set_deposit(0, true);
        config.set_collateral(127, true);
        config.set_borrowing_variable(5, true);
        assert!(config.is_deposit(0));
        assert!(!config.is_deposit(1));
        assert!(config.is_collateral(127));
        assert!(config.is_borrowing_variable(5));
        assert!(config.has_debt());

        config.set_borrowing_variable(5, false);
        assert!(!config.has_debt());
        assert_eq!(config.borrows_variable, 0);
        assert_eq!(config.collaterals, 1u128 << 127);
    }

    #[test]
    fn test_user_config_ignores_out_of_range_index() {
        let mut config = UserConfig::default();
        config.set_deposit(MAX_RESERVES, true);
        assert_eq!(config, UserConfig::default());
        assert!(!config.is_deposit(MAX_RESERVES));
    }

    #[test]
    fn test_push_res_list_is_append_only() {
        let mut ledger = Ledger::new(Address::from("admin"), Address::from("pool"));
        assert_eq!(ledger.push_res_list(&Address::from("DAI")), Ok(0));
        assert_eq!(ledger.push_res_list(&Address::from("WETH")), Ok(1));
        assert_eq!(
            ledger.get_res_list(),
            &[Address::from("DAI"), Address::from("WETH")]
        );
    }

    #[test]
    fn test_push_res_list_max_reserves() {
        let mut ledger = Ledger::new(Address::from("admin"), Address::from("pool"));
        for i in 0..MAX_RESERVES {
            ledger
                .push_res_list(&Address::new(format!("asset{}", i)))
                .unwrap();
        }
        assert_eq!(
            ledger.push_res_list(&Address::from("one_more")),
            Err(PoolError::MaxPositionsExceeded)
        );
    }

    #[test]
    fn test_allowances() {
        let mut ledger = Ledger::new(Address::from("admin"), Address::from("pool"));
        let (dai, owner, spender) = (
            Address::from("DAI"),
            Address::from("owner"),
            Address::from("spender"),
        );
        ledger.set_allowance(&dai, &owner, &spender, AllowanceKind::Supply, 100);
        assert_eq!(
            ledger.get_allowance(&dai, &owner, &spender, AllowanceKind::Supply),
            100
        );
        assert_eq!(
            ledger.get_allowance(&dai, &owner, &spender, AllowanceKind::Debt),
            0
        );
        ledger.set_allowance(&dai, &owner, &spender, AllowanceKind::Supply, 0);
        assert_eq!(
            ledger.get_allowance(&dai, &owner, &spender, AllowanceKind::Supply),
            0
        );
    }

    #[test]
    fn test_roles() {
        let mut ledger = Ledger::new(Address::from("admin"), Address::from("pool"));
        let account = Address::from("treasury");
        ledger.set_role(&account, Role::Treasury, true);
        assert!(ledger.has_role(&account, Role::Treasury));
        assert!(!ledger.has_role(&account, Role::FlashBorrower));
        ledger.set_role(&account, Role::Treasury, false);
        assert!(!ledger.has_role(&account, Role::Treasury));
    }

    #[test]
    fn test_metadata_from_toml_accepts_strings_and_integers() {
        let metadata: ReserveMetadata = toml::from_str(
            r#"
            decimals = 18

            [rules]
            collateral_coefficient_e6 = 800_000
            penalty_e6 = "100000"

            [parameters]
            interest_rate_model = [1, 2, 3, 4, 5, 6, "300000000000000000"]
            income_for_suppliers_part_e6 = 999_990
            flash_loan_fee_e6 = 1000

            [restrictions]
            maximal_total_supply = "1_000_000_000_000_000_000_000_000_000"
            "#,
        )
        .unwrap();
        assert_eq!(metadata.decimals, 18);
        assert_eq!(metadata.rules.collateral_coefficient_e6, Some(800_000));
        assert_eq!(metadata.rules.borrow_coefficient_e6, None);
        assert_eq!(metadata.rules.penalty_e6, 100_000);
        assert_eq!(
            metadata.parameters.interest_rate_model[6],
            300_000_000_000_000_000
        );
        assert_eq!(metadata.parameters.stable_rate_base_e24, 0);
        assert_eq!(
            metadata.restrictions.maximal_total_supply,
            Some(1_000_000_000_000_000_000_000_000_000)
        );
        assert_eq!(metadata.restrictions.maximal_total_debt, None);
        assert_eq!(metadata.restrictions.minimal_debt, 0);
    }

    #[test]
    fn test_metadata_rejects_short_rate_model() {
        let result: Result<ReserveParameters, _> = toml::from_str(
            r#"
            interest_rate_model = [1, 2, 3]
            income_for_suppliers_part_e6 = 999_990
            flash_loan_fee_e6 = 1000
            "#,
        );
        assert!(result.is_err());
    }
}
