use serde::{Deserialize, Serialize};

use crate::storage::{amount_serde, Address, ReserveMetadata};

/// A market to bootstrap a pool from
///
/// ```toml
/// admin = "bombadil"
/// pool = "pool"
/// flash_borrowers = ["frodo"]
/// treasury = ["merry"]
///
/// [[reserves]]
/// asset = "DAI"
/// price_e8 = "100000000"
/// decimals = 6
/// ...
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketConfig {
    pub admin: Address,
    pub pool: Address,
    #[serde(default)]
    pub flash_borrowers: Vec<Address>,
    #[serde(default)]
    pub treasury: Vec<Address>,
    #[serde(default)]
    pub reserves: Vec<ReserveListing>,
}

/// A reserve listed by a market config, in reserve index order
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveListing {
    pub asset: Address,
    /// The initial price of the asset, expressed in 8 decimals
    #[serde(default, with = "amount_serde::option")]
    pub price_e8: Option<u128>,
    #[serde(flatten)]
    pub metadata: ReserveMetadata,
}

impl MarketConfig {
    /// Parse a market config from TOML
    ///
    /// ### Errors
    /// If the TOML is malformed or does not describe a market
    pub fn from_toml(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutils;

    const MARKET: &str = r#"
admin = "bombadil"
pool = "pool"
flash_borrowers = ["frodo"]

[[reserves]]
asset = "DAI"
price_e8 = 100_000_000
decimals = 6

[reserves.rules]
collateral_coefficient_e6 = 970_000
borrow_coefficient_e6 = 1_030_000
penalty_e6 = 15_000

[reserves.parameters]
interest_rate_model = [
    "300_000_000_000_000",
    "500_000_000_000_000",
    "2_000_000_000_000_000",
    "4_000_000_000_000_000",
    "10_000_000_000_000_000",
    "100_000_000_000_000_000",
    "300_000_000_000_000_000",
]
income_for_suppliers_part_e6 = 999_990
flash_loan_fee_e6 = 1_000

[reserves.restrictions]
minimal_collateral = 2_000_000
minimal_debt = 1_000_000

[[reserves]]
asset = "WETH"
decimals = 18

[reserves.rules]
borrow_coefficient_e6 = 1_200_000
penalty_e6 = 100_000

[reserves.parameters]
interest_rate_model = ["0", "1", "2", "3", "4", "5", "6"]
income_for_suppliers_part_e6 = 999_990
flash_loan_fee_e6 = 1_000
"#;

    #[test]
    fn test_from_toml() {
        let market = MarketConfig::from_toml(MARKET).unwrap();
        assert_eq!(market.admin, testutils::bombadil());
        assert_eq!(market.flash_borrowers, vec![testutils::frodo()]);
        assert!(market.treasury.is_empty());
        assert_eq!(market.reserves.len(), 2);

        let dai = &market.reserves[0];
        assert_eq!(dai.asset, Address::from("DAI"));
        assert_eq!(dai.price_e8, Some(100_000_000));
        assert_eq!(dai.metadata, testutils::dai_metadata());

        let weth = &market.reserves[1];
        assert_eq!(weth.price_e8, None);
        assert_eq!(weth.metadata.rules.collateral_coefficient_e6, None);
        assert_eq!(weth.metadata.parameters.interest_rate_model[6], 6);
        assert_eq!(weth.metadata.restrictions.maximal_total_supply, None);
    }

    #[test]
    fn test_from_toml_missing_fields() {
        assert!(MarketConfig::from_toml("admin = \"bombadil\"").is_err());
        let missing_rules = "admin = \"a\"\npool = \"p\"\n[[reserves]]\nasset = \"DAI\"\ndecimals = 6\n";
        assert!(MarketConfig::from_toml(missing_rules).is_err());
    }
}
