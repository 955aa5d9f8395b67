pub mod assertions;
pub mod flash_loan_receiver;
pub mod test_fixture;

use reserve_pool::Address;
use test_fixture::{TestFixture, TokenIndex, SCALAR_18, SCALAR_6};

/// Create a fixture where frodo supplied liquidity to every reserve and samwise borrowed
/// DAI against WETH collateral
///
/// * frodo supplies 100k DAI, 100k USDC, 10 WETH and 10k LINK
/// * samwise supplies 10 WETH as collateral and borrows 5k DAI at a variable rate
pub fn create_fixture_with_data() -> (TestFixture, Address, Address) {
    let mut fixture = TestFixture::create();
    let frodo = fixture.create_user("frodo");
    let samwise = fixture.create_user("samwise");

    fixture.supply(TokenIndex::DAI, &frodo, 100_000 * SCALAR_6);
    fixture.supply(TokenIndex::USDC, &frodo, 100_000 * SCALAR_6);
    fixture.supply(TokenIndex::WETH, &frodo, 10 * SCALAR_18);
    fixture.supply(TokenIndex::LINK, &frodo, 10_000 * SCALAR_18);

    fixture.supply_collateral(TokenIndex::WETH, &samwise, 10 * SCALAR_18);
    let dai = fixture.tokens[TokenIndex::DAI].clone();
    fixture
        .pool
        .borrow_variable(&samwise, &samwise, &dai, 5_000 * SCALAR_6)
        .unwrap();

    (fixture, frodo, samwise)
}
