#![cfg(test)]
use reserve_pool::{PoolError, PoolEvent, Request, RequestType, SCALAR_18};
use test_suites::test_fixture::{TestFixture, TokenIndex, SCALAR_6};

#[test]
fn test_deposit_and_redeem_weth() {
    let mut fixture = TestFixture::create();
    let sam = fixture.create_user("samwise");
    let weth = fixture.tokens[TokenIndex::WETH].clone();
    let index_before = fixture.read_reserve_data(TokenIndex::WETH).cumulative_supply_index_e18;

    // Sam deposits 10 WETH
    fixture.mint(TokenIndex::WETH, &sam, 10 * SCALAR_18);
    let deposited = fixture
        .pool
        .deposit(&sam, &sam, &weth, 10 * SCALAR_18)
        .unwrap();
    assert_eq!(deposited, 10 * SCALAR_18);

    let reserve_data = fixture.read_reserve_data(TokenIndex::WETH);
    assert_eq!(reserve_data.total_supplied, 10 * SCALAR_18);
    assert_eq!(reserve_data.cumulative_supply_index_e18, index_before);
    assert_eq!(fixture.read_position(TokenIndex::WETH, &sam).supplied, 10 * SCALAR_18);
    assert_eq!(fixture.balance(TokenIndex::WETH, &sam), 0);
    assert_eq!(fixture.pool_balance(TokenIndex::WETH), 10 * SCALAR_18);

    let config = fixture.pool.view_user_config(&sam);
    let weth_index = fixture.read_reserve_config(TokenIndex::WETH).index;
    assert!(config.is_deposit(weth_index));
    assert!(!config.is_collateral(weth_index));
    assert_eq!(
        fixture.ledger().events().last(),
        Some(&PoolEvent::Deposit {
            asset: weth.clone(),
            caller: sam.clone(),
            on_behalf_of: sam.clone(),
            amount: 10 * SCALAR_18,
        })
    );

    // Sam redeems 4 WETH, then the rest
    let redeemed = fixture
        .pool
        .redeem(&sam, &sam, &weth, Some(4 * SCALAR_18))
        .unwrap();
    assert_eq!(redeemed, 4 * SCALAR_18);
    assert_eq!(fixture.read_position(TokenIndex::WETH, &sam).supplied, 6 * SCALAR_18);
    assert_eq!(fixture.balance(TokenIndex::WETH, &sam), 4 * SCALAR_18);

    let redeemed = fixture.pool.redeem(&sam, &sam, &weth, None).unwrap();
    assert_eq!(redeemed, 6 * SCALAR_18);
    assert_eq!(fixture.read_reserve_data(TokenIndex::WETH).total_supplied, 0);
    assert_eq!(fixture.balance(TokenIndex::WETH, &sam), 10 * SCALAR_18);
    assert_eq!(fixture.pool_balance(TokenIndex::WETH), 0);
    assert!(!fixture.pool.view_user_config(&sam).is_deposit(weth_index));

    // Nothing left to redeem
    assert_eq!(
        fixture.pool.redeem(&sam, &sam, &weth, None),
        Err(PoolError::InsufficientBalance)
    );
}

#[test]
fn test_deposit_errors_leave_state_unchanged() {
    let mut fixture = TestFixture::create();
    let sam = fixture.create_user("samwise");
    let dai = fixture.tokens[TokenIndex::DAI].clone();
    fixture.mint(TokenIndex::DAI, &sam, 100 * SCALAR_6);
    let events_before = fixture.ledger().events().len();

    // more than sam holds
    assert_eq!(
        fixture.pool.deposit(&sam, &sam, &dai, 101 * SCALAR_6),
        Err(PoolError::InsufficientBalance)
    );
    // below the DAI minimal collateral of 2 DAI
    assert_eq!(
        fixture.pool.deposit(&sam, &sam, &dai, SCALAR_6),
        Err(PoolError::BelowMinimum)
    );
    assert_eq!(
        fixture.pool.deposit(&sam, &sam, &dai, 0),
        Err(PoolError::AmountNotGreaterThanZero)
    );

    // a batch fails as a whole
    let requests = vec![
        Request {
            request_type: RequestType::Deposit,
            asset: dai.clone(),
            amount: Some(50 * SCALAR_6),
        },
        Request {
            request_type: RequestType::Deposit,
            asset: dai.clone(),
            amount: Some(51 * SCALAR_6),
        },
    ];
    assert_eq!(
        fixture.pool.submit(&sam, &sam, &requests),
        Err(PoolError::InsufficientBalance)
    );

    assert_eq!(fixture.balance(TokenIndex::DAI, &sam), 100 * SCALAR_6);
    assert_eq!(fixture.read_reserve_data(TokenIndex::DAI).total_supplied, 0);
    assert_eq!(fixture.ledger().events().len(), events_before);
}

#[test]
fn test_freezed_and_inactive_reserves() {
    let mut fixture = TestFixture::create();
    let sam = fixture.create_user("samwise");
    let bombadil = fixture.bombadil.clone();
    let usdc = fixture.tokens[TokenIndex::USDC].clone();
    fixture.supply(TokenIndex::USDC, &sam, 1_000 * SCALAR_6);
    fixture.mint(TokenIndex::USDC, &sam, 1_000 * SCALAR_6);

    fixture
        .pool
        .set_reserve_is_freezed(&bombadil, &usdc, true)
        .unwrap();
    assert_eq!(
        fixture.pool.deposit(&sam, &sam, &usdc, 1_000 * SCALAR_6),
        Err(PoolError::Freezed)
    );
    // redeeming is still allowed
    assert_eq!(
        fixture.pool.redeem(&sam, &sam, &usdc, Some(500 * SCALAR_6)),
        Ok(500 * SCALAR_6)
    );

    fixture
        .pool
        .set_reserve_is_active(&bombadil, &usdc, false)
        .unwrap();
    assert_eq!(
        fixture.pool.redeem(&sam, &sam, &usdc, None),
        Err(PoolError::Inactive)
    );

    fixture
        .pool
        .set_reserve_is_active(&bombadil, &usdc, true)
        .unwrap();
    fixture
        .pool
        .set_reserve_is_freezed(&bombadil, &usdc, false)
        .unwrap();
    assert_eq!(
        fixture.pool.deposit(&sam, &sam, &usdc, 1_000 * SCALAR_6),
        Ok(1_000 * SCALAR_6)
    );
    assert_eq!(
        fixture.read_position(TokenIndex::USDC, &sam).supplied,
        1_500 * SCALAR_6
    );
}

#[test]
fn test_redeem_on_behalf_uses_supply_allowance() {
    let mut fixture = TestFixture::create();
    let sam = fixture.create_user("samwise");
    let merry = fixture.create_user("merry");
    let dai = fixture.tokens[TokenIndex::DAI].clone();
    fixture.supply(TokenIndex::DAI, &sam, 100 * SCALAR_6);

    assert_eq!(
        fixture.pool.redeem(&merry, &sam, &dai, Some(10 * SCALAR_6)),
        Err(PoolError::InsufficientAllowance)
    );

    fixture.pool.approve_supply(&sam, &merry, &dai, 30 * SCALAR_6);
    assert_eq!(
        fixture.pool.redeem(&merry, &sam, &dai, Some(30 * SCALAR_6)),
        Ok(30 * SCALAR_6)
    );
    // merry receives the tokens, sam's position shrinks
    assert_eq!(fixture.balance(TokenIndex::DAI, &merry), 30 * SCALAR_6);
    assert_eq!(fixture.balance(TokenIndex::DAI, &sam), 0);
    assert_eq!(fixture.read_position(TokenIndex::DAI, &sam).supplied, 70 * SCALAR_6);

    // the allowance is spent
    assert_eq!(
        fixture.pool.redeem(&merry, &sam, &dai, Some(10 * SCALAR_6)),
        Err(PoolError::InsufficientAllowance)
    );
}

#[test]
fn test_supply_cap() {
    let mut fixture = TestFixture::create();
    let sam = fixture.create_user("samwise");
    let link = fixture.tokens[TokenIndex::LINK].clone();
    let cap = fixture
        .read_reserve_config(TokenIndex::LINK)
        .restrictions
        .maximal_total_supply
        .unwrap();
    fixture.mint(TokenIndex::LINK, &sam, cap + 1);

    assert_eq!(
        fixture.pool.deposit(&sam, &sam, &link, cap + 1),
        Err(PoolError::SupplyCapExceeded)
    );
    assert_eq!(fixture.pool.deposit(&sam, &sam, &link, cap), Ok(cap));
}

#[test]
fn test_many_users_supply_sums_to_total() {
    let mut fixture = TestFixture::create();
    let users = [
        fixture.create_user("frodo"),
        fixture.create_user("samwise"),
        fixture.create_user("merry"),
        fixture.create_user("pippin"),
    ];
    let dai = fixture.tokens[TokenIndex::DAI].clone();
    for (i, user) in users.iter().enumerate() {
        fixture.supply(TokenIndex::DAI, user, (i as u128 + 1) * 1_000 * SCALAR_6);
    }
    fixture
        .pool
        .redeem(&users[1], &users[1], &dai, Some(1_234_567_890))
        .unwrap();
    fixture.pool.redeem(&users[3], &users[3], &dai, None).unwrap();

    let sum: u128 = users
        .iter()
        .map(|user| fixture.read_position(TokenIndex::DAI, user).supplied)
        .sum();
    assert_eq!(fixture.read_reserve_data(TokenIndex::DAI).total_supplied, sum);
    assert_eq!(fixture.pool_balance(TokenIndex::DAI), sum);
    assert_eq!(sum, 6_000 * SCALAR_6 - 1_234_567_890);
}
