#![cfg(test)]
use reserve_pool::{FlashLoanReceiver, PoolError, PoolEvent, SCALAR_18};
use test_suites::{
    flash_loan_receiver::MockFlashLoanReceiver,
    test_fixture::{TestFixture, TokenIndex},
};

/// Frodo supplies 10 WETH
fn setup() -> TestFixture {
    let mut fixture = TestFixture::create();
    let frodo = fixture.create_user("frodo");
    fixture.supply(TokenIndex::WETH, &frodo, 10 * SCALAR_18);
    fixture
}

#[test]
fn test_flash_loan() {
    let mut fixture = setup();
    let sam = fixture.create_user("samwise");
    let weth = fixture.tokens[TokenIndex::WETH].clone();
    let mut receiver = MockFlashLoanReceiver::new("receiver");

    fixture
        .pool
        .flash_loan(&sam, &mut receiver, &[weth.clone()], &[5 * SCALAR_18], &[1, 2, 3])
        .unwrap();

    // 0.1% fee on 5 WETH
    let fee = 5_000_000_000_000_000;
    assert_eq!(
        receiver.calls,
        vec![(vec![weth.clone()], vec![5 * SCALAR_18], vec![fee])]
    );
    assert_eq!(fixture.pool_balance(TokenIndex::WETH), 10 * SCALAR_18 + fee);
    assert_eq!(fixture.balance(TokenIndex::WETH, &receiver.address()), 0);
    assert_eq!(
        fixture.ledger().events().last(),
        Some(&PoolEvent::FlashLoan {
            receiver: receiver.address(),
            caller: sam.clone(),
            asset: weth.clone(),
            amount: 5 * SCALAR_18,
            fee,
        })
    );
    assert!(!fixture.ledger().is_flash_loan_in_flight(&weth));

    // the fee is protocol income the treasury can take
    assert_eq!(
        fixture.pool.view_protocol_income(Some(&[weth.clone()][..])),
        Ok(vec![(weth.clone(), fee as i128)])
    );
    let treasury = fixture.treasury.clone();
    assert_eq!(
        fixture
            .pool
            .take_protocol_income(&sam, Some(&[weth.clone()][..]), &sam),
        Err(PoolError::UnauthorizedError)
    );
    assert_eq!(
        fixture
            .pool
            .take_protocol_income(&treasury, Some(&[weth.clone()][..]), &treasury),
        Ok(vec![(weth.clone(), fee)])
    );
    assert_eq!(fixture.balance(TokenIndex::WETH, &treasury), fee);
    assert_eq!(fixture.pool_balance(TokenIndex::WETH), 10 * SCALAR_18);
}

#[test]
fn test_flash_loan_flash_borrower_fee() {
    let mut fixture = setup();
    let weth = fixture.tokens[TokenIndex::WETH].clone();
    let flash_borrower = fixture.flash_borrower.clone();
    let mut receiver = MockFlashLoanReceiver::new("receiver");

    fixture
        .pool
        .flash_loan(&flash_borrower, &mut receiver, &[weth.clone()], &[5 * SCALAR_18], &[])
        .unwrap();
    assert_eq!(receiver.calls[0].2, vec![500_000_000_000_000]);
    assert_eq!(
        fixture.pool_balance(TokenIndex::WETH),
        10 * SCALAR_18 + 500_000_000_000_000
    );
}

#[test]
fn test_flash_loan_without_approval() {
    let mut fixture = setup();
    let sam = fixture.create_user("samwise");
    let weth = fixture.tokens[TokenIndex::WETH].clone();
    let mut receiver = MockFlashLoanReceiver::new("receiver");
    receiver.custom_amount_to_approve = Some(0);
    let events_before = fixture.ledger().events().len();

    assert_eq!(
        fixture
            .pool
            .flash_loan(&sam, &mut receiver, &[weth.clone()], &[5 * SCALAR_18], &[]),
        Err(PoolError::InsufficientAllowance)
    );
    // the callback ran, but the loan is undone
    assert_eq!(receiver.calls.len(), 1);
    assert_eq!(fixture.pool_balance(TokenIndex::WETH), 10 * SCALAR_18);
    assert_eq!(fixture.balance(TokenIndex::WETH, &receiver.address()), 0);
    assert_eq!(fixture.ledger().events().len(), events_before);
    assert!(!fixture.ledger().is_flash_loan_in_flight(&weth));
}

#[test]
fn test_flash_loan_failures() {
    let mut fixture = setup();
    let sam = fixture.create_user("samwise");
    let weth = fixture.tokens[TokenIndex::WETH].clone();
    let dai = fixture.tokens[TokenIndex::DAI].clone();

    let mut receiver = MockFlashLoanReceiver::new("receiver");
    receiver.fail_execute_operation = true;
    assert_eq!(
        fixture
            .pool
            .flash_loan(&sam, &mut receiver, &[weth.clone()], &[SCALAR_18], &[]),
        Err(PoolError::ExecuteOperationFailed)
    );

    let mut receiver = MockFlashLoanReceiver::new("receiver");
    receiver.simulate_balance_to_cover_fee = false;
    assert_eq!(
        fixture
            .pool
            .flash_loan(&sam, &mut receiver, &[weth.clone()], &[SCALAR_18], &[]),
        Err(PoolError::InsufficientBalance)
    );

    let mut receiver = MockFlashLoanReceiver::new("receiver");
    assert_eq!(
        fixture
            .pool
            .flash_loan(&sam, &mut receiver, &[weth.clone()], &[11 * SCALAR_18], &[]),
        Err(PoolError::InsufficientBalance)
    );
    assert_eq!(
        fixture
            .pool
            .flash_loan(&sam, &mut receiver, &[dai.clone()], &[1_000_000], &[]),
        Err(PoolError::InsufficientBalance)
    );
    assert_eq!(
        fixture
            .pool
            .flash_loan(&sam, &mut receiver, &[weth.clone()], &[SCALAR_18, SCALAR_18], &[]),
        Err(PoolError::BadRequest)
    );
    assert!(receiver.calls.is_empty());
    assert_eq!(fixture.pool_balance(TokenIndex::WETH), 10 * SCALAR_18);
}
