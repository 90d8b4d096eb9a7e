use super::common::*;
use crate::allocation::{CreditPool, PoolError};
use crate::records::PatternSet;

fn pool(capacity: i64) -> CreditPool {
    CreditPool::new(
        "Free",
        credit(capacity),
        PatternSet::new(["Major-.*"]).expect("pattern compiles"),
    )
    .expect("capacity is valid")
}

#[test]
fn deposit_returns_what_does_not_fit() {
    let mut pool = pool(5);

    assert_eq!(pool.deposit(credit(3)).expect("deposit"), credit(0));
    assert_eq!(pool.balance(), credit(3));

    assert_eq!(pool.deposit(credit(4)).expect("deposit"), credit(2));
    assert_eq!(pool.balance(), credit(5));
}

#[test]
fn withdraw_grants_at_most_the_balance() {
    let mut pool = pool(5);
    pool.deposit(credit(3)).expect("deposit");

    assert_eq!(pool.withdraw(credit(2)).expect("withdraw"), credit(2));
    assert_eq!(pool.withdraw(credit(4)).expect("withdraw"), credit(1));
    assert_eq!(pool.balance(), credit(0));
}

#[test]
fn deposit_then_withdraw_restores_balance() {
    let mut pool = pool(10);
    pool.deposit(credit(4)).expect("deposit");

    pool.deposit(credit(3)).expect("deposit");
    pool.withdraw(credit(3)).expect("withdraw");

    assert_eq!(pool.balance(), credit(4));
}

#[test]
fn negative_amounts_are_rejected() {
    let mut pool = pool(5);

    assert_eq!(
        pool.deposit(credit(-1)),
        Err(PoolError::NegativeAmount(credit(-1)))
    );
    assert_eq!(
        pool.withdraw(credit(-2)),
        Err(PoolError::NegativeAmount(credit(-2)))
    );
    assert_eq!(pool.balance(), credit(0));
}

#[test]
fn negative_capacity_is_rejected() {
    match CreditPool::new("Free", credit(-1), PatternSet::empty()) {
        Err(PoolError::InvalidCapacity { name, .. }) => assert_eq!(name, "Free"),
        other => panic!("expected invalid capacity, got {other:?}"),
    }
}

#[test]
fn accepts_full_matches_only() {
    let pool = pool(5);
    assert!(pool.accepts("Major-Core"));
    assert!(!pool.accepts("Minor-Major-Core"));
}
