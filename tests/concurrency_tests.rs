//! Concurrency properties of the balance engine
//!
//! These tests drive a shared `BalanceEngine` from many OS threads at once
//! and check the invariants that must hold whatever the interleaving:
//! no lost updates, no negative balances, conservation of money across
//! transfers, and termination of opposite transfers.

use accounts_engine::{AccountError, BalanceEngine, EngineConfig, InMemoryBalanceStore};
use rstest::{fixture, rstest};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).unwrap()
}

#[fixture]
fn engine() -> BalanceEngine<InMemoryBalanceStore> {
    BalanceEngine::new(Arc::new(InMemoryBalanceStore::new()))
}

fn funded(engine: &BalanceEngine<InMemoryBalanceStore>, amount: &str) -> String {
    let id = engine.create_account().unwrap();
    engine.increase_balance(&id, dec(amount)).unwrap();
    id
}

#[rstest]
#[case::few_threads(4, 250)]
#[case::many_threads(32, 50)]
fn concurrent_increases_are_all_applied(
    engine: BalanceEngine<InMemoryBalanceStore>,
    #[case] threads: usize,
    #[case] per_thread: usize,
) {
    let id = engine.create_account().unwrap();
    let barrier = Barrier::new(threads);

    thread::scope(|scope| {
        for _ in 0..threads {
            scope.spawn(|| {
                barrier.wait();
                for _ in 0..per_thread {
                    engine.increase_balance(&id, dec("0.01")).unwrap();
                }
            });
        }
    });

    let expected = Decimal::new((threads * per_thread) as i64, 2);
    assert_eq!(engine.get_balance(&id).unwrap(), expected);
}

#[rstest]
fn concurrent_reductions_never_overdraw(engine: BalanceEngine<InMemoryBalanceStore>) {
    let id = funded(&engine, "100.00");
    let barrier = Barrier::new(16);

    let successes: usize = thread::scope(|scope| {
        let handles: Vec<_> = (0..16)
            .map(|_| {
                scope.spawn(|| {
                    barrier.wait();
                    (0..20)
                        .filter(|_| match engine.reduce_balance(&id, dec("1.00")) {
                            Ok(balance) => {
                                assert!(balance >= Decimal::ZERO);
                                true
                            }
                            Err(AccountError::InsufficientFunds { .. }) => false,
                            Err(e) => panic!("Unexpected error: {}", e),
                        })
                        .count()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).sum()
    });

    assert_eq!(successes, 100);
    assert_eq!(engine.get_balance(&id).unwrap(), dec("0.00"));
}

#[rstest]
fn opposite_transfers_terminate_and_conserve_money(engine: BalanceEngine<InMemoryBalanceStore>) {
    let a = funded(&engine, "1000.00");
    let b = funded(&engine, "1000.00");
    let barrier = Barrier::new(8);

    thread::scope(|scope| {
        for i in 0..8 {
            let (from, to) = if i % 2 == 0 { (&a, &b) } else { (&b, &a) };
            let engine = &engine;
            let barrier = &barrier;
            scope.spawn(move || {
                barrier.wait();
                for _ in 0..100 {
                    engine.transfer_money(from, to, dec("1.00")).unwrap();
                }
            });
        }
    });

    assert_eq!(engine.get_balance(&a).unwrap(), dec("1000.00"));
    assert_eq!(engine.get_balance(&b).unwrap(), dec("1000.00"));
}

#[rstest]
fn transfer_ring_conserves_total(engine: BalanceEngine<InMemoryBalanceStore>) {
    let accounts: Vec<String> = (0..5).map(|_| funded(&engine, "50.00")).collect();
    let barrier = Barrier::new(accounts.len());

    thread::scope(|scope| {
        for i in 0..accounts.len() {
            let from = &accounts[i];
            let to = &accounts[(i + 1) % accounts.len()];
            let engine = &engine;
            let barrier = &barrier;
            scope.spawn(move || {
                barrier.wait();
                for _ in 0..200 {
                    // Some transfers may be refused, none may create or destroy money
                    match engine.transfer_money(from, to, dec("0.75")) {
                        Ok(()) | Err(AccountError::InsufficientFunds { .. }) => {}
                        Err(e) => panic!("Unexpected error: {}", e),
                    }
                }
            });
        }
    });

    let total: Decimal = accounts
        .iter()
        .map(|id| {
            let balance = engine.get_balance(id).unwrap();
            assert!(balance >= Decimal::ZERO);
            balance
        })
        .sum();
    assert_eq!(total, dec("250.00"));
}

#[rstest]
fn failed_transfer_leaves_both_balances_untouched(engine: BalanceEngine<InMemoryBalanceStore>) {
    let a = funded(&engine, "10.00");

    assert_eq!(
        engine.transfer_money(&a, "missing", dec("5.00")),
        Err(AccountError::account_not_found("missing"))
    );
    assert_eq!(engine.get_balance(&a).unwrap(), dec("10.00"));

    assert_eq!(
        engine.transfer_money("missing", &a, dec("5.00")),
        Err(AccountError::account_not_found("missing"))
    );
    assert_eq!(engine.get_balance(&a).unwrap(), dec("10.00"));
}

#[test]
fn bounded_transfer_gives_up_while_account_is_busy() {
    let config = EngineConfig::new(Duration::from_millis(1), Some(5));
    let engine = BalanceEngine::with_config(Arc::new(InMemoryBalanceStore::new()), config);
    let a = funded(&engine, "10.00");
    let b = engine.create_account().unwrap();

    let lock = engine.lock_registry().lock_for(&b);
    let _held = lock.lock().unwrap();

    assert_eq!(
        engine.transfer_money(&a, &b, dec("1.00")),
        Err(AccountError::lock_acquisition_timeout(&a, &b, 5))
    );
    assert_eq!(engine.get_balance(&a).unwrap(), dec("10.00"));
}

#[rstest]
fn balance_reads_see_whole_transfers(engine: BalanceEngine<InMemoryBalanceStore>) {
    let a = funded(&engine, "100.00");
    let b = funded(&engine, "100.00");

    thread::scope(|scope| {
        scope.spawn(|| {
            for _ in 0..200 {
                engine.transfer_money(&a, &b, dec("0.50")).unwrap();
                engine.transfer_money(&b, &a, dec("0.50")).unwrap();
            }
        });
        scope.spawn(|| {
            for _ in 0..200 {
                let balance = engine.get_balance(&a).unwrap();
                assert!(balance >= dec("99.50") && balance <= dec("100.00"));
            }
        });
    });
}
