mod common;

use common::*;
use pay_ledger::domain::payment::UpsertOutcome;
use pay_ledger::services::ingest::record_completed_checkout;

// ── 21. concurrent_redeliveries_insert_exactly_once ────────────────────────
// 10 tasks deliver the same session concurrently. The unique constraint and
// the single conditional write mean exactly 1 insert, 9 converging updates.

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_redeliveries_insert_exactly_once() {
    let pool = setup_pool("pay_ledger_test_concurrency").await;

    let mut handles = Vec::new();
    for _ in 0..10 {
        let pool = pool.clone();
        handles.push(tokio::spawn(async move {
            let p = make_payment("cs_race", 1999, "usd", "a@b.com");
            record_completed_checkout(&pool, &p).await.unwrap()
        }));
    }

    let mut created = 0;
    let mut updated = 0;
    for h in handles {
        match h.await.unwrap() {
            UpsertOutcome::Created(_) => created += 1,
            UpsertOutcome::Updated(_) => updated += 1,
        }
    }

    assert_eq!(created, 1, "exactly 1 Created");
    assert_eq!(updated, 9, "9 converging Updates");
    assert_eq!(count_payments(&pool, "cs_race").await, 1);

    let row = get_payment(&pool, "cs_race").await.unwrap();
    assert_eq!(row.status, "completed");
    assert_eq!(row.amount, 1999);
}

// ── 22. concurrent_distinct_sessions_proceed_in_parallel ───────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_distinct_sessions_proceed_in_parallel() {
    let pool = setup_pool("pay_ledger_test_concurrency").await;

    let mut handles = Vec::new();
    for i in 0..8 {
        let pool = pool.clone();
        handles.push(tokio::spawn(async move {
            let session = format!("cs_parallel_{i}");
            let p = make_payment(&session, 100 * (i + 1), "usd", "N/A");
            record_completed_checkout(&pool, &p).await.unwrap()
        }));
    }

    for h in handles {
        assert!(matches!(h.await.unwrap(), UpsertOutcome::Created(_)));
    }

    for i in 0..8 {
        assert_eq!(count_payments(&pool, &format!("cs_parallel_{i}")).await, 1);
    }
}

// ── 23. racing_corrections_converge ────────────────────────────────────────
// Concurrent redeliveries with different amounts: a single row survives and
// its amount is one of the delivered values, never a torn mix.

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_corrections_converge() {
    let pool = setup_pool("pay_ledger_test_concurrency").await;

    let amounts: Vec<i64> = vec![1000, 2000, 3000, 4000, 5000];
    let mut handles = Vec::new();
    for amount in amounts.clone() {
        let pool = pool.clone();
        handles.push(tokio::spawn(async move {
            let p = make_payment("cs_correct", amount, "usd", "a@b.com");
            record_completed_checkout(&pool, &p).await.unwrap()
        }));
    }
    for h in handles {
        h.await.unwrap();
    }

    assert_eq!(count_payments(&pool, "cs_correct").await, 1);
    let row = get_payment(&pool, "cs_correct").await.unwrap();
    assert!(amounts.contains(&row.amount), "got {}", row.amount);
    assert_eq!(row.status, "completed");
}
