//! Dashboard aggregate sums and the cache refresher.

use chrono::{Duration as ChronoDuration, Utc};
use receivable_service::models::{CreateInvoice, Invoice};
use receivable_service::services::{InMemoryInvoiceStore, InvoiceStore, MockCache};
use receivable_service::workers::refresher::{
    AggregateRefresher, OPEN_MONTH_KEY, OPEN_TOTAL_KEY, SETTLED_MONTH_KEY, SETTLED_TOTAL_KEY,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

async fn seed(store: &InMemoryInvoiceStore, total: i64, settled: bool) {
    store
        .create(&CreateInvoice {
            debtor_id: 1,
            debtor_name: "Debtor".to_string(),
            originating_user_id: 1,
            total_amount: Decimal::new(total, 3),
            settled,
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn sums_split_by_settled_flag() {
    let store = InMemoryInvoiceStore::new();
    seed(&store, 100_000, true).await;
    seed(&store, 200_000, true).await;
    seed(&store, 300_000, false).await;

    assert_eq!(
        store.sum_amount(true, false).await.unwrap(),
        Decimal::new(300_000, 3)
    );
    assert_eq!(
        store.sum_amount(false, false).await.unwrap(),
        Decimal::new(300_000, 3)
    );
}

#[tokio::test]
async fn month_window_excludes_older_invoices() {
    let store = InMemoryInvoiceStore::new();
    seed(&store, 100_000, false).await;

    // A second open invoice dated well before the current month.
    store.seed(Invoice {
        id: 50,
        debtor_id: 2,
        debtor_name: "Old Debtor".to_string(),
        originating_user_id: 1,
        total_amount: Decimal::new(500_000, 3),
        settled: false,
        created_at: Utc::now() - ChronoDuration::days(62),
        settlements: Vec::new(),
    });

    assert_eq!(
        store.sum_amount(false, false).await.unwrap(),
        Decimal::new(600_000, 3)
    );
    assert_eq!(
        store.sum_amount(false, true).await.unwrap(),
        Decimal::new(100_000, 3)
    );
}

#[tokio::test]
async fn empty_ledger_sums_to_zero() {
    let store = InMemoryInvoiceStore::new();
    assert_eq!(store.sum_amount(true, false).await.unwrap(), Decimal::ZERO);
    assert_eq!(store.sum_amount(false, true).await.unwrap(), Decimal::ZERO);
}

#[tokio::test]
async fn refresh_publishes_all_four_keys() {
    let store = Arc::new(InMemoryInvoiceStore::new());
    seed(&store, 100_000, false).await;
    seed(&store, 250_000, true).await;

    let cache = Arc::new(MockCache::new());
    let refresher = AggregateRefresher::new(
        store.clone(),
        cache.clone(),
        Duration::from_secs(10),
        CancellationToken::new(),
    );

    refresher.refresh_once().await.unwrap();

    let expected_open = store.sum_amount(false, false).await.unwrap().to_string();
    let expected_settled = store.sum_amount(true, false).await.unwrap().to_string();

    assert_eq!(cache.get(OPEN_TOTAL_KEY), Some(expected_open.clone()));
    assert_eq!(cache.get(OPEN_MONTH_KEY), Some(expected_open));
    assert_eq!(cache.get(SETTLED_TOTAL_KEY), Some(expected_settled.clone()));
    assert_eq!(cache.get(SETTLED_MONTH_KEY), Some(expected_settled));
}

#[tokio::test]
async fn cache_write_failures_do_not_abort_the_pass() {
    let store = Arc::new(InMemoryInvoiceStore::new());
    seed(&store, 100_000, false).await;

    let cache = Arc::new(MockCache::new());
    cache
        .fail_writes
        .store(true, std::sync::atomic::Ordering::SeqCst);

    let refresher = AggregateRefresher::new(
        store,
        cache.clone(),
        Duration::from_secs(10),
        CancellationToken::new(),
    );

    // All four writes fail; the pass itself still succeeds.
    refresher.refresh_once().await.unwrap();
    assert!(cache.get(OPEN_TOTAL_KEY).is_none());
}
