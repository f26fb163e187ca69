//! Settlement lifecycle tests against the in-memory store.

use receivable_service::models::CreateInvoice;
use receivable_service::services::{
    InMemoryInvoiceStore, InvoiceStore, MockDirectory, MockNotifier, MockRenderer,
    ReceivableError, ReceivableService,
};
use rust_decimal::Decimal;
use std::sync::Arc;

fn service(store: Arc<InMemoryInvoiceStore>) -> ReceivableService {
    ReceivableService::new(
        store,
        Arc::new(MockRenderer::new()),
        Arc::new(MockDirectory::new()),
        Arc::new(MockNotifier::new()),
    )
}

fn amount(units: i64, scale: u32) -> Decimal {
    Decimal::new(units, scale)
}

async fn seed_invoice(store: &InMemoryInvoiceStore, total: Decimal) -> i64 {
    store
        .create(&CreateInvoice {
            debtor_id: 7,
            debtor_name: "Acme Freight".to_string(),
            originating_user_id: 1,
            total_amount: total,
            settled: false,
        })
        .await
        .expect("seed invoice")
        .id
}

#[tokio::test]
async fn settling_unknown_invoice_is_not_found() {
    let store = Arc::new(InMemoryInvoiceStore::new());
    let svc = service(store);

    let err = svc.settle(999, 1, amount(10_000, 3)).await.unwrap_err();
    assert!(matches!(err, ReceivableError::InvoiceNotFound));
}

#[tokio::test]
async fn payment_above_remaining_balance_is_rejected() {
    let store = Arc::new(InMemoryInvoiceStore::new());
    let id = seed_invoice(&store, amount(150_000, 3)).await;
    let svc = service(store.clone());

    // 150.001 against a 150.000 invoice.
    let err = svc.settle(id, 1, amount(150_001, 3)).await.unwrap_err();
    assert!(matches!(err, ReceivableError::InvalidAmount));

    let invoice = store.find_by_id(id).await.unwrap().unwrap();
    assert!(invoice.settlements.is_empty());
    assert!(!invoice.settled);
}

#[tokio::test]
async fn zero_and_negative_payments_are_rejected() {
    let store = Arc::new(InMemoryInvoiceStore::new());
    let id = seed_invoice(&store, amount(100_000, 3)).await;
    let svc = service(store);

    let err = svc.settle(id, 1, Decimal::ZERO).await.unwrap_err();
    assert!(matches!(err, ReceivableError::InvalidAmount));

    let err = svc.settle(id, 1, amount(-5_000, 3)).await.unwrap_err();
    assert!(matches!(err, ReceivableError::InvalidAmount));
}

#[tokio::test]
async fn exact_payment_flips_invoice_to_settled() {
    let store = Arc::new(InMemoryInvoiceStore::new());
    let id = seed_invoice(&store, amount(150_000, 3)).await;
    let svc = service(store.clone());

    svc.settle(id, 42, amount(150_000, 3)).await.unwrap();

    let invoice = store.find_by_id(id).await.unwrap().unwrap();
    assert!(invoice.settled);
    assert_eq!(invoice.settlements.len(), 1);
    assert_eq!(invoice.settlements[0].settling_user_id, 42);
    assert_eq!(invoice.remaining(), Decimal::ZERO);
}

#[tokio::test]
async fn partial_payments_accumulate_until_settled() {
    let store = Arc::new(InMemoryInvoiceStore::new());
    let id = seed_invoice(&store, amount(150_000, 3)).await;
    let svc = service(store.clone());

    svc.settle(id, 1, amount(100_000, 3)).await.unwrap();

    let invoice = store.find_by_id(id).await.unwrap().unwrap();
    assert!(!invoice.settled);
    assert_eq!(invoice.remaining(), amount(50_000, 3));

    svc.settle(id, 1, amount(50_000, 3)).await.unwrap();

    let invoice = store.find_by_id(id).await.unwrap().unwrap();
    assert!(invoice.settled);
    assert_eq!(invoice.settlements.len(), 2);
    assert_eq!(invoice.paid_so_far(), invoice.total_amount);

    // Nothing more can be applied once settled, however small.
    let err = svc.settle(id, 1, amount(1, 3)).await.unwrap_err();
    assert!(matches!(err, ReceivableError::AlreadySettled));
}

#[tokio::test]
async fn payment_above_remaining_but_below_total_is_rejected() {
    let store = Arc::new(InMemoryInvoiceStore::new());
    let id = seed_invoice(&store, amount(200_000, 3)).await;
    let svc = service(store.clone());

    svc.settle(id, 1, amount(150_000, 3)).await.unwrap();

    // 100 < total 200, but remaining is only 50.
    let err = svc.settle(id, 1, amount(100_000, 3)).await.unwrap_err();
    assert!(matches!(err, ReceivableError::InvalidAmount));

    let invoice = store.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(invoice.settlements.len(), 1);
    assert!(invoice.paid_so_far() <= invoice.total_amount);
}
