//! Invoice CRUD behavior tests against the in-memory store.

use receivable_service::models::{
    CreateInvoice, ListInvoicesFilter, OrderBy, SettlementInput, UpdateInvoice,
};
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

fn create_input(debtor_id: i64, name: &str, total: Decimal) -> CreateInvoice {
    CreateInvoice {
        debtor_id,
        debtor_name: name.to_string(),
        originating_user_id: 1,
        total_amount: total,
        settled: false,
    }
}

#[tokio::test]
async fn create_assigns_id_and_starts_without_settlements() {
    let store = Arc::new(InMemoryInvoiceStore::new());
    let svc = service(store.clone());

    let invoice = svc
        .create_invoice(create_input(7, "Acme Freight", Decimal::new(500_000, 3)))
        .await
        .unwrap();

    assert!(invoice.id > 0);
    assert!(!invoice.settled);
    assert!(invoice.settlements.is_empty());
    assert_eq!(invoice.remaining(), invoice.total_amount);

    let found = store.find_by_id(invoice.id).await.unwrap().unwrap();
    assert_eq!(found.debtor_name, "Acme Freight");
}

#[tokio::test]
async fn update_with_mismatched_id_changes_nothing() {
    let store = Arc::new(InMemoryInvoiceStore::new());
    let svc = service(store.clone());

    let invoice = svc
        .create_invoice(create_input(7, "Acme Freight", Decimal::new(500_000, 3)))
        .await
        .unwrap();

    let err = svc
        .update_invoice(
            invoice.id + 1,
            UpdateInvoice {
                id: invoice.id,
                debtor_id: 9,
                debtor_name: "Renamed".to_string(),
                originating_user_id: 1,
                total_amount: Decimal::new(1_000, 3),
                settled: true,
                settlements: Vec::new(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ReceivableError::IdMismatch));

    let unchanged = store.find_by_id(invoice.id).await.unwrap().unwrap();
    assert_eq!(unchanged.debtor_name, "Acme Freight");
    assert!(!unchanged.settled);
}

#[tokio::test]
async fn update_on_missing_invoice_is_not_found() {
    let store = Arc::new(InMemoryInvoiceStore::new());
    let svc = service(store);

    let err = svc
        .update_invoice(
            41,
            UpdateInvoice {
                id: 41,
                debtor_id: 9,
                debtor_name: "Ghost".to_string(),
                originating_user_id: 1,
                total_amount: Decimal::new(1_000, 3),
                settled: false,
                settlements: Vec::new(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ReceivableError::InvoiceNotFound));
}

#[tokio::test]
async fn update_replaces_record_and_settlement_set() {
    let store = Arc::new(InMemoryInvoiceStore::new());
    let svc = service(store.clone());

    let invoice = svc
        .create_invoice(create_input(7, "Acme Freight", Decimal::new(300_000, 3)))
        .await
        .unwrap();
    svc.settle(invoice.id, 1, Decimal::new(100_000, 3))
        .await
        .unwrap();

    let existing = store.find_by_id(invoice.id).await.unwrap().unwrap();
    let kept = &existing.settlements[0];

    let updated = svc
        .update_invoice(
            invoice.id,
            UpdateInvoice {
                id: invoice.id,
                debtor_id: 8,
                debtor_name: "Acme Freight Ltd".to_string(),
                originating_user_id: 2,
                total_amount: Decimal::new(400_000, 3),
                settled: false,
                settlements: vec![
                    SettlementInput {
                        id: Some(kept.id),
                        settling_user_id: kept.settling_user_id,
                        amount_paid: Decimal::new(120_000, 3),
                    },
                    SettlementInput {
                        id: None,
                        settling_user_id: 5,
                        amount_paid: Decimal::new(80_000, 3),
                    },
                ],
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.debtor_name, "Acme Freight Ltd");
    assert_eq!(updated.total_amount, Decimal::new(400_000, 3));
    assert_eq!(updated.settlements.len(), 2);
    assert_eq!(updated.settlements[0].id, kept.id);
    assert_eq!(updated.settlements[0].amount_paid, Decimal::new(120_000, 3));
    assert!(updated.settlements[1].id > kept.id);
    // created_at survives the replace.
    assert_eq!(updated.created_at, invoice.created_at);
}

#[tokio::test]
async fn update_prunes_settlements_absent_from_input() {
    let store = Arc::new(InMemoryInvoiceStore::new());
    let svc = service(store.clone());

    let invoice = svc
        .create_invoice(create_input(7, "Acme Freight", Decimal::new(300_000, 3)))
        .await
        .unwrap();
    svc.settle(invoice.id, 1, Decimal::new(50_000, 3)).await.unwrap();
    svc.settle(invoice.id, 1, Decimal::new(60_000, 3)).await.unwrap();

    let updated = svc
        .update_invoice(
            invoice.id,
            UpdateInvoice {
                id: invoice.id,
                debtor_id: 7,
                debtor_name: "Acme Freight".to_string(),
                originating_user_id: 1,
                total_amount: Decimal::new(300_000, 3),
                settled: false,
                settlements: Vec::new(),
            },
        )
        .await
        .unwrap();

    assert!(updated.settlements.is_empty());
}

#[tokio::test]
async fn delete_reports_absence_instead_of_failing() {
    let store = Arc::new(InMemoryInvoiceStore::new());
    let svc = service(store.clone());

    let invoice = svc
        .create_invoice(create_input(7, "Acme Freight", Decimal::new(100_000, 3)))
        .await
        .unwrap();

    assert!(svc.delete_invoice(invoice.id).await.unwrap());
    assert!(!svc.delete_invoice(invoice.id).await.unwrap());
    assert!(store.find_by_id(invoice.id).await.unwrap().is_none());
}

#[tokio::test]
async fn listing_does_not_load_settlements_but_find_one_does() {
    let store = Arc::new(InMemoryInvoiceStore::new());
    let svc = service(store);

    let invoice = svc
        .create_invoice(create_input(7, "Acme Freight", Decimal::new(300_000, 3)))
        .await
        .unwrap();
    svc.settle(invoice.id, 1, Decimal::new(100_000, 3))
        .await
        .unwrap();

    let (page, count) = svc
        .find_page(0, 20, OrderBy::default(), ListInvoicesFilter::default())
        .await
        .unwrap();
    assert_eq!(count, 1);
    assert!(page[0].settlements.is_empty());

    let full = svc.find_one(invoice.id).await.unwrap().unwrap();
    assert_eq!(full.settlements.len(), 1);
}
