//! Report export pipeline tests: scan, layout, rendering, and dispatch.

use base64::Engine;
use receivable_service::models::{CreateInvoice, ListInvoicesFilter, OrderBy};
use receivable_service::services::{
    ColumnStyle, InMemoryInvoiceStore, InvoiceStore, MockDirectory, MockNotifier, MockRenderer,
    ReceivableError, ReceivableService,
};
use rust_decimal::Decimal;
use std::sync::Arc;

struct ExportFixture {
    store: Arc<InMemoryInvoiceStore>,
    renderer: Arc<MockRenderer>,
    notifier: Arc<MockNotifier>,
    service: ReceivableService,
}

fn fixture(directory: MockDirectory) -> ExportFixture {
    let store = Arc::new(InMemoryInvoiceStore::new());
    let renderer = Arc::new(MockRenderer::new());
    let notifier = Arc::new(MockNotifier::new());
    let service = ReceivableService::new(
        store.clone(),
        renderer.clone(),
        Arc::new(directory),
        notifier.clone(),
    );
    ExportFixture {
        store,
        renderer,
        notifier,
        service,
    }
}

async fn seed(store: &InMemoryInvoiceStore, n: usize) {
    for i in 1..=n as i64 {
        store
            .create(&CreateInvoice {
                debtor_id: i,
                debtor_name: format!("Debtor {}", i),
                originating_user_id: 1,
                total_amount: Decimal::new(i * 1_000, 3),
                settled: i % 2 == 0,
            })
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn export_scans_past_the_page_size() {
    let fx = fixture(MockDirectory::new().with_user(9, "Ana", "ana@example.com"));
    seed(&fx.store, 250).await;

    fx.service
        .export(9, OrderBy::default(), ListInvoicesFilter::default())
        .await
        .unwrap();

    let rendered = fx.renderer.rendered.lock().unwrap();
    assert_eq!(rendered.len(), 1);
    assert_eq!(rendered[0].rows.len(), 250);
}

#[tokio::test]
async fn export_handles_a_row_count_on_the_page_boundary() {
    let fx = fixture(MockDirectory::new().with_user(9, "Ana", "ana@example.com"));
    seed(&fx.store, 100).await;

    fx.service
        .export(9, OrderBy::default(), ListInvoicesFilter::default())
        .await
        .unwrap();

    let rendered = fx.renderer.rendered.lock().unwrap();
    assert_eq!(rendered[0].rows.len(), 100);
}

#[tokio::test]
async fn export_formats_rows_and_styles_columns() {
    let fx = fixture(MockDirectory::new().with_user(9, "Ana", "ana@example.com"));
    fx.store
        .create(&CreateInvoice {
            debtor_id: 42,
            debtor_name: "Acme Freight".to_string(),
            originating_user_id: 1,
            total_amount: Decimal::new(1_234_500, 3),
            settled: false,
        })
        .await
        .unwrap();

    fx.service
        .export(9, OrderBy::default(), ListInvoicesFilter::default())
        .await
        .unwrap();

    let rendered = fx.renderer.rendered.lock().unwrap();
    let layout = &rendered[0];

    assert_eq!(
        layout.columns,
        vec!["Code", "Debtor", "Total Amount", "Settled"]
    );
    assert_eq!(layout.column_styles.get(&2), Some(&ColumnStyle::Right));
    assert_eq!(layout.column_styles.get(&3), Some(&ColumnStyle::Center));
    assert_eq!(
        layout.rows[0],
        vec!["1", "000042 - Acme Freight", "1234.50", "No"]
    );
}

#[tokio::test]
async fn export_emails_the_rendered_report() {
    let fx = fixture(MockDirectory::new().with_user(9, "Ana", "ana@example.com"));
    seed(&fx.store, 3).await;

    fx.service
        .export(9, OrderBy::default(), ListInvoicesFilter::default())
        .await
        .unwrap();

    let sent = fx.notifier.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);

    let (event, dispatch) = &sent[0];
    assert_eq!(event, "send-email");
    assert_eq!(dispatch.to, "ana@example.com");
    assert_eq!(dispatch.context["name"], "Ana");
    assert_eq!(dispatch.attachments.len(), 1);
    assert!(dispatch.attachments[0].filename.ends_with(".pdf"));

    // The attachment decodes back to the bytes the renderer wrote.
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(&dispatch.attachments[0].base64)
        .unwrap();
    assert!(!bytes.is_empty());
}

#[tokio::test]
async fn export_of_an_empty_ledger_still_sends() {
    let fx = fixture(MockDirectory::new().with_user(9, "Ana", "ana@example.com"));

    fx.service
        .export(9, OrderBy::default(), ListInvoicesFilter::default())
        .await
        .unwrap();

    assert_eq!(fx.renderer.rendered.lock().unwrap()[0].rows.len(), 0);
    assert_eq!(fx.notifier.sent.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn unidentified_requesting_user_fails_the_export() {
    // Directory is reachable but has no such user; it answers with the
    // sentinel record.
    let fx = fixture(MockDirectory::new());
    seed(&fx.store, 1).await;

    let err = fx
        .service
        .export(123, OrderBy::default(), ListInvoicesFilter::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ReceivableError::PdfExportFailed));
    assert!(fx.notifier.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unreachable_directory_fails_the_export() {
    let fx = fixture(MockDirectory::failing());
    seed(&fx.store, 1).await;

    let err = fx
        .service
        .export(9, OrderBy::default(), ListInvoicesFilter::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ReceivableError::PdfExportFailed));
}

#[tokio::test]
async fn renderer_failure_fails_the_export() {
    let store = Arc::new(InMemoryInvoiceStore::new());
    let notifier = Arc::new(MockNotifier::new());
    let service = ReceivableService::new(
        store.clone(),
        Arc::new(MockRenderer::failing()),
        Arc::new(MockDirectory::new().with_user(9, "Ana", "ana@example.com")),
        notifier.clone(),
    );
    seed(&store, 1).await;

    let err = service
        .export(9, OrderBy::default(), ListInvoicesFilter::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ReceivableError::PdfExportFailed));
    assert!(notifier.sent.lock().unwrap().is_empty());
}
