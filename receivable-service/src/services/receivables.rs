//! Receivable ledger service: settlement lifecycle, dashboard sums, and the
//! report export pipeline.

use crate::models::{
    CreateInvoice, CreateSettlement, Invoice, ListInvoicesFilter, OrderBy, UpdateInvoice,
};
use crate::services::directory::{DirectoryClient, UNKNOWN_USER_ID};
use crate::services::error::ReceivableError;
use crate::services::metrics::{EXPORTS_TOTAL, SETTLEMENTS_TOTAL};
use crate::services::notifier::{Attachment, EmailDispatch, Notifier};
use crate::services::renderer::{ColumnStyle, ReportLayout, ReportRenderer};
use crate::services::InvoiceStore;
use base64::Engine;
use rust_decimal::Decimal;
use service_core::error::AppError;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};

/// Rows fetched per page during the export's full scan.
const EXPORT_PAGE_SIZE: i64 = 100;

const REPORT_TITLE: &str = "Receivables listing";
const EXPORT_EMAIL_SUBJECT: &str = "Report export";
const EXPORT_EMAIL_TEMPLATE: &str = "report-export";
const SEND_EMAIL_EVENT: &str = "send-email";

/// The settlement engine. All invoice mutations funnel through here; the
/// transport layer is glue on top of these methods.
pub struct ReceivableService {
    store: Arc<dyn InvoiceStore>,
    renderer: Arc<dyn ReportRenderer>,
    directory: Arc<dyn DirectoryClient>,
    notifier: Arc<dyn Notifier>,
}

impl ReceivableService {
    pub fn new(
        store: Arc<dyn InvoiceStore>,
        renderer: Arc<dyn ReportRenderer>,
        directory: Arc<dyn DirectoryClient>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            renderer,
            directory,
            notifier,
        }
    }

    #[instrument(skip(self, input), fields(debtor_id = %input.debtor_id))]
    pub async fn create_invoice(&self, input: CreateInvoice) -> Result<Invoice, ReceivableError> {
        Ok(self.store.create(&input).await?)
    }

    #[instrument(skip(self, order, filter))]
    pub async fn find_page(
        &self,
        page: i64,
        size: i64,
        order: OrderBy,
        filter: ListInvoicesFilter,
    ) -> Result<(Vec<Invoice>, i64), ReceivableError> {
        Ok(self.store.find_page(page, size, &order, &filter).await?)
    }

    #[instrument(skip(self))]
    pub async fn find_one(&self, id: i64) -> Result<Option<Invoice>, ReceivableError> {
        Ok(self.store.find_by_id(id).await?)
    }

    /// Full-record replace. The path id and the record id must agree.
    #[instrument(skip(self, input), fields(invoice_id = %id))]
    pub async fn update_invoice(
        &self,
        id: i64,
        input: UpdateInvoice,
    ) -> Result<Invoice, ReceivableError> {
        if input.id != id {
            return Err(ReceivableError::IdMismatch);
        }

        self.store
            .update(&input)
            .await?
            .ok_or(ReceivableError::InvoiceNotFound)
    }

    /// Remove an invoice and its settlements. Deleting an id that does not
    /// exist reports false rather than an error.
    #[instrument(skip(self))]
    pub async fn delete_invoice(&self, id: i64) -> Result<bool, ReceivableError> {
        Ok(self.store.delete(id).await?)
    }

    /// Apply a payment event to an invoice.
    ///
    /// Validates before touching anything: the invoice must exist, must not
    /// already be settled, and the amount must fit both the remaining
    /// balance and the invoice total. The total check looks redundant but
    /// guards against a corrupted negative paid-so-far; both stay.
    #[instrument(skip(self), fields(invoice_id = %invoice_id, amount = %amount_paid))]
    pub async fn settle(
        &self,
        invoice_id: i64,
        settling_user_id: i64,
        amount_paid: Decimal,
    ) -> Result<(), ReceivableError> {
        let invoice = self
            .store
            .find_by_id(invoice_id)
            .await?
            .ok_or(ReceivableError::InvoiceNotFound)?;

        if invoice.settled {
            SETTLEMENTS_TOTAL.with_label_values(&["rejected"]).inc();
            return Err(ReceivableError::AlreadySettled);
        }

        let remaining = invoice.remaining();

        if amount_paid <= Decimal::ZERO
            || amount_paid > remaining
            || amount_paid > invoice.total_amount
        {
            SETTLEMENTS_TOTAL.with_label_values(&["rejected"]).inc();
            return Err(ReceivableError::InvalidAmount);
        }

        self.store
            .append_settlement(&CreateSettlement {
                invoice_id,
                settling_user_id,
                amount_paid,
            })
            .await?;

        if amount_paid == remaining {
            self.store.mark_settled(invoice_id).await?;
            info!(invoice_id = %invoice_id, "Invoice fully settled");
        }

        SETTLEMENTS_TOTAL.with_label_values(&["applied"]).inc();

        Ok(())
    }

    /// Sum of invoice totals by settled flag, optionally current month only.
    #[instrument(skip(self))]
    pub async fn sum_amount(
        &self,
        settled: bool,
        current_month_only: bool,
    ) -> Result<Decimal, ReceivableError> {
        Ok(self.store.sum_amount(settled, current_month_only).await?)
    }

    /// Export the filtered/ordered invoice listing as a PDF and email it to
    /// the requesting user. Every failure in the pipeline is reported as
    /// `PdfExportFailed`; the specific cause only goes to the logs.
    #[instrument(skip(self, order, filter), fields(user_id = %requesting_user_id))]
    pub async fn export(
        &self,
        requesting_user_id: i64,
        order: OrderBy,
        filter: ListInvoicesFilter,
    ) -> Result<(), ReceivableError> {
        match self.export_inner(requesting_user_id, order, filter).await {
            Ok(()) => {
                EXPORTS_TOTAL.with_label_values(&["ok"]).inc();
                Ok(())
            }
            Err(cause) => {
                EXPORTS_TOTAL.with_label_values(&["failed"]).inc();
                tracing::error!(error = %cause, "Report export failed");
                Err(ReceivableError::PdfExportFailed)
            }
        }
    }

    async fn export_inner(
        &self,
        requesting_user_id: i64,
        order: OrderBy,
        filter: ListInvoicesFilter,
    ) -> Result<(), ReceivableError> {
        let mut rows: Vec<Vec<String>> = Vec::new();
        let mut page = 0;

        // Full scan in fixed-size pages; a short page means end of data.
        loop {
            let batch = self
                .store
                .find_summaries(page, EXPORT_PAGE_SIZE, &order, &filter)
                .await?;
            let batch_len = batch.len() as i64;

            rows.extend(batch.into_iter().map(|inv| {
                vec![
                    inv.id.to_string(),
                    format!("{} - {}", format_debtor_code(inv.debtor_id), inv.debtor_name),
                    format_amount(inv.total_amount),
                    if inv.settled { "Yes" } else { "No" }.to_string(),
                ]
            }));

            if batch_len < EXPORT_PAGE_SIZE {
                break;
            }
            page += 1;
        }

        let layout = ReportLayout {
            columns: vec![
                "Code".to_string(),
                "Debtor".to_string(),
                "Total Amount".to_string(),
                "Settled".to_string(),
            ],
            column_styles: HashMap::from([(2, ColumnStyle::Right), (3, ColumnStyle::Center)]),
            rows,
        };

        let file_path = self
            .renderer
            .render(REPORT_TITLE, requesting_user_id, &layout)
            .await
            .map_err(|e| ReceivableError::Store(AppError::InternalError(e)))?;

        let filename = file_path
            .file_name()
            .map(|f| f.to_string_lossy().to_string())
            .unwrap_or_else(|| "report.pdf".to_string());

        let bytes = tokio::fs::read(&file_path)
            .await
            .map_err(|e| ReceivableError::Store(AppError::from(e)))?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);

        let user = self
            .directory
            .lookup(requesting_user_id)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Directory lookup failed");
                ReceivableError::UserDirectoryUnavailable
            })?;

        if user.id == UNKNOWN_USER_ID {
            return Err(ReceivableError::UserNotIdentified);
        }

        let dispatch = EmailDispatch {
            subject: EXPORT_EMAIL_SUBJECT.to_string(),
            to: user.email,
            template: EXPORT_EMAIL_TEMPLATE.to_string(),
            context: serde_json::json!({ "name": user.name }),
            attachments: vec![Attachment {
                filename,
                base64: encoded,
            }],
        };

        self.notifier.send(SEND_EMAIL_EVENT, dispatch);

        info!(user_id = %requesting_user_id, "Report export dispatched");

        Ok(())
    }
}

fn format_debtor_code(id: i64) -> String {
    format!("{:06}", id)
}

fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", amount)
}
