//! Settlement model for receivable-service.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A single payment event against an invoice. Owned by its invoice: deleting
/// the invoice cascades here, and rows are only ever appended through the
/// settlement operation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Settlement {
    pub id: i64,
    pub invoice_id: i64,
    pub settling_user_id: i64,
    pub amount_paid: Decimal,
    pub recorded_at: DateTime<Utc>,
}

/// Input for appending a settlement; the store assigns id and timestamp.
#[derive(Debug, Clone)]
pub struct CreateSettlement {
    pub invoice_id: i64,
    pub settling_user_id: i64,
    pub amount_paid: Decimal,
}

/// Settlement row supplied inline with a full-record invoice update.
/// `id: None` means insert; an existing id means update in place. Rows
/// omitted from the update are removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementInput {
    pub id: Option<i64>,
    pub settling_user_id: i64,
    pub amount_paid: Decimal,
}
