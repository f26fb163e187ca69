//! Invoice model for receivable-service.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::settlement::{Settlement, SettlementInput};

/// A receivable: money owed by a debtor, reduced by settlements until the
/// remaining balance reaches zero and the record flips to settled.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Invoice {
    pub id: i64,
    pub debtor_id: i64,
    pub debtor_name: String,
    pub originating_user_id: i64,
    pub total_amount: Decimal,
    pub settled: bool,
    pub created_at: DateTime<Utc>,
    #[sqlx(skip)]
    #[serde(default)]
    pub settlements: Vec<Settlement>,
}

impl Invoice {
    /// Sum of all recorded settlement amounts.
    pub fn paid_so_far(&self) -> Decimal {
        self.settlements.iter().map(|s| s.amount_paid).sum()
    }

    /// Outstanding balance still owed on this invoice.
    pub fn remaining(&self) -> Decimal {
        self.total_amount - self.paid_so_far()
    }
}

/// Minimal projection used by the report export scan.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct InvoiceSummary {
    pub id: i64,
    pub debtor_id: i64,
    pub debtor_name: String,
    pub total_amount: Decimal,
    pub settled: bool,
}

/// Input for creating an invoice. Settlements always start empty.
#[derive(Debug, Clone)]
pub struct CreateInvoice {
    pub debtor_id: i64,
    pub debtor_name: String,
    pub originating_user_id: i64,
    pub total_amount: Decimal,
    pub settled: bool,
}

/// Input for a full-record replace, including the inline settlement set.
/// `created_at` is never supplied; it is immutable after creation.
#[derive(Debug, Clone)]
pub struct UpdateInvoice {
    pub id: i64,
    pub debtor_id: i64,
    pub debtor_name: String,
    pub originating_user_id: i64,
    pub total_amount: Decimal,
    pub settled: bool,
    pub settlements: Vec<SettlementInput>,
}

/// Conjunctive filter for listing and exporting invoices.
#[derive(Debug, Clone, Default)]
pub struct ListInvoicesFilter {
    pub debtor_id: Option<i64>,
    pub settled: Option<bool>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
}

/// Whitelist of sortable columns. Ordering always tie-breaks on id so that
/// page-by-page scans are stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderColumn {
    Id,
    DebtorId,
    DebtorName,
    TotalAmount,
    Settled,
    CreatedAt,
}

impl OrderColumn {
    pub fn as_sql(&self) -> &'static str {
        match self {
            OrderColumn::Id => "id",
            OrderColumn::DebtorId => "debtor_id",
            OrderColumn::DebtorName => "debtor_name",
            OrderColumn::TotalAmount => "total_amount",
            OrderColumn::Settled => "settled",
            OrderColumn::CreatedAt => "created_at",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "debtor_id" => OrderColumn::DebtorId,
            "debtor_name" => OrderColumn::DebtorName,
            "total_amount" => OrderColumn::TotalAmount,
            "settled" => OrderColumn::Settled,
            "created_at" => OrderColumn::CreatedAt,
            _ => OrderColumn::Id,
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderDirection {
    Asc,
    Desc,
}

impl OrderDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            OrderDirection::Asc => "ASC",
            OrderDirection::Desc => "DESC",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "desc" => OrderDirection::Desc,
            _ => OrderDirection::Asc,
        }
    }
}

/// Column/direction pair applied to list and export queries.
#[derive(Debug, Clone, Copy)]
pub struct OrderBy {
    pub column: OrderColumn,
    pub direction: OrderDirection,
}

impl Default for OrderBy {
    fn default() -> Self {
        Self {
            column: OrderColumn::Id,
            direction: OrderDirection::Asc,
        }
    }
}
