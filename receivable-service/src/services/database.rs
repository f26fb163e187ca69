//! Database service for receivable-service.
//!
//! `InvoiceStore` is the seam between the settlement engine and durable
//! storage: a Postgres-backed `Database` in production and an
//! `InMemoryInvoiceStore` double for tests.

use crate::models::{
    CreateInvoice, CreateSettlement, Invoice, InvoiceSummary, ListInvoicesFilter, OrderBy,
    OrderColumn, OrderDirection, Settlement, UpdateInvoice,
};
use crate::services::metrics::DB_QUERY_DURATION;
use async_trait::async_trait;
use chrono::{Datelike, TimeZone, Utc};
use rust_decimal::Decimal;
use service_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{info, instrument};

/// Durable CRUD and query access to invoices and their settlements.
#[async_trait]
pub trait InvoiceStore: Send + Sync {
    /// Persist a new invoice with an empty settlement set.
    async fn create(&self, input: &CreateInvoice) -> Result<Invoice, AppError>;

    /// Load an invoice with its settlements.
    async fn find_by_id(&self, id: i64) -> Result<Option<Invoice>, AppError>;

    /// One page of invoices (settlements not loaded) plus the total matching
    /// count. Offset is `page * size`; ordering tie-breaks on id.
    async fn find_page(
        &self,
        page: i64,
        size: i64,
        order: &OrderBy,
        filter: &ListInvoicesFilter,
    ) -> Result<(Vec<Invoice>, i64), AppError>;

    /// One page of export projections in the same order/filter as `find_page`.
    async fn find_summaries(
        &self,
        page: i64,
        size: i64,
        order: &OrderBy,
        filter: &ListInvoicesFilter,
    ) -> Result<Vec<InvoiceSummary>, AppError>;

    /// Full-record replace by id, including the inline settlement set.
    /// Returns `None` when no invoice with that id exists.
    async fn update(&self, input: &UpdateInvoice) -> Result<Option<Invoice>, AppError>;

    /// Remove an invoice and its settlements. True when exactly one row went.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    /// Sum of `total_amount` over invoices with the given settled flag,
    /// optionally restricted to the current calendar month. Zero when no
    /// rows match, never absent.
    async fn sum_amount(&self, settled: bool, current_month_only: bool)
        -> Result<Decimal, AppError>;

    /// Append a settlement row to its invoice.
    async fn append_settlement(&self, input: &CreateSettlement) -> Result<Settlement, AppError>;

    /// Flip `settled` to true without rewriting the rest of the record.
    async fn mark_settled(&self, invoice_id: i64) -> Result<(), AppError>;
}

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "receivable-service"))]
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check database health.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }

    async fn load_settlements(&self, invoice_id: i64) -> Result<Vec<Settlement>, AppError> {
        sqlx::query_as::<_, Settlement>(
            r#"
            SELECT id, invoice_id, settling_user_id, amount_paid, recorded_at
            FROM invoice_settlement
            WHERE invoice_id = $1
            ORDER BY id
            "#,
        )
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to load settlements: {}", e)))
    }
}

// Filter binds follow the `($n IS NULL OR col = $n)` pattern so one statement
// covers every filter combination.
const INVOICE_FILTER_SQL: &str = "($1::bigint IS NULL OR debtor_id = $1) \
       AND ($2::bool IS NULL OR settled = $2) \
       AND ($3::timestamptz IS NULL OR created_at >= $3) \
       AND ($4::timestamptz IS NULL OR created_at <= $4)";

#[async_trait]
impl InvoiceStore for Database {
    #[instrument(skip(self, input), fields(debtor_id = %input.debtor_id))]
    async fn create(&self, input: &CreateInvoice) -> Result<Invoice, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_invoice"])
            .start_timer();

        let invoice = sqlx::query_as::<_, Invoice>(
            r#"
            INSERT INTO invoice (debtor_id, debtor_name, originating_user_id, total_amount, settled)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, debtor_id, debtor_name, originating_user_id, total_amount, settled, created_at
            "#,
        )
        .bind(input.debtor_id)
        .bind(&input.debtor_name)
        .bind(input.originating_user_id)
        .bind(input.total_amount)
        .bind(input.settled)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to create invoice: {}", e)))?;

        timer.observe_duration();

        info!(invoice_id = %invoice.id, total_amount = %invoice.total_amount, "Invoice created");

        Ok(invoice)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> Result<Option<Invoice>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["find_invoice"])
            .start_timer();

        let invoice = sqlx::query_as::<_, Invoice>(
            r#"
            SELECT id, debtor_id, debtor_name, originating_user_id, total_amount, settled, created_at
            FROM invoice
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get invoice: {}", e)))?;

        let invoice = match invoice {
            Some(mut invoice) => {
                invoice.settlements = self.load_settlements(invoice.id).await?;
                Some(invoice)
            }
            None => None,
        };

        timer.observe_duration();

        Ok(invoice)
    }

    #[instrument(skip(self, order, filter))]
    async fn find_page(
        &self,
        page: i64,
        size: i64,
        order: &OrderBy,
        filter: &ListInvoicesFilter,
    ) -> Result<(Vec<Invoice>, i64), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_invoices"])
            .start_timer();

        let size = size.clamp(1, 100);
        let offset = page.max(0) * size;

        let list_sql = format!(
            "SELECT id, debtor_id, debtor_name, originating_user_id, total_amount, settled, created_at \
             FROM invoice \
             WHERE {INVOICE_FILTER_SQL} \
             ORDER BY {} {}, id ASC \
             OFFSET $5 LIMIT $6",
            order.column.as_sql(),
            order.direction.as_sql(),
        );

        let invoices = sqlx::query_as::<_, Invoice>(&list_sql)
            .bind(filter.debtor_id)
            .bind(filter.settled)
            .bind(filter.created_from)
            .bind(filter.created_to)
            .bind(offset)
            .bind(size)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to list invoices: {}", e))
            })?;

        let count_sql = format!("SELECT COUNT(*) FROM invoice WHERE {INVOICE_FILTER_SQL}");
        let count = sqlx::query_scalar::<_, i64>(&count_sql)
            .bind(filter.debtor_id)
            .bind(filter.settled)
            .bind(filter.created_from)
            .bind(filter.created_to)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to count invoices: {}", e))
            })?;

        timer.observe_duration();

        Ok((invoices, count))
    }

    #[instrument(skip(self, order, filter))]
    async fn find_summaries(
        &self,
        page: i64,
        size: i64,
        order: &OrderBy,
        filter: &ListInvoicesFilter,
    ) -> Result<Vec<InvoiceSummary>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["export_scan"])
            .start_timer();

        let offset = page.max(0) * size;

        let sql = format!(
            "SELECT id, debtor_id, debtor_name, total_amount, settled \
             FROM invoice \
             WHERE {INVOICE_FILTER_SQL} \
             ORDER BY {} {}, id ASC \
             OFFSET $5 LIMIT $6",
            order.column.as_sql(),
            order.direction.as_sql(),
        );

        let rows = sqlx::query_as::<_, InvoiceSummary>(&sql)
            .bind(filter.debtor_id)
            .bind(filter.settled)
            .bind(filter.created_from)
            .bind(filter.created_to)
            .bind(offset)
            .bind(size)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to scan invoices: {}", e))
            })?;

        timer.observe_duration();

        Ok(rows)
    }

    #[instrument(skip(self, input), fields(invoice_id = %input.id))]
    async fn update(&self, input: &UpdateInvoice) -> Result<Option<Invoice>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_invoice"])
            .start_timer();

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to begin transaction: {}", e))
        })?;

        let updated = sqlx::query_as::<_, Invoice>(
            r#"
            UPDATE invoice
            SET debtor_id = $2,
                debtor_name = $3,
                originating_user_id = $4,
                total_amount = $5,
                settled = $6
            WHERE id = $1
            RETURNING id, debtor_id, debtor_name, originating_user_id, total_amount, settled, created_at
            "#,
        )
        .bind(input.id)
        .bind(input.debtor_id)
        .bind(&input.debtor_name)
        .bind(input.originating_user_id)
        .bind(input.total_amount)
        .bind(input.settled)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to update invoice: {}", e)))?;

        let Some(mut invoice) = updated else {
            tx.rollback().await.ok();
            timer.observe_duration();
            return Ok(None);
        };

        // Cascade the inline settlement set: rows absent from the update are
        // orphans and get removed, the rest are updated or inserted.
        let kept_ids: Vec<i64> = input.settlements.iter().filter_map(|s| s.id).collect();
        sqlx::query("DELETE FROM invoice_settlement WHERE invoice_id = $1 AND id <> ALL($2)")
            .bind(input.id)
            .bind(&kept_ids)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to prune settlements: {}", e))
            })?;

        for settlement in &input.settlements {
            match settlement.id {
                Some(settlement_id) => {
                    sqlx::query(
                        r#"
                        UPDATE invoice_settlement
                        SET settling_user_id = $3, amount_paid = $4
                        WHERE id = $1 AND invoice_id = $2
                        "#,
                    )
                    .bind(settlement_id)
                    .bind(input.id)
                    .bind(settlement.settling_user_id)
                    .bind(settlement.amount_paid)
                    .execute(&mut *tx)
                    .await
                }
                None => {
                    sqlx::query(
                        r#"
                        INSERT INTO invoice_settlement (invoice_id, settling_user_id, amount_paid)
                        VALUES ($1, $2, $3)
                        "#,
                    )
                    .bind(input.id)
                    .bind(settlement.settling_user_id)
                    .bind(settlement.amount_paid)
                    .execute(&mut *tx)
                    .await
                }
            }
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to write settlement: {}", e))
            })?;
        }

        tx.commit().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to commit update: {}", e))
        })?;

        invoice.settlements = self.load_settlements(invoice.id).await?;

        timer.observe_duration();

        info!(invoice_id = %invoice.id, "Invoice replaced");

        Ok(Some(invoice))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["delete_invoice"])
            .start_timer();

        let result = sqlx::query("DELETE FROM invoice WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to delete invoice: {}", e))
            })?;

        timer.observe_duration();

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self))]
    async fn sum_amount(
        &self,
        settled: bool,
        current_month_only: bool,
    ) -> Result<Decimal, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["sum_amount"])
            .start_timer();

        let total = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(total_amount), 0)
            FROM invoice
            WHERE settled = $1
              AND ($2::bool = FALSE OR created_at >= date_trunc('month', CURRENT_DATE))
            "#,
        )
        .bind(settled)
        .bind(current_month_only)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to sum invoices: {}", e)))?;

        timer.observe_duration();

        Ok(total)
    }

    #[instrument(skip(self, input), fields(invoice_id = %input.invoice_id))]
    async fn append_settlement(&self, input: &CreateSettlement) -> Result<Settlement, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["append_settlement"])
            .start_timer();

        let settlement = sqlx::query_as::<_, Settlement>(
            r#"
            INSERT INTO invoice_settlement (invoice_id, settling_user_id, amount_paid)
            VALUES ($1, $2, $3)
            RETURNING id, invoice_id, settling_user_id, amount_paid, recorded_at
            "#,
        )
        .bind(input.invoice_id)
        .bind(input.settling_user_id)
        .bind(input.amount_paid)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to append settlement: {}", e))
        })?;

        timer.observe_duration();

        info!(
            settlement_id = %settlement.id,
            invoice_id = %settlement.invoice_id,
            amount_paid = %settlement.amount_paid,
            "Settlement recorded"
        );

        Ok(settlement)
    }

    #[instrument(skip(self))]
    async fn mark_settled(&self, invoice_id: i64) -> Result<(), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["mark_settled"])
            .start_timer();

        sqlx::query("UPDATE invoice SET settled = TRUE WHERE id = $1")
            .bind(invoice_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to mark invoice settled: {}", e))
            })?;

        timer.observe_duration();

        info!(invoice_id = %invoice_id, "Invoice marked settled");

        Ok(())
    }
}

#[derive(Default)]
struct InMemoryState {
    next_invoice_id: i64,
    next_settlement_id: i64,
    invoices: BTreeMap<i64, Invoice>,
}

/// In-memory stand-in for `Database`, used by the test suite.
#[derive(Default)]
pub struct InMemoryInvoiceStore {
    state: std::sync::Mutex<InMemoryState>,
}

impl InMemoryInvoiceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an invoice as-is, keeping its timestamps. Test seeding only.
    pub fn seed(&self, invoice: Invoice) {
        let mut state = self.state.lock().expect("in-memory store mutex poisoned");
        state.next_invoice_id = state.next_invoice_id.max(invoice.id);
        let max_settlement = invoice.settlements.iter().map(|s| s.id).max().unwrap_or(0);
        state.next_settlement_id = state.next_settlement_id.max(max_settlement);
        state.invoices.insert(invoice.id, invoice);
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, InMemoryState>, AppError> {
        self.state
            .lock()
            .map_err(|e| AppError::InternalError(anyhow::anyhow!("store mutex poisoned: {}", e)))
    }

    fn matches(invoice: &Invoice, filter: &ListInvoicesFilter) -> bool {
        if let Some(debtor_id) = filter.debtor_id {
            if invoice.debtor_id != debtor_id {
                return false;
            }
        }
        if let Some(settled) = filter.settled {
            if invoice.settled != settled {
                return false;
            }
        }
        if let Some(from) = filter.created_from {
            if invoice.created_at < from {
                return false;
            }
        }
        if let Some(to) = filter.created_to {
            if invoice.created_at > to {
                return false;
            }
        }
        true
    }

    fn compare(a: &Invoice, b: &Invoice, order: &OrderBy) -> Ordering {
        let ordering = match order.column {
            OrderColumn::Id => a.id.cmp(&b.id),
            OrderColumn::DebtorId => a.debtor_id.cmp(&b.debtor_id),
            OrderColumn::DebtorName => a.debtor_name.cmp(&b.debtor_name),
            OrderColumn::TotalAmount => a.total_amount.cmp(&b.total_amount),
            OrderColumn::Settled => a.settled.cmp(&b.settled),
            OrderColumn::CreatedAt => a.created_at.cmp(&b.created_at),
        };
        let ordering = match order.direction {
            OrderDirection::Asc => ordering,
            OrderDirection::Desc => ordering.reverse(),
        };
        // Stable tie-break on id, always ascending.
        ordering.then(a.id.cmp(&b.id))
    }

    fn sorted_matches(
        state: &InMemoryState,
        order: &OrderBy,
        filter: &ListInvoicesFilter,
    ) -> Vec<Invoice> {
        let mut rows: Vec<Invoice> = state
            .invoices
            .values()
            .filter(|inv| Self::matches(inv, filter))
            .cloned()
            .collect();
        rows.sort_by(|a, b| Self::compare(a, b, order));
        rows
    }
}

#[async_trait]
impl InvoiceStore for InMemoryInvoiceStore {
    async fn create(&self, input: &CreateInvoice) -> Result<Invoice, AppError> {
        let mut state = self.lock()?;
        state.next_invoice_id += 1;
        let invoice = Invoice {
            id: state.next_invoice_id,
            debtor_id: input.debtor_id,
            debtor_name: input.debtor_name.clone(),
            originating_user_id: input.originating_user_id,
            total_amount: input.total_amount,
            settled: input.settled,
            created_at: Utc::now(),
            settlements: Vec::new(),
        };
        state.invoices.insert(invoice.id, invoice.clone());
        Ok(invoice)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Invoice>, AppError> {
        let state = self.lock()?;
        Ok(state.invoices.get(&id).cloned())
    }

    async fn find_page(
        &self,
        page: i64,
        size: i64,
        order: &OrderBy,
        filter: &ListInvoicesFilter,
    ) -> Result<(Vec<Invoice>, i64), AppError> {
        let state = self.lock()?;
        let rows = Self::sorted_matches(&state, order, filter);
        let count = rows.len() as i64;
        let size = size.clamp(1, 100);
        let offset = (page.max(0) * size) as usize;
        let page_rows = rows
            .into_iter()
            .skip(offset)
            .take(size as usize)
            .map(|mut inv| {
                // The list path does not eagerly load settlements.
                inv.settlements = Vec::new();
                inv
            })
            .collect();
        Ok((page_rows, count))
    }

    async fn find_summaries(
        &self,
        page: i64,
        size: i64,
        order: &OrderBy,
        filter: &ListInvoicesFilter,
    ) -> Result<Vec<InvoiceSummary>, AppError> {
        let state = self.lock()?;
        let rows = Self::sorted_matches(&state, order, filter);
        let offset = (page.max(0) * size) as usize;
        Ok(rows
            .into_iter()
            .skip(offset)
            .take(size.max(0) as usize)
            .map(|inv| InvoiceSummary {
                id: inv.id,
                debtor_id: inv.debtor_id,
                debtor_name: inv.debtor_name,
                total_amount: inv.total_amount,
                settled: inv.settled,
            })
            .collect())
    }

    async fn update(&self, input: &UpdateInvoice) -> Result<Option<Invoice>, AppError> {
        let mut state = self.lock()?;
        let mut next_settlement_id = state.next_settlement_id;
        let Some(existing) = state.invoices.get_mut(&input.id) else {
            return Ok(None);
        };

        existing.debtor_id = input.debtor_id;
        existing.debtor_name = input.debtor_name.clone();
        existing.originating_user_id = input.originating_user_id;
        existing.total_amount = input.total_amount;
        existing.settled = input.settled;
        // created_at stays untouched.

        let mut settlements = Vec::with_capacity(input.settlements.len());
        for entry in &input.settlements {
            let (id, recorded_at) = match entry.id {
                Some(id) => {
                    let recorded_at = existing
                        .settlements
                        .iter()
                        .find(|s| s.id == id)
                        .map(|s| s.recorded_at)
                        .unwrap_or_else(Utc::now);
                    (id, recorded_at)
                }
                None => {
                    next_settlement_id += 1;
                    (next_settlement_id, Utc::now())
                }
            };
            settlements.push(Settlement {
                id,
                invoice_id: input.id,
                settling_user_id: entry.settling_user_id,
                amount_paid: entry.amount_paid,
                recorded_at,
            });
        }
        existing.settlements = settlements;

        let updated = existing.clone();
        state.next_settlement_id = next_settlement_id;
        Ok(Some(updated))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut state = self.lock()?;
        Ok(state.invoices.remove(&id).is_some())
    }

    async fn sum_amount(
        &self,
        settled: bool,
        current_month_only: bool,
    ) -> Result<Decimal, AppError> {
        let state = self.lock()?;
        let now = Utc::now();
        let month_start = Utc
            .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
            .single()
            .unwrap_or(now);

        let total = state
            .invoices
            .values()
            .filter(|inv| inv.settled == settled)
            .filter(|inv| !current_month_only || inv.created_at >= month_start)
            .map(|inv| inv.total_amount)
            .sum();
        Ok(total)
    }

    async fn append_settlement(&self, input: &CreateSettlement) -> Result<Settlement, AppError> {
        let mut state = self.lock()?;
        state.next_settlement_id += 1;
        let settlement = Settlement {
            id: state.next_settlement_id,
            invoice_id: input.invoice_id,
            settling_user_id: input.settling_user_id,
            amount_paid: input.amount_paid,
            recorded_at: Utc::now(),
        };
        let Some(invoice) = state.invoices.get_mut(&input.invoice_id) else {
            return Err(AppError::DatabaseError(anyhow::anyhow!(
                "settlement references missing invoice {}",
                input.invoice_id
            )));
        };
        invoice.settlements.push(settlement.clone());
        Ok(settlement)
    }

    async fn mark_settled(&self, invoice_id: i64) -> Result<(), AppError> {
        let mut state = self.lock()?;
        if let Some(invoice) = state.invoices.get_mut(&invoice_id) {
            invoice.settled = true;
        }
        Ok(())
    }
}
