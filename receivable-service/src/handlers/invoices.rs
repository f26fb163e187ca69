//! HTTP surface for the receivable ledger. Handlers validate and translate;
//! every rule lives in the engine.

use crate::models::{
    CreateInvoice, Invoice, ListInvoicesFilter, OrderBy, OrderColumn, OrderDirection,
    SettlementInput, UpdateInvoice,
};
use crate::startup::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use validator::{Validate, ValidationError};

fn positive_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if *amount <= Decimal::ZERO {
        return Err(ValidationError::new("amount_not_positive"));
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateInvoiceRequest {
    pub debtor_id: i64,
    #[validate(length(min = 1, max = 100, message = "Debtor name must be 1-100 characters"))]
    pub debtor_name: String,
    pub originating_user_id: i64,
    #[validate(custom(function = positive_amount))]
    pub total_amount: Decimal,
    #[serde(default)]
    pub settled: bool,
}

#[derive(Debug, Deserialize)]
pub struct SettlementPayload {
    pub id: Option<i64>,
    pub settling_user_id: i64,
    pub amount_paid: Decimal,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateInvoiceRequest {
    pub id: i64,
    pub debtor_id: i64,
    #[validate(length(min = 1, max = 100, message = "Debtor name must be 1-100 characters"))]
    pub debtor_name: String,
    pub originating_user_id: i64,
    #[validate(custom(function = positive_amount))]
    pub total_amount: Decimal,
    pub settled: bool,
    #[serde(default)]
    pub settlements: Vec<SettlementPayload>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SettleRequest {
    pub settling_user_id: i64,
    #[validate(custom(function = positive_amount))]
    pub amount_paid: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct ListInvoicesParams {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub order_column: Option<String>,
    pub order_direction: Option<String>,
    pub debtor_id: Option<i64>,
    pub settled: Option<bool>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub requesting_user_id: i64,
    pub order_column: Option<String>,
    pub order_direction: Option<String>,
    pub debtor_id: Option<i64>,
    pub settled: Option<bool>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub data: Vec<Invoice>,
    pub count: i64,
}

fn order_from(column: Option<&str>, direction: Option<&str>) -> OrderBy {
    OrderBy {
        column: column.map(OrderColumn::from_string).unwrap_or(OrderColumn::Id),
        direction: direction
            .map(OrderDirection::from_string)
            .unwrap_or(OrderDirection::Asc),
    }
}

#[tracing::instrument(skip(state, request))]
pub async fn create_invoice(
    State(state): State<AppState>,
    Json(request): Json<CreateInvoiceRequest>,
) -> Result<impl IntoResponse, AppError> {
    request.validate()?;

    let invoice = state
        .receivables
        .create_invoice(CreateInvoice {
            debtor_id: request.debtor_id,
            debtor_name: request.debtor_name,
            originating_user_id: request.originating_user_id,
            total_amount: request.total_amount,
            settled: request.settled,
        })
        .await
        .map_err(AppError::from)?;

    Ok((StatusCode::CREATED, Json(invoice)))
}

#[tracing::instrument(skip(state, params))]
pub async fn list_invoices(
    State(state): State<AppState>,
    Query(params): Query<ListInvoicesParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = params.page.unwrap_or(0).max(0);
    let size = params.size.unwrap_or(20).clamp(1, 100);
    let order = order_from(params.order_column.as_deref(), params.order_direction.as_deref());
    let filter = ListInvoicesFilter {
        debtor_id: params.debtor_id,
        settled: params.settled,
        created_from: params.created_from,
        created_to: params.created_to,
    };

    let (data, count) = state
        .receivables
        .find_page(page, size, order, filter)
        .await
        .map_err(AppError::from)?;

    Ok(Json(ListResponse { data, count }))
}

#[tracing::instrument(skip(state))]
pub async fn get_invoice(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let invoice = state
        .receivables
        .find_one(id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("invoice not found")))?;

    Ok(Json(invoice))
}

#[tracing::instrument(skip(state, request), fields(invoice_id = %id))]
pub async fn update_invoice(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateInvoiceRequest>,
) -> Result<impl IntoResponse, AppError> {
    request.validate()?;

    let invoice = state
        .receivables
        .update_invoice(
            id,
            UpdateInvoice {
                id: request.id,
                debtor_id: request.debtor_id,
                debtor_name: request.debtor_name,
                originating_user_id: request.originating_user_id,
                total_amount: request.total_amount,
                settled: request.settled,
                settlements: request
                    .settlements
                    .into_iter()
                    .map(|s| SettlementInput {
                        id: s.id,
                        settling_user_id: s.settling_user_id,
                        amount_paid: s.amount_paid,
                    })
                    .collect(),
            },
        )
        .await
        .map_err(AppError::from)?;

    Ok(Json(invoice))
}

#[tracing::instrument(skip(state))]
pub async fn delete_invoice(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let removed = state
        .receivables
        .delete_invoice(id)
        .await
        .map_err(AppError::from)?;

    Ok(Json(removed))
}

#[tracing::instrument(skip(state, request), fields(invoice_id = %id))]
pub async fn settle_invoice(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<SettleRequest>,
) -> Result<impl IntoResponse, AppError> {
    request.validate()?;

    state
        .receivables
        .settle(id, request.settling_user_id, request.amount_paid)
        .await
        .map_err(AppError::from)?;

    Ok((StatusCode::CREATED, Json(true)))
}

#[tracing::instrument(skip(state, request), fields(user_id = %request.requesting_user_id))]
pub async fn export_invoices(
    State(state): State<AppState>,
    Json(request): Json<ExportRequest>,
) -> Result<impl IntoResponse, AppError> {
    let order = order_from(request.order_column.as_deref(), request.order_direction.as_deref());
    let filter = ListInvoicesFilter {
        debtor_id: request.debtor_id,
        settled: request.settled,
        created_from: request.created_from,
        created_to: request.created_to,
    };

    state
        .receivables
        .export(request.requesting_user_id, order, filter)
        .await
        .map_err(AppError::from)?;

    Ok(Json(true))
}
