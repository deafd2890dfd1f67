//! Invoice generation and adjustment endpoints

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};

use crate::auth::admin_auth::BusinessIdentity;
use crate::billing::generate::{self, AdjustmentPatch, CustomerFailure};
use crate::billing::money::parse_money;
use crate::db;
use crate::db::invoices::Invoice;
use crate::state::AppState;

use super::ApiResult;

/// POST /api/admin/invoices/generate
#[derive(Deserialize)]
pub struct GenerateRequest {
    pub month: u32,
    pub year: i32,
    #[serde(default)]
    pub reset_adjustments: bool,
}

#[derive(Serialize)]
pub struct GenerateResponse {
    pub invoices: Vec<InvoiceSummary>,
    pub errors: Vec<CustomerFailure>,
}

/// One invoice as the admin UI consumes it
#[derive(Serialize)]
pub struct InvoiceSummary {
    pub id: i64,
    pub customer_id: i64,
    pub customer: String,
    pub month: i64,
    pub year: i64,
    pub days: i64,
    pub total_days: i64,
    pub supplier_holidays: i64,
    pub client_holidays: i64,
    pub rate: Decimal,
    pub total: Decimal,
    pub discount: Decimal,
    pub additional: Decimal,
    #[serde(rename = "final")]
    pub final_amount: Decimal,
    pub status: String,
}

impl InvoiceSummary {
    fn from_row(inv: &Invoice) -> Result<Self, AppError> {
        Ok(Self {
            id: inv.id,
            customer_id: inv.customer_id,
            customer: inv.customer_name.clone(),
            month: inv.month,
            year: inv.year,
            days: inv.chargeable_days,
            total_days: inv.total_days,
            supplier_holidays: inv.supplier_holiday_days,
            client_holidays: inv.client_holiday_days,
            rate: parse_money(&inv.rate_per_jug)?,
            total: parse_money(&inv.base_amount)?,
            discount: parse_money(&inv.discount)?,
            additional: parse_money(&inv.additional_charges)?,
            final_amount: parse_money(&inv.final_amount)?,
            status: inv.status.clone(),
        })
    }
}

/// Invoice detail with audit timestamps and remarks
#[derive(Serialize)]
pub struct InvoiceDetail {
    #[serde(flatten)]
    pub summary: InvoiceSummary,
    pub remarks: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl InvoiceDetail {
    fn from_row(inv: &Invoice) -> Result<Self, AppError> {
        Ok(Self {
            summary: InvoiceSummary::from_row(inv)?,
            remarks: inv.remarks.clone(),
            created_at: inv.created_at,
            updated_at: inv.updated_at,
        })
    }
}

pub async fn generate_invoices(
    State(state): State<AppState>,
    Extension(identity): Extension<BusinessIdentity>,
    Json(req): Json<GenerateRequest>,
) -> ApiResult<GenerateResponse> {
    let outcome = generate::generate(
        &state.pool,
        &identity.business_id,
        req.month,
        req.year,
        req.reset_adjustments,
    )
    .await?;

    let invoices = outcome
        .invoices
        .iter()
        .map(InvoiceSummary::from_row)
        .collect::<Result<Vec<_>, _>>()?;

    let now = shared::util::now_millis();
    let detail = serde_json::json!({
        "month": req.month,
        "year": req.year,
        "generated": invoices.len(),
        "failed": outcome.failures.len(),
    });
    let _ = db::audit::log(
        &state.pool,
        &identity.business_id,
        "invoices_generated",
        Some(&detail),
        now,
    )
    .await;

    Ok(Json(GenerateResponse {
        invoices,
        errors: outcome.failures,
    }))
}

/// GET /api/admin/invoices?month=&year=
#[derive(Deserialize)]
pub struct PeriodQuery {
    pub month: u32,
    pub year: i32,
}

pub async fn list_invoices(
    State(state): State<AppState>,
    Extension(identity): Extension<BusinessIdentity>,
    Query(query): Query<PeriodQuery>,
) -> ApiResult<Vec<InvoiceSummary>> {
    if !(1..=12).contains(&query.month) {
        return Err(AppError::new(ErrorCode::InvalidBillingPeriod)
            .with_detail("month", query.month));
    }

    let rows = db::invoices::list_for_period(
        &state.pool,
        &identity.business_id,
        query.month as i64,
        query.year as i64,
    )
    .await
    .map_err(|e| {
        tracing::error!("Invoice query error: {e}");
        AppError::new(ErrorCode::DatabaseError)
    })?;

    let invoices = rows
        .iter()
        .map(InvoiceSummary::from_row)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(invoices))
}

pub async fn get_invoice(
    State(state): State<AppState>,
    Extension(identity): Extension<BusinessIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<InvoiceDetail> {
    let mut conn = state.pool.acquire().await.map_err(|e| {
        tracing::error!("Connection acquire error: {e}");
        AppError::new(ErrorCode::DatabaseError)
    })?;

    let invoice = db::invoices::find_by_id(&mut conn, id)
        .await
        .map_err(|e| {
            tracing::error!("Invoice lookup error: {e}");
            AppError::new(ErrorCode::DatabaseError)
        })?
        .filter(|inv| inv.business_id == identity.business_id)
        .ok_or_else(|| AppError::new(ErrorCode::InvoiceNotFound))?;

    Ok(Json(InvoiceDetail::from_row(&invoice)?))
}

/// PUT /api/admin/invoices/{id}
#[derive(Deserialize)]
pub struct AdjustRequest {
    pub discount: Option<Decimal>,
    pub additional_charges: Option<Decimal>,
    pub remarks: Option<String>,
}

pub async fn adjust_invoice(
    State(state): State<AppState>,
    Extension(identity): Extension<BusinessIdentity>,
    Path(id): Path<i64>,
    Json(req): Json<AdjustRequest>,
) -> ApiResult<InvoiceDetail> {
    let patch = AdjustmentPatch {
        discount: req.discount,
        additional_charges: req.additional_charges,
        remarks: req.remarks,
    };
    let invoice = generate::adjust(&state.pool, &identity.business_id, id, patch).await?;

    let now = shared::util::now_millis();
    let detail = serde_json::json!({ "invoice_id": id });
    let _ = db::audit::log(
        &state.pool,
        &identity.business_id,
        "invoice_adjusted",
        Some(&detail),
        now,
    )
    .await;

    Ok(Json(InvoiceDetail::from_row(&invoice)?))
}
