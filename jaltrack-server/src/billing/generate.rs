//! Generation orchestrator
//!
//! Iterates all active customers of a business for a target period,
//! runs the calendar reconciler and the pricing calculator, and
//! upserts one invoice per (customer, period). Per-customer
//! best-effort: one customer's failure is recorded and the batch
//! continues. Each customer's read-merge-upsert runs in its own
//! transaction, so a failed customer never leaves a partial invoice.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use shared::error::{AppError, ErrorCode};
use sqlx::SqlitePool;

use crate::db;
use crate::db::customers::Customer;
use crate::db::invoices::{ComputedInvoice, Invoice};

use super::calendar::{self, BillableCustomer, HolidayScope, HolidaySpan};
use super::money::{format_money, parse_money, round_money};
use super::pricing::{self, Adjustment};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// One customer the batch could not bill
#[derive(Debug, Clone, Serialize)]
pub struct CustomerFailure {
    pub customer_id: i64,
    pub customer_name: String,
    pub error: String,
}

/// Result of a generation run: every invoice for the period (not just
/// the ones touched by this run) plus the per-customer failures the
/// caller must surface.
#[derive(Debug)]
pub struct GenerationOutcome {
    pub invoices: Vec<Invoice>,
    pub failures: Vec<CustomerFailure>,
}

/// Generate (or regenerate) all invoices of `business_id` for
/// (month, year).
///
/// Sticky manual adjustments survive regeneration: an existing
/// invoice's discount and additional charges are carried into the new
/// computation unless `reset_adjustments` is set. Running twice with
/// unchanged data rewrites identical computed fields and creates no
/// duplicate rows.
pub async fn generate(
    pool: &SqlitePool,
    business_id: &str,
    month: u32,
    year: i32,
    reset_adjustments: bool,
) -> Result<GenerationOutcome, AppError> {
    let (month_start, month_end) = calendar::month_bounds(month, year).map_err(AppError::from)?;

    db::businesses::find_by_id(pool, business_id)
        .await
        .map_err(|e| {
            tracing::error!("Business lookup error: {e}");
            AppError::new(ErrorCode::DatabaseError)
        })?
        .ok_or_else(|| AppError::new(ErrorCode::BusinessNotFound))?;

    let customers = db::customers::list_active(pool, business_id)
        .await
        .map_err(|e| {
            tracing::error!("Customer query error: {e}");
            AppError::new(ErrorCode::DatabaseError)
        })?;

    let holiday_rows = db::holidays::list_overlapping(
        pool,
        business_id,
        &month_start.format(DATE_FORMAT).to_string(),
        &month_end.format(DATE_FORMAT).to_string(),
    )
    .await
    .map_err(|e| {
        tracing::error!("Holiday query error: {e}");
        AppError::new(ErrorCode::DatabaseError)
    })?;
    let holidays = parse_holidays(&holiday_rows)?;

    let mut failures = Vec::new();
    for customer in &customers {
        if let Err(err) = bill_customer(
            pool,
            business_id,
            customer,
            &holidays,
            month,
            year,
            reset_adjustments,
        )
        .await
        {
            tracing::warn!(
                customer_id = customer.id,
                "Skipping customer in generation run: {err}"
            );
            failures.push(CustomerFailure {
                customer_id: customer.id,
                customer_name: customer.name.clone(),
                error: err,
            });
        }
    }

    let invoices = db::invoices::list_for_period(pool, business_id, month as i64, year as i64)
        .await
        .map_err(|e| {
            tracing::error!("Invoice query error: {e}");
            AppError::new(ErrorCode::DatabaseError)
        })?;

    Ok(GenerationOutcome { invoices, failures })
}

/// Reconcile, price and upsert one customer's invoice in a single
/// transaction. String errors become `CustomerFailure` entries.
async fn bill_customer(
    pool: &SqlitePool,
    business_id: &str,
    customer: &Customer,
    holidays: &[HolidaySpan],
    month: u32,
    year: i32,
    reset_adjustments: bool,
) -> Result<(), String> {
    let join_date = NaiveDate::parse_from_str(&customer.join_date, DATE_FORMAT)
        .map_err(|_| format!("malformed join date '{}'", customer.join_date))?;
    let rate = parse_money(&customer.rate_per_jug).map_err(|e| e.to_string())?;

    let billable = BillableCustomer {
        id: customer.id,
        join_date,
        holiday_billing: customer.holiday_billing,
    };
    let breakdown =
        calendar::reconcile(&billable, holidays, month, year).map_err(|e| e.to_string())?;

    let mut tx = pool
        .begin()
        .await
        .map_err(|e| format!("transaction begin failed: {e}"))?;

    let existing =
        db::invoices::find_for_period(&mut tx, business_id, customer.id, month as i64, year as i64)
            .await
            .map_err(|e| format!("invoice lookup failed: {e}"))?;

    let adjustment = match (&existing, reset_adjustments) {
        (Some(inv), false) => Some(Adjustment {
            discount: parse_money(&inv.discount).map_err(|e| e.to_string())?,
            additional_charges: parse_money(&inv.additional_charges).map_err(|e| e.to_string())?,
        }),
        _ => None,
    };

    let amounts = pricing::price(
        breakdown.chargeable_days as i64,
        rate,
        adjustment.as_ref(),
    )
    .map_err(|e| e.to_string())?;

    let computed = ComputedInvoice {
        id: shared::util::snowflake_id(),
        business_id: business_id.to_string(),
        customer_id: customer.id,
        customer_name: customer.name.clone(),
        month: month as i64,
        year: year as i64,
        total_days: breakdown.total_days as i64,
        supplier_holiday_days: breakdown.supplier_holiday_days as i64,
        client_holiday_days: breakdown.client_holiday_days as i64,
        chargeable_days: breakdown.chargeable_days as i64,
        rate_per_jug: format_money(rate),
        base_amount: format_money(amounts.base_amount),
        discount: format_money(amounts.discount),
        additional_charges: format_money(amounts.additional_charges),
        final_amount: format_money(amounts.final_amount),
        now: shared::util::now_millis(),
    };

    db::invoices::upsert_computed(&mut tx, &computed)
        .await
        .map_err(|e| format!("invoice upsert failed: {e}"))?;

    tx.commit()
        .await
        .map_err(|e| format!("transaction commit failed: {e}"))
}

/// Manual adjustment patch; omitted fields keep their stored values
#[derive(Debug, Clone, Default)]
pub struct AdjustmentPatch {
    pub discount: Option<Decimal>,
    pub additional_charges: Option<Decimal>,
    pub remarks: Option<String>,
}

/// Apply a manual adjustment to one invoice.
///
/// Recomputes `final_amount` from the stored `base_amount` without
/// re-running the reconciler. 404s when the invoice does not exist or
/// belongs to another business.
pub async fn adjust(
    pool: &SqlitePool,
    business_id: &str,
    invoice_id: i64,
    patch: AdjustmentPatch,
) -> Result<Invoice, AppError> {
    for (field, value) in [
        ("discount", patch.discount),
        ("additional_charges", patch.additional_charges),
    ] {
        if let Some(v) = value {
            if v.is_sign_negative() {
                return Err(AppError::new(ErrorCode::NegativeAdjustment)
                    .with_detail("field", field));
            }
        }
    }

    let mut tx = pool.begin().await.map_err(|e| {
        tracing::error!("Transaction begin error: {e}");
        AppError::new(ErrorCode::DatabaseError)
    })?;

    let invoice = db::invoices::find_by_id(&mut tx, invoice_id)
        .await
        .map_err(|e| {
            tracing::error!("Invoice lookup error: {e}");
            AppError::new(ErrorCode::DatabaseError)
        })?
        .filter(|inv| inv.business_id == business_id)
        .ok_or_else(|| AppError::new(ErrorCode::InvoiceNotFound))?;

    let base = parse_money(&invoice.base_amount).map_err(AppError::from)?;
    let discount = match patch.discount {
        Some(d) => round_money(d),
        None => parse_money(&invoice.discount).map_err(AppError::from)?,
    };
    let additional = match patch.additional_charges {
        Some(a) => round_money(a),
        None => parse_money(&invoice.additional_charges).map_err(AppError::from)?,
    };
    let final_amount = pricing::final_amount(base, discount, additional);

    let now = shared::util::now_millis();
    db::invoices::update_adjustments(
        &mut tx,
        invoice_id,
        &format_money(discount),
        &format_money(additional),
        patch.remarks.as_deref(),
        &format_money(final_amount),
        now,
    )
    .await
    .map_err(|e| {
        tracing::error!("Adjustment update error: {e}");
        AppError::new(ErrorCode::DatabaseError)
    })?;

    let updated = db::invoices::find_by_id(&mut tx, invoice_id)
        .await
        .map_err(|e| {
            tracing::error!("Invoice re-read error: {e}");
            AppError::new(ErrorCode::DatabaseError)
        })?
        .ok_or_else(|| AppError::new(ErrorCode::InvoiceNotFound))?;

    tx.commit().await.map_err(|e| {
        tracing::error!("Transaction commit error: {e}");
        AppError::new(ErrorCode::DatabaseError)
    })?;

    Ok(updated)
}

fn parse_holidays(rows: &[db::holidays::Holiday]) -> Result<Vec<HolidaySpan>, AppError> {
    rows.iter()
        .map(|row| {
            let start = NaiveDate::parse_from_str(&row.start_date, DATE_FORMAT);
            let end = NaiveDate::parse_from_str(&row.end_date, DATE_FORMAT);
            match (start, end) {
                (Ok(start), Ok(end)) => Ok(HolidaySpan {
                    start,
                    end: end.max(start),
                    scope: if row.scope == db::holidays::SCOPE_CLIENT {
                        HolidayScope::Client
                    } else {
                        HolidayScope::Supplier
                    },
                    customer_id: row.customer_id,
                }),
                _ => Err(AppError::validation("holiday has malformed dates")
                    .with_detail("holiday_id", row.id)),
            }
        })
        .collect()
}
