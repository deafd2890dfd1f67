//! Invoice reads and writes
//!
//! One row per (business, customer, month, year), enforced by a unique
//! index. Regeneration goes through [`upsert_computed`], which rewrites
//! the computed fields and leaves `status` and `remarks` alone on
//! conflict.

use sqlx::{SqliteConnection, SqlitePool};

pub const STATUS_PENDING: &str = "pending";

#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct Invoice {
    pub id: i64,
    pub business_id: String,
    pub customer_id: i64,
    /// Display-name snapshot taken at generation time
    pub customer_name: String,
    pub month: i64,
    pub year: i64,
    pub total_days: i64,
    pub supplier_holiday_days: i64,
    pub client_holiday_days: i64,
    pub chargeable_days: i64,
    /// Exact decimal text
    pub rate_per_jug: String,
    pub base_amount: String,
    pub discount: String,
    pub additional_charges: String,
    pub final_amount: String,
    /// 'pending' or 'paid'; never written by the billing engine
    pub status: String,
    pub remarks: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Computed fields written by a generation run
#[derive(Debug, Clone)]
pub struct ComputedInvoice {
    pub id: i64,
    pub business_id: String,
    pub customer_id: i64,
    pub customer_name: String,
    pub month: i64,
    pub year: i64,
    pub total_days: i64,
    pub supplier_holiday_days: i64,
    pub client_holiday_days: i64,
    pub chargeable_days: i64,
    pub rate_per_jug: String,
    pub base_amount: String,
    pub discount: String,
    pub additional_charges: String,
    pub final_amount: String,
    pub now: i64,
}

pub async fn find_for_period(
    conn: &mut SqliteConnection,
    business_id: &str,
    customer_id: i64,
    month: i64,
    year: i64,
) -> Result<Option<Invoice>, sqlx::Error> {
    sqlx::query_as(
        "SELECT * FROM invoices
         WHERE business_id = ? AND customer_id = ? AND month = ? AND year = ?",
    )
    .bind(business_id)
    .bind(customer_id)
    .bind(month)
    .bind(year)
    .fetch_optional(conn)
    .await
}

pub async fn find_by_id(
    conn: &mut SqliteConnection,
    invoice_id: i64,
) -> Result<Option<Invoice>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM invoices WHERE id = ?")
        .bind(invoice_id)
        .fetch_optional(conn)
        .await
}

pub async fn list_for_period(
    pool: &SqlitePool,
    business_id: &str,
    month: i64,
    year: i64,
) -> Result<Vec<Invoice>, sqlx::Error> {
    sqlx::query_as(
        "SELECT * FROM invoices
         WHERE business_id = ? AND month = ? AND year = ?
         ORDER BY customer_name, customer_id",
    )
    .bind(business_id)
    .bind(month)
    .bind(year)
    .fetch_all(pool)
    .await
}

/// Insert the invoice, or rewrite its computed fields if one already
/// exists for the period key. The caller has already merged sticky
/// adjustments into `discount` / `additional_charges` / `final_amount`
/// under the same transaction, so the conflict arm writes them as
/// given; `status`, `remarks`, `id` and `created_at` are preserved.
pub async fn upsert_computed(
    conn: &mut SqliteConnection,
    inv: &ComputedInvoice,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO invoices (
            id, business_id, customer_id, customer_name, month, year,
            total_days, supplier_holiday_days, client_holiday_days, chargeable_days,
            rate_per_jug, base_amount, discount, additional_charges, final_amount,
            status, remarks, created_at, updated_at
         ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, NULL, ?, ?)
         ON CONFLICT(business_id, customer_id, month, year) DO UPDATE SET
            customer_name = excluded.customer_name,
            total_days = excluded.total_days,
            supplier_holiday_days = excluded.supplier_holiday_days,
            client_holiday_days = excluded.client_holiday_days,
            chargeable_days = excluded.chargeable_days,
            rate_per_jug = excluded.rate_per_jug,
            base_amount = excluded.base_amount,
            discount = excluded.discount,
            additional_charges = excluded.additional_charges,
            final_amount = excluded.final_amount,
            updated_at = excluded.updated_at",
    )
    .bind(inv.id)
    .bind(&inv.business_id)
    .bind(inv.customer_id)
    .bind(&inv.customer_name)
    .bind(inv.month)
    .bind(inv.year)
    .bind(inv.total_days)
    .bind(inv.supplier_holiday_days)
    .bind(inv.client_holiday_days)
    .bind(inv.chargeable_days)
    .bind(&inv.rate_per_jug)
    .bind(&inv.base_amount)
    .bind(&inv.discount)
    .bind(&inv.additional_charges)
    .bind(&inv.final_amount)
    .bind(STATUS_PENDING)
    .bind(inv.now)
    .bind(inv.now)
    .execute(conn)
    .await?;
    Ok(())
}

/// Write a manual adjustment. Remarks are only touched when provided.
pub async fn update_adjustments(
    conn: &mut SqliteConnection,
    invoice_id: i64,
    discount: &str,
    additional_charges: &str,
    remarks: Option<&str>,
    final_amount: &str,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE invoices SET
            discount = ?,
            additional_charges = ?,
            remarks = COALESCE(?, remarks),
            final_amount = ?,
            updated_at = ?
         WHERE id = ?",
    )
    .bind(discount)
    .bind(additional_charges)
    .bind(remarks)
    .bind(final_amount)
    .bind(now)
    .bind(invoice_id)
    .execute(conn)
    .await?;
    Ok(())
}
