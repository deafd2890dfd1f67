//! Holiday reads

use sqlx::SqlitePool;

pub const SCOPE_SUPPLIER: &str = "supplier";
pub const SCOPE_CLIENT: &str = "client";

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Holiday {
    pub id: i64,
    pub business_id: String,
    /// ISO-8601 date text, inclusive
    pub start_date: String,
    /// ISO-8601 date text, inclusive
    pub end_date: String,
    pub reason: String,
    /// 'supplier' or 'client'
    pub scope: String,
    /// For client-scoped holidays: the targeted customer, NULL for all
    pub customer_id: Option<i64>,
}

/// Holidays whose range overlaps [month_start, month_end].
///
/// ISO date text compares lexicographically, so the range predicate
/// works directly on the stored columns.
pub async fn list_overlapping(
    pool: &SqlitePool,
    business_id: &str,
    month_start: &str,
    month_end: &str,
) -> Result<Vec<Holiday>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, business_id, start_date, end_date, reason, scope, customer_id
         FROM holidays WHERE business_id = ? AND start_date <= ? AND end_date >= ?",
    )
    .bind(business_id)
    .bind(month_end)
    .bind(month_start)
    .fetch_all(pool)
    .await
}
