//! Customer reads
//!
//! Customers are owned by the admin CRUD; the billing engine only
//! lists them. Rate and join date stay as stored text here and are
//! parsed at the engine boundary, so one customer's malformed record
//! surfaces as a per-customer generation failure.

use sqlx::SqlitePool;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Customer {
    pub id: i64,
    pub business_id: String,
    pub name: String,
    /// Per-day rate, exact decimal text
    pub rate_per_jug: String,
    /// Whether customer-specific holidays reduce this customer's bill
    pub holiday_billing: bool,
    /// ISO-8601 date text
    pub join_date: String,
    pub active: bool,
}

pub async fn list_active(
    pool: &SqlitePool,
    business_id: &str,
) -> Result<Vec<Customer>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, business_id, name, rate_per_jug, holiday_billing, join_date, active
         FROM customers WHERE business_id = ? AND active = 1 ORDER BY name, id",
    )
    .bind(business_id)
    .fetch_all(pool)
    .await
}
