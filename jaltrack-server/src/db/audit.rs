//! Audit log operations

use sqlx::SqlitePool;

/// Write an audit log entry (detail serialized as JSON text)
pub async fn log(
    pool: &SqlitePool,
    business_id: &str,
    action: &str,
    detail: Option<&serde_json::Value>,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO audit_logs (business_id, action, detail, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(business_id)
    .bind(action)
    .bind(detail.map(|d| d.to_string()))
    .bind(now)
    .execute(pool)
    .await?;
    Ok(())
}

/// Query audit log entries for a business (paginated, newest first)
#[derive(Debug, sqlx::FromRow, serde::Serialize)]
pub struct AuditEntry {
    pub id: i64,
    pub action: String,
    /// JSON text as stored; deserialized at the API layer
    pub detail: Option<String>,
    pub created_at: i64,
}

pub async fn query(
    pool: &SqlitePool,
    business_id: &str,
    limit: i64,
    offset: i64,
) -> Result<Vec<AuditEntry>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, action, detail, created_at FROM audit_logs
         WHERE business_id = ? ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
    )
    .bind(business_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}
