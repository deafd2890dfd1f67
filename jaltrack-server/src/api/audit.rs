//! Audit trail endpoint

use axum::{
    Extension, Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};

use crate::auth::admin_auth::BusinessIdentity;
use crate::db;
use crate::state::AppState;

use super::ApiResult;

const MAX_PAGE_SIZE: i64 = 100;

/// GET /api/admin/audit?limit=&offset=
#[derive(Deserialize)]
pub struct AuditQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Serialize)]
pub struct AuditItem {
    pub id: i64,
    pub action: String,
    pub detail: Option<serde_json::Value>,
    pub created_at: i64,
}

pub async fn list_audit(
    State(state): State<AppState>,
    Extension(identity): Extension<BusinessIdentity>,
    Query(query): Query<AuditQuery>,
) -> ApiResult<Vec<AuditItem>> {
    let limit = query.limit.unwrap_or(50).clamp(1, MAX_PAGE_SIZE);
    let offset = query.offset.unwrap_or(0).max(0);

    let entries = db::audit::query(&state.pool, &identity.business_id, limit, offset)
        .await
        .map_err(|e| {
            tracing::error!("Audit query error: {e}");
            AppError::new(ErrorCode::DatabaseError)
        })?;

    let items = entries
        .into_iter()
        .map(|e| AuditItem {
            id: e.id,
            action: e.action,
            detail: e.detail.and_then(|d| serde_json::from_str(&d).ok()),
            created_at: e.created_at,
        })
        .collect();
    Ok(Json(items))
}
