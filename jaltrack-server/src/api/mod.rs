//! API routes for jaltrack-server

pub mod audit;
pub mod health;
pub mod invoices;

use crate::auth::admin_auth::admin_auth_middleware;
use crate::state::AppState;
use axum::routing::{get, post};
use axum::{Router, middleware};
use shared::error::AppError;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub type ApiResult<T> = Result<axum::Json<T>, AppError>;

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    // Business admin API (JWT authenticated)
    let admin = Router::new()
        .route("/api/admin/invoices/generate", post(invoices::generate_invoices))
        .route("/api/admin/invoices", get(invoices::list_invoices))
        .route(
            "/api/admin/invoices/{id}",
            get(invoices::get_invoice).put(invoices::adjust_invoice),
        )
        .route("/api/admin/audit", get(audit::list_audit))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            admin_auth_middleware,
        ));

    Router::new()
        .route("/health", get(health::health_check))
        .merge(admin)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
