//! Business JWT authentication for the admin API

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::error::{ApiResponse, AppError, ErrorCode};

use crate::state::AppState;

/// JWT claims for business authentication
#[derive(Debug, Serialize, Deserialize)]
pub struct AdminClaims {
    /// Business ID
    pub sub: String,
    /// Business owner email
    pub email: String,
    /// Expiration (Unix timestamp seconds)
    pub exp: usize,
    /// Issued at (Unix timestamp seconds)
    pub iat: usize,
}

/// Authenticated business identity extracted from JWT
#[derive(Debug, Clone)]
pub struct BusinessIdentity {
    pub business_id: String,
    pub email: String,
}

const JWT_EXPIRY_HOURS: i64 = 24;

/// Create a JWT token for a business
pub fn create_token(
    business_id: &str,
    email: &str,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now();
    let claims = AdminClaims {
        sub: business_id.to_string(),
        email: email.to_string(),
        exp: (now + chrono::Duration::hours(JWT_EXPIRY_HOURS)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Middleware that extracts and verifies the business JWT from the
/// Authorization header
pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| unauthorized("Missing Authorization header"))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| unauthorized("Invalid Authorization format"))?;

    let validation = Validation::default();
    let token_data = jsonwebtoken::decode::<AdminClaims>(
        token,
        &DecodingKey::from_secret(state.jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|e| {
        tracing::debug!("JWT validation failed: {e}");
        unauthorized("Invalid or expired token")
    })?;

    let identity = BusinessIdentity {
        business_id: token_data.claims.sub,
        email: token_data.claims.email,
    };

    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}

fn unauthorized(message: &str) -> Response {
    let err = AppError::with_message(ErrorCode::NotAuthenticated, message);
    let body = ApiResponse::error(&err);
    (http::StatusCode::UNAUTHORIZED, axum::Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_token_round_trips_claims() {
        let token = create_token("biz-1", "owner@example.com", "test-secret").unwrap();
        let data = jsonwebtoken::decode::<AdminClaims>(
            &token,
            &DecodingKey::from_secret(b"test-secret"),
            &Validation::default(),
        )
        .unwrap();
        assert_eq!(data.claims.sub, "biz-1");
        assert_eq!(data.claims.email, "owner@example.com");
        assert!(data.claims.exp > data.claims.iat);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = create_token("biz-1", "owner@example.com", "test-secret").unwrap();
        let result = jsonwebtoken::decode::<AdminClaims>(
            &token,
            &DecodingKey::from_secret(b"other-secret"),
            &Validation::default(),
        );
        assert!(result.is_err());
    }
}
