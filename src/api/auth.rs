//! Admin sessions: HS256 JWTs carried as `Authorization: Bearer <token>`.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::domain::aggregates::{AdminRole, AdminUser};
use crate::CatalogError;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// HMAC secret used to sign and verify tokens.
    pub secret: String,
    pub max_age_days: i64,
}

impl SessionConfig {
    pub const DEFAULT_MAX_AGE_DAYS: i64 = 30;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: AdminRole,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

/// Signs a session token for `user`; returns it with its expiry.
pub fn issue_token(user: &AdminUser, config: &SessionConfig) -> Result<(String, DateTime<Utc>), jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let expires_at = now + Duration::days(config.max_age_days);
    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        role: user.role,
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
        jti: Uuid::new_v4().to_string(),
    };
    let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(config.secret.as_bytes()))?;
    Ok((token, expires_at))
}

/// Checks signature and expiry.
pub fn validate_token(token: &str, config: &SessionConfig) -> Result<Claims, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(token, &DecodingKey::from_secret(config.secret.as_bytes()), &Validation::default())?;
    Ok(data.claims)
}

/// An authenticated back-office user. Taking this extractor gates a handler.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSession {
    pub user_id: Uuid,
    pub email: String,
    pub role: AdminRole,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AdminSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(CatalogError::Unauthorized)?;

        let claims = validate_token(token, &state.session).map_err(|e| {
            tracing::debug!(error = %e, "Rejected session token");
            CatalogError::Unauthorized
        })?;

        Ok(Self { user_id: claims.sub, email: claims.email, role: claims.role })
    }
}
