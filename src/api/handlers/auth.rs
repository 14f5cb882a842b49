use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::auth::{issue_token, AdminSession};
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::ValidJson;
use crate::api::state::AppState;
use crate::domain::aggregates::{AdminProfile, LoginInput};
use crate::CatalogError;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: AdminProfile,
}

pub async fn login(State(s): State<AppState>, ValidJson(input): ValidJson<LoginInput>) -> ApiResult<Json<LoginResponse>> {
    let user = s.accounts.authenticate(&input).await.map_err(|e| match e {
        CatalogError::Unauthorized => ApiError::InvalidCredentials,
        other => other.into(),
    })?;
    let (token, expires_at) =
        issue_token(&user, &s.session).map_err(|e| ApiError::Internal(format!("token signing failed: {e}")))?;
    tracing::info!(user_id = %user.id, "Admin logged in");
    Ok(Json(LoginResponse { token, expires_at, user: AdminProfile::from(&user) }))
}

/// The session behind the presented token.
pub async fn me(session: AdminSession) -> Json<AdminSession> {
    Json(session)
}
