use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::api::extract::{BearerToken, CurrentUser};
use crate::api::response::{ApiError, AppJson, JSend};
use crate::auth::{AuthError, AuthUser};
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SignUpResponse {
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct SignInResponse {
    pub token: String,
    pub user: AuthUser,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: AuthUser,
    pub active_subscription: bool,
}

#[derive(Debug, Serialize)]
pub struct PurchaseResponse {
    pub id: String,
    pub content_id: String,
    pub amount: u64,
    pub status: String,
    pub purchase_date: String,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn sign_up(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<SignUpRequest>,
) -> Result<Json<JSend<SignUpResponse>>, ApiError> {
    if req.email.trim().is_empty() {
        return Err(ApiError::bad_request("email must not be empty"));
    }
    if req.password.is_empty() {
        return Err(ApiError::bad_request("password must not be empty"));
    }

    let user_id = state
        .auth
        .sign_up(&req.email, &req.password, req.full_name.as_deref())
        .map_err(auth_error)?;

    Ok(JSend::success(SignUpResponse { user_id }))
}

pub async fn sign_in(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<SignInRequest>,
) -> Result<Json<JSend<SignInResponse>>, ApiError> {
    let (token, user) = state
        .auth
        .sign_in(&req.email, &req.password)
        .map_err(auth_error)?;

    Ok(JSend::success(SignInResponse { token, user }))
}

pub async fn sign_out(
    State(state): State<Arc<AppState>>,
    BearerToken(token): BearerToken,
) -> Result<Json<JSend<()>>, ApiError> {
    if let Some(token) = token {
        state.auth.sign_out(&token).map_err(auth_error)?;
    }
    Ok(JSend::success(()))
}

pub async fn me(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<JSend<MeResponse>>, ApiError> {
    let user = user.ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    let active_subscription = state
        .db
        .has_active_subscription(&user.id, Utc::now())
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok(JSend::success(MeResponse {
        user,
        active_subscription,
    }))
}

pub async fn my_purchases(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<JSend<Vec<PurchaseResponse>>>, ApiError> {
    let user = user.ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    let purchases = state
        .db
        .list_purchases(&user.id)
        .map_err(|e| ApiError::internal(e.to_string()))?
        .iter()
        .map(|p| PurchaseResponse {
            id: p.id.clone(),
            content_id: p.content_id.clone(),
            amount: p.amount,
            status: p.status.clone(),
            purchase_date: p.purchase_date.to_rfc3339(),
        })
        .collect();

    Ok(JSend::success(purchases))
}

// ============================================================================
// Helpers
// ============================================================================

fn auth_error(e: AuthError) -> ApiError {
    match e {
        AuthError::EmailTaken => ApiError::conflict(e.to_string()),
        AuthError::InvalidCredentials => ApiError::unauthorized(e.to_string()),
        AuthError::Database(_) | AuthError::Crypto(_) => ApiError::internal(e.to_string()),
    }
}
