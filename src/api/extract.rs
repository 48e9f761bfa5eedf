use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::api::response::ApiError;
use crate::auth::AuthUser;
use crate::AppState;

fn bearer_token(parts: &Parts) -> Option<String> {
    let header = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?;
    if token.is_empty() {
        None
    } else {
        Some(token.to_owned())
    }
}

/// The raw bearer token from the `Authorization` header, if one was sent.
pub struct BearerToken(pub Option<String>);

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for BearerToken {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &Arc<AppState>,
    ) -> Result<Self, ApiError> {
        Ok(BearerToken(bearer_token(parts)))
    }
}

/// The authenticated user for the request, or `None` for anonymous callers.
pub struct CurrentUser(pub Option<AuthUser>);

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, ApiError> {
        let Some(token) = bearer_token(parts) else {
            return Ok(CurrentUser(None));
        };
        let user = state.auth.current_user(&token).map_err(|e| {
            tracing::error!("Failed to resolve session: {e}");
            ApiError::internal("Failed to resolve session")
        })?;
        Ok(CurrentUser(user))
    }
}

/// An authenticated user whose profile carries the admin flag. Rejects
/// anonymous callers with 401 and non-admin users with 403.
pub struct AdminUser(pub AuthUser);

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, ApiError> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        let user = user.ok_or_else(|| ApiError::unauthorized("Authentication required"))?;
        if !user.is_admin() {
            return Err(ApiError::forbidden("Admin privileges required"));
        }
        Ok(AdminUser(user))
    }
}
