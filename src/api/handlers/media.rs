use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::api::response::{ApiError, AppQuery};
use crate::object_store::ObjectStoreError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SignedUrlParams {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub expires: Option<i64>,
}

/// Serve a stored object from the content bucket.
/// Route: GET /storage/:bucket/*path
///
/// Plain requests are served as-is (public-bucket semantics). When either
/// signed-URL parameter is present, both are required and the signature
/// must verify.
pub async fn serve_object(
    State(state): State<Arc<AppState>>,
    Path((bucket, path)): Path<(String, String)>,
    AppQuery(params): AppQuery<SignedUrlParams>,
) -> Result<Response, ApiError> {
    if bucket != state.gateway.bucket() {
        return Err(ApiError::not_found("Unknown bucket"));
    }

    // The wildcard arrives percent-decoded; reject anything that is not a
    // plain bucket-relative key before it reaches a filesystem-backed store.
    let clean = std::path::Path::new(&path)
        .components()
        .all(|c| matches!(c, std::path::Component::Normal(_)));
    if !clean || path.is_empty() {
        return Err(ApiError::not_found("Object not found"));
    }

    if params.token.is_some() || params.expires.is_some() {
        let (Some(token), Some(expires)) = (params.token.as_deref(), params.expires) else {
            return Err(ApiError::bad_request(
                "Signed requests require both token and expires",
            ));
        };
        if !state.gateway.verify_signed(&path, token, expires) {
            return Err(ApiError::forbidden("Invalid or expired signature"));
        }
    }

    let data = state.gateway.fetch(&path).await.map_err(|e| match e {
        ObjectStoreError::NotFound(_) => ApiError::not_found("Object not found"),
        ObjectStoreError::BucketNotFound(_) => ApiError::not_found("Unknown bucket"),
        _ => ApiError::internal(format!("Failed to retrieve object: {e}")),
    })?;

    let mime_type = mime_guess::from_path(&path).first_or_octet_stream();
    let byte_size = data.len() as u64;

    let mut response = (StatusCode::OK, data).into_response();
    let headers = response.headers_mut();

    headers.insert(
        header::CONTENT_TYPE,
        mime_type
            .as_ref()
            .parse()
            .unwrap_or(header::HeaderValue::from_static("application/octet-stream")),
    );

    headers.insert(header::CONTENT_LENGTH, header::HeaderValue::from(byte_size));

    // Set Content-Disposition with filename from the path's last segment
    let filename = path.rsplit('/').next().unwrap_or(&path);
    if let Ok(value) = format!("inline; filename=\"{filename}\"").parse() {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }

    // Cache for 1 hour, matching the upload-side cache control
    headers.insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("public, max-age=3600"),
    );

    Ok(response)
}
