use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::admin_error;
use super::catalog::{category_to_response, content_to_response, CategoryResponse, ContentResponse};
use crate::admin::{self, CategoryDraft, ContentDraft, UploadedFile};
use crate::api::extract::AdminUser;
use crate::api::response::{ApiError, AppJson, JSend};
use crate::storage::models::FileType;
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AdminContentRow {
    #[serde(flatten)]
    pub content: ContentResponse,
    pub category_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct PurgeResponse {
    pub categories_deleted: u64,
    pub content_deleted: u64,
}

// ============================================================================
// Category handlers
// ============================================================================

pub async fn create_category(
    _admin: AdminUser,
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<CategoryRequest>,
) -> Result<Json<JSend<CategoryResponse>>, ApiError> {
    save_category(&state, None, req)
}

pub async fn update_category(
    _admin: AdminUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AppJson(req): AppJson<CategoryRequest>,
) -> Result<Json<JSend<CategoryResponse>>, ApiError> {
    save_category(&state, Some(id), req)
}

pub async fn delete_category(
    _admin: AdminUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<JSend<DeleteResponse>>, ApiError> {
    let deleted = admin::delete_category(&state.db, &state.catalog, &id).map_err(admin_error)?;
    if !deleted {
        return Err(ApiError::not_found("Category not found"));
    }
    Ok(JSend::success(DeleteResponse { deleted }))
}

// ============================================================================
// Content handlers
// ============================================================================

/// List every content item across categories, joined with category names.
pub async fn admin_list_content(
    _admin: AdminUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<JSend<Vec<AdminContentRow>>>, ApiError> {
    let names: HashMap<String, String> = state
        .db
        .list_categories()
        .map_err(|e| ApiError::internal(e.to_string()))?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();

    let rows = state
        .db
        .list_all_content()
        .map_err(|e| ApiError::internal(e.to_string()))?
        .iter()
        .map(|item| AdminContentRow {
            category_name: names.get(&item.category_id).cloned(),
            content: content_to_response(item),
        })
        .collect();

    Ok(JSend::success(rows))
}

pub async fn create_content(
    _admin: AdminUser,
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<JSend<ContentResponse>>, ApiError> {
    save_content(&state, None, multipart).await
}

pub async fn update_content(
    _admin: AdminUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<JSend<ContentResponse>>, ApiError> {
    save_content(&state, Some(id), multipart).await
}

pub async fn delete_content(
    _admin: AdminUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<JSend<DeleteResponse>>, ApiError> {
    let deleted = admin::delete_content(&state.db, &state.catalog, &id).map_err(admin_error)?;
    if !deleted {
        return Err(ApiError::not_found("Content not found"));
    }
    Ok(JSend::success(DeleteResponse { deleted }))
}

// ============================================================================
// Internal handlers
// ============================================================================

pub async fn health() -> Json<JSend<HealthResponse>> {
    JSend::success(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn admin_purge(
    State(state): State<Arc<AppState>>,
) -> Result<Json<JSend<PurgeResponse>>, ApiError> {
    let stats = state
        .db
        .purge_all()
        .map_err(|e| ApiError::internal(e.to_string()))?;

    state.catalog.load_categories(&state.db);
    state.catalog.clear_content();

    tracing::warn!(
        categories = stats.categories,
        content = stats.content,
        "Purged all catalog data"
    );

    Ok(JSend::success(PurgeResponse {
        categories_deleted: stats.categories,
        content_deleted: stats.content,
    }))
}

// ============================================================================
// Helpers
// ============================================================================

fn save_category(
    state: &AppState,
    id: Option<String>,
    req: CategoryRequest,
) -> Result<Json<JSend<CategoryResponse>>, ApiError> {
    if req.name.trim().is_empty() {
        return Err(ApiError::bad_request("name must not be empty"));
    }
    if req.slug.trim().is_empty() {
        return Err(ApiError::bad_request("slug must not be empty"));
    }

    let draft = CategoryDraft {
        id,
        name: req.name,
        slug: req.slug,
        icon: req.icon.unwrap_or_default(),
    };

    let category = admin::save_category(&state.db, &state.catalog, draft).map_err(admin_error)?;
    Ok(JSend::success(category_to_response(&category)))
}

async fn save_content(
    state: &AppState,
    id: Option<String>,
    multipart: Multipart,
) -> Result<Json<JSend<ContentResponse>>, ApiError> {
    let (mut draft, cover, content_file) =
        parse_content_form(multipart, state.config.max_upload_size).await?;
    draft.id = id;

    let record = admin::save_content(
        &state.db,
        &state.gateway,
        &state.catalog,
        draft,
        cover,
        content_file,
    )
    .await
    .map_err(admin_error)?;

    Ok(JSend::success(content_to_response(&record)))
}

/// Parse the admin content form: text fields plus the optional `cover` and
/// `file` parts.
async fn parse_content_form(
    mut multipart: Multipart,
    max_upload_size: u64,
) -> Result<(ContentDraft, Option<UploadedFile>, Option<UploadedFile>), ApiError> {
    let mut draft = ContentDraft::default();
    let mut cover: Option<UploadedFile> = None;
    let mut content_file: Option<UploadedFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart data: {e}")))?
    {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "cover" => {
                cover = Some(read_file_part(field, max_upload_size).await?);
            }
            "file" => {
                content_file = Some(read_file_part(field, max_upload_size).await?);
            }
            "category_id" => {
                draft.category_id = Some(text_field(field, "category_id").await?);
            }
            "title" => {
                draft.title = Some(text_field(field, "title").await?);
            }
            "description" => {
                draft.description = Some(text_field(field, "description").await?);
            }
            "image_url" => {
                draft.image_url = Some(text_field(field, "image_url").await?);
            }
            "content_url" => {
                draft.content_url = Some(text_field(field, "content_url").await?);
            }
            "file_type" => {
                let text = text_field(field, "file_type").await?;
                draft.file_type = Some(parse_file_type(&text)?);
            }
            "is_premium" => {
                let text = text_field(field, "is_premium").await?;
                draft.is_premium = Some(text.parse::<bool>().map_err(|_| {
                    ApiError::bad_request("is_premium must be 'true' or 'false'")
                })?);
            }
            "preview_duration" => {
                let text = text_field(field, "preview_duration").await?;
                draft.preview_duration = Some(text.parse::<u32>().map_err(|_| {
                    ApiError::bad_request("preview_duration must be a non-negative integer")
                })?);
            }
            _ => {
                // Ignore unknown fields
            }
        }
    }

    Ok((draft, cover, content_file))
}

async fn read_file_part(
    field: axum::extract::multipart::Field<'_>,
    max_upload_size: u64,
) -> Result<UploadedFile, ApiError> {
    let filename = field.file_name().unwrap_or("upload").to_string();
    let declared_type = field.content_type().map(|s| s.to_string());

    let data = field
        .bytes()
        .await
        .map_err(|e| ApiError::bad_request(format!("Failed to read file: {e}")))?;

    if data.len() as u64 > max_upload_size {
        return Err(ApiError::payload_too_large(format!(
            "File exceeds maximum upload size of {max_upload_size} bytes"
        )));
    }

    // Media type: from the multipart part, or guess from the filename
    let media_type = declared_type
        .filter(|ct| ct != "application/octet-stream")
        .or_else(|| {
            mime_guess::from_path(&filename)
                .first()
                .map(|m| m.to_string())
        })
        .unwrap_or_else(|| "application/octet-stream".to_string());

    Ok(UploadedFile {
        filename,
        media_type,
        data,
    })
}

async fn text_field(
    field: axum::extract::multipart::Field<'_>,
    name: &str,
) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid {name}: {e}")))
}

fn parse_file_type(text: &str) -> Result<FileType, ApiError> {
    match text {
        "video" => Ok(FileType::Video),
        "pdf" => Ok(FileType::Pdf),
        "image" => Ok(FileType::Image),
        "external" => Ok(FileType::External),
        other => Err(ApiError::bad_request(format!(
            "file_type must be one of video, pdf, image, external (got '{other}')"
        ))),
    }
}
