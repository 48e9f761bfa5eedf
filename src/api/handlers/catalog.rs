use std::collections::HashSet;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::access::can_access;
use crate::api::extract::CurrentUser;
use crate::api::response::{ApiError, JSend};
use crate::storage::models::{Category, ContentRecord, FileType};
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub icon: String,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct ContentResponse {
    pub id: String,
    pub category_id: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub content_url: String,
    pub file_type: FileType,
    pub is_external: bool,
    pub is_premium: bool,
    pub file_size: Option<u64>,
    pub preview_duration: Option<u32>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize)]
pub struct SectionResponse {
    pub category: Option<CategoryResponse>,
    pub content: Vec<ContentResponse>,
}

#[derive(Debug, Serialize)]
pub struct ContentViewResponse {
    pub content: ContentResponse,
    /// `granted` or `locked`.
    pub access: String,
    /// Seconds of preview playback allowed; present only for locked video.
    pub preview_duration: Option<u32>,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Json<JSend<Vec<CategoryResponse>>> {
    let categories: Vec<CategoryResponse> = state
        .catalog
        .categories()
        .iter()
        .map(category_to_response)
        .collect();

    JSend::success(categories)
}

/// Resolve a section by slug and return its content, newest first.
///
/// An unknown slug resolves to `category: null` and leaves the content
/// snapshot untouched, mirroring the no-op selection behavior.
pub async fn section_content(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Json<JSend<SectionResponse>> {
    state.catalog.load_content(&state.db, &slug);

    let category = state.catalog.category_by_slug(&slug);
    let content = if category.is_some() {
        state
            .catalog
            .content()
            .iter()
            .map(content_to_response)
            .collect()
    } else {
        Vec::new()
    };

    JSend::success(SectionResponse {
        category: category.as_ref().map(category_to_response),
        content,
    })
}

/// Fetch one content item together with the caller's access decision.
pub async fn view_content(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<JSend<ContentViewResponse>>, ApiError> {
    let item = state
        .db
        .get_content(&id)
        .map_err(|e| ApiError::internal(e.to_string()))?
        .ok_or_else(|| ApiError::not_found("Content not found"))?;

    let purchased: HashSet<String> = match user {
        Some(ref u) => state
            .db
            .purchased_content_ids(&u.id)
            .map_err(|e| ApiError::internal(e.to_string()))?,
        None => HashSet::new(),
    };

    let granted = can_access(&item, user.as_ref(), &purchased);
    let preview_duration = if !granted && item.file_type == FileType::Video {
        Some(item.preview_duration_secs())
    } else {
        None
    };

    Ok(JSend::success(ContentViewResponse {
        content: content_to_response(&item),
        access: if granted { "granted" } else { "locked" }.to_string(),
        preview_duration,
    }))
}

// ============================================================================
// Helpers
// ============================================================================

pub(super) fn category_to_response(category: &Category) -> CategoryResponse {
    CategoryResponse {
        id: category.id.clone(),
        name: category.name.clone(),
        slug: category.slug.clone(),
        icon: category.icon.clone(),
        created_at: category.created_at.to_rfc3339(),
    }
}

pub(super) fn content_to_response(item: &ContentRecord) -> ContentResponse {
    ContentResponse {
        id: item.id.clone(),
        category_id: item.category_id.clone(),
        title: item.title.clone(),
        description: item.description.clone(),
        image_url: item.image_url.clone(),
        content_url: item.content_url.clone(),
        file_type: item.file_type,
        is_external: item.file_type.is_external(),
        is_premium: item.is_premium,
        file_size: item.file_size,
        preview_duration: item.preview_duration,
        created_at: item.created_at.to_rfc3339(),
        updated_at: item.updated_at.to_rfc3339(),
    }
}
