//! Admin content-management workflow: category/content saves with optional
//! file upload and derived-field computation, and deletes.
//!
//! Privilege is enforced at the HTTP boundary, not here. Every mutation
//! ends with a full catalog reload; there is no optimistic update.

use bytes::Bytes;
use chrono::Utc;
use thiserror::Error;

use crate::catalog::Catalog;
use crate::object_store::{upload_path, ObjectStoreError, StorageGateway};
use crate::storage::models::{Category, ContentRecord, FileType};
use crate::storage::{Database, DatabaseError};

/// Migration that provisions the storage bucket; named in the remediation
/// message when uploads fail because the bucket does not exist.
pub const BUCKET_MIGRATION: &str = "20251223_add_content_file_fields.sql";

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("storage bucket '{0}' not found; run the {BUCKET_MIGRATION} migration")]
    BucketMissing(String),
    #[error("storage error: {0}")]
    Storage(ObjectStoreError),
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Invalid(String),
}

impl AdminError {
    fn from_storage(e: ObjectStoreError) -> Self {
        match e {
            ObjectStoreError::BucketNotFound(bucket) => AdminError::BucketMissing(bucket),
            other => AdminError::Storage(other),
        }
    }
}

/// Category form contents. A present `id` means edit, absent means create.
#[derive(Debug, Clone, Default)]
pub struct CategoryDraft {
    pub id: Option<String>,
    pub name: String,
    pub slug: String,
    pub icon: String,
}

/// Content form contents. Optional fields are "not provided" on edit;
/// create applies defaults (premium on, external link, 30 s preview).
#[derive(Debug, Clone, Default)]
pub struct ContentDraft {
    pub id: Option<String>,
    pub category_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub content_url: Option<String>,
    pub file_type: Option<FileType>,
    pub is_premium: Option<bool>,
    pub preview_duration: Option<u32>,
}

/// An uploaded multipart file part.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub media_type: String,
    pub data: Bytes,
}

/// Insert or update a category, then reload the category snapshot.
///
/// No slug format or uniqueness validation happens before submission;
/// conflicts surface only as storage errors.
pub fn save_category(
    db: &Database,
    catalog: &Catalog,
    draft: CategoryDraft,
) -> Result<Category, AdminError> {
    let category = match draft.id {
        Some(ref id) => {
            let mut existing = db
                .get_category(id)?
                .ok_or(AdminError::NotFound("category"))?;
            existing.name = draft.name;
            existing.slug = draft.slug;
            existing.icon = draft.icon;
            existing
        }
        None => Category {
            id: uuid::Uuid::new_v4().to_string(),
            name: draft.name,
            slug: draft.slug,
            icon: draft.icon,
            created_at: Utc::now(),
        },
    };

    db.put_category(&category)?;
    catalog.load_categories(db);

    tracing::debug!(category_id = %category.id, slug = %category.slug, "Saved category");
    Ok(category)
}

/// Insert or update a content item. Uploads the cover and content files
/// when present, derives `content_url`, `file_size`, and `file_type` from
/// the content upload, persists, and reloads the section's content list.
pub async fn save_content(
    db: &Database,
    gateway: &StorageGateway,
    catalog: &Catalog,
    draft: ContentDraft,
    cover: Option<UploadedFile>,
    content_file: Option<UploadedFile>,
) -> Result<ContentRecord, AdminError> {
    let now = Utc::now();

    let mut record = match draft.id {
        Some(ref id) => db.get_content(id)?.ok_or(AdminError::NotFound("content"))?,
        None => {
            let category_id = draft
                .category_id
                .clone()
                .ok_or_else(|| AdminError::Invalid("category_id is required".into()))?;
            let title = draft
                .title
                .clone()
                .ok_or_else(|| AdminError::Invalid("title is required".into()))?;
            ContentRecord {
                id: uuid::Uuid::new_v4().to_string(),
                category_id,
                title,
                description: String::new(),
                image_url: String::new(),
                content_url: String::new(),
                file_type: FileType::External,
                is_premium: true,
                file_size: None,
                preview_duration: Some(30),
                created_at: now,
                updated_at: now,
            }
        }
    };

    if let Some(category_id) = draft.category_id {
        record.category_id = category_id;
    }
    if let Some(title) = draft.title {
        record.title = title;
    }
    if let Some(description) = draft.description {
        record.description = description;
    }
    if let Some(image_url) = draft.image_url {
        record.image_url = image_url;
    }
    if let Some(content_url) = draft.content_url {
        record.content_url = content_url;
    }
    if let Some(file_type) = draft.file_type {
        record.file_type = file_type;
    }
    if let Some(is_premium) = draft.is_premium {
        record.is_premium = is_premium;
    }
    if let Some(preview_duration) = draft.preview_duration {
        record.preview_duration = Some(preview_duration);
    }

    if let Some(cover) = cover {
        let path = upload_path("covers", now.timestamp_millis(), safe_filename(&cover.filename));
        let stored = gateway
            .upload_file(&path, cover.data, &cover.media_type)
            .await
            .map_err(AdminError::from_storage)?;
        record.image_url = gateway.public_url(&stored);
    }

    // Derived fields are computed only when a content file was actually
    // uploaded; URL-only edits leave file_type and file_size unchanged.
    if let Some(file) = content_file {
        let path = upload_path("content", now.timestamp_millis(), safe_filename(&file.filename));
        let byte_size = file.data.len() as u64;
        let stored = gateway
            .upload_file(&path, file.data, &file.media_type)
            .await
            .map_err(AdminError::from_storage)?;
        record.content_url = gateway.public_url(&stored);
        record.file_size = Some(byte_size);
        record.file_type = FileType::from_media_type(&file.media_type);
    }

    record.updated_at = now;
    db.put_content(&record)?;

    reload_section(db, catalog, &record.category_id);

    tracing::debug!(content_id = %record.id, file_type = ?record.file_type, "Saved content");
    Ok(record)
}

/// Delete a category by id and reload the category list. Content rows
/// referencing it are not cascaded client-side.
pub fn delete_category(db: &Database, catalog: &Catalog, id: &str) -> Result<bool, AdminError> {
    let deleted = db.delete_category(id)?;
    catalog.load_categories(db);

    tracing::debug!(category_id = %id, deleted, "Deleted category");
    Ok(deleted)
}

/// Delete a content item by id and reload its section. The stored object
/// is left in the bucket; only the row is removed.
pub fn delete_content(db: &Database, catalog: &Catalog, id: &str) -> Result<bool, AdminError> {
    let category_id = db.get_content(id)?.map(|c| c.category_id);
    let deleted = db.delete_content(id)?;

    if let Some(ref category_id) = category_id {
        reload_section(db, catalog, category_id);
    }

    tracing::debug!(content_id = %id, deleted, "Deleted content");
    Ok(deleted)
}

/// Reduce a client-supplied filename to its final path component so the
/// stored key cannot escape the `covers/` and `content/` prefixes.
fn safe_filename(raw: &str) -> &str {
    let name = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    if name.is_empty() || name == "." || name == ".." {
        "upload"
    } else {
        name
    }
}

fn reload_section(db: &Database, catalog: &Catalog, category_id: &str) {
    let slug = match db.get_category(category_id) {
        Ok(Some(category)) => category.slug,
        // Dangling category reference: nothing to reload
        Ok(None) => return,
        Err(e) => {
            tracing::error!(error = %e, category_id, "Error resolving category for reload");
            return;
        }
    };
    catalog.load_categories(db);
    catalog.load_content(db, &slug);
}
