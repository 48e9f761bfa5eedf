//! In-memory catalog snapshot.
//!
//! A single snapshot of the category list plus the currently-selected
//! section's content, reloaded in full after every admin mutation. Read
//! failures keep the previous snapshot (stale-read tolerance); there is no
//! retry and no pagination.

use std::sync::RwLock;

use crate::storage::models::{Category, ContentRecord};
use crate::storage::Database;

#[derive(Default)]
struct Snapshot {
    categories: Vec<Category>,
    content: Vec<ContentRecord>,
}

pub struct Catalog {
    snapshot: RwLock<Snapshot>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    pub fn new() -> Self {
        Self {
            snapshot: RwLock::new(Snapshot::default()),
        }
    }

    /// Fetch all categories ordered by name. On failure the prior list is
    /// left untouched and the error is only logged.
    pub fn load_categories(&self, db: &Database) {
        match db.list_categories() {
            Ok(categories) => {
                self.write().categories = categories;
            }
            Err(e) => {
                tracing::error!(error = %e, "Error loading categories");
            }
        }
    }

    /// Resolve `slug` against the already-loaded category list and fetch
    /// that category's content, newest first.
    ///
    /// An unknown slug is a silent no-op: no fetch happens and the content
    /// snapshot keeps its previous value. Fetch failures likewise leave the
    /// previous value in place.
    pub fn load_content(&self, db: &Database, slug: &str) {
        let category_id = {
            let snapshot = self.read();
            match snapshot.categories.iter().find(|c| c.slug == slug) {
                Some(category) => category.id.clone(),
                None => return,
            }
        };

        match db.list_content_by_category(&category_id) {
            Ok(content) => {
                self.write().content = content;
            }
            Err(e) => {
                tracing::error!(error = %e, slug, "Error loading content");
            }
        }
    }

    /// Clear the selected section's content (leaving a section).
    pub fn clear_content(&self) {
        self.write().content = Vec::new();
    }

    pub fn categories(&self) -> Vec<Category> {
        self.read().categories.clone()
    }

    pub fn content(&self) -> Vec<ContentRecord> {
        self.read().content.clone()
    }

    pub fn category_by_slug(&self, slug: &str) -> Option<Category> {
        self.read()
            .categories
            .iter()
            .find(|c| c.slug == slug)
            .cloned()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Snapshot> {
        self.snapshot.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Snapshot> {
        self.snapshot.write().unwrap_or_else(|e| e.into_inner())
    }
}
