use redb::ReadableTable;

use super::db::{Database, DatabaseError};
use super::models::{Category, ContentRecord};
use super::tables::*;

impl Database {
    // ========================================================================
    // Category operations
    // ========================================================================

    /// Store a category record and update the slug index.
    ///
    /// No slug-uniqueness validation happens here: a colliding slug simply
    /// repoints the index (last writer wins), matching the save path that
    /// defers all validation to the storage layer.
    pub fn put_category(&self, category: &Category) -> Result<(), DatabaseError> {
        debug_assert!(!category.id.is_empty(), "category id must not be empty");

        let write_txn = self.begin_write()?;
        {
            // Drop a stale slug index entry when the slug changed
            let old_slug: Option<String> = {
                let table = write_txn.open_table(CATEGORIES)?;
                let existing = table.get(category.id.as_str())?;
                match existing {
                    Some(data) => {
                        let old: Category = rmp_serde::from_slice(data.value())?;
                        Some(old.slug)
                    }
                    None => None,
                }
            };

            let mut table = write_txn.open_table(CATEGORIES)?;
            let data = rmp_serde::to_vec_named(category)?;
            table.insert(category.id.as_str(), data.as_slice())?;

            let mut slug_table = write_txn.open_table(CATEGORY_SLUGS)?;
            if let Some(old_slug) = old_slug {
                if old_slug != category.slug {
                    slug_table.remove(old_slug.as_str())?;
                }
            }
            slug_table.insert(category.slug.as_str(), category.id.as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Get a category by its id
    pub fn get_category(&self, id: &str) -> Result<Option<Category>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(CATEGORIES)?;

        match table.get(id)? {
            Some(data) => Ok(Some(rmp_serde::from_slice(data.value())?)),
            None => Ok(None),
        }
    }

    /// Get a category by its slug (resolves slug -> id -> category)
    pub fn get_category_by_slug(&self, slug: &str) -> Result<Option<Category>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let slug_table = read_txn.open_table(CATEGORY_SLUGS)?;

        let id = match slug_table.get(slug)? {
            Some(data) => data.value().to_string(),
            None => return Ok(None),
        };

        let table = read_txn.open_table(CATEGORIES)?;
        match table.get(id.as_str())? {
            Some(data) => Ok(Some(rmp_serde::from_slice(data.value())?)),
            None => Ok(None),
        }
    }

    /// List all categories ordered by name ascending.
    pub fn list_categories(&self) -> Result<Vec<Category>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(CATEGORIES)?;

        let mut categories = Vec::new();
        for result in table.iter()? {
            let (_, value) = result?;
            let category: Category = rmp_serde::from_slice(value.value())?;
            categories.push(category);
        }

        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    /// Delete a category by id and clean up the slug index.
    ///
    /// Content rows referencing the category are left in place; there is no
    /// client-side cascade guard.
    pub fn delete_category(&self, id: &str) -> Result<bool, DatabaseError> {
        let write_txn = self.begin_write()?;

        let slug: Option<String> = {
            let table = write_txn.open_table(CATEGORIES)?;
            let existing = table.get(id)?;
            match existing {
                Some(data) => {
                    let category: Category = rmp_serde::from_slice(data.value())?;
                    Some(category.slug)
                }
                None => None,
            }
        };

        let deleted = match slug {
            Some(slug) => {
                {
                    let mut table = write_txn.open_table(CATEGORIES)?;
                    table.remove(id)?;
                }
                {
                    let mut slug_table = write_txn.open_table(CATEGORY_SLUGS)?;
                    slug_table.remove(slug.as_str())?;
                }
                true
            }
            None => false,
        };

        write_txn.commit()?;
        Ok(deleted)
    }

    // ========================================================================
    // Content operations
    // ========================================================================

    /// Store a content record and maintain the category index.
    pub fn put_content(&self, content: &ContentRecord) -> Result<(), DatabaseError> {
        debug_assert!(!content.id.is_empty(), "content id must not be empty");

        let write_txn = self.begin_write()?;
        {
            // Handle category reassignment on update
            let old_category: Option<String> = {
                let table = write_txn.open_table(CONTENT)?;
                let existing = table.get(content.id.as_str())?;
                match existing {
                    Some(data) => {
                        let old: ContentRecord = rmp_serde::from_slice(data.value())?;
                        Some(old.category_id)
                    }
                    None => None,
                }
            };

            let mut table = write_txn.open_table(CONTENT)?;
            let data = rmp_serde::to_vec_named(content)?;
            table.insert(content.id.as_str(), data.as_slice())?;

            let mut index = write_txn.open_table(CATEGORY_CONTENT)?;

            if let Some(ref old_category) = old_category {
                if *old_category != content.category_id {
                    remove_from_index(&mut index, old_category, &content.id)?;
                }
            }

            let mut ids: Vec<String> = match index.get(content.category_id.as_str())? {
                Some(data) => rmp_serde::from_slice(data.value())?,
                None => Vec::new(),
            };
            if !ids.contains(&content.id) {
                ids.push(content.id.clone());
                let data = rmp_serde::to_vec_named(&ids)?;
                index.insert(content.category_id.as_str(), data.as_slice())?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Get a content item by id
    pub fn get_content(&self, id: &str) -> Result<Option<ContentRecord>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(CONTENT)?;

        match table.get(id)? {
            Some(data) => Ok(Some(rmp_serde::from_slice(data.value())?)),
            None => Ok(None),
        }
    }

    /// List content for one category, newest first.
    pub fn list_content_by_category(
        &self,
        category_id: &str,
    ) -> Result<Vec<ContentRecord>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let index = read_txn.open_table(CATEGORY_CONTENT)?;
        let table = read_txn.open_table(CONTENT)?;

        let ids: Vec<String> = match index.get(category_id)? {
            Some(data) => rmp_serde::from_slice(data.value())?,
            None => return Ok(Vec::new()),
        };

        let mut items = Vec::new();
        for id in ids {
            if let Some(data) = table.get(id.as_str())? {
                let item: ContentRecord = rmp_serde::from_slice(data.value())?;
                items.push(item);
            }
        }

        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    /// List all content, newest first (admin overview).
    pub fn list_all_content(&self) -> Result<Vec<ContentRecord>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(CONTENT)?;

        let mut items = Vec::new();
        for result in table.iter()? {
            let (_, value) = result?;
            let item: ContentRecord = rmp_serde::from_slice(value.value())?;
            items.push(item);
        }

        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    /// Delete a content item by id and clean up the category index.
    pub fn delete_content(&self, id: &str) -> Result<bool, DatabaseError> {
        let write_txn = self.begin_write()?;

        let category_id: Option<String> = {
            let table = write_txn.open_table(CONTENT)?;
            let existing = table.get(id)?;
            match existing {
                Some(data) => {
                    let item: ContentRecord = rmp_serde::from_slice(data.value())?;
                    Some(item.category_id)
                }
                None => None,
            }
        };

        let deleted = match category_id {
            Some(category_id) => {
                {
                    let mut table = write_txn.open_table(CONTENT)?;
                    table.remove(id)?;
                }
                {
                    let mut index = write_txn.open_table(CATEGORY_CONTENT)?;
                    remove_from_index(&mut index, &category_id, id)?;
                }
                true
            }
            None => false,
        };

        write_txn.commit()?;
        Ok(deleted)
    }
}

fn remove_from_index(
    index: &mut redb::Table<'_, &'static str, &'static [u8]>,
    key: &str,
    id: &str,
) -> Result<(), DatabaseError> {
    let ids: Option<Vec<String>> = match index.get(key)? {
        Some(data) => Some(rmp_serde::from_slice(data.value())?),
        None => None,
    };

    if let Some(mut ids) = ids {
        ids.retain(|existing| existing != id);
        if ids.is_empty() {
            index.remove(key)?;
        } else {
            let data = rmp_serde::to_vec_named(&ids)?;
            index.insert(key, data.as_slice())?;
        }
    }
    Ok(())
}
