use redb::{Database as RedbDatabase, ReadTransaction, ReadableTable, WriteTransaction};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use super::tables::*;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Commit error: {0}")]
    Commit(Box<redb::CommitError>),
    #[error("Database error: {0}")]
    Redb(Box<redb::Error>),
    #[error("Database error: {0}")]
    RedbDatabase(Box<redb::DatabaseError>),
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] rmp_serde::decode::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] rmp_serde::encode::Error),
    #[error("Storage error: {0}")]
    Storage(Box<redb::StorageError>),
    #[error("Table error: {0}")]
    Table(Box<redb::TableError>),
    #[error("Transaction error: {0}")]
    Transaction(Box<redb::TransactionError>),
}

impl DatabaseError {
    /// True when the error means a relation was never created, as opposed
    /// to a connection/IO failure. Used by the check-db tool.
    pub fn is_missing_table(&self) -> bool {
        matches!(
            self,
            DatabaseError::Table(e) if matches!(**e, redb::TableError::TableDoesNotExist(_))
        )
    }
}

impl From<redb::CommitError> for DatabaseError {
    fn from(e: redb::CommitError) -> Self {
        DatabaseError::Commit(Box::new(e))
    }
}

impl From<redb::DatabaseError> for DatabaseError {
    fn from(e: redb::DatabaseError) -> Self {
        DatabaseError::RedbDatabase(Box::new(e))
    }
}

impl From<redb::Error> for DatabaseError {
    fn from(e: redb::Error) -> Self {
        DatabaseError::Redb(Box::new(e))
    }
}

impl From<redb::StorageError> for DatabaseError {
    fn from(e: redb::StorageError) -> Self {
        DatabaseError::Storage(Box::new(e))
    }
}

impl From<redb::TableError> for DatabaseError {
    fn from(e: redb::TableError) -> Self {
        DatabaseError::Table(Box::new(e))
    }
}

impl From<redb::TransactionError> for DatabaseError {
    fn from(e: redb::TransactionError) -> Self {
        DatabaseError::Transaction(Box::new(e))
    }
}

pub struct Database {
    db: Arc<RedbDatabase>,
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
        }
    }
}

/// Statistics from a purge operation
#[derive(Debug, Default)]
pub struct PurgeStats {
    pub categories: u64,
    pub content: u64,
}

impl Database {
    /// Open or create a database at the given path and initialize all tables.
    pub fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self, DatabaseError> {
        std::fs::create_dir_all(data_dir.as_ref())?;
        let db_path = data_dir.as_ref().join("storefront.redb");
        let db = Arc::new(RedbDatabase::create(db_path)?);

        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(CATEGORIES)?;
            let _ = write_txn.open_table(CATEGORY_SLUGS)?;
            let _ = write_txn.open_table(CONTENT)?;
            let _ = write_txn.open_table(CATEGORY_CONTENT)?;
            let _ = write_txn.open_table(ACCOUNTS)?;
            let _ = write_txn.open_table(ACCOUNT_EMAILS)?;
            let _ = write_txn.open_table(SESSIONS)?;
            let _ = write_txn.open_table(USER_PROFILES)?;
            let _ = write_txn.open_table(SUBSCRIPTIONS)?;
            let _ = write_txn.open_table(USER_SUBSCRIPTIONS)?;
            let _ = write_txn.open_table(USER_PURCHASES)?;
            let _ = write_txn.open_table(USER_PURCHASE_INDEX)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Open an existing database without creating files or tables.
    /// The check-db tool uses this so a missing relation stays observable.
    pub fn open_existing<P: AsRef<Path>>(data_dir: P) -> Result<Self, DatabaseError> {
        let db_path = data_dir.as_ref().join("storefront.redb");
        let db = Arc::new(RedbDatabase::open(db_path)?);
        Ok(Self { db })
    }

    /// Begin a read transaction
    pub fn begin_read(&self) -> Result<ReadTransaction, DatabaseError> {
        Ok(self.db.begin_read()?)
    }

    /// Begin a write transaction
    pub fn begin_write(&self) -> Result<WriteTransaction, DatabaseError> {
        Ok(self.db.begin_write()?)
    }

    /// Count category rows. Reports a missing-table error distinctly so the
    /// connectivity check can tell "relation absent" from "cannot read".
    pub fn count_categories(&self) -> Result<u64, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(CATEGORIES)?;
        let mut count = 0;
        for row in table.iter()? {
            row?;
            count += 1;
        }
        Ok(count)
    }

    // ========================================================================
    // Admin operations
    // ========================================================================

    /// Purge catalog data - for testing only
    pub fn purge_all(&self) -> Result<PurgeStats, DatabaseError> {
        let write_txn = self.begin_write()?;

        let categories = clear_bytes_table(&write_txn, CATEGORIES)?;
        clear_str_table(&write_txn, CATEGORY_SLUGS)?;
        let content = clear_bytes_table(&write_txn, CONTENT)?;
        clear_bytes_table(&write_txn, CATEGORY_CONTENT)?;

        write_txn.commit()?;
        Ok(PurgeStats {
            categories,
            content,
        })
    }
}

fn clear_bytes_table(
    write_txn: &WriteTransaction,
    def: redb::TableDefinition<'static, &'static str, &'static [u8]>,
) -> Result<u64, DatabaseError> {
    let table = write_txn.open_table(def)?;
    let keys: Vec<String> = table
        .iter()?
        .map(|r| r.map(|(k, _)| k.value().to_string()))
        .collect::<Result<Vec<_>, _>>()?;
    drop(table);

    let mut table = write_txn.open_table(def)?;
    let mut removed = 0;
    for key in keys {
        table.remove(key.as_str())?;
        removed += 1;
    }
    Ok(removed)
}

fn clear_str_table(
    write_txn: &WriteTransaction,
    def: redb::TableDefinition<'static, &'static str, &'static str>,
) -> Result<u64, DatabaseError> {
    let table = write_txn.open_table(def)?;
    let keys: Vec<String> = table
        .iter()?
        .map(|r| r.map(|(k, _)| k.value().to_string()))
        .collect::<Result<Vec<_>, _>>()?;
    drop(table);

    let mut table = write_txn.open_table(def)?;
    let mut removed = 0;
    for key in keys {
        table.remove(key.as_str())?;
        removed += 1;
    }
    Ok(removed)
}
