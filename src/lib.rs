//! storefront - A content-paywall storefront API
//!
//! This crate serves a catalog of categories and content items
//! (video/PDF/image/external link), gates premium items behind purchase
//! records, and exposes an admin surface for catalog CRUD with file upload:
//! - Swappable object storage backends (local filesystem, hosted bucket API)
//! - redb embedded database for catalog, auth, and ledger rows
//! - Bearer-session auth with a session-change event stream
//! - REST API with multipart upload support

pub mod access;
pub mod admin;
pub mod api;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod object_store;
pub mod storage;

use auth::AuthManager;
use catalog::Catalog;
use config::Config;
use object_store::StorageGateway;
use storage::Database;

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub auth: AuthManager,
    pub catalog: Catalog,
    pub gateway: StorageGateway,
}
