mod catalog_ops;
mod db;
pub mod models;
mod tables;
mod user_ops;

pub use db::{Database, DatabaseError, PurgeStats};
