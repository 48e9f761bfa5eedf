//! Connectivity check: verifies the storefront database exists and the
//! categories relation is readable. Operational tooling, not part of the
//! application runtime.
//!
//! Exit codes: 0 on success, 1 when the relation or database is missing or
//! unreadable.

use storefront::storage::Database;

fn main() {
    let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string());
    println!("Verifying storefront database at {data_dir}...");

    let db = match Database::open_existing(&data_dir) {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Connection failed: {e}");
            std::process::exit(1);
        }
    };

    match db.count_categories() {
        Ok(count) => {
            println!("Connection successful! \"categories\" relation found ({count} rows).");
        }
        Err(e) if e.is_missing_table() => {
            eprintln!("Connection failed or relation missing: {e}");
            eprintln!(
                "NOTE: The \"categories\" relation does not exist. \
                 Start the server once to initialize the database."
            );
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Connection failed: {e}");
            std::process::exit(1);
        }
    }
}
