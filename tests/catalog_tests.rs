use chrono::Utc;
use storefront::catalog::Catalog;
use storefront::storage::models::{Category, ContentRecord, FileType};
use storefront::storage::Database;

fn test_db() -> (tempfile::TempDir, Database) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(dir.path().join("data")).unwrap();
    (dir, db)
}

fn category(id: &str, name: &str, slug: &str) -> Category {
    Category {
        id: id.to_string(),
        name: name.to_string(),
        slug: slug.to_string(),
        icon: "folder".to_string(),
        created_at: Utc::now(),
    }
}

fn content(id: &str, category_id: &str) -> ContentRecord {
    let now = Utc::now();
    ContentRecord {
        id: id.to_string(),
        category_id: category_id.to_string(),
        title: format!("Title {id}"),
        description: String::new(),
        image_url: String::new(),
        content_url: String::new(),
        file_type: FileType::Pdf,
        is_premium: false,
        file_size: None,
        preview_duration: None,
        created_at: now,
        updated_at: now,
    }
}

#[test]
fn test_load_categories_sorted() {
    let (_dir, db) = test_db();
    db.put_category(&category("c1", "Zulu", "zulu")).unwrap();
    db.put_category(&category("c2", "Alpha", "alpha")).unwrap();

    let catalog = Catalog::new();
    catalog.load_categories(&db);

    let names: Vec<String> = catalog.categories().into_iter().map(|c| c.name).collect();
    assert_eq!(names, vec!["Alpha", "Zulu"]);

    assert_eq!(catalog.category_by_slug("zulu").unwrap().id, "c1");
    assert!(catalog.category_by_slug("missing").is_none());
}

#[test]
fn test_load_content_for_known_slug() {
    let (_dir, db) = test_db();
    db.put_category(&category("c1", "Guides", "guides")).unwrap();
    db.put_category(&category("c2", "Videos", "videos")).unwrap();
    db.put_content(&content("item-1", "c1")).unwrap();
    db.put_content(&content("item-2", "c2")).unwrap();

    let catalog = Catalog::new();
    catalog.load_categories(&db);
    catalog.load_content(&db, "guides");

    let ids: Vec<String> = catalog.content().into_iter().map(|c| c.id).collect();
    assert_eq!(ids, vec!["item-1"]);
}

#[test]
fn test_unknown_slug_is_a_no_op() {
    let (_dir, db) = test_db();
    db.put_category(&category("c1", "Guides", "guides")).unwrap();
    db.put_content(&content("item-1", "c1")).unwrap();

    let catalog = Catalog::new();
    catalog.load_categories(&db);
    catalog.load_content(&db, "guides");
    assert_eq!(catalog.content().len(), 1);

    // Selecting a slug that resolves to nothing leaves the snapshot alone
    catalog.load_content(&db, "no-such-section");
    assert_eq!(catalog.content().len(), 1);
    assert_eq!(catalog.content()[0].id, "item-1");
}

#[test]
fn test_clear_content() {
    let (_dir, db) = test_db();
    db.put_category(&category("c1", "Guides", "guides")).unwrap();
    db.put_content(&content("item-1", "c1")).unwrap();

    let catalog = Catalog::new();
    catalog.load_categories(&db);
    catalog.load_content(&db, "guides");
    catalog.clear_content();

    assert!(catalog.content().is_empty());
}

#[test]
fn test_slug_resolution_uses_loaded_snapshot() {
    let (_dir, db) = test_db();
    db.put_category(&category("c1", "Guides", "guides")).unwrap();
    db.put_content(&content("item-1", "c1")).unwrap();

    // Without a prior category load the slug cannot resolve
    let catalog = Catalog::new();
    catalog.load_content(&db, "guides");
    assert!(catalog.content().is_empty());
}
