use chrono::{Duration, Utc};
use storefront::storage::models::{
    Category, ContentRecord, FileType, Subscription, UserProfile, UserPurchase,
};
use storefront::storage::Database;

fn test_db() -> (tempfile::TempDir, Database) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(dir.path().join("data")).unwrap();
    (dir, db)
}

fn sample_category(id: &str, name: &str, slug: &str) -> Category {
    Category {
        id: id.to_string(),
        name: name.to_string(),
        slug: slug.to_string(),
        icon: "book".to_string(),
        created_at: Utc::now(),
    }
}

fn sample_content(id: &str, category_id: &str, title: &str) -> ContentRecord {
    let now = Utc::now();
    ContentRecord {
        id: id.to_string(),
        category_id: category_id.to_string(),
        title: title.to_string(),
        description: "a description".to_string(),
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

#[test]
fn test_put_and_get_category() {
    let (_dir, db) = test_db();
    db.put_category(&sample_category("cat-1", "Guides", "guides"))
        .unwrap();

    let retrieved = db
        .get_category("cat-1")
        .unwrap()
        .expect("category should exist");
    assert_eq!(retrieved.name, "Guides");
    assert_eq!(retrieved.slug, "guides");
    assert_eq!(retrieved.icon, "book");
}

#[test]
fn test_get_category_by_slug() {
    let (_dir, db) = test_db();
    db.put_category(&sample_category("cat-2", "Videos", "videos"))
        .unwrap();

    let retrieved = db
        .get_category_by_slug("videos")
        .unwrap()
        .expect("category should exist");
    assert_eq!(retrieved.id, "cat-2");
}

#[test]
fn test_slug_index_follows_rename() {
    let (_dir, db) = test_db();
    let mut category = sample_category("cat-3", "Old", "old-slug");
    db.put_category(&category).unwrap();

    category.slug = "new-slug".to_string();
    db.put_category(&category).unwrap();

    assert!(db.get_category_by_slug("old-slug").unwrap().is_none());
    assert_eq!(
        db.get_category_by_slug("new-slug").unwrap().unwrap().id,
        "cat-3"
    );
}

#[test]
fn test_list_categories_ordered_by_name() {
    let (_dir, db) = test_db();
    db.put_category(&sample_category("c1", "Zebra", "zebra"))
        .unwrap();
    db.put_category(&sample_category("c2", "Apple", "apple"))
        .unwrap();
    db.put_category(&sample_category("c3", "Mango", "mango"))
        .unwrap();

    let names: Vec<String> = db
        .list_categories()
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Apple", "Mango", "Zebra"]);
}

#[test]
fn test_delete_category_cleans_slug_index() {
    let (_dir, db) = test_db();
    db.put_category(&sample_category("cat-4", "Temp", "temp"))
        .unwrap();

    assert!(db.delete_category("cat-4").unwrap());
    assert!(db.get_category("cat-4").unwrap().is_none());
    assert!(db.get_category_by_slug("temp").unwrap().is_none());
}

#[test]
fn test_delete_category_not_found() {
    let (_dir, db) = test_db();
    assert!(!db.delete_category("nonexistent").unwrap());
}

#[test]
fn test_put_and_get_content() {
    let (_dir, db) = test_db();
    db.put_category(&sample_category("cat-1", "Guides", "guides"))
        .unwrap();
    db.put_content(&sample_content("item-1", "cat-1", "First"))
        .unwrap();

    let retrieved = db
        .get_content("item-1")
        .unwrap()
        .expect("content should exist");
    assert_eq!(retrieved.title, "First");
    assert_eq!(retrieved.file_type, FileType::External);
    assert!(retrieved.is_premium);
    assert_eq!(retrieved.preview_duration, Some(30));
}

#[test]
fn test_list_content_by_category_newest_first() {
    let (_dir, db) = test_db();
    let base = Utc::now();

    let mut oldest = sample_content("item-1", "cat-1", "Oldest");
    oldest.created_at = base - Duration::hours(2);
    let mut middle = sample_content("item-2", "cat-1", "Middle");
    middle.created_at = base - Duration::hours(1);
    let mut newest = sample_content("item-3", "cat-1", "Newest");
    newest.created_at = base;
    let other = sample_content("item-4", "cat-2", "Elsewhere");

    db.put_content(&oldest).unwrap();
    db.put_content(&newest).unwrap();
    db.put_content(&middle).unwrap();
    db.put_content(&other).unwrap();

    let titles: Vec<String> = db
        .list_content_by_category("cat-1")
        .unwrap()
        .into_iter()
        .map(|c| c.title)
        .collect();
    assert_eq!(titles, vec!["Newest", "Middle", "Oldest"]);
}

#[test]
fn test_content_index_follows_category_reassignment() {
    let (_dir, db) = test_db();
    let mut item = sample_content("item-1", "cat-a", "Movable");
    db.put_content(&item).unwrap();

    item.category_id = "cat-b".to_string();
    db.put_content(&item).unwrap();

    assert!(db.list_content_by_category("cat-a").unwrap().is_empty());
    assert_eq!(db.list_content_by_category("cat-b").unwrap().len(), 1);
}

#[test]
fn test_delete_content() {
    let (_dir, db) = test_db();
    db.put_content(&sample_content("item-1", "cat-1", "Doomed"))
        .unwrap();

    assert!(db.delete_content("item-1").unwrap());
    assert!(db.get_content("item-1").unwrap().is_none());
    assert!(db.list_content_by_category("cat-1").unwrap().is_empty());
}

#[test]
fn test_purchased_content_ids() {
    let (_dir, db) = test_db();
    let now = Utc::now();

    for (id, content_id) in [("p1", "item-1"), ("p2", "item-2")] {
        db.put_purchase(&UserPurchase {
            id: id.to_string(),
            user_id: "user-1".to_string(),
            content_id: content_id.to_string(),
            amount: 999,
            status: "completed".to_string(),
            purchase_date: now,
            created_at: now,
        })
        .unwrap();
    }

    let ids = db.purchased_content_ids("user-1").unwrap();
    assert!(ids.contains("item-1"));
    assert!(ids.contains("item-2"));
    assert!(!ids.contains("item-3"));

    assert!(db.purchased_content_ids("user-2").unwrap().is_empty());
}

#[test]
fn test_list_purchases_newest_first() {
    let (_dir, db) = test_db();
    let base = Utc::now();

    let mut earlier = UserPurchase {
        id: "p1".to_string(),
        user_id: "user-1".to_string(),
        content_id: "item-1".to_string(),
        amount: 500,
        status: "completed".to_string(),
        purchase_date: base - Duration::days(1),
        created_at: base - Duration::days(1),
    };
    db.put_purchase(&earlier).unwrap();

    earlier.id = "p2".to_string();
    earlier.content_id = "item-2".to_string();
    earlier.purchase_date = base;
    db.put_purchase(&earlier).unwrap();

    let purchases = db.list_purchases("user-1").unwrap();
    assert_eq!(purchases.len(), 2);
    assert_eq!(purchases[0].id, "p2");
    assert_eq!(purchases[1].id, "p1");
}

#[test]
fn test_has_active_subscription() {
    let (_dir, db) = test_db();
    let now = Utc::now();

    db.put_subscription(&Subscription {
        id: "sub-1".to_string(),
        user_id: "user-1".to_string(),
        provider_session_id: String::new(),
        provider_customer_id: String::new(),
        status: "active".to_string(),
        expires_at: now + Duration::days(30),
        created_at: now,
    })
    .unwrap();

    db.put_subscription(&Subscription {
        id: "sub-2".to_string(),
        user_id: "user-2".to_string(),
        provider_session_id: String::new(),
        provider_customer_id: String::new(),
        status: "canceled".to_string(),
        expires_at: now + Duration::days(30),
        created_at: now,
    })
    .unwrap();

    assert!(db.has_active_subscription("user-1", now).unwrap());
    assert!(!db.has_active_subscription("user-2", now).unwrap());
    assert!(!db.has_active_subscription("user-3", now).unwrap());

    // An expired subscription is not active
    assert!(!db
        .has_active_subscription("user-1", now + Duration::days(31))
        .unwrap());
}

#[test]
fn test_put_and_get_profile() {
    let (_dir, db) = test_db();
    db.put_profile(&UserProfile {
        id: "user-1".to_string(),
        email: "admin@example.com".to_string(),
        full_name: "Admin".to_string(),
        avatar_url: String::new(),
        is_admin: true,
        role: "admin".to_string(),
        created_at: Utc::now(),
    })
    .unwrap();

    let profile = db
        .get_profile("user-1")
        .unwrap()
        .expect("profile should exist");
    assert!(profile.is_admin);
    assert_eq!(profile.role, "admin");

    assert!(db.get_profile("nonexistent").unwrap().is_none());
}

#[test]
fn test_purge_all_clears_catalog_only() {
    let (_dir, db) = test_db();
    db.put_category(&sample_category("cat-1", "Guides", "guides"))
        .unwrap();
    db.put_content(&sample_content("item-1", "cat-1", "First"))
        .unwrap();
    db.put_profile(&UserProfile {
        id: "user-1".to_string(),
        email: "user@example.com".to_string(),
        full_name: String::new(),
        avatar_url: String::new(),
        is_admin: false,
        role: "user".to_string(),
        created_at: Utc::now(),
    })
    .unwrap();

    let stats = db.purge_all().unwrap();
    assert_eq!(stats.categories, 1);
    assert_eq!(stats.content, 1);

    assert!(db.list_categories().unwrap().is_empty());
    assert!(db.get_content("item-1").unwrap().is_none());
    assert!(db.get_category_by_slug("guides").unwrap().is_none());

    // User data survives a catalog purge
    assert!(db.get_profile("user-1").unwrap().is_some());
}
