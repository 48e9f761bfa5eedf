use std::collections::HashSet;

use chrono::Utc;
use storefront::access::{can_access, PreviewGate};
use storefront::auth::AuthUser;
use storefront::storage::models::{ContentRecord, FileType, UserProfile};

fn item(id: &str, is_premium: bool) -> ContentRecord {
    let now = Utc::now();
    ContentRecord {
        id: id.to_string(),
        category_id: "cat-1".to_string(),
        title: "Item".to_string(),
        description: String::new(),
        image_url: String::new(),
        content_url: String::new(),
        file_type: FileType::Video,
        is_premium,
        file_size: None,
        preview_duration: None,
        created_at: now,
        updated_at: now,
    }
}

fn user(id: &str, is_admin: bool) -> AuthUser {
    AuthUser {
        id: id.to_string(),
        email: format!("{id}@example.com"),
        profile: Some(UserProfile {
            id: id.to_string(),
            email: format!("{id}@example.com"),
            full_name: String::new(),
            avatar_url: String::new(),
            is_admin,
            role: if is_admin { "admin" } else { "user" }.to_string(),
            created_at: Utc::now(),
        }),
    }
}

fn purchased(ids: &[&str]) -> HashSet<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_free_content_is_open_to_everyone() {
    let free = item("item-1", false);
    let none = purchased(&[]);

    assert!(can_access(&free, None, &none));
    assert!(can_access(&free, Some(&user("u1", false)), &none));
    assert!(can_access(&free, Some(&user("a1", true)), &none));
}

#[test]
fn test_premium_content_requires_purchase() {
    let premium = item("item-1", true);

    assert!(!can_access(&premium, None, &purchased(&[])));
    assert!(!can_access(
        &premium,
        Some(&user("u1", false)),
        &purchased(&[])
    ));
    assert!(can_access(
        &premium,
        Some(&user("u1", false)),
        &purchased(&["item-1"])
    ));
    // A purchase of a different item does not help
    assert!(!can_access(
        &premium,
        Some(&user("u1", false)),
        &purchased(&["item-2"])
    ));
}

#[test]
fn test_admin_bypasses_purchase_check() {
    let premium = item("item-1", true);
    assert!(can_access(&premium, Some(&user("a1", true)), &purchased(&[])));
}

#[test]
fn test_missing_profile_is_not_admin() {
    let premium = item("item-1", true);
    let anonymous_profile = AuthUser {
        id: "u1".to_string(),
        email: "u1@example.com".to_string(),
        profile: None,
    };
    assert!(!can_access(&premium, Some(&anonymous_profile), &purchased(&[])));
}

#[test]
fn test_preview_gate_fires_once_at_boundary() {
    let mut gate = PreviewGate::new(30);
    assert_eq!(gate.boundary(), 30.0);

    assert!(gate.on_time_update(0.0).is_none());
    assert!(gate.on_time_update(29.9).is_none());

    let cutoff = gate.on_time_update(30.0).expect("boundary crossing fires");
    assert_eq!(cutoff.clamp_to, 30.0);

    // Subsequent updates past the boundary stay quiet
    assert!(gate.on_time_update(30.5).is_none());
    assert!(gate.on_time_update(31.0).is_none());
}

#[test]
fn test_preview_gate_rearms_after_seek_back() {
    let mut gate = PreviewGate::new(30);

    assert!(gate.on_time_update(31.0).is_some());
    assert!(gate.on_time_update(32.0).is_none());

    // Seeking below the boundary re-arms the gate
    assert!(gate.on_time_update(10.0).is_none());
    assert!(gate.on_time_update(30.0).is_some());
}
