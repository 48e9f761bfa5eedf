use std::sync::Arc;

use bytes::Bytes;
use storefront::object_store::{upload_path, LocalStore, ObjectStore, ObjectStoreError, StorageGateway};

fn test_store() -> (tempfile::TempDir, LocalStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path(), "content-files").unwrap();
    (dir, store)
}

#[tokio::test]
async fn test_local_store_put_get() {
    let (_dir, store) = test_store();

    let data = Bytes::from("hello world");
    store
        .put("covers/1_test.png", data.clone(), "image/png")
        .await
        .unwrap();

    let retrieved = store.get("covers/1_test.png").await.unwrap();
    assert_eq!(retrieved, data);
}

#[tokio::test]
async fn test_local_store_put_overwrites() {
    let (_dir, store) = test_store();

    store
        .put("key", Bytes::from("first"), "text/plain")
        .await
        .unwrap();
    store
        .put("key", Bytes::from("second"), "text/plain")
        .await
        .unwrap();

    assert_eq!(store.get("key").await.unwrap(), Bytes::from("second"));
}

#[tokio::test]
async fn test_local_store_exists() {
    let (_dir, store) = test_store();

    assert!(!store.exists("missing").await.unwrap());

    store
        .put("present", Bytes::from("data"), "text/plain")
        .await
        .unwrap();
    assert!(store.exists("present").await.unwrap());
}

#[tokio::test]
async fn test_local_store_delete() {
    let (_dir, store) = test_store();

    store
        .put("to-delete", Bytes::from("data"), "text/plain")
        .await
        .unwrap();
    store.delete("to-delete").await.unwrap();
    assert!(!store.exists("to-delete").await.unwrap());

    // Deleting a nonexistent key should not error
    store.delete("nonexistent").await.unwrap();
}

#[tokio::test]
async fn test_local_store_get_not_found() {
    let (_dir, store) = test_store();

    let result = store.get("missing").await;
    assert!(matches!(
        result.unwrap_err(),
        ObjectStoreError::NotFound(_)
    ));
}

#[tokio::test]
async fn test_local_store_missing_bucket() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path(), "content-files").unwrap();
    std::fs::remove_dir_all(dir.path().join("content-files")).unwrap();

    let result = store.put("key", Bytes::from("data"), "text/plain").await;
    assert!(matches!(
        result.unwrap_err(),
        ObjectStoreError::BucketNotFound(_)
    ));
}

#[tokio::test]
async fn test_local_store_rejects_escaping_paths() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path(), "content-files").unwrap();

    // A file outside the bucket must stay unreachable through the store
    std::fs::write(dir.path().join("outside.txt"), b"bucket-external data").unwrap();

    for path in ["../outside.txt", "../../outside.txt", "a/../../outside.txt"] {
        assert!(
            matches!(
                store.get(path).await.unwrap_err(),
                ObjectStoreError::Backend(_)
            ),
            "get accepted {path}"
        );
        assert!(
            store
                .put(path, Bytes::from("x"), "text/plain")
                .await
                .is_err(),
            "put accepted {path}"
        );
        assert!(store.exists(path).await.is_err(), "exists accepted {path}");
        assert!(store.delete(path).await.is_err(), "delete accepted {path}");
    }

    // Nothing escaped the bucket
    assert_eq!(
        std::fs::read(dir.path().join("outside.txt")).unwrap(),
        b"bucket-external data"
    );

    // Plain nested keys still work
    store
        .put("covers/1_a.png", Bytes::from("ok"), "image/png")
        .await
        .unwrap();
    assert!(store.exists("covers/1_a.png").await.unwrap());
}

#[test]
fn test_upload_path_format() {
    assert_eq!(
        upload_path("covers", 1700000000123, "poster.png"),
        "covers/1700000000123_poster.png"
    );
    assert_eq!(
        upload_path("content", 42, "lesson one.mp4"),
        "content/42_lesson one.mp4"
    );
}

fn test_gateway(signing_key: Option<String>) -> (tempfile::TempDir, StorageGateway) {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path(), "content-files").unwrap();
    let gateway = StorageGateway::new(
        Arc::new(store),
        "content-files",
        "http://localhost:8080/",
        signing_key,
    );
    (dir, gateway)
}

#[tokio::test]
async fn test_gateway_upload_and_fetch() {
    let (_dir, gateway) = test_gateway(None);

    let stored = gateway
        .upload_file("covers/1_a.png", Bytes::from("png bytes"), "image/png")
        .await
        .unwrap();
    assert_eq!(stored, "covers/1_a.png");

    assert!(gateway.exists("covers/1_a.png").await.unwrap());
    assert_eq!(
        gateway.fetch("covers/1_a.png").await.unwrap(),
        Bytes::from("png bytes")
    );
}

#[tokio::test]
async fn test_gateway_fetch_cannot_leave_bucket() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path(), "content-files").unwrap();
    std::fs::write(dir.path().join("secret.txt"), b"do not serve").unwrap();
    let gateway = StorageGateway::new(
        Arc::new(store),
        "content-files",
        "http://localhost:8080",
        None,
    );

    assert!(gateway.fetch("../secret.txt").await.is_err());
    assert!(gateway.fetch("../../secret.txt").await.is_err());
}

#[tokio::test]
async fn test_gateway_delete_file() {
    let (_dir, gateway) = test_gateway(None);

    gateway
        .upload_file("covers/1_a.png", Bytes::from("png bytes"), "image/png")
        .await
        .unwrap();
    gateway.delete_file("covers/1_a.png").await.unwrap();
    assert!(!gateway.exists("covers/1_a.png").await.unwrap());
}

#[test]
fn test_gateway_public_url_trims_trailing_slash() {
    let (_dir, gateway) = test_gateway(None);

    assert_eq!(
        gateway.public_url("covers/1_a.png"),
        "http://localhost:8080/storage/content-files/covers/1_a.png"
    );
}

#[test]
fn test_signed_url_roundtrip() {
    let (_dir, gateway) = test_gateway(Some("secret-key".to_string()));

    let url = gateway
        .signed_url("content/1_clip.mp4", 3600)
        .expect("signing key is configured");
    assert!(url.starts_with("http://localhost:8080/storage/content-files/content/1_clip.mp4?token="));

    // Pull token and expires back out of the query string
    let query = url.split_once('?').unwrap().1;
    let mut token = None;
    let mut expires = None;
    for pair in query.split('&') {
        match pair.split_once('=').unwrap() {
            ("token", v) => token = Some(v.to_string()),
            ("expires", v) => expires = Some(v.parse::<i64>().unwrap()),
            _ => {}
        }
    }
    let token = token.unwrap();
    let expires = expires.unwrap();

    assert!(gateway.verify_signed("content/1_clip.mp4", &token, expires));

    // Forged token, wrong path, and expired timestamps are all rejected
    assert!(!gateway.verify_signed("content/1_clip.mp4", "bogus", expires));
    assert!(!gateway.verify_signed("content/2_other.mp4", &token, expires));
    assert!(!gateway.verify_signed("content/1_clip.mp4", &token, 1));
}

#[test]
fn test_signed_url_without_key() {
    let (_dir, gateway) = test_gateway(None);

    assert!(gateway.signed_url("content/1_clip.mp4", 3600).is_none());
    assert!(!gateway.verify_signed("content/1_clip.mp4", "anything", i64::MAX));
}
