//! Integration tests for user records.

use sarathi_core::Error;
use sarathi_store::SqliteStore;
use uuid::Uuid;

async fn test_store() -> (SqliteStore, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteStore::new(dir.path().join("test.db")).await.unwrap();
    (store, dir)
}

#[tokio::test]
async fn test_upsert_creates_then_reuses() {
    let (store, _dir) = test_store().await;

    let first = store
        .upsert_user("uid-1", Some("a@example.com"), Some("A"))
        .await
        .unwrap();
    assert_eq!(first.external_uid, "uid-1");
    assert!(first.last_active.is_some());

    let second = store.upsert_user("uid-1", None, None).await.unwrap();
    assert_eq!(second.id, first.id);
    // Original attributes survive a bare re-verification.
    assert_eq!(second.email.as_deref(), Some("a@example.com"));
}

#[tokio::test]
async fn test_distinct_uids_get_distinct_users() {
    let (store, _dir) = test_store().await;
    let a = store.upsert_user("uid-a", None, None).await.unwrap();
    let b = store.upsert_user("uid-b", None, None).await.unwrap();
    assert_ne!(a.id, b.id);
}

#[tokio::test]
async fn test_update_preferences() {
    let (store, _dir) = test_store().await;
    let user = store.upsert_user("uid-1", None, None).await.unwrap();
    assert_eq!(user.preferences, serde_json::json!({}));

    let updated = store
        .update_preferences(user.id, &serde_json::json!({"language": "hi"}))
        .await
        .unwrap();
    assert_eq!(updated.preferences["language"], "hi");
}

#[tokio::test]
async fn test_update_preferences_unknown_user() {
    let (store, _dir) = test_store().await;
    let err = store
        .update_preferences(Uuid::new_v4(), &serde_json::json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound("user", _)));
}

#[tokio::test]
async fn test_get_unknown_user_is_not_found() {
    let (store, _dir) = test_store().await;
    let err = store.get_user(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, Error::NotFound("user", _)));
}

#[tokio::test]
async fn test_delete_unknown_user_is_not_found() {
    let (store, _dir) = test_store().await;
    let err = store.delete_user(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, Error::NotFound("user", _)));
}
