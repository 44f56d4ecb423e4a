use chrono::{TimeZone, Utc};
use spotauth::{
    error::StoreError,
    management::{CredentialStore, FileCredentialStore},
    types::Credential,
};

fn credential(refresh_token: Option<&str>) -> Credential {
    Credential {
        access_token: "access-1".to_string(),
        refresh_token: refresh_token.map(str::to_string),
        expires_at: Utc.with_ymd_and_hms(2024, 5, 1, 13, 0, 0).unwrap(),
        scope: "user-read-private".to_string(),
        token_type: "Bearer".to_string(),
    }
}

#[tokio::test]
async fn missing_file_means_signed_out() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileCredentialStore::new(dir.path().join("cache/credential.json"));

    assert!(store.load().await.unwrap().is_none());
}

#[tokio::test]
async fn saves_three_fixed_keys() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileCredentialStore::new(dir.path().join("cache/credential.json"));

    store.save(&credential(Some("refresh-1"))).await.unwrap();

    let raw = std::fs::read_to_string(store.path()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let object = value.as_object().unwrap();
    let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["accessToken", "expirationDate", "refreshToken"]);
    assert_eq!(object["accessToken"], "access-1");
    assert_eq!(object["refreshToken"], "refresh-1");

    let loaded = store.load().await.unwrap().unwrap();
    assert_eq!(loaded.access_token, "access-1");
    assert_eq!(loaded.refresh_token.as_deref(), Some("refresh-1"));
    assert_eq!(loaded.expires_at, credential(None).expires_at);
}

#[tokio::test]
async fn absent_refresh_token_is_not_written() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileCredentialStore::new(dir.path().join("credential.json"));

    store.save(&credential(None)).await.unwrap();

    let raw = std::fs::read_to_string(store.path()).unwrap();
    assert!(!raw.contains("refreshToken"));
    assert_eq!(store.load().await.unwrap().unwrap().refresh_token, None);
}

#[tokio::test]
async fn clear_removes_file_and_tolerates_repeats() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileCredentialStore::new(dir.path().join("credential.json"));
    store.save(&credential(Some("refresh-1"))).await.unwrap();

    store.clear().await.unwrap();
    assert!(!store.path().exists());
    assert!(store.load().await.unwrap().is_none());

    store.clear().await.unwrap();
}

#[tokio::test]
async fn malformed_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("credential.json");
    std::fs::write(&path, "{\"accessToken\": 42}").unwrap();

    let err = FileCredentialStore::new(path).load().await.unwrap_err();
    assert!(matches!(err, StoreError::Serde(_)));
}
