//! Secret store integration tests.
//!
//! These tests drive `SecretManager` against a real project layout on disk,
//! the way the CLI does: is_enabled -> load -> get/set -> rotate -> persist.

use setenv_core::{paths, Passphrase, GLOBAL_CONTEXT};
use setenv_integration_tests::project;
use setenv_secrets::{SecretError, SecretManager};

async fn open(root: &std::path::Path, passphrase: &str) -> SecretManager {
    let mut manager = SecretManager::for_project(root, Passphrase::new(passphrase)).unwrap();
    manager.load().await.unwrap();
    manager
}

#[tokio::test]
async fn test_set_persist_reload() {
    let dir = project();
    assert!(!SecretManager::is_enabled(dir.path()));

    let mut manager = open(dir.path(), "correct-horse").await;
    manager
        .set_secret(GLOBAL_CONTEXT, "API_KEY", "abc123")
        .await
        .unwrap();
    manager.persist().await.unwrap();
    assert!(SecretManager::is_enabled(dir.path()));

    let reloaded = open(dir.path(), "correct-horse").await;
    let secrets = reloaded.get_secrets(GLOBAL_CONTEXT).await.unwrap();
    let plain: Vec<(&str, &str)> = secrets
        .iter()
        .map(|(k, v)| (k.as_str(), v.expose()))
        .collect();
    assert_eq!(plain, vec![("API_KEY", "abc123")]);
}

#[tokio::test]
async fn test_wrong_password_rejected_before_any_plaintext() {
    let dir = project();
    let mut manager = open(dir.path(), "correct-horse").await;
    manager.set_secret("dev", "ADMIN_PASSWORD", "s3cret").await.unwrap();
    manager.persist().await.unwrap();

    let mut wrong = SecretManager::for_project(dir.path(), Passphrase::new("wrong-horse")).unwrap();
    assert!(matches!(wrong.load().await, Err(SecretError::InvalidPassword)));
    assert!(matches!(
        wrong.get_secrets("dev").await,
        Err(SecretError::NotLoaded)
    ));
}

#[tokio::test]
async fn test_contexts_come_from_config() {
    let dir = project();
    let mut manager = open(dir.path(), "correct-horse").await;

    manager.set_secret("staging", "TOKEN", "x").await.unwrap();
    assert!(manager.get_secrets("dev").await.unwrap().is_empty());
    assert!(matches!(
        manager.get_secrets("production").await,
        Err(SecretError::InvalidContext(_))
    ));
}

#[tokio::test]
async fn test_rotation_survives_reload() {
    let dir = project();
    let mut manager = open(dir.path(), "correct-horse").await;
    manager.set_secret(GLOBAL_CONTEXT, "API_KEY", "abc123").await.unwrap();
    manager.set_secret("dev", "ADMIN_PASSWORD", "s3cret").await.unwrap();
    manager.set_secret("staging", "TOKEN", "").await.unwrap();
    manager.persist().await.unwrap();

    let mut manager = open(dir.path(), "correct-horse").await;
    manager.rotate(Passphrase::new("battery-staple")).await.unwrap();
    manager.persist().await.unwrap();

    let rotated = open(dir.path(), "battery-staple").await;
    assert_eq!(rotated.get_secrets(GLOBAL_CONTEXT).await.unwrap()["API_KEY"].expose(), "abc123");
    assert_eq!(rotated.get_secrets("dev").await.unwrap()["ADMIN_PASSWORD"].expose(), "s3cret");
    assert_eq!(rotated.get_secrets("staging").await.unwrap()["TOKEN"].expose(), "");
}

#[tokio::test]
async fn test_store_file_is_readable_json() {
    let dir = project();
    let mut manager = open(dir.path(), "correct-horse").await;
    manager.set_secret("dev", "ADMIN_PASSWORD", "s3cret").await.unwrap();
    manager.persist().await.unwrap();

    let raw = std::fs::read_to_string(paths::secrets_file(dir.path())).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let token = parsed["dev"]["ADMIN_PASSWORD"].as_str().unwrap();
    assert_eq!(token.split('.').count(), 4);
    assert!(!raw.contains("s3cret"));
}

#[tokio::test]
async fn test_legacy_store_loads() {
    let dir = project();
    std::fs::write(
        paths::secrets_file(dir.path()),
        r#"{
  "GLOBAL": {
    "API_KEY": "M9NoBa83.8OHSw7Sllod4aVpLPC0eDw==.AAECAwQFBgcICQoLDA0ODw==.pdCUNLpo4y1Ok0kvOMetzA=="
  }
}"#,
    )
    .unwrap();

    let manager = open(dir.path(), "correct-horse").await;
    assert_eq!(
        manager.get_secrets(GLOBAL_CONTEXT).await.unwrap()["API_KEY"].expose(),
        "abc123"
    );
}
