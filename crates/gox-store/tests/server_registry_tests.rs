//! Integration tests for the file-backed server registry.

use gox_core::{RepositoryError, ServerDescriptor, ServerRegistry};
use gox_store::FileServerRegistry;

fn trojan(name: &str) -> ServerDescriptor {
    let mut server = ServerDescriptor::new(name, "trojan", "203.0.113.7", 443);
    server.password = "hunter2".to_string();
    server
}

#[tokio::test]
async fn create_assigns_id_and_timestamps() {
    let dir = tempfile::tempdir().unwrap();
    let registry = FileServerRegistry::new(dir.path());

    let created = registry.create(trojan("frankfurt")).await.unwrap();

    assert!(!created.id.is_empty());
    assert_eq!(created.created, created.updated);
    assert!(dir.path().join("frankfurt+203.0.113.7+443.json").exists());

    let fetched = registry.get(&created.id).await.unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn get_missing_id_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let registry = FileServerRegistry::new(dir.path());

    let err = registry.get("does-not-exist").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn duplicate_names_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let registry = FileServerRegistry::new(dir.path());

    registry.create(trojan("paris")).await.unwrap();
    let err = registry.create(trojan("paris")).await.unwrap_err();

    assert!(matches!(err, RepositoryError::AlreadyExists(_)));
    assert_eq!(registry.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn invalid_descriptor_is_rejected_before_write() {
    let dir = tempfile::tempdir().unwrap();
    let registry = FileServerRegistry::new(dir.path());

    let no_password = ServerDescriptor::new("bare", "trojan", "203.0.113.7", 443);
    let err = registry.create(no_password).await.unwrap_err();

    assert!(matches!(err, RepositoryError::Validation(_)));
    assert!(registry.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn update_renames_file_and_keeps_created() {
    let dir = tempfile::tempdir().unwrap();
    let registry = FileServerRegistry::new(dir.path());

    let created = registry.create(trojan("old-name")).await.unwrap();

    let mut renamed = created.clone();
    renamed.name = "new-name".to_string();
    let updated = registry.update(renamed).await.unwrap();

    assert_eq!(updated.created, created.created);
    assert!(updated.updated >= created.updated);
    assert!(!dir.path().join("old-name+203.0.113.7+443.json").exists());
    assert!(dir.path().join("new-name+203.0.113.7+443.json").exists());
    assert_eq!(registry.get_by_name("new-name").await.unwrap().id, created.id);
}

#[tokio::test]
async fn update_to_taken_name_fails() {
    let dir = tempfile::tempdir().unwrap();
    let registry = FileServerRegistry::new(dir.path());

    registry.create(trojan("a")).await.unwrap();
    let mut b = registry.create(trojan("b")).await.unwrap();
    b.name = "a".to_string();

    assert!(matches!(
        registry.update(b).await,
        Err(RepositoryError::AlreadyExists(_))
    ));
}

#[tokio::test]
async fn validate_name_ignores_excluded_record() {
    let dir = tempfile::tempdir().unwrap();
    let registry = FileServerRegistry::new(dir.path());

    let a = registry.create(trojan("a")).await.unwrap();

    assert!(registry.validate_name("a", &a.id).await.is_ok());
    assert!(registry.validate_name("a", "").await.is_err());
    assert!(registry.validate_name("b", "").await.is_ok());
}

#[tokio::test]
async fn delete_removes_record() {
    let dir = tempfile::tempdir().unwrap();
    let registry = FileServerRegistry::new(dir.path());

    let created = registry.create(trojan("gone")).await.unwrap();
    registry.delete(&created.id).await.unwrap();

    assert!(registry.list().await.unwrap().is_empty());
    assert!(registry.delete(&created.id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn list_skips_malformed_and_foreign_files() {
    let dir = tempfile::tempdir().unwrap();
    let registry = FileServerRegistry::new(dir.path());

    registry.create(trojan("good")).await.unwrap();
    std::fs::write(dir.path().join("broken.json"), "{ nope").unwrap();
    std::fs::write(dir.path().join("README.txt"), "not a record").unwrap();

    let servers = registry.list().await.unwrap();
    assert_eq!(servers.len(), 1);
    assert_eq!(servers[0].name, "good");
}
