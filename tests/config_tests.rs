// Tests for credential persistence in src/config.rs

mod common;

use hoyodaily::config::{Credential, CredentialStore};

#[test]
fn test_credential_logged_in_requires_both_fields() {
    assert!(Credential::new("123", "token").is_logged_in());
    assert!(!Credential::new("", "token").is_logged_in());
    assert!(!Credential::new("123", "").is_logged_in());
    assert!(!Credential::default().is_logged_in());
}

#[test]
fn test_cookie_header() {
    let credential = Credential::new("123456789", "v2_token");
    assert_eq!(
        credential.cookie_header(),
        "ltoken_v2=v2_token; ltuid_v2=123456789;"
    );
}

#[test]
fn test_credential_json_field_names() {
    let credential: Credential = serde_json::from_str(common::fixtures::CONFIG_JSON).unwrap();
    assert_eq!(credential.ltuid, "123456789");
    assert_eq!(credential.ltoken, "v2_CAISDGNpZXc");

    let value = serde_json::to_value(&credential).unwrap();
    assert_eq!(value["ltuid_v2"], "123456789");
    assert_eq!(value["ltoken_v2"], "v2_CAISDGNpZXc");
}

#[test]
fn test_credential_missing_fields_default_to_empty() {
    let credential: Credential = serde_json::from_str(r#"{"ltuid_v2": "123"}"#).unwrap();
    assert_eq!(credential.ltuid, "123");
    assert_eq!(credential.ltoken, "");
    assert!(!credential.is_logged_in());
}

#[test]
fn test_save_then_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.json");

    let credential = Credential::new("abc123", "xyz789");
    credential.save(&path).unwrap();

    assert_eq!(Credential::load(&path).unwrap(), credential);
}

#[test]
fn test_store_open_missing_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = CredentialStore::open(dir.path().join("config.json"));

    assert_eq!(store.snapshot(), Credential::default());
    assert!(!store.is_logged_in());
}

#[test]
fn test_store_open_invalid_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "not json").unwrap();

    let store = CredentialStore::open(&path);
    assert!(!store.is_logged_in());
}

#[test]
fn test_store_open_loads_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, common::fixtures::CONFIG_JSON).unwrap();

    let store = CredentialStore::open(&path);
    assert!(store.is_logged_in());
    assert_eq!(store.snapshot().ltuid, "123456789");
}

#[test]
fn test_store_replace_persists_wholesale() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, common::fixtures::CONFIG_JSON).unwrap();

    let store = CredentialStore::open(&path);
    store.replace(Credential::new("999", "new_token")).unwrap();

    assert_eq!(store.snapshot(), Credential::new("999", "new_token"));
    let reopened = CredentialStore::open(&path);
    assert_eq!(reopened.snapshot(), Credential::new("999", "new_token"));
}

#[test]
fn test_store_replace_updates_memory_even_if_save_fails() {
    let dir = tempfile::tempdir().unwrap();
    // A directory where the file should be makes the write fail
    let path = dir.path().join("config.json");
    std::fs::create_dir(&path).unwrap();

    let store = CredentialStore::new(&path);
    assert!(store.replace(Credential::new("1", "2")).is_err());
    assert!(store.is_logged_in());
}

#[cfg(unix)]
#[test]
fn test_saved_config_is_private() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    Credential::new("1", "2").save(&path).unwrap();

    let mode = std::fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}
