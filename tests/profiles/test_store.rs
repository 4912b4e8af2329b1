//! Tests for loading profile stores from disk

use netpin::profiles::{ProfileError, ProfileStore, RawSelector};
use tempfile::tempdir;

#[test]
fn test_load_toml_profiles() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("profiles.toml");
    std::fs::write(
        &path,
        r#"
[compilers.solc]
version = "0.8.0"

[networks.development]
host = "127.0.0.1"
port = 7545
network_id = "*"

[networks.ropsten]
host = "ropsten.example.org"
port = 443
network_id = 3
"#,
    )
    .unwrap();

    let store = ProfileStore::load(&path).unwrap();
    let names: Vec<&str> = store.names().map(|n| n.as_str()).collect();
    assert_eq!(names, vec!["development", "ropsten"]);
    assert_eq!(store.default_profile_name().as_str(), "development");

    let ropsten = store.lookup("ropsten").unwrap();
    assert_eq!(ropsten.network_id, Some(RawSelector::Id(3)));
    assert_eq!(ropsten.compiler.version.as_deref(), Some("0.8.0"));
}

#[test]
fn test_load_json_profiles() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("profiles.json");
    std::fs::write(
        &path,
        r#"{
            "default": "local",
            "networks": {
                "local": {
                    "host": "localhost",
                    "port": 8545,
                    "network_id": 1337,
                    "compiler": { "name": "solc", "version": "0.8.19" }
                }
            }
        }"#,
    )
    .unwrap();

    let store = ProfileStore::load(&path).unwrap();
    assert_eq!(store.default_profile_name().as_str(), "local");
    let local = store.lookup("local").unwrap();
    assert_eq!(local.port, Some(8545));
    assert_eq!(local.compiler.name.as_deref(), Some("solc"));
}

#[test]
fn test_out_of_range_port_survives_loading() {
    // The validator, not the parser, reports bad ports
    let store = ProfileStore::from_toml_str(
        r#"
[networks.development]
host = "127.0.0.1"
port = 70000
network_id = "*"
compiler = { name = "solc", version = "0.8.0" }
"#,
    )
    .unwrap();

    assert_eq!(store.lookup("development").unwrap().port, Some(70000));
    let results = store.validate_all();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].1.as_ref().unwrap_err().field, "port");
}

#[test]
fn test_missing_file_is_read_error() {
    let temp = tempdir().unwrap();
    let err = ProfileStore::load(&temp.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ProfileError::Read { .. }));
}

#[test]
fn test_malformed_files_are_parse_errors() {
    let temp = tempdir().unwrap();

    let toml_path = temp.path().join("profiles.toml");
    std::fs::write(&toml_path, "[networks.development\nhost = ").unwrap();
    assert!(matches!(
        ProfileStore::load(&toml_path),
        Err(ProfileError::Toml { .. })
    ));

    let json_path = temp.path().join("profiles.json");
    std::fs::write(&json_path, "{ \"networks\": ").unwrap();
    assert!(matches!(
        ProfileStore::load(&json_path),
        Err(ProfileError::Json { .. })
    ));
}

#[test]
fn test_unsupported_extension() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("profiles.yaml");
    std::fs::write(&path, "networks: {}").unwrap();

    let err = ProfileStore::load(&path).unwrap_err();
    assert!(matches!(err, ProfileError::UnsupportedFormat { .. }));
}
