//! Drive the netpin binary against temporary workspaces

use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn run_cli(workspace: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_netpin"))
        .args(args)
        .current_dir(workspace)
        .env_remove("RUST_LOG")
        .env_remove("NETPIN_PROFILE")
        .output()
        .expect("run netpin CLI");

    (
        output.status.code().unwrap_or(-1),
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
    )
}

fn initialized_workspace() -> TempDir {
    let temp = TempDir::new().expect("create temp dir");
    let (code, stdout, stderr) = run_cli(temp.path(), &["init"]);
    assert_eq!(code, 0, "init failed: {stdout}\n{stderr}");
    assert!(temp.path().join(".netpin/settings.toml").exists());
    assert!(temp.path().join(".netpin/profiles.toml").exists());
    temp
}

#[test]
fn test_resolve_default_profile_as_json() {
    let workspace = initialized_workspace();
    let (code, stdout, stderr) = run_cli(
        workspace.path(),
        &["resolve", "--installed", "0.8.0", "--json"],
    );
    assert_eq!(code, 0, "{stderr}");

    let json: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    assert_eq!(json["status"], "success");
    assert_eq!(json["data"]["profile"], "development");
    assert_eq!(json["data"]["network"]["host"], "127.0.0.1");
    assert_eq!(json["data"]["network"]["port"], 7545);
    assert_eq!(json["data"]["compiler"]["version"], "0.8.0");
    assert!(json["data"].get("warning").is_none());
}

#[test]
fn test_resolve_rejects_old_compiler() {
    let workspace = initialized_workspace();
    let (code, stdout, _) = run_cli(
        workspace.path(),
        &["resolve", "--installed", "0.7.5", "--json"],
    );
    assert_eq!(code, 2);

    let json: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    assert_eq!(json["status"], "error");
    assert_eq!(json["error"]["stage"], "version");

    let (code, _, stderr) = run_cli(workspace.path(), &["resolve", "--installed", "0.7.5"]);
    assert_eq!(code, 2);
    assert!(stderr.contains("Do not build"), "{stderr}");
}

#[test]
fn test_resolve_unknown_profile() {
    let workspace = initialized_workspace();
    let (code, _, stderr) = run_cli(
        workspace.path(),
        &["resolve", "mainnet", "--installed", "0.8.0"],
    );
    assert_eq!(code, 3);
    assert!(stderr.contains("mainnet"));
}

#[test]
fn test_local_override_selects_profile() {
    let workspace = initialized_workspace();
    let profiles = workspace.path().join(".netpin/profiles.toml");
    let mut content = std::fs::read_to_string(&profiles).unwrap();
    content.push_str("\n[networks.testnet]\nhost = \"10.0.0.5\"\nport = 8545\nnetwork_id = 5\n");
    std::fs::write(&profiles, content).unwrap();
    std::fs::write(
        workspace.path().join(".netpin/profile.local.json"),
        r#"{ "profile": "testnet" }"#,
    )
    .unwrap();

    let (code, stdout, stderr) = run_cli(
        workspace.path(),
        &["resolve", "--installed", "0.8.0", "--json"],
    );
    assert_eq!(code, 0, "{stderr}");
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    assert_eq!(json["data"]["profile"], "testnet");
    assert_eq!(json["data"]["network"]["selector"]["id"], 5);
}

#[test]
fn test_check_reports_invalid_port() {
    let workspace = initialized_workspace();
    let profiles = workspace.path().join(".netpin/profiles.toml");
    let content = std::fs::read_to_string(&profiles)
        .unwrap()
        .replace("port = 7545", "port = 70000");
    std::fs::write(&profiles, content).unwrap();

    let (code, stdout, _) = run_cli(workspace.path(), &["check"]);
    assert_eq!(code, 6);
    assert!(stdout.contains("development"));
    assert!(stdout.contains("port"));
}

#[test]
fn test_list_marks_default() {
    let workspace = initialized_workspace();
    let (code, stdout, _) = run_cli(workspace.path(), &["list", "--json"]);
    assert_eq!(code, 0);

    let json: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    assert_eq!(json["data"][0]["name"], "development");
    assert_eq!(json["data"][0]["default"], true);
    assert_eq!(json["data"][0]["compiler"]["version"], "0.8.0");
}

#[test]
fn test_missing_profiles_file() {
    let temp = TempDir::new().unwrap();
    let (code, _, stderr) = run_cli(
        temp.path(),
        &["--profiles", "nowhere.toml", "resolve", "--installed", "0.8.0"],
    );
    assert_eq!(code, 5);
    assert!(stderr.contains("nowhere.toml"));
}

#[test]
fn test_init_refuses_to_overwrite() {
    let workspace = initialized_workspace();

    let (code, _, stderr) = run_cli(workspace.path(), &["init"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("--force"));

    std::fs::remove_file(workspace.path().join(".netpin/settings.toml")).unwrap();
    let (code, _, stderr) = run_cli(workspace.path(), &["init"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("profiles.toml"));

    let (code, _, _) = run_cli(workspace.path(), &["init", "--force"]);
    assert_eq!(code, 0);
}
