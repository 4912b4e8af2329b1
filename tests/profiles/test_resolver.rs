//! Tests for end-to-end profile resolution

use netpin::profiles::{
    CompilerProbe, NetworkSelector, PinnedProbe, ProbeError, ProfileName, ProfileStore,
    RawProfile, RawSelector, ResolutionCause, Resolver, Stage, Version,
};
use std::time::Duration;

fn development_store() -> ProfileStore {
    ProfileStore::from_toml_str(
        r#"
[compilers.solc]
version = "0.8.0"

[networks.development]
host = "127.0.0.1"
port = 7545
network_id = "*"
"#,
    )
    .unwrap()
}

fn installed(version: &str) -> PinnedProbe {
    PinnedProbe::new().with("solc", Version::parse(version).unwrap())
}

fn name(s: &str) -> ProfileName {
    ProfileName::new(s).unwrap()
}

#[test]
fn test_default_profile_resolves_with_exact_compiler() {
    let store = development_store();
    let probe = installed("0.8.0");

    let context = Resolver::new(&store, &probe).resolve(None).unwrap();

    assert_eq!(context.profile().as_str(), "development");
    assert_eq!(context.host(), "127.0.0.1");
    assert_eq!(context.port(), 7545);
    assert_eq!(context.network().selector, NetworkSelector::Any);
    assert_eq!(context.compiler().name, "solc");
    assert_eq!(context.compiler().version, Version::new(0, 8, 0));
    assert_eq!(context.installed_version(), &Version::new(0, 8, 0));
    assert_eq!(context.warning(), None);
}

#[test]
fn test_older_compiler_fails_at_version_stage() {
    let store = development_store();
    let probe = installed("0.7.5");

    let err = Resolver::new(&store, &probe).resolve(None).unwrap_err();
    assert_eq!(err.stage, Stage::Version);
    assert!(matches!(err.cause, ResolutionCause::Rejected { .. }));
}

#[test]
fn test_patch_drift_attaches_warning() {
    let store = development_store();
    let probe = installed("0.8.5");

    let context = Resolver::new(&store, &probe).resolve(None).unwrap();
    let warning = context.warning().expect("drift warning");
    assert!(warning.contains("0.8.5"));
    // The declared pin is reported, not the installed version
    assert_eq!(context.compiler().version, Version::new(0, 8, 0));
    assert_eq!(context.installed_version(), &Version::new(0, 8, 5));
}

#[test]
fn test_unknown_profile_never_falls_back() {
    let store = development_store();
    let probe = installed("0.8.0");

    let err = Resolver::new(&store, &probe)
        .resolve(Some(&name("mainnet")))
        .unwrap_err();
    assert_eq!(err.stage, Stage::Lookup);
    assert!(matches!(err.cause, ResolutionCause::NotFound(_)));
    assert!(err.to_string().contains("mainnet"));
}

#[test]
fn test_missing_designated_default_is_lookup_failure() {
    let store = development_store().with_default(name("staging"));
    let probe = installed("0.8.0");

    let err = Resolver::new(&store, &probe).resolve(None).unwrap_err();
    assert_eq!(err.stage, Stage::Lookup);
}

#[test]
fn test_invalid_profile_fails_at_validate_stage() {
    let mut store = ProfileStore::new();
    store.insert(
        name("development"),
        RawProfile::new("127.0.0.1", 0, RawSelector::wildcard(), "solc", "0.8.0"),
    );
    let probe = installed("0.8.0");

    let err = Resolver::new(&store, &probe).resolve(None).unwrap_err();
    assert_eq!(err.stage, Stage::Validate);
    assert_eq!(err.invalid_field(), Some("port"));
}

#[test]
fn test_resolution_is_idempotent_except_timestamp() {
    let store = development_store();
    let probe = installed("0.8.5");
    let resolver = Resolver::new(&store, &probe);

    let first = resolver.resolve(None).unwrap();
    let second = resolver.resolve(None).unwrap();

    assert!(first.same_resolution(&second));
    assert!(second.resolved_at() >= first.resolved_at());
}

#[test]
fn test_unavailable_compiler_is_rejected() {
    let store = development_store();
    let probe = PinnedProbe::new();

    let err = Resolver::new(&store, &probe).resolve(None).unwrap_err();
    assert_eq!(err.stage, Stage::Version);
    assert!(err.reason().starts_with("compiler not found"));
}

struct StalledProbe;

impl CompilerProbe for StalledProbe {
    fn installed_version(&self, compiler: &str, timeout: Duration) -> Result<Version, ProbeError> {
        Err(ProbeError::TimedOut {
            compiler: compiler.to_string(),
            after: timeout,
        })
    }
}

#[test]
fn test_query_timeout_is_version_stage_timeout() {
    let store = development_store();
    let err = Resolver::new(&store, &StalledProbe)
        .with_timeout(Duration::from_millis(50))
        .resolve(None)
        .unwrap_err();

    assert_eq!(err.stage, Stage::Version);
    assert_eq!(err.reason(), "timeout");
    assert!(err.is_timeout());
}

#[cfg(unix)]
#[test]
fn test_slow_compiler_process_times_out() {
    use netpin::profiles::CommandProbe;

    let store = development_store();
    let probe = CommandProbe::new().with_command(
        "solc",
        vec!["sh".to_string(), "-c".to_string(), "sleep 5; echo 0.8.0".to_string()],
    );

    let err = Resolver::new(&store, &probe)
        .with_timeout(Duration::from_millis(100))
        .resolve(None)
        .unwrap_err();
    assert_eq!(err.stage, Stage::Version);
    assert_eq!(err.reason(), "timeout");
}

#[cfg(unix)]
#[test]
fn test_real_compiler_output_resolves() {
    use netpin::profiles::CommandProbe;

    let store = development_store();
    let probe = CommandProbe::new().with_command(
        "solc",
        vec![
            "sh".to_string(),
            "-c".to_string(),
            "echo 'Version: 0.8.0+commit.c7dfd78e.Linux.g++'".to_string(),
        ],
    );

    let context = Resolver::new(&store, &probe).resolve(None).unwrap();
    assert_eq!(context.installed_version(), &Version::new(0, 8, 0));
}

#[test]
fn test_parallel_resolutions_share_one_store() {
    let mut store = development_store();
    store.insert(
        name("ropsten"),
        RawProfile::new("ropsten.example.org", 443, RawSelector::Id(3), "solc", "0.8.0"),
    );
    let probe = installed("0.8.0");

    let contexts: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = ["development", "ropsten", "development", "ropsten"]
            .into_iter()
            .map(|profile| {
                let store = &store;
                let probe = &probe;
                scope.spawn(move || {
                    Resolver::new(store, probe)
                        .resolve(Some(&name(profile)))
                        .unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(contexts.len(), 4);
    assert_eq!(contexts[1].network().selector, NetworkSelector::Exact(3));
    assert!(contexts[0].same_resolution(&contexts[2]));
    assert!(contexts[1].same_resolution(&contexts[3]));
}
