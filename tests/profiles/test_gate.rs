//! Tests for the compiler version gate

use netpin::profiles::gate::{GateResult, check};
use netpin::profiles::Version;

fn gate(declared: &str, installed: &str) -> GateResult {
    check(
        &Version::parse(declared).unwrap(),
        &Version::parse(installed).unwrap(),
    )
}

#[test]
fn test_gate_ordering() {
    assert_eq!(gate("0.8.0", "0.8.0"), GateResult::Proceed);
    assert!(matches!(
        gate("0.8.0", "0.8.5"),
        GateResult::ProceedWithWarning { .. }
    ));
    assert!(matches!(gate("0.8.0", "0.7.9"), GateResult::Reject { .. }));
    assert!(matches!(gate("0.8.0", "0.9.0"), GateResult::Reject { .. }));
}

#[test]
fn test_gate_never_tolerates_downgrade() {
    for installed in ["0.8.3", "0.8.0", "0.7.99", "0.0.0"] {
        let result = gate("0.8.4", installed);
        assert!(
            matches!(result, GateResult::Reject { .. }),
            "0.8.4 vs {installed}: {result:?}"
        );
    }
}
