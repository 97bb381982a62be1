//! Registry lifecycle and name-uniqueness properties, exercised through the
//! public API.

use std::iter;

use lockstep::{HarnessError, Outcome, Phase, Registry, Suite};

fn no_tags() -> iter::Empty<String> {
    iter::empty()
}

#[test]
fn names_in_order_matches_registration_order() {
    let mut registry = Registry::new();
    let names = ["zeta", "alpha", "midpoint", "omega"];
    for name in names {
        registry
            .register(name, no_tags(), || async { Outcome::Succeeded })
            .unwrap();
    }
    assert_eq!(registry.names_in_order(), names);
}

#[test]
fn duplicate_registration_fails_and_preserves_state() {
    let mut registry = Registry::new();
    registry
        .register("only", no_tags(), || async { Outcome::Succeeded })
        .unwrap();

    let before = registry
        .names_in_order()
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>();
    let err = registry
        .register("only", no_tags(), || async { Outcome::Pending })
        .unwrap_err();

    assert!(matches!(err, HarnessError::DuplicateName { .. }));
    assert_eq!(registry.names_in_order(), before);
    assert_eq!(registry.phase(), Phase::Registering);
}

#[test]
fn registration_after_close_is_rejected() {
    let mut registry = Registry::new();
    registry
        .register("in-time", no_tags(), || async { Outcome::Succeeded })
        .unwrap();
    registry.close();

    let err = registry
        .register("too-late", no_tags(), || async { Outcome::Succeeded })
        .unwrap_err();
    assert_eq!(
        err,
        HarnessError::RegistrationClosed {
            name: "too-late".to_string()
        }
    );
    assert_eq!(registry.len(), 1);

    // Phase is monotonic; closing again changes nothing.
    registry.close();
    assert_eq!(registry.phase(), Phase::Closed);
}

#[test]
fn duplicate_error_points_at_the_first_registration() {
    let mut registry = Registry::new();
    let first_line = line!() + 1;
    registry.register("pinned", no_tags(), || async { Outcome::Succeeded }).unwrap();

    match registry
        .register("pinned", no_tags(), || async { Outcome::Succeeded })
        .unwrap_err()
    {
        HarnessError::DuplicateName { name, first } => {
            assert_eq!(name, "pinned");
            assert!(first.file.ends_with("registration.rs"));
            assert_eq!(first.line, first_line);
        }
        other => panic!("expected DuplicateName, got {other:?}"),
    }
}

#[tokio::test]
async fn running_a_suite_closes_its_registry() {
    use std::sync::Arc;

    let mut suite = Suite::new("lifecycle");
    suite
        .register("solo", no_tags(), || async { Outcome::Succeeded })
        .unwrap();
    assert_eq!(suite.registry().phase(), Phase::Registering);

    let reporter = Arc::new(lockstep::RecordingReporter::new());
    let summary = suite
        .run(tokio::runtime::Handle::current(), reporter)
        .await
        .unwrap();
    assert_eq!(summary.succeeded, 1);
}
