//! Process-wide registration. Kept in its own test binary so the global
//! registry here holds only the built-ins plus what this file registers.

use std::panic::{self, AssertUnwindSafe};
use std::thread;

use cloudrules::rules::{registry, Provider, Results, RuleMetadata, Severity};
use cloudrules::state::State;

fn meta(id: &str) -> RuleMetadata {
    RuleMetadata {
        id: id.into(),
        aliases: vec![format!("legacy-{}", id.to_lowercase())],
        provider: Provider::Aws,
        service: "plugin".into(),
        short_code: id.to_lowercase(),
        severity: Severity::Low,
        ..Default::default()
    }
}

fn noop(_: &State) -> Results {
    Results::new()
}

#[test]
fn modules_register_concurrently_then_registry_freezes() {
    let handles: Vec<_> = (0..8)
        .map(|i| thread::spawn(move || registry::register(meta(&format!("P-{i}")), noop)))
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let global = registry::global();
    for i in 0..8 {
        let id = format!("P-{i}");
        assert_eq!(global.lookup(&id).unwrap().id(), id);
        assert_eq!(global.resolve_id(&format!("legacy-p-{i}")), Some(id.as_str()));
    }
    assert!(global.lookup("AVD-AWS-0088").is_some());
    assert_eq!(global.len(), 13);

    let ids: Vec<String> = global.all().iter().map(|c| c.id().to_string()).collect();
    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(ids, sorted);

    let late = panic::catch_unwind(AssertUnwindSafe(|| registry::register(meta("P-late"), noop)));
    let payload = late.expect_err("registration after freeze must panic");
    let message = payload
        .downcast_ref::<String>()
        .cloned()
        .unwrap_or_default();
    assert!(message.contains("frozen"), "{message}");
    assert!(registry::global().lookup("P-late").is_none());
}
