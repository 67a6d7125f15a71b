use std::collections::BTreeMap;

use crate::rules::{registry, Provider, Results, RuleMetadata, Severity};
use crate::state::{managed, State};

use super::examples;

pub(super) fn register() {
    registry::register(
        RuleMetadata {
            id: "AVD-GCP-0015".into(),
            aliases: vec!["google-sql-require-tls".into()],
            provider: Provider::Google,
            service: "sql".into(),
            short_code: "encrypt-in-transit-data".into(),
            summary: "SSL connections to a SQL database instance should be enforced.".into(),
            impact: "Intercepted data can be read in transit".into(),
            resolution: "Enforce SSL for all connections".into(),
            explanation: "In-transit data should be encrypted so that if traffic is intercepted \
                          data will not be exposed in plaintext to attackers."
                .into(),
            links: vec!["https://cloud.google.com/sql/docs/mysql/configure-ssl-instance".into()],
            severity: Severity::High,
            examples: BTreeMap::from([
                (
                    "terraform".into(),
                    examples(
                        &[include_str!("../../../fixtures/AVD-GCP-0015/terraform/good/1.tf")],
                        &[include_str!("../../../fixtures/AVD-GCP-0015/terraform/bad/1.tf")],
                        include_str!("../../../fixtures/AVD-GCP-0015/terraform/remediation.md"),
                        &["https://registry.terraform.io/providers/hashicorp/google/latest/docs/resources/sql_database_instance"],
                    ),
                ),
                (
                    "state".into(),
                    examples(
                        &[include_str!("../../../fixtures/AVD-GCP-0015/state/good/1.json")],
                        &[
                            include_str!("../../../fixtures/AVD-GCP-0015/state/bad/1.json"),
                            include_str!("../../../fixtures/AVD-GCP-0015/state/bad/2.json"),
                        ],
                        "",
                        &[],
                    ),
                ),
            ]),
        },
        check,
    );
}

fn check(state: &State) -> Results {
    let mut results = Results::new();
    for instance in managed(&state.google.sql.instances) {
        let require_tls = &instance.settings.ip_configuration.require_tls;
        if require_tls.is_false() {
            results.add(
                "Database instance does not require TLS for all connections.",
                require_tls,
            );
        } else {
            results.add_passed(instance);
        }
    }
    results
}
