use std::collections::BTreeMap;

use crate::rules::{registry, Provider, Results, RuleMetadata, Severity};
use crate::state::google::DatabaseFamily;
use crate::state::{managed, State};

use super::examples;

/// AVD-GCP-0023: contained database authentication on SQL Server instances.
pub(super) fn register() {
    registry::register(
        RuleMetadata {
            id: "AVD-GCP-0023".into(),
            aliases: vec![],
            provider: Provider::Google,
            service: "sql".into(),
            short_code: "no-contained-db-auth".into(),
            summary: "Contained database authentication should be disabled".into(),
            impact: "Access can be granted without knowledge of the database administrator".into(),
            resolution: "Disable contained database authentication".into(),
            explanation: "Users with ALTER permissions on users can grant access to a contained \
                          database without the knowledge of an administrator"
                .into(),
            links: vec![
                "https://docs.microsoft.com/en-us/sql/database-engine/configure-windows/contained-database-authentication-server-configuration-option?view=sql-server-ver15".into(),
            ],
            severity: Severity::Medium,
            examples: BTreeMap::from([
                (
                    "terraform".into(),
                    examples(
                        &[include_str!("../../../fixtures/AVD-GCP-0023/terraform/good/1.tf")],
                        &[include_str!("../../../fixtures/AVD-GCP-0023/terraform/bad/1.tf")],
                        include_str!("../../../fixtures/AVD-GCP-0023/terraform/remediation.md"),
                        &["https://registry.terraform.io/providers/hashicorp/google/latest/docs/resources/sql_database_instance"],
                    ),
                ),
                (
                    "state".into(),
                    examples(
                        &[
                            include_str!("../../../fixtures/AVD-GCP-0023/state/good/1.json"),
                            include_str!("../../../fixtures/AVD-GCP-0023/state/good/2.json"),
                        ],
                        &[include_str!("../../../fixtures/AVD-GCP-0023/state/bad/1.json")],
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
        if instance.database_family() != DatabaseFamily::SqlServer {
            continue;
        }
        let flag = &instance.settings.flags.contained_database_authentication;
        if flag.is_true() {
            results.add(
                "Database instance has contained database authentication enabled.",
                flag,
            );
        } else {
            results.add_passed(instance);
        }
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::google::DatabaseInstance;
    use crate::state::Metadata;

    fn instance(reference: &str, version: &str, contained: bool) -> DatabaseInstance {
        let mut instance = DatabaseInstance {
            metadata: Metadata::new(reference),
            ..Default::default()
        };
        instance.database_version.value = version.into();
        instance.settings.flags.contained_database_authentication.value = contained;
        instance
    }

    #[test]
    fn flags_sql_server_with_contained_auth() {
        let mut state = State::default();
        state.google.sql.instances = vec![
            instance("google_sql_database_instance.a", "SQLSERVER_2017_STANDARD", true),
            instance("google_sql_database_instance.b", "SQLSERVER_2019_ENTERPRISE", false),
        ];
        state.link();

        let findings: Vec<_> = check(&state).into_iter().collect();
        assert_eq!(findings.len(), 2);
        assert!(findings[0].is_failure());
        assert_eq!(
            findings[0].node().reference,
            "google_sql_database_instance.a.settings.database_flags.contained_database_authentication"
        );
        assert!(!findings[1].is_failure());
    }

    #[test]
    fn ignores_other_database_families() {
        let mut state = State::default();
        state.google.sql.instances = vec![instance("google_sql_database_instance.pg", "POSTGRES_14", true)];
        state.link();
        assert!(check(&state).is_empty());
    }
}
