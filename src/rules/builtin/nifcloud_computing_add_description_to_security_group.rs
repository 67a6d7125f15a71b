use std::collections::BTreeMap;

use crate::rules::{registry, Provider, Results, RuleMetadata, Severity};
use crate::state::{managed, State};

use super::examples;

/// Description Terraform fills in when none is given.
const DEFAULT_DESCRIPTION: &str = "Managed by Terraform";

/// AVD-NIF-0002: security groups need a meaningful description.
///
/// Flags both a missing description and the provider's placeholder.
pub(super) fn register() {
    registry::register(
        RuleMetadata {
            id: "AVD-NIF-0002".into(),
            aliases: vec!["nifcloud-computing-add-description-to-security-group".into()],
            provider: Provider::Nifcloud,
            service: "computing".into(),
            short_code: "add-description-to-security-group".into(),
            summary: "Missing description for security group.".into(),
            impact: "Descriptions provide context for the firewall rule reasons".into(),
            resolution: "Add descriptions for all security groups".into(),
            explanation: "Security groups should include a description for auditing purposes.\n\n\
                          Simplifies auditing, debugging, and managing security groups."
                .into(),
            links: vec!["https://pfs.nifcloud.com/help/fw/change.htm".into()],
            severity: Severity::Low,
            examples: BTreeMap::from([
                (
                    "terraform".into(),
                    examples(
                        &[include_str!("../../../fixtures/AVD-NIF-0002/terraform/good/1.tf")],
                        &[
                            include_str!("../../../fixtures/AVD-NIF-0002/terraform/bad/1.tf"),
                            include_str!("../../../fixtures/AVD-NIF-0002/terraform/bad/2.tf"),
                        ],
                        include_str!("../../../fixtures/AVD-NIF-0002/terraform/remediation.md"),
                        &["https://registry.terraform.io/providers/nifcloud/nifcloud/latest/docs/resources/security_group#description"],
                    ),
                ),
                (
                    "state".into(),
                    examples(
                        &[include_str!("../../../fixtures/AVD-NIF-0002/state/good/1.json")],
                        &[
                            include_str!("../../../fixtures/AVD-NIF-0002/state/bad/1.json"),
                            include_str!("../../../fixtures/AVD-NIF-0002/state/bad/2.json"),
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
    for group in managed(&state.nifcloud.computing.security_groups) {
        if group.description.is_empty() {
            results.add("Security group does not have a description.", &group.description);
        } else if group.description.equal_to(DEFAULT_DESCRIPTION) {
            results.add(
                "Security group explicitly uses the default description.",
                &group.description,
            );
        } else {
            results.add_passed(group);
        }
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::nifcloud::SecurityGroup;
    use crate::state::Metadata;

    fn group(reference: &str, description: &str, managed: bool) -> SecurityGroup {
        let mut group = SecurityGroup {
            metadata: if managed {
                Metadata::new(reference)
            } else {
                Metadata::unmanaged(reference)
            },
            ..Default::default()
        };
        group.description.value = description.into();
        group
    }

    #[test]
    fn flags_empty_and_default_descriptions() {
        let mut state = State::default();
        state.nifcloud.computing.security_groups = vec![
            group("nifcloud_security_group.a", "", true),
            group("nifcloud_security_group.b", DEFAULT_DESCRIPTION, true),
            group("nifcloud_security_group.c", "Allow from app traffic", true),
            group("nifcloud_security_group.d", "", false),
        ];
        state.link();

        let messages: Vec<(bool, String)> = check(&state)
            .into_iter()
            .map(|f| (f.is_failure(), f.resource().to_string()))
            .collect();
        assert_eq!(
            messages,
            vec![
                (true, "nifcloud_security_group.a".to_string()),
                (true, "nifcloud_security_group.b".to_string()),
                (false, "nifcloud_security_group.c".to_string()),
            ]
        );
    }
}
