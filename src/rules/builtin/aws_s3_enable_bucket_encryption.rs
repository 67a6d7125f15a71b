use std::collections::BTreeMap;

use crate::rules::{registry, Provider, Results, RuleMetadata, Severity};
use crate::state::{managed, State};

use super::examples;

pub(super) fn register() {
    registry::register(
        RuleMetadata {
            id: "AVD-AWS-0088".into(),
            aliases: vec![],
            provider: Provider::Aws,
            service: "s3".into(),
            short_code: "enable-bucket-encryption".into(),
            summary: "Unencrypted S3 bucket.".into(),
            impact: "The bucket objects could be read if compromised".into(),
            resolution: "Configure bucket encryption".into(),
            explanation: "S3 Buckets should be encrypted to protect the data that is stored \
                          within them if access is compromised."
                .into(),
            links: vec![
                "https://docs.aws.amazon.com/AmazonS3/latest/userguide/bucket-encryption.html".into(),
            ],
            severity: Severity::High,
            examples: BTreeMap::from([
                (
                    "terraform".into(),
                    examples(
                        &[include_str!("../../../fixtures/AVD-AWS-0088/terraform/good/1.tf")],
                        &[include_str!("../../../fixtures/AVD-AWS-0088/terraform/bad/1.tf")],
                        include_str!("../../../fixtures/AVD-AWS-0088/terraform/remediation.md"),
                        &["https://registry.terraform.io/providers/hashicorp/aws/latest/docs/resources/s3_bucket#enable-default-server-side-encryption"],
                    ),
                ),
                (
                    "state".into(),
                    examples(
                        &[include_str!("../../../fixtures/AVD-AWS-0088/state/good/1.json")],
                        &[include_str!("../../../fixtures/AVD-AWS-0088/state/bad/1.json")],
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
    for bucket in managed(&state.aws.s3.buckets) {
        if bucket.encryption.enabled.is_false() {
            results.add("Bucket does not have encryption enabled", &bucket.encryption.enabled);
        } else {
            results.add_passed(bucket);
        }
    }
    results
}
