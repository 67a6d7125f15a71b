use std::collections::BTreeMap;

use crate::rules::{registry, Provider, Results, RuleMetadata, Severity};
use crate::state::{managed, State};

use super::examples;

/// AVD-AWS-0086: S3 public access block must reject public ACLs.
pub(super) fn register() {
    registry::register(
        RuleMetadata {
            id: "AVD-AWS-0086".into(),
            aliases: vec![],
            provider: Provider::Aws,
            service: "s3".into(),
            short_code: "block-public-acls".into(),
            summary: "S3 Access block should block public ACL".into(),
            impact: "PUT calls with public ACLs specified can make objects public".into(),
            resolution: "Enable blocking any PUT calls with a public ACL specified".into(),
            explanation: "S3 buckets should block public ACLs on buckets and any objects they \
                          contain. By blocking, PUTs will fail if the object has any public ACL."
                .into(),
            links: vec![
                "https://docs.aws.amazon.com/AmazonS3/latest/userguide/access-control-block-public-access.html".into(),
            ],
            severity: Severity::High,
            examples: BTreeMap::from([
                (
                    "terraform".into(),
                    examples(
                        &[include_str!("../../../fixtures/AVD-AWS-0086/terraform/good/1.tf")],
                        &[include_str!("../../../fixtures/AVD-AWS-0086/terraform/bad/1.tf")],
                        include_str!("../../../fixtures/AVD-AWS-0086/terraform/remediation.md"),
                        &["https://registry.terraform.io/providers/hashicorp/aws/latest/docs/resources/s3_bucket_public_access_block#block_public_acls"],
                    ),
                ),
                (
                    "state".into(),
                    examples(
                        &[include_str!("../../../fixtures/AVD-AWS-0086/state/good/1.json")],
                        &[
                            include_str!("../../../fixtures/AVD-AWS-0086/state/bad/1.json"),
                            include_str!("../../../fixtures/AVD-AWS-0086/state/bad/2.json"),
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
    for bucket in managed(&state.aws.s3.buckets) {
        match &bucket.public_access_block {
            None => results.add("No public access block so not blocking public acls", bucket),
            Some(block) if block.block_public_acls.is_false() => results.add(
                "Public access block does not block public ACLs",
                &block.block_public_acls,
            ),
            Some(_) => results.add_passed(bucket),
        }
    }
    results
}
