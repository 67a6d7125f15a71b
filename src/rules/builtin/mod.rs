mod aws_s3_block_public_acls;
mod aws_s3_enable_bucket_encryption;
mod google_sql_encrypt_in_transit_data;
mod google_sql_no_contained_db_auth;
mod nifcloud_computing_add_description_to_security_group;

use super::LanguageExamples;

/// Registers every built-in check with the process-wide registry.
pub(crate) fn register_all() {
    aws_s3_block_public_acls::register();
    aws_s3_enable_bucket_encryption::register();
    google_sql_encrypt_in_transit_data::register();
    google_sql_no_contained_db_auth::register();
    nifcloud_computing_add_description_to_security_group::register();
}

fn examples(good: &[&str], bad: &[&str], remediation: &str, links: &[&str]) -> LanguageExamples {
    LanguageExamples {
        good: good.iter().map(|s| s.to_string()).collect(),
        bad: bad.iter().map(|s| s.to_string()).collect(),
        remediation_markdown: remediation.to_string(),
        links: links.iter().map(|s| s.to_string()).collect(),
    }
}
