//! cloudrules: rule registry and evaluation engine for cloud-infrastructure
//! policy checks.
//!
//! Checks register once at start-up, run against a read-only multi-provider
//! [`state::State`], and produce a deterministic [`scan::ResultSet`].
//!
//! # Quick Start
//!
//! ```no_run
//! use cloudrules::parser::{json::JsonStateParser, StateParser};
//! use cloudrules::{scan, ScanOptions};
//!
//! let source = std::fs::read_to_string("state.json").unwrap();
//! let state = JsonStateParser.parse(&source).unwrap();
//! let report = scan(&state, &ScanOptions::default()).unwrap();
//! println!("Pass: {}, Failures: {}", report.verdict.pass, report.results.failure_count());
//! ```

pub mod config;
pub mod conformance;
pub mod error;
pub mod parser;
pub mod rules;
pub mod scan;
pub mod state;

use std::path::PathBuf;

use config::Config;
use error::Result;
use rules::policy::PolicyVerdict;
use scan::{Cancellation, ResultSet};
use state::State;

/// Options for a scan invocation.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Path to config file (defaults to `.cloudrules.toml` in the working directory).
    pub config_path: Option<PathBuf>,
    /// Override for the policy's fail_on threshold.
    pub fail_on_override: Option<rules::Severity>,
    pub cancellation: Option<Cancellation>,
}

/// Complete scan report.
#[derive(Debug)]
pub struct ScanReport {
    pub results: ResultSet,
    pub verdict: PolicyVerdict,
}

/// Run a complete scan: load config, select checks, evaluate, apply policy.
pub fn scan(state: &State, options: &ScanOptions) -> Result<ScanReport> {
    let config_path = options
        .config_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(".cloudrules.toml"));
    let config = Config::load(&config_path)?;
    scan_with_config(state, config, options)
}

/// Same as [`scan`] with an already-loaded configuration.
pub fn scan_with_config(state: &State, mut config: Config, options: &ScanOptions) -> Result<ScanReport> {
    let registry = rules::registry::global();

    if let Some(fail_on) = options.fail_on_override {
        config.policy.fail_on = fail_on;
    }
    config.policy.normalize(registry)?;

    let checks = config.selection.select(registry)?;

    let mut eval_options = config.evaluator.eval_options();
    eval_options.cancellation = options.cancellation.clone();
    let results = scan::evaluate(state, &checks, &eval_options);

    let verdict = config.policy.evaluate(&results);

    Ok(ScanReport { results, verdict })
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::parser::json::JsonStateParser;
    use crate::parser::StateParser;
    use std::path::Path;

    fn load(name: &str) -> State {
        let path = Path::new("tests/fixtures/states").join(name);
        let source = std::fs::read_to_string(path).unwrap();
        JsonStateParser.parse(&source).unwrap()
    }

    fn options() -> ScanOptions {
        ScanOptions {
            config_path: Some(PathBuf::from("tests/fixtures/absent.toml")),
            ..Default::default()
        }
    }

    #[test]
    fn compliant_state_passes() {
        let report = scan(&load("compliant.json"), &options()).unwrap();
        assert!(!report.results.has_failures());
        assert!(report.verdict.pass);
        assert!(report.results.errors().next().is_none());
    }

    #[test]
    fn mixed_state_fails_with_attributed_findings() {
        let report = scan(&load("mixed.json"), &options()).unwrap();
        assert!(!report.verdict.pass);
        assert!(report.results.failures().any(|f| f.rule_id() == "AVD-AWS-0088"));
        assert!(report.results.failures().any(|f| f.rule_id() == "AVD-GCP-0023"));
        assert!(report
            .results
            .findings()
            .all(|f| !f.resource().contains("imported")));
    }

    #[test]
    fn empty_state_is_not_applicable_everywhere() {
        let report = scan(&State::default(), &options()).unwrap();
        let registered = rules::registry::global().len();
        assert_eq!(report.results.not_applicable().count(), registered);
        assert!(report.verdict.pass);
    }

    #[test]
    fn selection_and_threshold_from_config() {
        let mut config = Config::default();
        config.selection.ignore_rules = vec!["aws-s3-*".into()];
        config.policy.fail_on = rules::Severity::Low;

        let report = scan_with_config(&load("mixed.json"), config, &options()).unwrap();
        assert!(report.results.outcome("AVD-AWS-0088").is_none());
        assert!(report.results.outcome("AVD-GCP-0023").is_some());
        assert!(!report.verdict.pass);
    }

    #[test]
    fn repeated_scans_serialize_identically() {
        let state = load("mixed.json");
        let first = scan(&state, &options()).unwrap();
        let second = scan(&state, &options()).unwrap();
        assert_eq!(
            serde_json::to_string(&first.results).unwrap(),
            serde_json::to_string(&second.results).unwrap()
        );
    }
}
