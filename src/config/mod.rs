use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RulesError};
use crate::rules::policy::Policy;
use crate::rules::selection::Selection;
use crate::scan::EvalOptions;

/// Top-level configuration from `.cloudrules.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub policy: Policy,
    #[serde(default)]
    pub selection: Selection,
    #[serde(default)]
    pub evaluator: EvaluatorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluatorConfig {
    /// Worker threads; 0 means one per CPU.
    #[serde(default)]
    pub parallelism: usize,
    #[serde(default = "default_continue_on_fault")]
    pub continue_on_fault: bool,
}

fn default_continue_on_fault() -> bool {
    true
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            parallelism: 0,
            continue_on_fault: true,
        }
    }
}

impl EvaluatorConfig {
    pub fn eval_options(&self) -> EvalOptions {
        EvalOptions {
            parallelism: self.parallelism,
            continue_on_fault: self.continue_on_fault,
            cancellation: None,
        }
    }
}

impl Config {
    /// Load config from a TOML file. Returns default if file doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.evaluator.parallelism > 1024 {
            return Err(RulesError::Config(format!(
                "evaluator.parallelism = {} is out of range (0-1024)",
                self.evaluator.parallelism
            )));
        }
        Ok(())
    }

    /// Generate a starter config file.
    pub fn starter_toml() -> &'static str {
        r#"# cloudrules configuration

[policy]
# Minimum severity to fail the scan (informational, low, medium, high, critical).
fail_on = "high"
# Fail when a check errors while evaluating.
fail_on_error = false

# Per-rule severity overrides. Aliases and long ids are accepted.
# [policy.overrides]
# "AVD-NIF-0002" = "informational"

# Accepted failures for specific resources.
# [[policy.exceptions]]
# rule = "AVD-AWS-0088"
# resource = "aws_s3_bucket.public_assets"

[selection]
# providers = ["aws", "google"]
# services = ["s3"]
# min_severity = "low"
# rules = ["AVD-AWS-*"]
# ignore_rules = ["google-sql-no-contained-db-auth"]

[evaluator]
# Worker threads; 0 means one per CPU.
parallelism = 0
continue_on_fault = true
"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Provider, Severity};

    #[test]
    fn starter_config_parses_to_defaults() {
        let config: Config = toml::from_str(Config::starter_toml()).unwrap();
        assert_eq!(config.policy.fail_on, Severity::High);
        assert!(config.selection.rules.is_empty());
        assert!(config.evaluator.continue_on_fault);
        assert_eq!(config.evaluator.parallelism, 0);
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join(".cloudrules.toml")).unwrap();
        assert!(config.policy.exceptions.is_empty());
    }

    #[test]
    fn loads_all_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".cloudrules.toml");
        std::fs::write(
            &path,
            r#"
[policy]
fail_on = "medium"

[policy.overrides]
"AVD-NIF-0002" = "informational"

[[policy.exceptions]]
rule = "AVD-AWS-0088"
resource = "aws_s3_bucket.public_assets"

[selection]
providers = ["aws", "nifcloud"]
min_severity = "low"
ignore_rules = ["AVD-AWS-0086"]

[evaluator]
parallelism = 2
continue_on_fault = false
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.policy.fail_on, Severity::Medium);
        assert_eq!(config.policy.overrides["AVD-NIF-0002"], Severity::Informational);
        assert_eq!(config.policy.exceptions[0].resource.as_deref(), Some("aws_s3_bucket.public_assets"));
        assert_eq!(config.selection.providers, vec![Provider::Aws, Provider::Nifcloud]);
        assert_eq!(config.selection.min_severity, Some(Severity::Low));
        let options = config.evaluator.eval_options();
        assert_eq!(options.parallelism, 2);
        assert!(!options.continue_on_fault);
    }

    #[test]
    fn rejects_absurd_parallelism() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".cloudrules.toml");
        std::fs::write(&path, "[evaluator]\nparallelism = 100000\n").unwrap();
        assert!(matches!(Config::load(&path), Err(RulesError::Config(_))));
    }
}
