use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Finding, Registry, Severity};
use crate::error::{Result, RulesError};
use crate::scan::ResultSet;

/// Policy verdict: the final pass/fail decision after applying
/// exceptions and severity overrides to a result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyVerdict {
    pub pass: bool,
    pub total_failures: usize,
    pub effective_failures: usize,
    pub highest_severity: Option<Severity>,
    pub fail_threshold: Severity,
    pub errored_checks: usize,
    pub incomplete: bool,
}

/// Policy configuration loaded from the `[policy]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policy {
    /// Minimum severity to fail the scan.
    #[serde(default = "default_fail_on")]
    pub fail_on: Severity,
    /// Fail the scan when any check errored.
    #[serde(default)]
    pub fail_on_error: bool,
    /// Per-rule severity overrides.
    #[serde(default)]
    pub overrides: BTreeMap<String, Severity>,
    /// Accepted failures for specific resources.
    #[serde(default)]
    pub exceptions: Vec<Exception>,
}

/// A waived failure: `rule` on `resource` (or on every resource when unset).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exception {
    pub rule: String,
    #[serde(default)]
    pub resource: Option<String>,
}

impl Exception {
    fn covers(&self, finding: &Finding) -> bool {
        self.rule == finding.rule_id()
            && self
                .resource
                .as_deref()
                .map_or(true, |r| r == finding.resource())
    }
}

fn default_fail_on() -> Severity {
    Severity::High
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            fail_on: Severity::High,
            fail_on_error: false,
            overrides: BTreeMap::new(),
            exceptions: Vec::new(),
        }
    }
}

impl Policy {
    /// Rewrite aliases and long ids in overrides and exceptions to rule ids.
    ///
    /// Two names of one rule overriding it with different severities is a
    /// configuration error.
    pub fn normalize(&mut self, registry: &Registry) -> Result<()> {
        let mut overrides: BTreeMap<String, (String, Severity)> = BTreeMap::new();
        for (name, severity) in std::mem::take(&mut self.overrides) {
            let id = canonical(registry, name.clone());
            match overrides.get(&id) {
                Some((other, existing)) if *existing != severity => {
                    return Err(RulesError::Config(format!(
                        "conflicting overrides for rule '{id}': '{other}' = {existing}, '{name}' = {severity}"
                    )));
                }
                Some(_) => {}
                None => {
                    overrides.insert(id, (name, severity));
                }
            }
        }
        self.overrides = overrides
            .into_iter()
            .map(|(id, (_, severity))| (id, severity))
            .collect();
        for exception in &mut self.exceptions {
            exception.rule = canonical(registry, std::mem::take(&mut exception.rule));
        }
        Ok(())
    }

    /// Severity of a failure once overrides apply.
    pub fn effective_severity(&self, finding: &Finding) -> Severity {
        self.overrides
            .get(finding.rule_id())
            .copied()
            .unwrap_or(finding.severity())
    }

    pub fn is_excepted(&self, finding: &Finding) -> bool {
        self.exceptions.iter().any(|e| e.covers(finding))
    }

    /// Evaluate a result set against this policy and produce a verdict.
    pub fn evaluate(&self, results: &ResultSet) -> PolicyVerdict {
        let effective: Vec<Severity> = results
            .failures()
            .filter(|f| !self.is_excepted(f))
            .map(|f| self.effective_severity(f))
            .collect();

        let highest = effective.iter().copied().max();
        let errored = results.errors().count();
        let failed = effective.iter().any(|&sev| sev >= self.fail_on)
            || (self.fail_on_error && errored > 0);

        PolicyVerdict {
            pass: !failed,
            total_failures: results.failure_count(),
            effective_failures: effective.len(),
            highest_severity: highest,
            fail_threshold: self.fail_on,
            errored_checks: errored,
            incomplete: results.is_incomplete(),
        }
    }
}

fn canonical(registry: &Registry, name: String) -> String {
    registry
        .resolve_id(&name)
        .map(str::to_string)
        .unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Provider, Results, RuleMetadata};
    use crate::scan::{evaluate, EvalOptions};
    use crate::state::{Metadata, State};

    fn meta(id: &str, severity: Severity) -> RuleMetadata {
        RuleMetadata {
            id: id.into(),
            aliases: vec![format!("alias-{}", id.to_lowercase())],
            provider: Provider::Google,
            service: "sql".into(),
            short_code: id.to_lowercase(),
            severity,
            ..Default::default()
        }
    }

    /// One check per entry; each fails once against `resource`.
    fn results(rules: &[(&str, Severity)], resource: &str) -> (Registry, ResultSet) {
        let mut registry = Registry::new();
        for (id, severity) in rules {
            let node = Metadata::new(resource);
            registry.add(meta(id, *severity), move |_: &State| {
                let mut results = Results::new();
                results.add("bad", &node);
                results
            });
        }
        let set = evaluate(&State::default(), &registry.all(), &EvalOptions::default());
        (registry, set)
    }

    #[test]
    fn default_policy_fails_on_high() {
        let (_, set) = results(&[("R-1", Severity::High)], "res.a");
        let verdict = Policy::default().evaluate(&set);
        assert!(!verdict.pass);
        assert_eq!(verdict.highest_severity, Some(Severity::High));
    }

    #[test]
    fn default_policy_passes_on_medium() {
        let (_, set) = results(&[("R-9", Severity::Medium)], "res.a");
        let verdict = Policy::default().evaluate(&set);
        assert!(verdict.pass);
        assert_eq!(verdict.total_failures, 1);
    }

    #[test]
    fn exception_waives_failure_for_resource() {
        let (_, set) = results(&[("R-1", Severity::Critical)], "res.a");
        let mut policy = Policy::default();
        policy.exceptions.push(Exception {
            rule: "R-1".into(),
            resource: Some("res.a".into()),
        });
        let verdict = policy.evaluate(&set);
        assert!(verdict.pass);
        assert_eq!(verdict.effective_failures, 0);

        policy.exceptions[0].resource = Some("res.b".into());
        assert!(!policy.evaluate(&set).pass);
    }

    #[test]
    fn override_by_alias_downgrades_severity() {
        let (registry, set) = results(&[("R-1", Severity::Critical)], "res.a");
        let mut policy = Policy::default();
        policy.overrides.insert("alias-r-1".into(), Severity::Informational);
        policy.normalize(&registry).unwrap();
        let verdict = policy.evaluate(&set);
        assert!(verdict.pass);
        assert_eq!(verdict.highest_severity, Some(Severity::Informational));
    }

    #[test]
    fn conflicting_overrides_for_one_rule_are_rejected() {
        let (registry, set) = results(&[("R-1", Severity::Critical)], "res.a");
        let mut policy = Policy::default();
        policy.overrides.insert("R-1".into(), Severity::Critical);
        policy.overrides.insert("alias-r-1".into(), Severity::Informational);

        let err = policy.clone().normalize(&registry).unwrap_err();
        assert!(matches!(&err, RulesError::Config(msg) if msg.contains("R-1")));

        policy.overrides.insert("alias-r-1".into(), Severity::Critical);
        for _ in 0..50 {
            let mut normalized = policy.clone();
            normalized.normalize(&registry).unwrap();
            assert_eq!(normalized.overrides.len(), 1);
            assert!(!normalized.evaluate(&set).pass);
        }
    }

    #[test]
    fn errored_checks_fail_only_when_asked() {
        let mut registry = Registry::new();
        registry.add(meta("R-1", Severity::Low), |_: &State| -> Results { panic!("boom") });
        let set = evaluate(&State::default(), &registry.all(), &EvalOptions::default());

        let mut policy = Policy::default();
        assert!(policy.evaluate(&set).pass);
        policy.fail_on_error = true;
        let verdict = policy.evaluate(&set);
        assert!(!verdict.pass);
        assert_eq!(verdict.errored_checks, 1);
    }
}
