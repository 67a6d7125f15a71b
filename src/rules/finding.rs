use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{RuleMetadata, Severity};
use crate::state::{Metadata, StateNode};

/// A single pass/fail outcome produced by a check against one node.
///
/// Built by predicates through [`Results`]; the evaluator stamps the
/// originating rule id and severity before the finding is collected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    rule_id: String,
    severity: Severity,
    status: Status,
    message: String,
    /// Offending node for failures, the compliant resource for passes.
    node: Metadata,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Passed,
    Failed,
}

impl Finding {
    pub fn failure(message: impl Into<String>, node: &impl StateNode) -> Self {
        Self {
            rule_id: String::new(),
            severity: Severity::None,
            status: Status::Failed,
            message: message.into(),
            node: node.metadata().clone(),
        }
    }

    pub fn pass(node: &impl StateNode) -> Self {
        Self {
            rule_id: String::new(),
            severity: Severity::None,
            status: Status::Passed,
            message: String::new(),
            node: node.metadata().clone(),
        }
    }

    pub(crate) fn attributed(mut self, rule: &RuleMetadata) -> Self {
        self.rule_id = rule.id.clone();
        self.severity = rule.severity;
        self
    }

    pub fn rule_id(&self) -> &str {
        &self.rule_id
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_failure(&self) -> bool {
        self.status == Status::Failed
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn node(&self) -> &Metadata {
        &self.node
    }

    /// Address of the resource the finding is attributed to.
    pub fn resource(&self) -> &str {
        self.node.resource_ref()
    }

    /// Stable identity of the finding: rule id + node reference.
    ///
    /// Two findings with equal fingerprints are duplicates. Collapsing them
    /// is up to the reporter.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.rule_id.as_bytes());
        hasher.update([0u8]);
        hasher.update(self.node.reference.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Findings emitted by one predicate invocation, in emission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Results {
    findings: Vec<Finding>,
}

impl Results {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure against the offending node.
    pub fn add(&mut self, message: impl Into<String>, node: &impl StateNode) {
        self.findings.push(Finding::failure(message, node));
    }

    /// Record that `node` was checked and found compliant.
    pub fn add_passed(&mut self, node: &impl StateNode) {
        self.findings.push(Finding::pass(node));
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Finding> {
        self.findings.iter()
    }

    pub fn into_vec(self) -> Vec<Finding> {
        self.findings
    }
}

impl IntoIterator for Results {
    type Item = Finding;
    type IntoIter = std::vec::IntoIter<Finding>;

    fn into_iter(self) -> Self::IntoIter {
        self.findings.into_iter()
    }
}
