use std::collections::BTreeMap;

use serde::Serialize;

use crate::rules::{Finding, Severity};

/// Ordered outcome of one evaluation run.
///
/// Built fresh by each call to [`super::evaluate`] and handed to reporting
/// as-is. Findings are never deduplicated here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResultSet {
    outcomes: Vec<CheckOutcome>,
    /// Set when cancellation or stop-on-fault left checks undispatched.
    incomplete: bool,
}

/// What happened when one check ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckOutcome {
    pub rule_id: String,
    pub severity: Severity,
    pub status: OutcomeStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum OutcomeStatus {
    /// At least one pass or failure was recorded, in emission order.
    Evaluated { findings: Vec<Finding> },
    /// The predicate found nothing it applies to.
    NotApplicable,
    /// The predicate faulted; its partial output is discarded.
    Errored { message: String },
}

impl CheckOutcome {
    pub fn findings(&self) -> &[Finding] {
        match &self.status {
            OutcomeStatus::Evaluated { findings } => findings,
            _ => &[],
        }
    }

    pub fn is_not_applicable(&self) -> bool {
        matches!(self.status, OutcomeStatus::NotApplicable)
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            OutcomeStatus::Errored { message } => Some(message),
            _ => None,
        }
    }
}

impl ResultSet {
    pub(crate) fn new(outcomes: Vec<CheckOutcome>, incomplete: bool) -> Self {
        Self {
            outcomes,
            incomplete,
        }
    }

    pub fn outcomes(&self) -> &[CheckOutcome] {
        &self.outcomes
    }

    pub fn outcome(&self, rule_id: &str) -> Option<&CheckOutcome> {
        self.outcomes.iter().find(|o| o.rule_id == rule_id)
    }

    pub fn is_incomplete(&self) -> bool {
        self.incomplete
    }

    /// Every finding, in check order then emission order.
    pub fn findings(&self) -> impl Iterator<Item = &Finding> {
        self.outcomes.iter().flat_map(|o| o.findings().iter())
    }

    pub fn failures(&self) -> impl Iterator<Item = &Finding> {
        self.findings().filter(|f| f.is_failure())
    }

    pub fn passes(&self) -> impl Iterator<Item = &Finding> {
        self.findings().filter(|f| !f.is_failure())
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    pub fn failure_count_by_severity(&self, severity: Severity) -> usize {
        self.failures().filter(|f| f.severity() == severity).count()
    }

    /// Failure totals per severity; severities without failures are absent.
    pub fn failure_counts(&self) -> BTreeMap<Severity, usize> {
        let mut counts = BTreeMap::new();
        for finding in self.failures() {
            *counts.entry(finding.severity()).or_insert(0) += 1;
        }
        counts
    }

    /// Findings grouped by owning resource address.
    pub fn group_by_resource(&self) -> BTreeMap<&str, Vec<&Finding>> {
        let mut groups: BTreeMap<&str, Vec<&Finding>> = BTreeMap::new();
        for finding in self.findings() {
            groups.entry(finding.resource()).or_default().push(finding);
        }
        groups
    }

    /// Groups of two or more findings sharing rule id and node reference.
    pub fn duplicate_groups(&self) -> Vec<Vec<&Finding>> {
        let mut groups: BTreeMap<String, Vec<&Finding>> = BTreeMap::new();
        for finding in self.findings() {
            groups.entry(finding.fingerprint()).or_default().push(finding);
        }
        groups.into_values().filter(|g| g.len() > 1).collect()
    }

    /// Ids of checks that found nothing to evaluate.
    pub fn not_applicable(&self) -> impl Iterator<Item = &str> {
        self.outcomes
            .iter()
            .filter(|o| o.is_not_applicable())
            .map(|o| o.rule_id.as_str())
    }

    /// `(rule id, message)` for every check that faulted.
    pub fn errors(&self) -> impl Iterator<Item = (&str, &str)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.error().map(|e| (o.rule_id.as_str(), e)))
    }
}
