//! Conformance harness.
//!
//! Every example a rule declares is parsed, evaluated with that rule alone,
//! and compared against its declared verdict: good examples must produce no
//! failure for the rule, bad examples at least one. Run it from a test; a
//! broken example is a build failure, never a scan-time condition.

pub mod fixtures;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::error::{Result, RulesError};
use crate::parser::{builtin_parsers, StateParser};
use crate::rules::{Check, LanguageExamples, Registry};
use crate::scan::{evaluate, EvalOptions, ResultSet};

pub use fixtures::FixtureSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExampleKind {
    Good,
    Bad,
}

impl std::fmt::Display for ExampleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Good => write!(f, "good"),
            Self::Bad => write!(f, "bad"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum CaseOutcome {
    Passed,
    Failed { reason: String },
    /// No parser is registered for the example's language.
    Skipped { reason: String },
}

/// Verdict for one declared example.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseReport {
    pub rule_id: String,
    pub language: String,
    pub kind: ExampleKind,
    /// Position within the rule's good or bad list for that language.
    pub index: usize,
    pub outcome: CaseOutcome,
}

impl std::fmt::Display for CaseReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} example #{}",
            self.rule_id, self.language, self.kind, self.index
        )?;
        match &self.outcome {
            CaseOutcome::Passed => write!(f, ": ok"),
            CaseOutcome::Failed { reason } => write!(f, ": FAILED: {reason}"),
            CaseOutcome::Skipped { reason } => write!(f, ": skipped: {reason}"),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ConformanceReport {
    pub cases: Vec<CaseReport>,
    /// Fixture directories naming rules that are not registered.
    pub unknown_rules: Vec<String>,
}

impl ConformanceReport {
    pub fn passed(&self) -> impl Iterator<Item = &CaseReport> {
        self.cases
            .iter()
            .filter(|c| c.outcome == CaseOutcome::Passed)
    }

    pub fn failed(&self) -> impl Iterator<Item = &CaseReport> {
        self.cases
            .iter()
            .filter(|c| matches!(c.outcome, CaseOutcome::Failed { .. }))
    }

    pub fn skipped(&self) -> impl Iterator<Item = &CaseReport> {
        self.cases
            .iter()
            .filter(|c| matches!(c.outcome, CaseOutcome::Skipped { .. }))
    }

    pub fn is_success(&self) -> bool {
        self.failed().next().is_none() && self.unknown_rules.is_empty()
    }

    /// `Err` listing every failed case and unknown rule.
    pub fn into_result(self) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }
        let mut lines: Vec<String> = self.failed().map(|c| c.to_string()).collect();
        lines.extend(
            self.unknown_rules
                .iter()
                .map(|id| format!("{id}: fixtures for unregistered rule")),
        );
        Err(RulesError::Conformance {
            failed: lines.len(),
            details: lines.join("\n"),
        })
    }
}

/// Runs declared examples through parse → evaluate.
pub struct Harness {
    parsers: BTreeMap<String, Box<dyn StateParser>>,
}

impl Harness {
    /// Harness with the bundled parsers.
    pub fn new() -> Self {
        builtin_parsers()
            .into_iter()
            .fold(Self::empty(), |harness, parser| harness.with_parser(parser))
    }

    pub fn empty() -> Self {
        Self {
            parsers: BTreeMap::new(),
        }
    }

    /// Add or replace the parser for `parser.language()`.
    pub fn with_parser(mut self, parser: Box<dyn StateParser>) -> Self {
        self.parsers.insert(parser.language().to_string(), parser);
        self
    }

    pub fn run(&self, checks: &[Arc<Check>]) -> ConformanceReport {
        let cases = checks.iter().flat_map(|c| self.run_check(c)).collect();
        ConformanceReport {
            cases,
            unknown_rules: Vec::new(),
        }
    }

    /// Every example the check's own metadata declares.
    pub fn run_check(&self, check: &Arc<Check>) -> Vec<CaseReport> {
        self.run_examples(check, &check.metadata().examples)
    }

    /// Examples loaded from disk, matched to registered checks by id.
    pub fn run_fixtures(&self, fixtures: &FixtureSet, registry: &Registry) -> ConformanceReport {
        let mut report = ConformanceReport::default();
        for (rule_id, examples) in fixtures.iter() {
            match registry.lookup(rule_id) {
                Some(check) => report.cases.extend(self.run_examples(&check, examples)),
                None => report.unknown_rules.push(rule_id.to_string()),
            }
        }
        report
    }

    fn run_examples(
        &self,
        check: &Arc<Check>,
        examples: &BTreeMap<String, LanguageExamples>,
    ) -> Vec<CaseReport> {
        let mut cases = Vec::new();
        for (language, fixtures) in examples {
            let sets = [(ExampleKind::Good, &fixtures.good), (ExampleKind::Bad, &fixtures.bad)];
            for (kind, sources) in sets {
                for (index, source) in sources.iter().enumerate() {
                    let outcome = self.run_case(check, language, kind, source);
                    let case = CaseReport {
                        rule_id: check.id().to_string(),
                        language: language.clone(),
                        kind,
                        index,
                        outcome,
                    };
                    if matches!(case.outcome, CaseOutcome::Failed { .. }) {
                        tracing::warn!(case = %case, "conformance case failed");
                    } else {
                        tracing::debug!(case = %case, "conformance case");
                    }
                    cases.push(case);
                }
            }
        }
        cases
    }

    fn run_case(&self, check: &Arc<Check>, language: &str, kind: ExampleKind, source: &str) -> CaseOutcome {
        let Some(parser) = self.parsers.get(language) else {
            return CaseOutcome::Skipped {
                reason: format!("no parser for language '{language}'"),
            };
        };
        let state = match parser.parse(source) {
            Ok(state) => state,
            Err(e) => {
                return CaseOutcome::Failed {
                    reason: format!("example does not parse: {e}"),
                }
            }
        };
        let options = EvalOptions {
            parallelism: 1,
            ..Default::default()
        };
        let results = evaluate(&state, std::slice::from_ref(check), &options);
        judge(check.id(), kind, &results)
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

fn judge(rule_id: &str, kind: ExampleKind, results: &ResultSet) -> CaseOutcome {
    if let Some((_, message)) = results.errors().next() {
        return CaseOutcome::Failed {
            reason: format!("check errored: {message}"),
        };
    }
    let failures: Vec<&str> = results
        .failures()
        .filter(|f| f.rule_id() == rule_id)
        .map(|f| f.message())
        .collect();

    match kind {
        ExampleKind::Good if failures.is_empty() => CaseOutcome::Passed,
        ExampleKind::Good => CaseOutcome::Failed {
            reason: format!(
                "expected no failures, got {}: {}",
                failures.len(),
                failures.join("; ")
            ),
        },
        ExampleKind::Bad if !failures.is_empty() => CaseOutcome::Passed,
        ExampleKind::Bad => CaseOutcome::Failed {
            reason: "expected at least one failure, got none".into(),
        },
    }
}
