//! Evaluation engine.
//!
//! Runs a set of checks against one read-only [`State`] and assembles a
//! deterministic [`ResultSet`]. Checks fan out over a bounded rayon pool;
//! results are put back in check id order, never completion order.

pub mod result_set;

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;

use crate::rules::Check;
use crate::state::State;

pub use result_set::{CheckOutcome, OutcomeStatus, ResultSet};

/// Options for one evaluation run.
#[derive(Debug, Clone)]
pub struct EvalOptions {
    /// Worker threads. `0` uses one per CPU, `1` runs inline.
    pub parallelism: usize,
    /// Keep dispatching after a check faults.
    pub continue_on_fault: bool,
    pub cancellation: Option<Cancellation>,
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self {
            parallelism: 0,
            continue_on_fault: true,
            cancellation: None,
        }
    }
}

/// Shared flag that stops dispatch of further checks.
///
/// Checks already running finish normally; the run is flagged incomplete.
#[derive(Debug, Clone, Default)]
pub struct Cancellation(Arc<AtomicBool>);

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Run `checks` against `state`.
///
/// Outcomes are sorted by check id whatever the order of `checks`; findings
/// inside an outcome follow emission order. A check that panics is recorded as errored and does not
/// affect the others.
pub fn evaluate(state: &State, checks: &[Arc<Check>], options: &EvalOptions) -> ResultSet {
    let started = Instant::now();
    let stop = AtomicBool::new(false);
    let threads = match options.parallelism {
        0 => num_cpus::get(),
        n => n,
    };

    let dispatch = |check: &Arc<Check>| -> Option<CheckOutcome> {
        let cancelled = options
            .cancellation
            .as_ref()
            .is_some_and(Cancellation::is_cancelled);
        if cancelled || stop.load(Ordering::SeqCst) {
            return None;
        }
        let outcome = run_check(state, check);
        if outcome.error().is_some() && !options.continue_on_fault {
            stop.store(true, Ordering::SeqCst);
        }
        Some(outcome)
    };

    let collected: Vec<Option<CheckOutcome>> = if threads <= 1 || checks.len() <= 1 {
        checks.iter().map(dispatch).collect()
    } else {
        match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(pool) => pool.install(|| checks.par_iter().map(dispatch).collect()),
            Err(e) => {
                tracing::warn!(error = %e, "could not start worker pool, evaluating inline");
                checks.iter().map(dispatch).collect()
            }
        }
    };

    let incomplete = collected.iter().any(Option::is_none);
    let mut outcomes: Vec<CheckOutcome> = collected.into_iter().flatten().collect();
    outcomes.sort_by(|a, b| a.rule_id.cmp(&b.rule_id));
    let results = ResultSet::new(outcomes, incomplete);

    tracing::info!(
        checks = checks.len(),
        evaluated = results.outcomes().len(),
        failures = results.failure_count(),
        errors = results.errors().count(),
        incomplete,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "evaluation finished"
    );
    results
}

fn run_check(state: &State, check: &Check) -> CheckOutcome {
    let metadata = check.metadata();
    let _span = tracing::debug_span!("check", rule = %metadata.id).entered();

    let status = match panic::catch_unwind(AssertUnwindSafe(|| check.evaluate(state))) {
        Ok(findings) if findings.is_empty() => {
            tracing::debug!("no applicable resources");
            OutcomeStatus::NotApplicable
        }
        Ok(findings) => {
            tracing::debug!(findings = findings.len(), "check evaluated");
            OutcomeStatus::Evaluated { findings }
        }
        Err(payload) => {
            let message = panic_payload_to_string(payload.as_ref());
            tracing::warn!(rule = %metadata.id, error = %message, "check faulted");
            OutcomeStatus::Errored { message }
        }
    };

    CheckOutcome {
        rule_id: metadata.id.clone(),
        severity: metadata.severity,
        status,
    }
}

fn panic_payload_to_string(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&'static str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
