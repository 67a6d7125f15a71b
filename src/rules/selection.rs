use std::sync::Arc;

use glob::Pattern;
use serde::{Deserialize, Serialize};

use super::{Check, Provider, Registry, RuleMetadata, Severity};
use crate::error::{Result, RulesError};

/// Which checks to run, loaded from the `[selection]` table.
///
/// Rule patterns are globs matched against the id, every alias and the
/// long id, so `AVD-AWS-*` and `google-sql-*` both work.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Selection {
    /// Providers to include. Empty means all.
    #[serde(default)]
    pub providers: Vec<Provider>,
    /// Services to include. Empty means all.
    #[serde(default)]
    pub services: Vec<String>,
    /// Skip checks below this severity.
    #[serde(default)]
    pub min_severity: Option<Severity>,
    /// Rule patterns to include. Empty means all.
    #[serde(default)]
    pub rules: Vec<String>,
    /// Rule patterns to suppress.
    #[serde(default)]
    pub ignore_rules: Vec<String>,
}

impl Selection {
    /// Pick checks from the registry, preserving its id order.
    pub fn select(&self, registry: &Registry) -> Result<Vec<Arc<Check>>> {
        let include = compile(&self.rules)?;
        let ignore = compile(&self.ignore_rules)?;

        let selected: Vec<Arc<Check>> = registry
            .all()
            .into_iter()
            .filter(|check| {
                let meta = check.metadata();
                self.admits(meta)
                    && (include.is_empty() || matches_any(&include, meta))
                    && !matches_any(&ignore, meta)
            })
            .collect();

        tracing::debug!(
            registered = registry.len(),
            selected = selected.len(),
            "selected checks"
        );
        Ok(selected)
    }

    fn admits(&self, meta: &RuleMetadata) -> bool {
        (self.providers.is_empty() || self.providers.contains(&meta.provider))
            && (self.services.is_empty() || self.services.iter().any(|s| s == &meta.service))
            && self.min_severity.map_or(true, |min| meta.severity >= min)
    }
}

fn compile(patterns: &[String]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| {
            Pattern::new(p).map_err(|e| RulesError::Selection(format!("rule pattern '{p}': {e}")))
        })
        .collect()
}

fn matches_any(patterns: &[Pattern], meta: &RuleMetadata) -> bool {
    let names = meta.names();
    patterns
        .iter()
        .any(|p| names.iter().any(|name| p.matches(name)))
}
