use std::collections::BTreeMap;
use std::path::Path;

use walkdir::WalkDir;

use crate::error::{Result, RulesError};
use crate::rules::LanguageExamples;

const REMEDIATION_FILE: &str = "remediation.md";

/// Example fixtures stored as data, keyed by rule id then language.
///
/// On-disk layout:
///
/// ```text
/// <root>/<rule-id>/<language>/good/<any file>
/// <root>/<rule-id>/<language>/bad/<any file>
/// <root>/<rule-id>/<language>/remediation.md
/// ```
#[derive(Debug, Clone, Default)]
pub struct FixtureSet {
    rules: BTreeMap<String, BTreeMap<String, LanguageExamples>>,
}

impl FixtureSet {
    /// Load every fixture under `root`. Files are read in name order.
    pub fn load_dir(root: &Path) -> Result<Self> {
        let mut set = Self::default();

        for entry in WalkDir::new(root)
            .min_depth(3)
            .max_depth(4)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| RulesError::Io(e.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(root)
                .map_err(|e| RulesError::Config(format!("fixture path outside root: {e}")))?;
            let parts: Vec<&str> = relative
                .iter()
                .filter_map(|p| p.to_str())
                .collect();

            match parts.as_slice() {
                [rule_id, language, REMEDIATION_FILE] => {
                    let examples = set.entry(rule_id, language);
                    examples.remediation_markdown = std::fs::read_to_string(entry.path())?;
                }
                [rule_id, language, kind @ ("good" | "bad"), _] => {
                    let source = std::fs::read_to_string(entry.path())?;
                    let examples = set.entry(rule_id, language);
                    if *kind == "good" {
                        examples.good.push(source);
                    } else {
                        examples.bad.push(source);
                    }
                }
                _ => {
                    tracing::debug!(path = %entry.path().display(), "ignoring file outside fixture layout");
                }
            }
        }

        tracing::debug!(root = %root.display(), rules = set.len(), "loaded fixtures");
        Ok(set)
    }

    fn entry(&mut self, rule_id: &str, language: &str) -> &mut LanguageExamples {
        self.rules
            .entry(rule_id.to_string())
            .or_default()
            .entry(language.to_string())
            .or_default()
    }

    pub fn get(&self, rule_id: &str) -> Option<&BTreeMap<String, LanguageExamples>> {
        self.rules.get(rule_id)
    }

    /// `(rule id, examples by language)`, ordered by rule id.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeMap<String, LanguageExamples>)> {
        self.rules.iter().map(|(id, examples)| (id.as_str(), examples))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
