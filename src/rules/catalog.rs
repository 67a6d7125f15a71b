//! Read-only metadata export for documentation generators.
//!
//! Nothing here runs a check.

use serde::Serialize;

use super::{Registry, RuleMetadata};
use crate::error::Result;

/// One documented rule.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntry<'a> {
    pub long_id: String,
    #[serde(flatten)]
    pub metadata: &'a RuleMetadata,
}

/// Every registered rule, ordered by id.
pub fn entries(registry: &Registry) -> Vec<CatalogEntry<'_>> {
    registry
        .metadata()
        .map(|metadata| CatalogEntry {
            long_id: metadata.long_id(),
            metadata,
        })
        .collect()
}

pub fn to_json(registry: &Registry) -> Result<String> {
    let json = serde_json::to_string_pretty(&entries(registry))?;
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{LanguageExamples, Provider, Results, Severity};
    use crate::state::State;

    #[test]
    fn export_includes_examples_without_running_checks() {
        let mut registry = Registry::new();
        let mut metadata = RuleMetadata {
            id: "AVD-NIF-0002".into(),
            provider: Provider::Nifcloud,
            service: "computing".into(),
            short_code: "add-description-to-security-group".into(),
            severity: Severity::Low,
            ..Default::default()
        };
        metadata.examples.insert(
            "terraform".into(),
            LanguageExamples {
                good: vec!["resource \"nifcloud_security_group\" \"good\" {}".into()],
                ..Default::default()
            },
        );
        registry.add(metadata, |_: &State| -> Results { panic!("must not run") });

        let json: serde_json::Value = serde_json::from_str(&to_json(&registry).unwrap()).unwrap();
        assert_eq!(json[0]["id"], "AVD-NIF-0002");
        assert_eq!(json[0]["long_id"], "nifcloud-computing-add-description-to-security-group");
        assert_eq!(json[0]["severity"], "low");
        assert_eq!(json[0]["examples"]["terraform"]["good"].as_array().unwrap().len(), 1);
    }
}
