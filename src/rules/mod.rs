pub mod builtin;
pub mod catalog;
pub mod finding;
pub mod metadata;
pub mod policy;
pub mod registry;
pub mod selection;

use crate::state::State;

pub use finding::{Finding, Results, Status};
pub use metadata::{LanguageExamples, Provider, RuleMetadata, Severity};
pub use registry::{Registry, RegistryError};

/// The rule body: inspects the state and reports what it found.
///
/// Must be pure. The state is shared read-only across concurrently running
/// checks.
pub type Predicate = Box<dyn Fn(&State) -> Results + Send + Sync>;

/// A registered rule: metadata paired with its predicate.
pub struct Check {
    metadata: RuleMetadata,
    predicate: Predicate,
}

impl Check {
    pub(crate) fn new(metadata: RuleMetadata, predicate: Predicate) -> Self {
        Self {
            metadata,
            predicate,
        }
    }

    pub fn id(&self) -> &str {
        &self.metadata.id
    }

    pub fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    /// Run the predicate and attribute every finding to this rule. Callers
    /// go through [`crate::scan::evaluate`], which isolates faults.
    pub(crate) fn evaluate(&self, state: &State) -> Vec<Finding> {
        (self.predicate)(state)
            .into_iter()
            .map(|finding| finding.attributed(&self.metadata))
            .collect()
    }
}

impl std::fmt::Debug for Check {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Check")
            .field("id", &self.metadata.id)
            .field("severity", &self.metadata.severity)
            .finish_non_exhaustive()
    }
}
