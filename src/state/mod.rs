//! Typed state model for resolved infrastructure configuration.
//!
//! A parser collaborator produces a `State`. All checks consume a `&State`.
//! This decouples configuration-language parsing from policy evaluation.

pub mod aws;
pub mod google;
pub mod nifcloud;
pub mod value;

use serde::{Deserialize, Serialize};

pub use aws::AwsState;
pub use google::GoogleState;
pub use nifcloud::NifcloudState;
pub use value::{BoolValue, IntValue, StringValue, Value};

/// Root of the state tree. One subtree per provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct State {
    pub aws: AwsState,
    pub google: GoogleState,
    pub nifcloud: NifcloudState,
}

impl State {
    /// Propagate provenance from resources down to their attributes.
    ///
    /// Parsers call this once after building the tree; the state is
    /// read-only from then on.
    pub fn link(&mut self) {
        self.aws.link();
        self.google.link();
        self.nifcloud.link();
    }
}

/// Any node of the state tree.
pub trait StateNode {
    fn metadata(&self) -> &Metadata;
}

/// Provenance and source attribution carried by every node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Metadata {
    /// Stable address of the node, e.g. `aws_s3_bucket.logs.acl`.
    #[serde(default)]
    pub reference: String,
    /// Address of the owning resource, for attribute nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<Range>,
    /// False for pre-existing infrastructure outside the producer's control.
    #[serde(default = "default_managed")]
    pub managed: bool,
}

fn default_managed() -> bool {
    true
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            reference: String::new(),
            resource: None,
            range: None,
            managed: true,
        }
    }
}

impl Metadata {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            ..Default::default()
        }
    }

    pub fn unmanaged(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            managed: false,
            ..Default::default()
        }
    }

    pub fn with_range(mut self, range: Range) -> Self {
        self.range = Some(range);
        self
    }

    pub fn is_managed(&self) -> bool {
        self.managed
    }

    pub fn is_unmanaged(&self) -> bool {
        !self.managed
    }

    /// Address of the resource this node belongs to (itself for resources).
    pub fn resource_ref(&self) -> &str {
        self.resource.as_deref().unwrap_or(&self.reference)
    }

    /// Fill in anything the parser left blank from the parent resource.
    pub(crate) fn inherit(&mut self, parent: &Metadata, field: &str) {
        if self.reference.is_empty() {
            self.reference = format!("{}.{}", parent.reference, field);
        }
        if self.resource.is_none() {
            self.resource = Some(parent.resource_ref().to_string());
        }
        if self.range.is_none() {
            self.range = parent.range.clone();
        }
        if !parent.managed {
            self.managed = false;
        }
    }

    /// Give a resource a positional address when the parser supplied none.
    pub(crate) fn ensure_reference(&mut self, kind: &str, index: usize) {
        if self.reference.is_empty() {
            self.reference = format!("{kind}[{index}]");
        }
    }
}

impl StateNode for Metadata {
    fn metadata(&self) -> &Metadata {
        self
    }
}

/// Location in the original configuration source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub filename: String,
    pub start_line: usize,
    pub end_line: usize,
}

impl std::fmt::Display for Range {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.start_line == self.end_line {
            write!(f, "{}:{}", self.filename, self.start_line)
        } else {
            write!(f, "{}:{}-{}", self.filename, self.start_line, self.end_line)
        }
    }
}

/// Iterate only the nodes under the producer's control.
///
/// Most checks skip unmanaged resources; this is the usual first line of a
/// predicate loop.
pub fn managed<T: StateNode>(items: &[T]) -> impl Iterator<Item = &T> {
    items.iter().filter(|item| item.metadata().is_managed())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_inherits_parent_provenance() {
        let parent = Metadata::unmanaged("aws_s3_bucket.logs").with_range(Range {
            filename: "main.tf".into(),
            start_line: 3,
            end_line: 9,
        });
        let mut attr = Metadata::default();
        attr.inherit(&parent, "acl");

        assert_eq!(attr.reference, "aws_s3_bucket.logs.acl");
        assert_eq!(attr.resource_ref(), "aws_s3_bucket.logs");
        assert!(attr.is_unmanaged());
        assert_eq!(attr.range.as_ref().map(|r| r.to_string()).as_deref(), Some("main.tf:3-9"));
    }

    #[test]
    fn explicit_reference_is_kept() {
        let parent = Metadata::new("google_sql_database_instance.db");
        let mut attr = Metadata::new("google_sql_database_instance.db.settings[0].flag");
        attr.inherit(&parent, "flag");
        assert_eq!(attr.reference, "google_sql_database_instance.db.settings[0].flag");
        assert_eq!(attr.resource_ref(), "google_sql_database_instance.db");
    }

    #[test]
    fn managed_filters_unmanaged_nodes() {
        let nodes = vec![Metadata::new("a"), Metadata::unmanaged("b"), Metadata::new("c")];
        let refs: Vec<&str> = managed(&nodes).map(|m| m.reference.as_str()).collect();
        assert_eq!(refs, vec!["a", "c"]);
    }
}
