use serde::{Deserialize, Serialize};

use super::{Metadata, StateNode};

/// A leaf attribute with its own provenance.
///
/// Deserializes from either a bare value (`true`) or the full form
/// (`{ "value": true, "metadata": { ... } }`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "ValueRepr<T>", bound(deserialize = "T: Deserialize<'de>"))]
pub struct Value<T> {
    pub metadata: Metadata,
    pub value: T,
}

pub type BoolValue = Value<bool>;
pub type StringValue = Value<String>;
pub type IntValue = Value<i64>;

#[derive(Deserialize)]
#[serde(untagged)]
enum ValueRepr<T> {
    Full {
        #[serde(default)]
        metadata: Metadata,
        value: T,
    },
    Bare(T),
}

impl<T> From<ValueRepr<T>> for Value<T> {
    fn from(repr: ValueRepr<T>) -> Self {
        match repr {
            ValueRepr::Full { metadata, value } => Self { metadata, value },
            ValueRepr::Bare(value) => Self {
                metadata: Metadata::default(),
                value,
            },
        }
    }
}

impl<T> Value<T> {
    pub fn new(value: T, metadata: Metadata) -> Self {
        Self { metadata, value }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub(crate) fn link(&mut self, parent: &Metadata, field: &str) {
        self.metadata.inherit(parent, field);
    }
}

impl<T> StateNode for Value<T> {
    fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}

impl BoolValue {
    pub fn is_true(&self) -> bool {
        self.value
    }

    pub fn is_false(&self) -> bool {
        !self.value
    }
}

impl StringValue {
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn equal_to(&self, other: &str) -> bool {
        self.value == other
    }

    pub fn starts_with(&self, prefix: &str) -> bool {
        self.value.starts_with(prefix)
    }
}

impl IntValue {
    pub fn less_than(&self, other: i64) -> bool {
        self.value < other
    }
}
