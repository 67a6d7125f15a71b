//! Rule registry.
//!
//! Checks are registered once at start-up and read many times. A local
//! [`Registry`] can be built directly (tests, embedders); the process-wide
//! one is populated through [`register`] and frozen by the first call to
//! [`global`]. Nothing is ever removed.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, PoisonError};

use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;
use thiserror::Error;

use super::{builtin, Check, Results, RuleMetadata};
use crate::state::State;

static ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").unwrap());

static SLUG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap());

static LINK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https?://\S+$").unwrap());

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("rule name '{name}' is already registered by {existing}")]
    DuplicateKey { name: String, existing: String },

    #[error("invalid metadata for rule '{id}': {reason}")]
    InvalidMetadata { id: String, reason: String },

    #[error("rule '{id}' registered after the registry was frozen")]
    Frozen { id: String },
}

/// Checks keyed by id, with every id, alias and long id in one namespace.
#[derive(Default)]
pub struct Registry {
    checks: BTreeMap<String, Arc<Check>>,
    names: HashMap<String, String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a check, rejecting invalid metadata and name collisions.
    pub fn try_add<F>(&mut self, metadata: RuleMetadata, predicate: F) -> Result<Arc<Check>, RegistryError>
    where
        F: Fn(&State) -> Results + Send + Sync + 'static,
    {
        validate(&metadata)?;

        let names = metadata.names();
        for name in &names {
            if let Some(existing) = self.names.get(name) {
                return Err(RegistryError::DuplicateKey {
                    name: name.clone(),
                    existing: existing.clone(),
                });
            }
        }

        let id = metadata.id.clone();
        let check = Arc::new(Check::new(metadata, Box::new(predicate)));
        for name in names {
            self.names.insert(name, id.clone());
        }
        self.checks.insert(id.clone(), Arc::clone(&check));
        tracing::trace!(rule = %id, "registered check");
        Ok(check)
    }

    /// Register a check. A collision is an authoring bug and aborts start-up.
    pub fn add<F>(&mut self, metadata: RuleMetadata, predicate: F) -> Arc<Check>
    where
        F: Fn(&State) -> Results + Send + Sync + 'static,
    {
        match self.try_add(metadata, predicate) {
            Ok(check) => check,
            Err(e) => panic!("{e}"),
        }
    }

    /// Every check, ordered by id.
    pub fn all(&self) -> Vec<Arc<Check>> {
        self.checks.values().cloned().collect()
    }

    /// Find a check by id, alias or long id.
    pub fn lookup(&self, name: &str) -> Option<Arc<Check>> {
        self.resolve_id(name)
            .and_then(|id| self.checks.get(id))
            .cloned()
    }

    /// Canonical id for any registered name.
    pub fn resolve_id(&self, name: &str) -> Option<&str> {
        self.names.get(name).map(String::as_str)
    }

    /// Metadata of every check, ordered by id. Runs nothing.
    pub fn metadata(&self) -> impl Iterator<Item = &RuleMetadata> {
        self.checks.values().map(|c| c.metadata())
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}

fn validate(metadata: &RuleMetadata) -> Result<(), RegistryError> {
    let invalid = |reason: String| RegistryError::InvalidMetadata {
        id: metadata.id.clone(),
        reason,
    };

    if !ID_RE.is_match(&metadata.id) {
        return Err(invalid("id must be a non-empty token without whitespace".into()));
    }
    for alias in &metadata.aliases {
        if !ID_RE.is_match(alias) {
            return Err(invalid(format!("alias '{alias}' is not a valid name")));
        }
    }
    if !SLUG_RE.is_match(&metadata.service) {
        return Err(invalid(format!("service '{}' is not kebab-case", metadata.service)));
    }
    if !SLUG_RE.is_match(&metadata.short_code) {
        return Err(invalid(format!("short code '{}' is not kebab-case", metadata.short_code)));
    }
    let example_links = metadata.examples.values().flat_map(|e| e.links.iter());
    for link in metadata.links.iter().chain(example_links) {
        if !LINK_RE.is_match(link) {
            return Err(invalid(format!("link '{link}' is not an http(s) URL")));
        }
    }
    Ok(())
}

// `Some` while registration is open, `None` once frozen.
static PENDING: Lazy<Mutex<Option<Registry>>> = Lazy::new(|| Mutex::new(Some(Registry::new())));

static GLOBAL: OnceCell<Registry> = OnceCell::new();

/// Add a check to the process-wide registry.
///
/// Safe to call from any thread during initialization. Panics on a
/// duplicate name or once [`global`] has frozen the registry.
pub fn register<F>(metadata: RuleMetadata, predicate: F) -> Arc<Check>
where
    F: Fn(&State) -> Results + Send + Sync + 'static,
{
    let mut pending = PENDING.lock().unwrap_or_else(PoisonError::into_inner);
    match pending.as_mut() {
        Some(registry) => registry.add(metadata, predicate),
        None => panic!("{}", RegistryError::Frozen { id: metadata.id }),
    }
}

/// The process-wide registry, built-in checks included.
///
/// The first call freezes registration; every later call returns the same
/// read-only table.
pub fn global() -> &'static Registry {
    GLOBAL.get_or_init(|| {
        builtin::register_all();
        let registry = PENDING
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .unwrap_or_default();
        tracing::debug!(rules = registry.len(), "rule registry frozen");
        registry
    })
}
