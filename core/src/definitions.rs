//! The merged definition set and the fallback source it draws from.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use crate::schema::Schema;

/// Where a definition in the merged set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Copied from the fallback document while resolving a reference.
    Fallback,
    /// Produced by the primary producer.
    Primary,
    /// Injected by the augmenter.
    WellKnown,
}

/// A named schema in the merged set.
#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    pub schema: Schema,
    pub origin: Origin,
}

impl Definition {
    pub fn new(schema: Schema, origin: Origin) -> Self {
        Self { schema, origin }
    }
}

/// Definitions keyed by normalized name.
///
/// Backed by a `BTreeMap`, so iteration order is stable across runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DefinitionSet {
    entries: BTreeMap<String, Definition>,
}

impl DefinitionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Definition> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts `definition` unless `name` is already present.
    ///
    /// Returns `true` if the entry was inserted.
    pub fn insert_if_absent(&mut self, name: impl Into<String>, definition: Definition) -> bool {
        match self.entries.entry(name.into()) {
            Entry::Vacant(slot) => {
                slot.insert(definition);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    /// Inserts or replaces, returning the previous entry.
    pub fn overlay(&mut self, name: impl Into<String>, definition: Definition) -> Option<Definition> {
        self.entries.insert(name.into(), definition)
    }

    /// Counts entries by origin.
    pub fn count_by(&self, origin: Origin) -> usize {
        self.entries.values().filter(|def| def.origin == origin).count()
    }

    /// Drops origins, leaving the name→schema map of the output document.
    pub fn into_schemas(self) -> BTreeMap<String, Schema> {
        self.entries
            .into_iter()
            .map(|(name, def)| (name, def.schema))
            .collect()
    }
}

/// Read-only name→schema map taken from a reference API document.
///
/// Keys are already in the normalized name space.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FallbackSource {
    definitions: BTreeMap<String, Schema>,
}

impl FallbackSource {
    pub fn new(definitions: BTreeMap<String, Schema>) -> Self {
        Self { definitions }
    }

    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.definitions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl FromIterator<(String, Schema)> for FallbackSource {
    fn from_iter<I: IntoIterator<Item = (String, Schema)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
