//! Learned-mapping store ("knowledge base").
//!
//! The store remembers which column headers were mapped to which canonical
//! field, one category per field. Detectors consult it before any heuristic
//! and never write to it directly: learning is returned as a list of
//! [`StoreMutation`]s for the caller to apply.

use std::collections::BTreeMap;

use roster_model::{Confidence, FieldKind, MatchType, StoreEntry};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::utils::normalize_name;

/// Read/write contract of the learned-mapping store.
///
/// Lookups are case-insensitive exact matches on the normalised column
/// name; substrings never match.
pub trait MappingStore {
    /// Finds the entry for `name` in the field's category.
    fn find(&self, field: FieldKind, name: &str) -> Option<&StoreEntry>;

    /// Appends an entry. Does not deduplicate; callers that need it check
    /// [`MappingStore::find`] first.
    fn add(&mut self, field: FieldKind, name: &str, confidence: Confidence, match_type: MatchType);

    /// Entries of one category, in insertion order.
    fn entries(&self, field: FieldKind) -> &[StoreEntry];

    /// Full copy of the store contents.
    fn snapshot(&self) -> KnowledgeBase;
}

/// In-memory store, serialisable for persistence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeBase {
    #[serde(default)]
    categories: BTreeMap<FieldKind, Vec<StoreEntry>>,
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of entries across all categories.
    pub fn len(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Non-empty categories with their entries.
    pub fn categories(&self) -> impl Iterator<Item = (FieldKind, &[StoreEntry])> {
        self.categories
            .iter()
            .filter(|(_, entries)| !entries.is_empty())
            .map(|(field, entries)| (*field, entries.as_slice()))
    }

    /// Records an operator-confirmed mapping unless the category already
    /// knows this column name. Returns true if an entry was added.
    pub fn confirm(
        &mut self,
        field: FieldKind,
        name: &str,
        confidence: Confidence,
        match_type: MatchType,
    ) -> bool {
        if self.find(field, name).is_some() {
            return false;
        }
        self.add(field, name, confidence, match_type);
        true
    }

    /// Applies pending writes in order.
    pub fn apply_all(&mut self, mutations: &[StoreMutation]) {
        for mutation in mutations {
            mutation.apply(self);
        }
    }

    /// Applies pending writes through [`KnowledgeBase::confirm`], skipping
    /// names that are already known. Returns the number of entries added.
    pub fn confirm_all(&mut self, mutations: &[StoreMutation]) -> usize {
        mutations
            .iter()
            .filter(|mutation| {
                self.confirm(
                    mutation.field,
                    &mutation.normalized_name,
                    mutation.confidence,
                    mutation.match_type,
                )
            })
            .count()
    }
}

impl MappingStore for KnowledgeBase {
    fn find(&self, field: FieldKind, name: &str) -> Option<&StoreEntry> {
        let wanted = normalize_name(name);
        if wanted.is_empty() {
            return None;
        }
        self.categories.get(&field).and_then(|entries| {
            entries
                .iter()
                .find(|entry| normalize_name(&entry.normalized_name) == wanted)
        })
    }

    fn add(&mut self, field: FieldKind, name: &str, confidence: Confidence, match_type: MatchType) {
        let normalized_name = normalize_name(name);
        info!(
            field = %field,
            column = %normalized_name,
            confidence = confidence.value(),
            match_type = %match_type,
            "knowledge entry added"
        );
        self.categories.entry(field).or_default().push(StoreEntry {
            normalized_name,
            confidence,
            match_type,
        });
    }

    fn entries(&self, field: FieldKind) -> &[StoreEntry] {
        self.categories
            .get(&field)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn snapshot(&self) -> KnowledgeBase {
        self.clone()
    }
}

/// A write the caller should apply to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreMutation {
    pub field: FieldKind,
    pub normalized_name: String,
    pub confidence: Confidence,
    pub match_type: MatchType,
}

impl StoreMutation {
    pub fn new(
        field: FieldKind,
        name: &str,
        confidence: Confidence,
        match_type: MatchType,
    ) -> Self {
        Self {
            field,
            normalized_name: normalize_name(name),
            confidence,
            match_type,
        }
    }

    /// Appends the entry to `store`.
    pub fn apply(&self, store: &mut dyn MappingStore) {
        store.add(
            self.field,
            &self.normalized_name,
            self.confidence,
            self.match_type,
        );
    }
}
