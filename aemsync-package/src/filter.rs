//! Filter manifest accumulator for `META-INF/vault/filter.xml`.

use std::collections::HashSet;

use serde::Serialize;

use aemsync_core::types::{FilterEntry, ItemPath};

/// Ordered, duplicate-free list of filter entries for one package.
#[derive(Debug, Clone, Default)]
pub struct FilterManifest {
    entries: Vec<FilterEntry>,
    items: HashSet<ItemPath>,
}

impl FilterManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `entry` unless its item is already selected.
    ///
    /// Returns `false` when the entry was ignored as a duplicate.
    pub fn push(&mut self, entry: FilterEntry) -> bool {
        if !self.items.insert(entry.item().clone()) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    pub fn entries(&self) -> &[FilterEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn context(&self) -> FilterContext {
        FilterContext {
            filters: self.entries.iter().map(FilterCtx::from).collect(),
        }
    }
}

/// Rendering payload for the filter template.
#[derive(Debug, Serialize)]
pub(crate) struct FilterContext {
    filters: Vec<FilterCtx>,
}

#[derive(Debug, Serialize)]
struct FilterCtx {
    kind: &'static str,
    item: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exclude: Option<String>,
}

impl From<&FilterEntry> for FilterCtx {
    fn from(entry: &FilterEntry) -> Self {
        match entry {
            FilterEntry::Delete { item } => FilterCtx {
                kind: "delete",
                item: item.0.clone(),
                scope: None,
                exclude: None,
            },
            FilterEntry::Update { item, scope } => FilterCtx {
                kind: "update",
                item: item.0.clone(),
                scope: Some(scope.0.clone()),
                exclude: Some(format!("{}/.*", scope.as_str().trim_end_matches('/'))),
            },
        }
    }
}
