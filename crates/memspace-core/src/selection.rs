use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// How a new selection combines with the one already active on a dataset.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SelectionMode {
    /// Replace the active selection.
    #[default]
    New,

    /// Union with the active selection.
    Add,

    /// Remove matching rows from the active selection.
    Remove,

    /// Keep only active rows that also match.
    Subset,
}

/// Spatial predicate used by a select-by-location request.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpatialRelation {
    #[default]
    Intersect,
    Contains,
    Within,
}

impl SpatialRelation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Intersect => "INTERSECT",
            Self::Contains => "CONTAINS",
            Self::Within => "WITHIN",
        }
    }
}

/// Snapshot of the rows an engine currently has selected on a dataset.
///
/// Rows are identified by object id. An empty id set with `active == false`
/// means no selection is in effect and every row participates in exports.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SelectionState {
    /// Whether a selection is in effect.
    pub active: bool,

    /// Selected object ids.
    pub ids: BTreeSet<u64>,

    /// Number of rows in the dataset.
    pub total: u64,
}

impl SelectionState {
    /// A state with nothing selected and no selection in effect.
    pub fn cleared(total: u64) -> Self {
        Self {
            active: false,
            ids: BTreeSet::new(),
            total,
        }
    }

    pub fn with_ids(ids: impl IntoIterator<Item = u64>, total: u64) -> Self {
        Self {
            active: true,
            ids: ids.into_iter().collect(),
            total,
        }
    }

    /// Number of selected rows.
    pub fn count(&self) -> u64 {
        self.ids.len() as u64
    }

    pub fn contains(&self, id: u64) -> bool {
        self.ids.contains(&id)
    }

    /// Combines a fresh match set with this state according to `mode`.
    pub fn combine(&self, mode: SelectionMode, matched: BTreeSet<u64>) -> SelectionState {
        let ids = match mode {
            SelectionMode::New => matched,
            SelectionMode::Add => self.ids.union(&matched).copied().collect(),
            SelectionMode::Remove => self.ids.difference(&matched).copied().collect(),
            SelectionMode::Subset => self.ids.intersection(&matched).copied().collect(),
        };

        SelectionState {
            active: true,
            ids,
            total: self.total,
        }
    }
}
