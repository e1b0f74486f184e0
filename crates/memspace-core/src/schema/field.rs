use super::FieldType;

use serde::{Deserialize, Serialize};
use std::fmt;

/// A field as listed by the engine: `(name, type, alias)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldInfo {
    /// Name of the field in the source dataset.
    pub name: String,

    pub ty: FieldType,

    /// Alias of the table the field comes from. Joined fields carry the
    /// alias of the joined table.
    pub alias: String,
}

impl FieldInfo {
    pub fn new(name: impl Into<String>, ty: FieldType, alias: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty,
            alias: alias.into(),
        }
    }
}

/// One entry of a [`FieldMapping`](super::FieldMapping).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Immutable identity of the field.
    pub id: FieldId,

    /// Name of the column in the source. Used to address the column at
    /// export time regardless of renames.
    pub source_name: String,

    /// Display name; becomes the output column name.
    pub name: String,

    /// Position in the mapping's current order.
    pub current_index: usize,

    pub ty: FieldType,
}

/// Identifies a field by the alias of its source table and the index it
/// was listed at.
#[derive(PartialEq, Eq, Clone, Hash, PartialOrd, Ord)]
pub struct FieldId {
    pub source: String,
    pub index: usize,
}

impl Field {
    pub(crate) fn from_info(info: FieldInfo, index: usize) -> Self {
        Self {
            id: FieldId {
                source: info.alias,
                index,
            },
            name: info.name.clone(),
            source_name: info.name,
            current_index: index,
            ty: info.ty,
        }
    }

    /// Original index in the engine listing.
    pub fn original_index(&self) -> usize {
        self.id.index
    }

    /// Alias of the table the field comes from.
    pub fn source_alias(&self) -> &str {
        &self.id.source
    }

    pub fn is_renamed(&self) -> bool {
        self.name != self.source_name
    }
}

impl fmt::Debug for FieldId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "FieldId({}/{})", self.source, self.index)
    }
}
