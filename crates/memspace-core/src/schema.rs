mod field;
pub use field::{Field, FieldId, FieldInfo};

mod field_type;
pub use field_type::FieldType;

mod mapping;
pub use mapping::{list_fields, FieldMapping};

use serde::{Deserialize, Serialize};

/// Whether a dataset carries geometry (a layer) or is a plain table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatasetKind {
    Layer,
    Table,
}

impl DatasetKind {
    pub fn is_layer(self) -> bool {
        matches!(self, Self::Layer)
    }

    pub fn is_table(self) -> bool {
        matches!(self, Self::Table)
    }
}

impl core::fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            Self::Layer => f.write_str("layer"),
            Self::Table => f.write_str("table"),
        }
    }
}
