use super::*;

use std::collections::BTreeSet;

#[derive(Debug)]
pub struct Export {
    /// Dataset to read from
    pub source: String,

    /// Directory or container the output is written to
    pub location: String,

    /// Name of the output dataset
    pub name: String,

    /// Output columns, in order
    pub fields: Vec<OutputField>,

    /// When set, only rows with these object ids are written
    pub selection: Option<BTreeSet<u64>>,
}

/// One output column of an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputField {
    /// Column in the source dataset
    pub source_name: String,

    /// Column name in the output
    pub name: String,
}

impl Export {
    /// Full path of the output dataset.
    pub fn output_path(&self) -> String {
        output_path(&self.location, &self.name)
    }
}

pub(crate) fn output_path(location: &str, name: &str) -> String {
    let location = location.trim_end_matches(['/', '\\']);
    if location.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", location, name)
    }
}

impl From<Export> for Operation {
    fn from(value: Export) -> Self {
        Self::Export(value)
    }
}
