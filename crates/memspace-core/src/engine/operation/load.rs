use super::*;

use crate::schema::DatasetKind;

#[derive(Debug)]
pub struct Load {
    /// Path of the dataset to copy
    pub path: String,

    /// Whether the copy is a feature layer or a table
    pub kind: DatasetKind,

    /// Workspace to copy into
    pub workspace: String,

    /// Name of the copy inside the workspace
    pub name: String,

    /// When set, only these fields are copied
    pub fields: Option<Vec<String>>,
}

impl From<Load> for Operation {
    fn from(value: Load) -> Self {
        Self::Load(value)
    }
}
