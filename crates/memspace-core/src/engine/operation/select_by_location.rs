use super::*;

use crate::selection::{SelectionMode, SpatialRelation};

#[derive(Debug)]
pub struct SelectByLocation {
    /// Dataset to select on
    pub dataset: String,

    /// Dataset whose features are tested against
    pub other: String,

    pub relation: SpatialRelation,

    pub mode: SelectionMode,
}

impl From<SelectByLocation> for Operation {
    fn from(value: SelectByLocation) -> Self {
        Self::SelectByLocation(value)
    }
}
