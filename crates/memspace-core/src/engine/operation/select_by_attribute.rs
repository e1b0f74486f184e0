use super::*;

use crate::selection::SelectionMode;

#[derive(Debug)]
pub struct SelectByAttribute {
    /// Dataset to select on
    pub dataset: String,

    /// Where clause in the engine's expression language
    pub expression: String,

    pub mode: SelectionMode,
}

impl From<SelectByAttribute> for Operation {
    fn from(value: SelectByAttribute) -> Self {
        Self::SelectByAttribute(value)
    }
}
