use super::*;

#[derive(Debug)]
pub struct ClearSelection {
    pub dataset: String,
}

impl From<ClearSelection> for Operation {
    fn from(value: ClearSelection) -> Self {
        Self::ClearSelection(value)
    }
}
