use super::*;

#[derive(Debug)]
pub struct ListFields {
    /// Dataset name or path to describe
    pub source: String,
}

impl From<ListFields> for Operation {
    fn from(value: ListFields) -> Self {
        Self::ListFields(value)
    }
}
