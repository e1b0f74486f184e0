use super::*;

#[derive(Debug)]
pub struct Delete {
    pub dataset: String,
}

impl From<Delete> for Operation {
    fn from(value: Delete) -> Self {
        Self::Delete(value)
    }
}
