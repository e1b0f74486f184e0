use super::*;

#[derive(Debug)]
pub struct RemoveJoin {
    pub dataset: String,

    /// Name of the joined dataset whose fields are removed
    pub other: String,
}

impl From<RemoveJoin> for Operation {
    fn from(value: RemoveJoin) -> Self {
        Self::RemoveJoin(value)
    }
}
