use super::*;

#[derive(Debug)]
pub struct Join {
    /// Dataset receiving the fields
    pub dataset: String,

    /// Key field on `dataset`
    pub key_field: String,

    /// Dataset supplying the fields
    pub other: String,

    /// Key field on `other`
    pub other_key_field: String,
}

impl From<Join> for Operation {
    fn from(value: Join) -> Self {
        Self::Join(value)
    }
}
