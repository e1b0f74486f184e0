use super::Error;

/// Error when a field mapping has no field with the requested display name.
#[derive(Debug)]
pub(super) struct FieldNotFoundError {
    name: Box<str>,
}

impl std::error::Error for FieldNotFoundError {}

impl core::fmt::Display for FieldNotFoundError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "field not found: `{}`", self.name)
    }
}

impl Error {
    /// Creates a field not found error.
    pub fn field_not_found(name: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::FieldNotFound(FieldNotFoundError {
            name: name.into().into(),
        }))
    }

    /// Returns `true` if this error is a field not found error.
    pub fn is_field_not_found(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::FieldNotFound(_))
    }
}
