use super::Error;

/// Error when an edit would leave two fields with the same display name.
///
/// Raised by:
/// - `rename_field` when the new name belongs to another field
/// - `rename_by_split` when stripping prefixes makes two names equal
/// - `export` when the staged schema still holds duplicate names
#[derive(Debug)]
pub(super) struct DuplicateNameError {
    name: Box<str>,
}

impl std::error::Error for DuplicateNameError {}

impl core::fmt::Display for DuplicateNameError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "duplicate field name: `{}`", self.name)
    }
}

impl Error {
    /// Creates a duplicate name error.
    pub fn duplicate_name(name: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::DuplicateName(DuplicateNameError {
            name: name.into().into(),
        }))
    }

    /// Returns `true` if this error is a duplicate name error.
    pub fn is_duplicate_name(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::DuplicateName(_))
    }
}
