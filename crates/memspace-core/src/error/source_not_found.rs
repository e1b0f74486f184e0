use super::Error;

/// Error when the engine cannot reach a data source to list its fields.
#[derive(Debug)]
pub(super) struct SourceNotFoundError {
    source: Box<str>,
}

impl std::error::Error for SourceNotFoundError {}

impl core::fmt::Display for SourceNotFoundError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "source not found: `{}`", self.source)
    }
}

impl Error {
    /// Creates a source not found error for the given source name or path.
    pub fn source_not_found(source: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::SourceNotFound(SourceNotFoundError {
            source: source.into().into(),
        }))
    }

    /// Returns `true` if this error is a source not found error.
    pub fn is_source_not_found(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::SourceNotFound(_))
    }
}
