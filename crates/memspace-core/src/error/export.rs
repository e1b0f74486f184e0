use super::Error;

/// Error when the engine fails to write an exported dataset.
///
/// This occurs when:
/// - The output location does not exist or is not writable
/// - The output already exists
/// - The engine rejects the staged schema
///
/// The engine contract is that a failed export leaves no partial output.
#[derive(Debug)]
pub(super) struct ExportError {
    output: Box<str>,
}

impl std::error::Error for ExportError {}

impl core::fmt::Display for ExportError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "failed to export `{}`", self.output)
    }
}

impl Error {
    /// Creates an export error for the given output path.
    pub fn export(output: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::Export(ExportError {
            output: output.into().into(),
        }))
    }

    /// Returns `true` if this error is an export error.
    pub fn is_export(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::Export(_))
    }
}
