use super::Error;

/// Error when a reorder request is malformed in a way other than an
/// out-of-range index, such as naming the same field twice.
#[derive(Debug)]
pub(super) struct InvalidReorderError {
    message: Box<str>,
}

impl std::error::Error for InvalidReorderError {}

impl core::fmt::Display for InvalidReorderError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid reorder: {}", self.message)
    }
}

impl Error {
    /// Creates an invalid reorder error.
    pub fn invalid_reorder(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvalidReorder(InvalidReorderError {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is an invalid reorder error.
    pub fn is_invalid_reorder(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::InvalidReorder(_))
    }
}
