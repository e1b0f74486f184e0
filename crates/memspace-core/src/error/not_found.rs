use super::Error;

/// Error when a name is not registered in the workspace.
#[derive(Debug)]
pub(super) struct NotFoundError {
    name: Box<str>,
}

impl std::error::Error for NotFoundError {}

impl core::fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "not found: `{}` is not registered", self.name)
    }
}

impl Error {
    /// Creates a registry lookup miss.
    pub fn not_found(name: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::NotFound(NotFoundError {
            name: name.into().into(),
        }))
    }

    /// Returns `true` if this error is a registry lookup miss.
    pub fn is_not_found(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::NotFound(_))
    }
}
