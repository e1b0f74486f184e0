use super::Error;

/// Error when a handle is used after its dataset left the workspace.
#[derive(Debug)]
pub(super) struct DanglingHandleError {
    name: Box<str>,
}

impl std::error::Error for DanglingHandleError {}

impl core::fmt::Display for DanglingHandleError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "dangling handle: `{}` was removed from the workspace",
            self.name
        )
    }
}

impl Error {
    /// Creates a dangling handle error.
    pub fn dangling_handle(name: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::DanglingHandle(DanglingHandleError {
            name: name.into().into(),
        }))
    }

    /// Returns `true` if this error is a dangling handle error.
    pub fn is_dangling_handle(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::DanglingHandle(_))
    }
}
