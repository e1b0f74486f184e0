use super::Error;

/// Error when the engine cannot copy a dataset into the workspace.
#[derive(Debug)]
pub(super) struct LoadError {
    path: Box<str>,
}

impl std::error::Error for LoadError {}

impl core::fmt::Display for LoadError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "failed to load `{}`", self.path)
    }
}

impl Error {
    /// Creates a load error for the given input path.
    pub fn load(path: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::Load(LoadError {
            path: path.into().into(),
        }))
    }

    /// Returns `true` if this error is a load error.
    pub fn is_load(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::Load(_))
    }
}
