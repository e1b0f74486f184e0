use super::Error;

/// Error when a derived workspace name is already registered and the
/// workspace rejects collisions.
#[derive(Debug)]
pub(super) struct NameCollisionError {
    name: Box<str>,
}

impl std::error::Error for NameCollisionError {}

impl core::fmt::Display for NameCollisionError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "name collision: `{}` is already registered", self.name)
    }
}

impl Error {
    /// Creates a name collision error.
    pub fn name_collision(name: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::NameCollision(NameCollisionError {
            name: name.into().into(),
        }))
    }

    /// Returns `true` if this error is a name collision error.
    pub fn is_name_collision(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::NameCollision(_))
    }
}
