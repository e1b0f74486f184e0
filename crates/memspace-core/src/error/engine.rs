use super::Error;

/// Error raised by a geoprocessing engine.
///
/// Engines report failures with this kind. The workspace and field mapping
/// never surface it on its own: at the delegation boundary it is wrapped in
/// the typed error of the operation that failed (load, export, ...).
#[derive(Debug)]
pub(super) struct EngineError {
    pub(super) inner: Box<dyn std::error::Error + Send + Sync>,
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.inner.as_ref())
    }
}

impl core::fmt::Display for EngineError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        // Display the error and walk its source chain
        core::fmt::Display::fmt(&self.inner, f)?;
        let mut source = self.inner.source();
        while let Some(err) = source {
            write!(f, ": {}", err)?;
            source = err.source();
        }
        Ok(())
    }
}

impl Error {
    /// Creates an error from an engine failure.
    ///
    /// Accepts anything convertible into a boxed error, including plain
    /// message strings.
    pub fn engine(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Error {
        Error::from(super::ErrorKind::Engine(EngineError { inner: err.into() }))
    }

    /// Returns `true` if this error is an engine failure.
    pub fn is_engine(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::Engine(_))
    }
}
