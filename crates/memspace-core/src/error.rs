mod adhoc;
mod dangling_handle;
mod duplicate_name;
mod engine;
mod export;
mod field_not_found;
mod index_out_of_range;
mod invalid_argument;
mod invalid_reorder;
mod load;
mod name_collision;
mod not_found;
mod source_not_found;

use adhoc::AdhocError;
use dangling_handle::DanglingHandleError;
use duplicate_name::DuplicateNameError;
use engine::EngineError;
use export::ExportError;
use field_not_found::FieldNotFoundError;
use index_out_of_range::IndexOutOfRangeError;
use invalid_argument::InvalidArgumentError;
use invalid_reorder::InvalidReorderError;
use load::LoadError;
use name_collision::NameCollisionError;
use not_found::NotFoundError;
use source_not_found::SourceNotFoundError;
use std::sync::Arc;

/// Returns early with an ad-hoc [`Error`] built from a format string.
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::Error::from_args(format_args!($($arg)*)))
    };
}

/// Builds an ad-hoc [`Error`] from a format string.
#[macro_export]
macro_rules! err {
    ($($arg:tt)*) => {
        $crate::Error::from_args(format_args!($($arg)*))
    };
}

/// An error that can occur in memspace.
#[derive(Clone)]
pub struct Error {
    inner: Option<Arc<ErrorInner>>,
}

#[derive(Debug)]
struct ErrorInner {
    kind: ErrorKind,
    cause: Option<Error>,
}

impl Error {
    /// Adds context to this error.
    ///
    /// Context is displayed in reverse order: the most recently added context
    /// is shown first, followed by earlier context, ending with the root cause.
    /// The `is_*` predicates inspect the outermost context, so wrapping an
    /// engine failure in a typed error makes the typed kind visible to callers
    /// while keeping the engine message in the chain.
    #[inline(always)]
    pub fn context(self, consequent: impl IntoError) -> Error {
        self.context_impl(consequent.into_error())
    }

    #[inline(never)]
    #[cold]
    fn context_impl(self, consequent: Error) -> Error {
        let mut err = consequent;
        if err.inner.is_none() {
            err = Error::from(ErrorKind::Unknown);
        }
        let inner = err.inner.as_mut().unwrap();
        assert!(
            inner.cause.is_none(),
            "consequent error must not already have a cause"
        );
        Arc::get_mut(inner)
            .expect("consequent error must not be shared")
            .cause = Some(self);
        err
    }

    /// Returns the innermost error of the context chain.
    pub fn root(&self) -> &Error {
        self.chain().last().unwrap_or(self)
    }

    fn chain(&self) -> impl Iterator<Item = &Error> {
        let mut err = self;
        core::iter::once(err).chain(core::iter::from_fn(move || {
            err = err.inner.as_ref().and_then(|inner| inner.cause.as_ref())?;
            Some(err)
        }))
    }

    fn kind(&self) -> &ErrorKind {
        self.inner
            .as_ref()
            .map(|inner| &inner.kind)
            .unwrap_or(&ErrorKind::Unknown)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        if let Some(cause) = self.inner.as_ref().and_then(|inner| inner.cause.as_ref()) {
            return Some(cause);
        }

        match self.kind() {
            ErrorKind::Engine(err) => Some(err),
            ErrorKind::Anyhow(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let mut it = self.chain().peekable();
        while let Some(err) = it.next() {
            core::fmt::Display::fmt(err.kind(), f)?;
            if it.peek().is_some() {
                f.write_str(": ")?;
            }
        }
        Ok(())
    }
}

impl core::fmt::Debug for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        if !f.alternate() {
            core::fmt::Display::fmt(self, f)
        } else {
            let Some(ref inner) = self.inner else {
                return f.debug_struct("Error").field("kind", &"None").finish();
            };
            f.debug_struct("Error")
                .field("kind", &inner.kind)
                .field("cause", &inner.cause)
                .finish()
        }
    }
}

#[derive(Debug)]
enum ErrorKind {
    Anyhow(anyhow::Error),
    Adhoc(AdhocError),
    Engine(EngineError),
    SourceNotFound(SourceNotFoundError),
    FieldNotFound(FieldNotFoundError),
    DuplicateName(DuplicateNameError),
    IndexOutOfRange(IndexOutOfRangeError),
    InvalidReorder(InvalidReorderError),
    InvalidArgument(InvalidArgumentError),
    NameCollision(NameCollisionError),
    Load(LoadError),
    Export(ExportError),
    NotFound(NotFoundError),
    DanglingHandle(DanglingHandleError),
    Unknown,
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        use self::ErrorKind::*;

        match self {
            Anyhow(err) => core::fmt::Display::fmt(err, f),
            Adhoc(err) => core::fmt::Display::fmt(err, f),
            Engine(err) => core::fmt::Display::fmt(err, f),
            SourceNotFound(err) => core::fmt::Display::fmt(err, f),
            FieldNotFound(err) => core::fmt::Display::fmt(err, f),
            DuplicateName(err) => core::fmt::Display::fmt(err, f),
            IndexOutOfRange(err) => core::fmt::Display::fmt(err, f),
            InvalidReorder(err) => core::fmt::Display::fmt(err, f),
            InvalidArgument(err) => core::fmt::Display::fmt(err, f),
            NameCollision(err) => core::fmt::Display::fmt(err, f),
            Load(err) => core::fmt::Display::fmt(err, f),
            Export(err) => core::fmt::Display::fmt(err, f),
            NotFound(err) => core::fmt::Display::fmt(err, f),
            DanglingHandle(err) => core::fmt::Display::fmt(err, f),
            Unknown => f.write_str("unknown memspace error"),
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error {
            inner: Some(Arc::new(ErrorInner { kind, cause: None })),
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Error {
        Error::from(ErrorKind::Anyhow(err))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::from(anyhow::Error::from(err))
    }
}

/// Trait for types that can be converted into an Error.
pub trait IntoError {
    /// Converts this type into an Error.
    fn into_error(self) -> Error;
}

impl IntoError for Error {
    #[inline(always)]
    fn into_error(self) -> Error {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_size() {
        // Ensure Error stays at one word (size of pointer/Arc)
        let expected_size = core::mem::size_of::<usize>();
        assert_eq!(expected_size, core::mem::size_of::<Error>());
    }

    #[test]
    fn error_from_args() {
        let err = Error::from_args(format_args!("test error: {}", 42));
        assert_eq!(err.to_string(), "test error: 42");
    }

    #[test]
    fn error_chain_display() {
        let root = err!("root cause");
        let mid = err!("middle context");
        let top = err!("top context");

        let chained = root.context(mid).context(top);
        assert_eq!(
            chained.to_string(),
            "top context: middle context: root cause"
        );
    }

    #[test]
    fn anyhow_bridge() {
        let anyhow_err = anyhow::anyhow!("something failed");
        let our_err: Error = anyhow_err.into();
        assert_eq!(our_err.to_string(), "something failed");
    }

    #[test]
    fn engine_error_wrapped_in_load() {
        let err = Error::engine("cannot open roads.shp").context(Error::load("C:/data/roads.shp"));

        assert!(err.is_load());
        assert!(!err.is_engine());
        assert!(err.root().is_engine());
        assert_eq!(
            err.to_string(),
            "failed to load `C:/data/roads.shp`: cannot open roads.shp"
        );
    }

    #[test]
    fn engine_error_wrapped_in_export() {
        let err = Error::engine("disk full").context(Error::export("out.gdb/parcels"));

        assert!(err.is_export());
        assert_eq!(err.to_string(), "failed to export `out.gdb/parcels`: disk full");
    }

    #[test]
    fn source_chain_walks_context() {
        use std::error::Error as _;

        let err = Error::engine("no such dataset").context(Error::source_not_found("mem_roads"));
        let source = err.source().expect("context must be exposed as source");
        assert_eq!(source.to_string(), "no such dataset");
    }

    #[test]
    fn source_not_found() {
        let err = Error::source_not_found("mem_roads");
        assert!(err.is_source_not_found());
        assert_eq!(err.to_string(), "source not found: `mem_roads`");
    }

    #[test]
    fn field_not_found() {
        let err = Error::field_not_found("Name");
        assert!(err.is_field_not_found());
        assert_eq!(err.to_string(), "field not found: `Name`");
    }

    #[test]
    fn duplicate_name() {
        let err = Error::duplicate_name("GEOID10");
        assert!(err.is_duplicate_name());
        assert_eq!(err.to_string(), "duplicate field name: `GEOID10`");
    }

    #[test]
    fn index_out_of_range() {
        let err = Error::index_out_of_range(5, 3);
        assert!(err.is_index_out_of_range());
        assert_eq!(err.to_string(), "index 5 is out of range for 3 fields");
    }

    #[test]
    fn invalid_reorder() {
        let err = Error::invalid_reorder("index 1 appears more than once");
        assert!(err.is_invalid_reorder());
        assert_eq!(
            err.to_string(),
            "invalid reorder: index 1 appears more than once"
        );
    }

    #[test]
    fn name_collision() {
        let err = Error::name_collision("mem_roads");
        assert!(err.is_name_collision());
        assert_eq!(
            err.to_string(),
            "name collision: `mem_roads` is already registered"
        );
    }

    #[test]
    fn not_found() {
        let err = Error::not_found("mem_roads");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "not found: `mem_roads` is not registered");
    }

    #[test]
    fn dangling_handle() {
        let err = Error::dangling_handle("mem_roads");
        assert!(err.is_dangling_handle());
        assert_eq!(
            err.to_string(),
            "dangling handle: `mem_roads` was removed from the workspace"
        );
    }

    #[test]
    fn invalid_argument() {
        let err = Error::invalid_argument("delimiter must not be empty");
        assert!(err.is_invalid_argument());
        assert_eq!(
            err.to_string(),
            "invalid argument: delimiter must not be empty"
        );
    }
}
