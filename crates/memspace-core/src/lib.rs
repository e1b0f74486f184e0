pub mod engine;
pub use engine::Engine;

mod error;
pub use error::Error;

pub mod schema;
pub use schema::{Field, FieldMapping};

pub mod selection;

/// A Result type alias that uses memspace's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;
