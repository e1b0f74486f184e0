//! Object-oriented handles over an in-memory geoprocessing workspace.
//!
//! A [`Workspace`] wraps an [`Engine`] and keeps a registry of the datasets
//! loaded into it. Loading a dataset returns a [`Layer`] handle, which
//! carries a lazily built [`FieldMapping`] for schema edits, a
//! [`Selection`] facet for attribute and spatial queries, and export.
//!
//! ```ignore
//! let mut tracts = workspace.add_table("C:/data/tracts.dbf")?;
//!
//! let mapping = tracts.field_mapping_mut()?;
//! mapping.reorder(&[2, 0], true)?;
//! mapping.rename_field("EstTotPop16", "Population")?;
//!
//! tracts.selection().where_clause("EstTotPop16 > 1000")?;
//! tracts.export("tract_pop", "C:/out.gdb")?;
//! ```

pub mod config;
pub use config::{CollisionPolicy, WorkspaceConfig};

mod layer;
pub use layer::{Layer, Table};

mod selection;
pub use selection::Selection;

pub mod workspace;
pub use workspace::{JoinAllReport, LoadOptions, Workspace};

pub use memspace_core::{
    engine, schema, schema::DatasetKind, selection::SelectionMode, selection::SelectionState,
    selection::SpatialRelation, Engine, Error, Field, FieldMapping, Result,
};

#[cfg(feature = "mem")]
pub use memspace_engine_mem as mem;
