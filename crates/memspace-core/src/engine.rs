mod capability;
pub use capability::Capability;

mod response;
pub use response::{ExportSummary, Response};

pub mod operation;
pub use operation::Operation;

use crate::Result;

use std::fmt::Debug;

/// The geoprocessing engine the workspace delegates to.
///
/// Every spatial and storage concern lives behind this trait: listing
/// fields, copying data into the workspace, selections, joins and exports.
/// Calls are synchronous and blocking; a failed call must leave no partial
/// effect behind.
pub trait Engine: Debug {
    /// Describes the engine's capability, which the workspace checks before
    /// delegating optional operations.
    fn capability(&self) -> &Capability;

    /// Execute an engine operation.
    fn exec(&mut self, op: Operation) -> Result<Response>;
}
