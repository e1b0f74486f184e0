mod clear_selection;
pub use clear_selection::ClearSelection;

mod delete;
pub use delete::Delete;

mod export;
pub(crate) use export::output_path;
pub use export::{Export, OutputField};

mod join;
pub use join::Join;

mod list_fields;
pub use list_fields::ListFields;

mod load;
pub use load::Load;

mod remove_join;
pub use remove_join::RemoveJoin;

mod select_by_attribute;
pub use select_by_attribute::SelectByAttribute;

mod select_by_location;
pub use select_by_location::SelectByLocation;

#[derive(Debug)]
pub enum Operation {
    /// List the fields of a dataset, in engine order.
    ListFields(ListFields),

    /// Copy a dataset into the workspace under a new name.
    Load(Load),

    /// Write a dataset through a staged field mapping.
    Export(Export),

    /// Select rows matching an attribute expression.
    SelectByAttribute(SelectByAttribute),

    /// Select rows by a spatial relation to another dataset.
    SelectByLocation(SelectByLocation),

    /// Drop the active selection of a dataset.
    ClearSelection(ClearSelection),

    /// Attach the fields of another dataset by key match.
    Join(Join),

    /// Remove the fields attached by a previous join.
    RemoveJoin(RemoveJoin),

    /// Delete a dataset from the workspace.
    Delete(Delete),
}

impl Operation {
    /// Short name of the operation, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ListFields(_) => "list_fields",
            Self::Load(_) => "load",
            Self::Export(_) => "export",
            Self::SelectByAttribute(_) => "select_by_attribute",
            Self::SelectByLocation(_) => "select_by_location",
            Self::ClearSelection(_) => "clear_selection",
            Self::Join(_) => "join",
            Self::RemoveJoin(_) => "remove_join",
            Self::Delete(_) => "delete",
        }
    }
}
