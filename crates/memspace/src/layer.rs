use crate::{
    engine::{operation, ExportSummary},
    schema::list_fields,
    DatasetKind, Error, FieldMapping, Result, Selection, SelectionState, Workspace,
};

use indexmap::IndexSet;
use tracing::{debug, info};

/// Handle to a dataset registered in a [`Workspace`].
///
/// The handle does not own data; it names a dataset the engine holds. Its
/// [`FieldMapping`] is built from the engine's field listing the first time
/// it is asked for and then keeps the caller's staged edits until
/// [`reload_mapping`](Layer::reload_mapping).
///
/// Once the dataset is removed from the workspace, every operation on the
/// handle fails with a dangling handle error, even after another dataset is
/// registered under the same name.
#[derive(Debug)]
pub struct Layer {
    workspace: Workspace,
    name: String,
    kind: DatasetKind,

    /// Registry generation of the dataset this handle was created for.
    generation: u64,

    mapping: Option<FieldMapping>,
}

/// A handle to a table. Tables and layers share one handle type and are
/// told apart by [`Layer::kind`].
pub type Table = Layer;

impl Layer {
    pub(crate) fn new(
        workspace: Workspace,
        name: String,
        kind: DatasetKind,
        generation: u64,
    ) -> Layer {
        Layer {
            workspace,
            name,
            kind,
            generation,
            mapping: None,
        }
    }

    /// Name of the dataset in the workspace.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> DatasetKind {
        self.kind
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Whether the dataset this handle was created for is still registered.
    pub fn is_registered(&self) -> bool {
        self.workspace
            .is_current(&self.name, self.generation, self.kind)
    }

    pub(crate) fn ensure_registered(&self) -> Result<()> {
        if self.is_registered() {
            Ok(())
        } else {
            Err(Error::dangling_handle(&self.name))
        }
    }

    pub fn field_mapping(&mut self) -> Result<&FieldMapping> {
        self.field_mapping_mut().map(|mapping| &*mapping)
    }

    pub fn field_mapping_mut(&mut self) -> Result<&mut FieldMapping> {
        self.ensure_registered()?;

        let mapping = match self.mapping.take() {
            Some(mapping) => mapping,
            None => FieldMapping::load(&mut **self.workspace.engine(), &self.name)?,
        };

        Ok(self.mapping.insert(mapping))
    }

    /// Discards staged edits and rebuilds the mapping from the engine.
    pub fn reload_mapping(&mut self) -> Result<&mut FieldMapping> {
        self.mapping = None;
        self.field_mapping_mut()
    }

    /// Aliases of the tables currently joined to this dataset.
    pub fn joins(&self) -> Result<Vec<String>> {
        self.ensure_registered()?;

        let listing = list_fields(&mut **self.workspace.engine(), &self.name)?;
        let aliases: IndexSet<String> = listing
            .into_iter()
            .map(|info| info.alias)
            .filter(|alias| !alias.is_empty() && *alias != self.name)
            .collect();

        Ok(aliases.into_iter().collect())
    }

    /// Attaches the fields of `other` to this dataset, matching
    /// `key_field` here to `other_key_field` there.
    ///
    /// If the field mapping was already built, the new fields are appended
    /// to it and the staged edits are kept.
    pub fn join(&mut self, other: &Layer, key_field: &str, other_key_field: &str) -> Result<()> {
        if !self.workspace.same(&other.workspace) {
            return Err(Error::invalid_argument(format!(
                "`{}` belongs to a different workspace",
                other.name
            )));
        }
        other.ensure_registered()?;

        self.join_dataset(&other.name, key_field, other_key_field)
    }

    pub(crate) fn join_dataset(
        &mut self,
        other: &str,
        key_field: &str,
        other_key_field: &str,
    ) -> Result<()> {
        self.ensure_registered()?;

        if !self.workspace.supports(|capability| capability.join) {
            return Err(Error::invalid_argument("the engine does not support joins"));
        }

        let op = operation::Join {
            dataset: self.name.clone(),
            key_field: key_field.to_string(),
            other: other.to_string(),
            other_key_field: other_key_field.to_string(),
        };

        self.workspace.exec(op.into()).map_err(|err| {
            err.context(memspace_core::err!(
                "failed to join `{}` to `{}`",
                other,
                self.name
            ))
        })?;

        if let Some(mapping) = &mut self.mapping {
            let listing = list_fields(&mut **self.workspace.engine(), &self.name)?;
            let appended = mapping.extend_listed(listing);
            debug!(dataset = %self.name, %other, appended, "field mapping extended");
        }

        info!(dataset = %self.name, %other, "joined");
        Ok(())
    }

    /// Removes the fields a previous join with `other` attached.
    ///
    /// Fields of `other` are dropped from an already built mapping; other
    /// staged edits are kept.
    pub fn drop_join(&mut self, other: &str) -> Result<()> {
        self.ensure_registered()?;

        if !self.workspace.supports(|capability| capability.remove_join) {
            return Err(Error::invalid_argument(
                "the engine does not support removing joins",
            ));
        }

        let op = operation::RemoveJoin {
            dataset: self.name.clone(),
            other: other.to_string(),
        };

        self.workspace.exec(op.into()).map_err(|err| {
            err.context(memspace_core::err!(
                "failed to remove join `{}` from `{}`",
                other,
                self.name
            ))
        })?;

        if let Some(mapping) = &mut self.mapping {
            let listing = list_fields(&mut **self.workspace.engine(), &self.name)?;
            let dropped = mapping.retain_listed(&listing);
            debug!(dataset = %self.name, %other, ?dropped, "field mapping trimmed");
        }

        info!(dataset = %self.name, %other, "join removed");
        Ok(())
    }

    /// Attribute and spatial selection on this dataset.
    pub fn selection(&self) -> Selection<'_> {
        Selection::new(self)
    }

    /// Writes the dataset to `output_location/output_name` through its
    /// field mapping. Only selected rows are written when a selection is
    /// active.
    pub fn export(&mut self, output_name: &str, output_location: &str) -> Result<ExportSummary> {
        self.ensure_registered()?;
        let selection = self.workspace.selection_state(&self.name);
        self.export_impl(output_name, output_location, selection)
    }

    /// Like [`export`](Layer::export), but writes every row regardless of
    /// the selection.
    pub fn export_all(
        &mut self,
        output_name: &str,
        output_location: &str,
    ) -> Result<ExportSummary> {
        self.export_impl(output_name, output_location, None)
    }

    fn export_impl(
        &mut self,
        output_name: &str,
        output_location: &str,
        selection: Option<SelectionState>,
    ) -> Result<ExportSummary> {
        let workspace = self.workspace.clone();
        let mapping = self.field_mapping_mut()?;

        let summary = mapping.export(
            &mut **workspace.engine(),
            output_name,
            output_location,
            selection.as_ref(),
        )?;

        info!(
            dataset = %mapping.source(),
            output = %summary.path,
            rows = summary.rows,
            "exported"
        );
        Ok(summary)
    }
}
