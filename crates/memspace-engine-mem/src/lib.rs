//! A reference [`Engine`] that keeps every dataset in process memory.
//!
//! `MemEngine` stands in for a real geoprocessing engine. Source datasets
//! and output locations are registered up front; loads copy sources into
//! the workspace, and exports write into an in-memory output catalog that
//! can be inspected afterwards. Clones share state, so a caller can hand one
//! clone to a workspace and keep another to look at the results.

mod dataset;
pub use dataset::{Column, Dataset, Envelope, Row, Value};

mod expr;
use expr::Expr;

use indexmap::{IndexMap, IndexSet};
use memspace_core::{
    engine::{operation, Capability, ExportSummary, Operation, Response},
    schema::FieldInfo,
    selection::{SelectionState, SpatialRelation},
    Engine, Error, Result,
};
use std::{
    cell::{Ref, RefCell},
    collections::{BTreeSet, HashSet},
    rc::Rc,
};
use tracing::{debug, trace};

#[derive(Debug, Clone, Default)]
pub struct MemEngine {
    state: Rc<RefCell<State>>,
}

#[derive(Debug, Default)]
struct State {
    /// Datasets reachable by path, as if on disk.
    sources: IndexMap<String, Dataset>,

    /// Datasets copied into a workspace, keyed by workspace name.
    workspace: IndexMap<String, Dataset>,

    /// Locations exports may write to.
    locations: IndexSet<String>,

    /// Exported datasets, keyed by full output path.
    outputs: IndexMap<String, Dataset>,
}

impl MemEngine {
    pub fn new() -> MemEngine {
        MemEngine::default()
    }

    /// Makes `dataset` loadable from `path`.
    pub fn with_source(self, path: impl AsRef<str>, dataset: Dataset) -> MemEngine {
        self.add_source(path, dataset);
        self
    }

    /// Makes `location` a valid export target.
    pub fn with_location(self, location: impl AsRef<str>) -> MemEngine {
        self.add_location(location);
        self
    }

    pub fn add_source(&self, path: impl AsRef<str>, dataset: Dataset) {
        self.state
            .borrow_mut()
            .sources
            .insert(normalize(path.as_ref()), dataset);
    }

    pub fn add_location(&self, location: impl AsRef<str>) {
        self.state
            .borrow_mut()
            .locations
            .insert(normalize(location.as_ref()));
    }

    /// A dataset currently held in the workspace.
    pub fn dataset(&self, name: &str) -> Option<Ref<'_, Dataset>> {
        Ref::filter_map(self.state.borrow(), |state| state.workspace.get(name)).ok()
    }

    /// An exported dataset, by full output path.
    pub fn output(&self, path: &str) -> Option<Ref<'_, Dataset>> {
        Ref::filter_map(self.state.borrow(), |state| state.outputs.get(&normalize(path))).ok()
    }

    /// Names of the datasets in the workspace, in load order.
    pub fn workspace_names(&self) -> Vec<String> {
        self.state.borrow().workspace.keys().cloned().collect()
    }
}

impl Engine for MemEngine {
    fn capability(&self) -> &Capability {
        &Capability::IN_MEMORY
    }

    fn exec(&mut self, op: Operation) -> Result<Response> {
        trace!(op = op.name(), "mem engine exec");
        let mut state = self.state.borrow_mut();

        match op {
            Operation::ListFields(op) => state.list_fields(&op.source).map(Response::Fields),
            Operation::Load(op) => state.load(op).map(|_| Response::Done),
            Operation::Export(op) => state.export(op).map(Response::Exported),
            Operation::SelectByAttribute(op) => {
                state.select_by_attribute(op).map(Response::Selection)
            }
            Operation::SelectByLocation(op) => {
                state.select_by_location(op).map(Response::Selection)
            }
            Operation::ClearSelection(op) => {
                let dataset = state.dataset_mut(&op.dataset)?;
                dataset.selection = SelectionState::cleared(dataset.len() as u64);
                Ok(Response::Selection(dataset.selection.clone()))
            }
            Operation::Join(op) => state.join(op).map(|_| Response::Done),
            Operation::RemoveJoin(op) => state.remove_join(op).map(|_| Response::Done),
            Operation::Delete(op) => match state.workspace.shift_remove(&op.dataset) {
                Some(_) => Ok(Response::Done),
                None => Err(missing(&op.dataset)),
            },
        }
    }
}

impl State {
    fn dataset(&self, name: &str) -> Result<&Dataset> {
        self.workspace
            .get(name)
            .or_else(|| self.sources.get(&normalize(name)))
            .ok_or_else(|| missing(name))
    }

    fn dataset_mut(&mut self, name: &str) -> Result<&mut Dataset> {
        self.workspace.get_mut(name).ok_or_else(|| missing(name))
    }

    fn list_fields(&self, source: &str) -> Result<Vec<FieldInfo>> {
        Ok(self.dataset(source)?.field_infos())
    }

    fn load(&mut self, op: operation::Load) -> Result<()> {
        let source = self
            .sources
            .get(&normalize(&op.path))
            .ok_or_else(|| Error::engine(format!("cannot open `{}`: no such dataset", op.path)))?;

        if op.kind.is_layer() && source.kind().is_table() {
            return Err(Error::engine(format!(
                "`{}` has no geometry and cannot be loaded as a layer",
                op.path
            )));
        }

        if self.workspace.contains_key(&op.name) {
            return Err(Error::engine(format!(
                "`{}/{}` already exists",
                op.workspace, op.name
            )));
        }

        let mut copy = source.clone().into_kind(op.kind);

        if let Some(fields) = &op.fields {
            let mut indices = vec![];
            for name in fields {
                let index = copy.column_index(name).ok_or_else(|| {
                    Error::engine(format!("field `{}` not found in `{}`", name, op.path))
                })?;
                indices.push(index);
            }
            indices.sort_unstable();
            indices.dedup();
            project(&mut copy, &indices);
        }

        copy.set_alias(&op.name);
        copy.selection = SelectionState::cleared(copy.len() as u64);

        debug!(path = %op.path, name = %op.name, kind = %op.kind, rows = copy.len(), "loaded");
        self.workspace.insert(op.name, copy);
        Ok(())
    }

    fn export(&mut self, op: operation::Export) -> Result<ExportSummary> {
        let location = normalize(&op.location);
        if !self.locations.contains(&location) {
            return Err(Error::engine(format!(
                "output location `{}` does not exist",
                op.location
            )));
        }

        let path = normalize(&op.output_path());
        if self.outputs.contains_key(&path) {
            return Err(Error::engine(format!("`{}` already exists", path)));
        }

        let source = self.dataset(&op.source)?;

        let mut names = HashSet::new();
        let mut indices = vec![];
        for field in &op.fields {
            if !names.insert(field.name.as_str()) {
                return Err(Error::engine(format!(
                    "invalid schema: duplicate output field `{}`",
                    field.name
                )));
            }

            let index = source.column_index(&field.source_name).ok_or_else(|| {
                Error::engine(format!(
                    "field `{}` not found in `{}`",
                    field.source_name, op.source
                ))
            })?;
            indices.push(index);
        }

        let columns = op
            .fields
            .iter()
            .zip(&indices)
            .map(|(field, &index)| Column {
                name: field.name.clone(),
                ty: source.columns[index].ty.clone(),
                alias: op.name.clone(),
            })
            .collect();

        let rows: Vec<Row> = source
            .rows
            .iter()
            .filter(|row| match &op.selection {
                Some(ids) => ids.contains(&row.oid),
                None => true,
            })
            .enumerate()
            .map(|(i, row)| Row {
                oid: i as u64 + 1,
                values: indices.iter().map(|&index| row.values[index].clone()).collect(),
                envelope: row.envelope,
            })
            .collect();

        let mut output = Dataset::from_parts(source.kind(), columns, rows);
        output.selection = SelectionState::cleared(output.len() as u64);

        let summary = ExportSummary {
            path: path.clone(),
            fields: output.field_names().into_iter().map(String::from).collect(),
            rows: output.len() as u64,
        };

        debug!(source = %op.source, %path, rows = summary.rows, "exported");
        self.outputs.insert(path, output);
        Ok(summary)
    }

    fn select_by_attribute(&mut self, op: operation::SelectByAttribute) -> Result<SelectionState> {
        let dataset = self.dataset_mut(&op.dataset)?;
        let expr = Expr::parse(&op.expression, dataset)?;

        let matched: BTreeSet<u64> = dataset
            .rows
            .iter()
            .filter(|row| expr.eval(&row.values))
            .map(|row| row.oid)
            .collect();

        dataset.selection = dataset.selection.combine(op.mode, matched);
        Ok(dataset.selection.clone())
    }

    fn select_by_location(&mut self, op: operation::SelectByLocation) -> Result<SelectionState> {
        if op.relation != SpatialRelation::Intersect {
            return Err(Error::engine(format!(
                "spatial relation {} is not supported",
                op.relation.as_str()
            )));
        }

        let other = self.dataset(&op.other)?;
        if !other.kind().is_layer() {
            return Err(Error::engine(format!("`{}` is not a feature layer", op.other)));
        }
        let envelopes: Vec<Envelope> = other.active_envelopes().copied().collect();

        let dataset = self.dataset_mut(&op.dataset)?;
        if !dataset.kind().is_layer() {
            return Err(Error::engine(format!(
                "`{}` is not a feature layer",
                op.dataset
            )));
        }

        let matched: BTreeSet<u64> = dataset
            .rows
            .iter()
            .filter(|row| match &row.envelope {
                Some(envelope) => envelopes.iter().any(|other| envelope.intersects(other)),
                None => false,
            })
            .map(|row| row.oid)
            .collect();

        dataset.selection = dataset.selection.combine(op.mode, matched);
        Ok(dataset.selection.clone())
    }

    fn join(&mut self, op: operation::Join) -> Result<()> {
        let other = self.dataset(&op.other)?;
        let other_key = other.column_index(&op.other_key_field).ok_or_else(|| {
            Error::engine(format!(
                "field `{}` not found in `{}`",
                op.other_key_field, op.other
            ))
        })?;

        let prefix = format!("{}$.", op.other);
        let joined_columns: Vec<Column> = other
            .columns
            .iter()
            .map(|column| Column {
                name: format!("{}{}", prefix, column.name),
                ty: column.ty.clone(),
                alias: op.other.clone(),
            })
            .collect();
        let other_rows: Vec<Vec<Value>> = other.rows.iter().map(|row| row.values.clone()).collect();

        let dataset = self.dataset_mut(&op.dataset)?;
        let key = dataset.column_index(&op.key_field).ok_or_else(|| {
            Error::engine(format!(
                "field `{}` not found in `{}`",
                op.key_field, op.dataset
            ))
        })?;

        if dataset.columns.iter().any(|column| column.alias == op.other) {
            return Err(Error::engine(format!(
                "`{}` is already joined to `{}`",
                op.other, op.dataset
            )));
        }

        for row in &mut dataset.rows {
            let found = other_rows.iter().find(|other| {
                expr::compare(&row.values[key], &other[other_key]) == Some(std::cmp::Ordering::Equal)
            });

            match found {
                Some(values) => row.values.extend(values.iter().cloned()),
                None => row
                    .values
                    .extend(std::iter::repeat(Value::Null).take(joined_columns.len())),
            }
        }
        dataset.columns.extend(joined_columns);

        debug!(dataset = %op.dataset, other = %op.other, "joined");
        Ok(())
    }

    fn remove_join(&mut self, op: operation::RemoveJoin) -> Result<()> {
        let dataset = self.dataset_mut(&op.dataset)?;

        let keep: Vec<usize> = dataset
            .columns
            .iter()
            .enumerate()
            .filter(|(_, column)| column.alias != op.other)
            .map(|(index, _)| index)
            .collect();

        if keep.len() == dataset.columns.len() {
            return Err(Error::engine(format!(
                "`{}` is not joined to `{}`",
                op.other, op.dataset
            )));
        }

        project(dataset, &keep);
        Ok(())
    }
}

/// Keeps only the columns at `indices`, which must be sorted.
fn project(dataset: &mut Dataset, indices: &[usize]) {
    dataset.columns = indices
        .iter()
        .map(|&index| dataset.columns[index].clone())
        .collect();

    for row in &mut dataset.rows {
        row.values = indices.iter().map(|&index| row.values[index].clone()).collect();
    }
}

fn missing(name: &str) -> Error {
    Error::engine(format!("dataset `{}` does not exist", name))
}

/// Paths compare with forward slashes and no trailing separator.
fn normalize(path: &str) -> String {
    path.replace('\\', "/").trim_end_matches('/').to_string()
}
