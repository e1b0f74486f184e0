mod builder;
pub use builder::Builder;

mod registry;
use registry::{base_name, Registry};

use crate::{DatasetKind, Engine, Error, Layer, Result, SelectionState, WorkspaceConfig};

use memspace_core::engine::{operation, Capability, Operation, Response};
use std::{
    cell::{RefCell, RefMut},
    fmt,
    rc::Rc,
};
use tracing::{debug, info, warn};

/// Shared state between all `Workspace` clones and the handles they hand out.
pub(crate) struct Shared {
    engine: RefCell<Box<dyn Engine>>,
    registry: RefCell<Registry>,
    config: WorkspaceConfig,
}

/// A session over an engine workspace.
///
/// Cloning is cheap and yields another reference to the same session. When
/// the last reference (including those held by handles) goes away, every
/// dataset still registered is deleted from the engine.
#[derive(Clone)]
pub struct Workspace {
    shared: Rc<Shared>,
}

/// Options for [`Workspace::add_layer_with`] and [`Workspace::add_table_with`].
#[derive(Debug, Default, Clone)]
pub struct LoadOptions {
    rename: Option<String>,
    limit_fields: Option<Vec<String>>,
}

/// Outcome of [`Workspace::join_all`].
#[derive(Debug, Default)]
pub struct JoinAllReport {
    /// Tables joined, in registration order.
    pub joined: Vec<String>,

    /// Tables that failed to join, with the reason.
    pub failed: Vec<(String, Error)>,
}

impl Workspace {
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// A workspace with the default configuration.
    pub fn new(engine: impl Engine + 'static) -> Workspace {
        Workspace::builder().build(engine)
    }

    fn from_parts(engine: Box<dyn Engine>, config: WorkspaceConfig) -> Workspace {
        debug!(path = %config.path, prefix = %config.name_prefix, "workspace created");
        Workspace {
            shared: Rc::new(Shared {
                engine: RefCell::new(engine),
                registry: RefCell::new(Registry::default()),
                config,
            }),
        }
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.shared.config
    }

    /// Copies the feature class at `path` into the workspace.
    pub fn add_layer(&self, path: &str) -> Result<Layer> {
        self.load(path, DatasetKind::Layer, LoadOptions::default())
    }

    /// Copies the table at `path` into the workspace.
    pub fn add_table(&self, path: &str) -> Result<Layer> {
        self.load(path, DatasetKind::Table, LoadOptions::default())
    }

    pub fn add_layer_with(&self, path: &str, options: LoadOptions) -> Result<Layer> {
        self.load(path, DatasetKind::Layer, options)
    }

    pub fn add_table_with(&self, path: &str, options: LoadOptions) -> Result<Layer> {
        self.load(path, DatasetKind::Table, options)
    }

    fn load(&self, path: &str, kind: DatasetKind, options: LoadOptions) -> Result<Layer> {
        let stem = match options.rename {
            Some(rename) if rename.trim().is_empty() => {
                return Err(Error::invalid_argument("load name must not be empty"));
            }
            Some(rename) => rename.trim().replace(' ', "_"),
            None => base_name(path)?,
        };

        let config = self.config();
        let name = self
            .shared
            .registry
            .borrow()
            .resolve(&format!("{}{}", config.name_prefix, stem), config.collision_policy)?;

        let op = operation::Load {
            path: path.to_string(),
            kind,
            workspace: config.path.clone(),
            name: name.clone(),
            fields: options.limit_fields,
        };

        self.exec(op.into())
            .map_err(|err| err.context(Error::load(path)))?;

        let generation = self.shared.registry.borrow_mut().insert(name.clone(), kind);
        info!(%path, %name, %kind, generation, "dataset registered");

        Ok(Layer::new(self.clone(), name, kind, generation))
    }

    /// A handle to the registered layer `name`.
    pub fn get_memory_layer(&self, name: &str) -> Result<Layer> {
        self.get(name, DatasetKind::Layer)
    }

    /// A handle to the registered table `name`.
    pub fn get_memory_table(&self, name: &str) -> Result<Layer> {
        self.get(name, DatasetKind::Table)
    }

    fn get(&self, name: &str, kind: DatasetKind) -> Result<Layer> {
        let generation = match self.shared.registry.borrow().get(name) {
            Some(entry) if entry.kind == kind => entry.generation,
            _ => return Err(Error::not_found(name)),
        };
        Ok(Layer::new(self.clone(), name.to_string(), kind, generation))
    }

    /// Registered names, in load order.
    pub fn contents(&self) -> Vec<String> {
        self.shared
            .registry
            .borrow()
            .names()
            .map(String::from)
            .collect()
    }

    pub fn layers(&self) -> Vec<String> {
        self.names_of(DatasetKind::Layer)
    }

    pub fn tables(&self) -> Vec<String> {
        self.names_of(DatasetKind::Table)
    }

    fn names_of(&self, kind: DatasetKind) -> Vec<String> {
        self.shared
            .registry
            .borrow()
            .names_of(kind)
            .map(String::from)
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.shared.registry.borrow().contains(name)
    }

    /// Deletes `name` from the engine and the registry.
    ///
    /// Handles to `name` fail with a dangling handle error afterwards.
    pub fn remove(&self, name: &str) -> Result<()> {
        if !self.contains(name) {
            return Err(Error::not_found(name));
        }

        let op = operation::Delete {
            dataset: name.to_string(),
        };
        self.exec(op.into())
            .map_err(|err| err.context(memspace_core::err!("failed to remove `{}`", name)))?;

        self.shared.registry.borrow_mut().remove(name);
        info!(%name, "dataset removed");
        Ok(())
    }

    /// Joins every registered table other than `layer` into `layer`.
    ///
    /// Tables are matched with `key_field` on `layer` and `to_field` on the
    /// table (`key_field` when `None`). A failed join is logged and recorded
    /// in the report; the remaining tables are still joined.
    pub fn join_all(
        &self,
        layer: &mut Layer,
        key_field: &str,
        to_field: Option<&str>,
    ) -> Result<JoinAllReport> {
        if !layer.workspace().same(self) {
            return Err(Error::invalid_argument(format!(
                "`{}` belongs to a different workspace",
                layer.name()
            )));
        }
        layer.ensure_registered()?;

        let to_field = to_field.unwrap_or(key_field);
        let tables: Vec<String> = self
            .tables()
            .into_iter()
            .filter(|table| table != layer.name())
            .collect();

        let mut report = JoinAllReport::default();
        for table in tables {
            match layer.join_dataset(&table, key_field, to_field) {
                Ok(()) => report.joined.push(table),
                Err(err) => {
                    warn!(layer = %layer.name(), %table, error = %err, "join failed; skipping");
                    report.failed.push((table, err));
                }
            }
        }

        Ok(report)
    }

    pub(crate) fn same(&self, other: &Workspace) -> bool {
        Rc::ptr_eq(&self.shared, &other.shared)
    }

    pub(crate) fn exec(&self, op: Operation) -> Result<Response> {
        debug!(op = op.name(), "engine exec");
        self.engine().exec(op)
    }

    pub(crate) fn engine(&self) -> RefMut<'_, Box<dyn Engine>> {
        self.shared.engine.borrow_mut()
    }

    pub(crate) fn supports(&self, f: impl FnOnce(&Capability) -> bool) -> bool {
        f(self.shared.engine.borrow().capability())
    }

    pub(crate) fn is_current(&self, name: &str, generation: u64, kind: DatasetKind) -> bool {
        self.shared
            .registry
            .borrow()
            .is_current(name, generation, kind)
    }

    pub(crate) fn selection_state(&self, name: &str) -> Option<SelectionState> {
        self.shared
            .registry
            .borrow()
            .get(name)
            .and_then(|entry| entry.selection.clone())
    }

    pub(crate) fn set_selection_state(&self, name: &str, state: SelectionState) {
        if let Some(entry) = self.shared.registry.borrow_mut().get_mut(name) {
            entry.selection = Some(state);
        }
    }
}

impl fmt::Debug for Workspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workspace")
            .field("path", &self.shared.config.path)
            .field("datasets", &self.contents())
            .finish()
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        let engine = self.engine.get_mut();

        for name in self.registry.get_mut().names() {
            let op = operation::Delete {
                dataset: name.to_string(),
            };

            if let Err(err) = engine.exec(op.into()) {
                warn!(%name, error = %err, "failed to delete dataset on shutdown");
            }
        }
    }
}

impl LoadOptions {
    pub fn new() -> LoadOptions {
        LoadOptions::default()
    }

    /// Use `name` instead of the base name of the path. The workspace
    /// prefix is still applied.
    pub fn rename(mut self, name: impl Into<String>) -> LoadOptions {
        self.rename = Some(name.into());
        self
    }

    /// Copy only these fields into the workspace.
    pub fn limit_fields<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> LoadOptions {
        self.limit_fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }
}

impl JoinAllReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}
