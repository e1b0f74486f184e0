use crate::{CollisionPolicy, DatasetKind, Error, Result, SelectionState};

use indexmap::IndexMap;

/// Datasets the workspace has loaded, in load order.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    entries: IndexMap<String, Entry>,

    /// Generation handed to the next registered dataset.
    next_generation: u64,
}

#[derive(Debug, Clone)]
pub(crate) struct Entry {
    pub(crate) kind: DatasetKind,

    /// Distinguishes this registration from earlier ones under the same name.
    pub(crate) generation: u64,

    /// Last selection state the engine reported for the dataset.
    pub(crate) selection: Option<SelectionState>,
}

impl Registry {
    pub(crate) fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub(crate) fn get(&self, name: &str) -> Option<&Entry> {
        self.entries.get(name)
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut Entry> {
        self.entries.get_mut(name)
    }

    pub(crate) fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub(crate) fn names_of(&self, kind: DatasetKind) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(move |(_, entry)| entry.kind == kind)
            .map(|(name, _)| name.as_str())
    }

    /// Picks the name `name` registers under without registering it.
    pub(crate) fn resolve(&self, name: &str, policy: CollisionPolicy) -> Result<String> {
        if !self.contains(name) {
            return Ok(name.to_string());
        }

        match policy {
            CollisionPolicy::Reject => Err(Error::name_collision(name)),
            CollisionPolicy::Suffix => {
                let mut n = 1;
                loop {
                    let candidate = format!("{}_{}", name, n);
                    if !self.contains(&candidate) {
                        return Ok(candidate);
                    }
                    n += 1;
                }
            }
        }
    }

    /// Registers `name` and returns its generation.
    pub(crate) fn insert(&mut self, name: String, kind: DatasetKind) -> u64 {
        debug_assert!(!self.contains(&name), "`{}` registered twice", name);

        let generation = self.next_generation;
        self.next_generation += 1;

        self.entries.insert(
            name,
            Entry {
                kind,
                generation,
                selection: None,
            },
        );
        generation
    }

    /// Whether `name` is registered as the same dataset a handle was
    /// created for.
    pub(crate) fn is_current(&self, name: &str, generation: u64, kind: DatasetKind) -> bool {
        matches!(
            self.get(name),
            Some(entry) if entry.generation == generation && entry.kind == kind
        )
    }

    pub(crate) fn remove(&mut self, name: &str) -> Option<Entry> {
        self.entries.shift_remove(name)
    }
}

/// Base name of the dataset at `path`.
///
/// The last path component is taken. A qualified name such as
/// `db.owner.Parcels` keeps its last segment; otherwise everything from the
/// first `.` on is an extension and is dropped. Spaces become underscores.
pub(crate) fn base_name(path: &str) -> Result<String> {
    let trimmed = path.trim_end_matches(['/', '\\']);
    let file = trimmed.rsplit(['/', '\\']).next().unwrap_or(trimmed);

    let stem = if file.matches('.').count() > 1 {
        file.rsplit('.').next()
    } else {
        file.split('.').next()
    }
    .unwrap_or(file);

    if stem.trim().is_empty() {
        return Err(Error::invalid_argument(format!(
            "cannot derive a dataset name from `{}`",
            path
        )));
    }

    Ok(stem.trim().replace(' ', "_"))
}
