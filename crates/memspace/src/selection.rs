use crate::{
    engine::{operation, Operation, Response},
    Error, Layer, Result, SelectionMode, SelectionState, SpatialRelation,
};

use tracing::debug;

/// Selection facet of a [`Layer`].
///
/// Selections are evaluated and held by the engine. The workspace keeps the
/// last state the engine reported for each dataset so exports can honor it,
/// which means every handle to the same dataset sees the same selection.
#[derive(Debug)]
pub struct Selection<'a> {
    layer: &'a Layer,
}

impl<'a> Selection<'a> {
    pub(crate) fn new(layer: &'a Layer) -> Selection<'a> {
        Selection { layer }
    }

    /// Replaces the selection with the rows matching `expression`.
    pub fn where_clause(&self, expression: &str) -> Result<SelectionState> {
        self.where_clause_with(expression, SelectionMode::New)
    }

    pub fn where_clause_with(
        &self,
        expression: &str,
        mode: SelectionMode,
    ) -> Result<SelectionState> {
        let op = operation::SelectByAttribute {
            dataset: self.layer.name().to_string(),
            expression: expression.to_string(),
            mode,
        };

        self.apply(op.into())
    }

    /// Replaces the selection with the features intersecting `other`.
    ///
    /// When `other` has an active selection, only its selected features
    /// take part.
    pub fn intersect(&self, other: &Layer) -> Result<SelectionState> {
        self.by_location(other, SpatialRelation::Intersect, SelectionMode::New)
    }

    pub fn by_location(
        &self,
        other: &Layer,
        relation: SpatialRelation,
        mode: SelectionMode,
    ) -> Result<SelectionState> {
        let workspace = self.layer.workspace();

        if !workspace.same(other.workspace()) {
            return Err(Error::invalid_argument(format!(
                "`{}` belongs to a different workspace",
                other.name()
            )));
        }
        other.ensure_registered()?;

        if !workspace.supports(|capability| capability.supports_relation(relation)) {
            return Err(Error::invalid_argument(format!(
                "the engine does not support spatial relation {}",
                relation.as_str()
            )));
        }

        let op = operation::SelectByLocation {
            dataset: self.layer.name().to_string(),
            other: other.name().to_string(),
            relation,
            mode,
        };

        self.apply(op.into())
    }

    /// Drops the selection so every row takes part again.
    pub fn clear(&self) -> Result<()> {
        let op = operation::ClearSelection {
            dataset: self.layer.name().to_string(),
        };

        self.apply(op.into()).map(|_| ())
    }

    /// Last selection state reported by the engine, if any selection call
    /// was made on the dataset.
    pub fn state(&self) -> Option<SelectionState> {
        if !self.layer.is_registered() {
            return None;
        }
        self.layer.workspace().selection_state(self.layer.name())
    }

    /// Number of selected rows; zero when no selection is active.
    pub fn count(&self) -> u64 {
        match self.state() {
            Some(state) if state.active => state.count(),
            _ => 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state().map(|state| state.active).unwrap_or(false)
    }

    fn apply(&self, op: Operation) -> Result<SelectionState> {
        self.layer.ensure_registered()?;

        let name = self.layer.name();
        let workspace = self.layer.workspace();

        let state = workspace
            .exec(op)
            .and_then(Response::into_selection)
            .map_err(|err| err.context(memspace_core::err!("selection on `{}` failed", name)))?;

        debug!(dataset = %name, active = state.active, selected = state.count(), "selection updated");
        workspace.set_selection_state(name, state.clone());
        Ok(state)
    }
}
