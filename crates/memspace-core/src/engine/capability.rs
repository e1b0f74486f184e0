use crate::selection::SpatialRelation;

#[derive(Debug)]
pub struct Capability {
    /// Spatial predicates the engine can evaluate in a select-by-location.
    pub spatial_relations: &'static [SpatialRelation],

    /// The engine can attach the fields of another dataset to a dataset by
    /// key match.
    pub join: bool,

    /// The engine can remove the fields a previous join attached.
    pub remove_join: bool,
}

impl Capability {
    /// Capabilities of the reference in-memory engine.
    pub const IN_MEMORY: Self = Self {
        spatial_relations: &[SpatialRelation::Intersect],
        join: true,
        remove_join: true,
    };

    /// An engine that only stores and exports tables.
    pub const TABULAR: Self = Self {
        spatial_relations: &[],
        join: false,
        remove_join: false,
    };

    pub fn supports_relation(&self, relation: SpatialRelation) -> bool {
        self.spatial_relations.contains(&relation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tabular_has_no_spatial_support() {
        assert!(!Capability::TABULAR.supports_relation(SpatialRelation::Intersect));
        assert!(Capability::IN_MEMORY.supports_relation(SpatialRelation::Intersect));
        assert!(!Capability::IN_MEMORY.supports_relation(SpatialRelation::Within));
    }
}
