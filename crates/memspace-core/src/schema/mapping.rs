use super::{Field, FieldInfo};
use crate::{
    engine::{
        operation::{self, OutputField},
        Engine, ExportSummary,
    },
    selection::SelectionState,
    Error, Result,
};

use indexmap::IndexSet;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::debug;

/// The ordered output schema of a dataset.
///
/// A mapping is built from the engine's field listing and then edited in
/// place: fields are reordered, dropped and renamed. None of the edits touch
/// the source dataset. They are staged on the mapping and only take effect
/// when [`FieldMapping::export`] hands the whole schema to the engine, so an
/// export always sees one consistent snapshot no matter how many edits came
/// before it.
///
/// Order is semantic: it is the column order of the exported dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
    /// Dataset the fields are read from.
    source: String,

    /// Fields in current order.
    fields: Vec<Field>,

    /// Number of fields ever listed; the next original index to hand out.
    listed: usize,
}

impl FieldMapping {
    /// Lists the fields of `source` through the engine and builds a mapping
    /// in the order the engine returns them.
    pub fn load(engine: &mut dyn Engine, source: &str) -> Result<FieldMapping> {
        let infos = list_fields(engine, source)?;
        Ok(FieldMapping::from_fields(source, infos))
    }

    /// Builds a mapping from a field listing that was already fetched.
    pub fn from_fields(
        source: impl Into<String>,
        infos: impl IntoIterator<Item = FieldInfo>,
    ) -> FieldMapping {
        let fields: Vec<_> = infos
            .into_iter()
            .enumerate()
            .map(|(index, info)| Field::from_info(info, index))
            .collect();

        FieldMapping {
            source: source.into(),
            listed: fields.len(),
            fields,
        }
    }

    /// Name of the dataset the mapping reads from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields in current order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Returns the field currently displayed as `name`.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Current position of the field displayed as `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name == name)
    }

    /// Display names in current order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|field| field.name.as_str()).collect()
    }

    /// `(current index, display name)` pairs in current order.
    pub fn current_order(&self) -> Vec<(usize, &str)> {
        self.fields
            .iter()
            .map(|field| (field.current_index, field.name.as_str()))
            .collect()
    }

    /// Reorders the mapping so it starts with the fields at `new_order`,
    /// which index into the current order.
    ///
    /// With `allow_drop`, fields not named in `new_order` are removed from
    /// the mapping for good. Without it, they are kept and placed after the
    /// named fields in the order they had before.
    ///
    /// Fails without changing the mapping when an index is out of range or
    /// appears more than once.
    pub fn reorder(&mut self, new_order: &[usize], allow_drop: bool) -> Result<()> {
        let len = self.fields.len();
        let mut seen = vec![false; len];

        for &index in new_order {
            if index >= len {
                return Err(Error::index_out_of_range(index, len));
            }

            if std::mem::replace(&mut seen[index], true) {
                return Err(Error::invalid_reorder(format!(
                    "index {} appears more than once",
                    index
                )));
            }
        }

        let mut slots: Vec<Option<Field>> = self.fields.drain(..).map(Some).collect();
        let mut reordered = Vec::with_capacity(len);

        for &index in new_order {
            reordered.extend(slots[index].take());
        }

        let rest = slots.into_iter().flatten();
        if allow_drop {
            for field in rest {
                debug!(source = %self.source, field = %field.name, "dropping field");
            }
        } else {
            reordered.extend(rest);
        }

        self.fields = reordered;
        self.renumber();
        Ok(())
    }

    /// Renames the field displayed as `old_name`.
    pub fn rename_field(&mut self, old_name: &str, new_name: &str) -> Result<()> {
        let Some(position) = self.position(old_name) else {
            return Err(Error::field_not_found(old_name));
        };

        if new_name.trim().is_empty() {
            return Err(Error::invalid_argument("field name must not be empty"));
        }

        if old_name == new_name {
            return Ok(());
        }

        if self.position(new_name).is_some() {
            return Err(Error::duplicate_name(new_name));
        }

        self.fields[position].name = new_name.to_string();
        Ok(())
    }

    /// Strips everything up to and including the last `delimiter` from each
    /// display name that contains it.
    ///
    /// Joined fields come back from the engine qualified with the joined
    /// table (`mem_tracts$.GEOID10`); splitting on `.` gives them back their
    /// bare names. The whole rename is rejected if it would make two names
    /// equal or leave a name empty.
    pub fn rename_by_split(&mut self, delimiter: &str) -> Result<()> {
        if delimiter.is_empty() {
            return Err(Error::invalid_argument("delimiter must not be empty"));
        }

        let renamed: Vec<&str> = self
            .fields
            .iter()
            .map(|field| match field.name.rfind(delimiter) {
                Some(at) => &field.name[at + delimiter.len()..],
                None => field.name.as_str(),
            })
            .collect();

        if let Some(field) = self
            .fields
            .iter()
            .zip(&renamed)
            .find_map(|(field, name)| name.trim().is_empty().then_some(field))
        {
            return Err(Error::invalid_argument(format!(
                "splitting `{}` on `{}` leaves an empty name",
                field.name, delimiter
            )));
        }

        // Only collisions this call introduces are errors.
        let before = name_counts(self.fields.iter().map(|field| field.name.as_str()));
        let after = name_counts(renamed.iter().copied());
        for name in &renamed {
            if after[name] > before.get(name).copied().unwrap_or(0).max(1) {
                return Err(Error::duplicate_name(*name));
            }
        }

        let renamed: Vec<String> = renamed.into_iter().map(String::from).collect();
        for (field, name) in self.fields.iter_mut().zip(renamed) {
            field.name = name;
        }

        Ok(())
    }

    /// Removes the named fields.
    pub fn drop_fields<S: AsRef<str>>(&mut self, names: &[S]) -> Result<()> {
        let drop = self.resolve_names(names)?;
        self.fields.retain(|field| !drop.contains(field.name.as_str()));
        self.renumber();
        Ok(())
    }

    /// Removes every field except the named ones, keeping current order.
    pub fn keep_only<S: AsRef<str>>(&mut self, names: &[S]) -> Result<()> {
        let keep = self.resolve_names(names)?;
        self.fields.retain(|field| keep.contains(field.name.as_str()));
        self.renumber();
        Ok(())
    }

    /// Aliases of the tables joined into the source, in order of first
    /// appearance.
    pub fn joins(&self) -> IndexSet<&str> {
        self.fields
            .iter()
            .map(Field::source_alias)
            .filter(|alias| *alias != self.source)
            .collect()
    }

    /// Fields that come from the table aliased `alias`.
    pub fn fields_from<'a>(&'a self, alias: &'a str) -> impl Iterator<Item = &'a Field> + 'a {
        self.fields
            .iter()
            .filter(move |field| field.source_alias() == alias)
    }

    /// Drops fields whose source column is no longer in `listing`.
    ///
    /// Returns the display names of the dropped fields.
    pub fn retain_listed(&mut self, listing: &[FieldInfo]) -> Vec<String> {
        let present: HashSet<&str> = listing.iter().map(|info| info.name.as_str()).collect();
        let mut dropped = vec![];

        self.fields.retain(|field| {
            let keep = present.contains(field.source_name.as_str());
            if !keep {
                dropped.push(field.name.clone());
            }
            keep
        });

        self.renumber();
        dropped
    }

    /// Appends fields from `listing` that the mapping has never seen.
    ///
    /// Fields the caller dropped earlier are not brought back. Returns the
    /// number of fields appended.
    pub fn extend_listed(&mut self, listing: impl IntoIterator<Item = FieldInfo>) -> usize {
        let known: HashSet<String> = self
            .fields
            .iter()
            .map(|field| field.source_name.clone())
            .collect();

        let mut appended = 0;
        for info in listing {
            if known.contains(&info.name) {
                continue;
            }

            // A display name may already be taken by a rename; the export
            // check reports it if the caller does not resolve it first.
            let field = Field::from_info(info, self.listed);
            self.listed += 1;
            self.fields.push(field);
            appended += 1;
        }

        self.renumber();
        appended
    }

    /// Returns an error naming the first display name used twice.
    pub fn check_unique_names(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.fields.len());
        for field in &self.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(Error::duplicate_name(&field.name));
            }
        }
        Ok(())
    }

    /// The staged output schema: source column to output name, in order.
    pub fn output_fields(&self) -> Vec<OutputField> {
        self.fields
            .iter()
            .map(|field| OutputField {
                source_name: field.source_name.clone(),
                name: field.name.clone(),
            })
            .collect()
    }

    /// Writes `output_location/output_name` through the engine with the
    /// fields of this mapping in current order.
    ///
    /// When `selection` is given and active, only the selected rows are
    /// written; otherwise every row is.
    pub fn export(
        &self,
        engine: &mut dyn Engine,
        output_name: &str,
        output_location: &str,
        selection: Option<&SelectionState>,
    ) -> Result<ExportSummary> {
        let path = operation::output_path(output_location, output_name);

        if self.fields.is_empty() {
            return Err(
                Error::invalid_argument("field mapping has no fields").context(Error::export(path))
            );
        }

        self.check_unique_names()?;

        let selection: Option<BTreeSet<u64>> = selection
            .filter(|state| state.active)
            .map(|state| state.ids.clone());

        debug!(
            source = %self.source,
            output = %path,
            fields = self.fields.len(),
            selected = ?selection.as_ref().map(BTreeSet::len),
            "exporting"
        );

        let op = operation::Export {
            source: self.source.clone(),
            location: output_location.to_string(),
            name: output_name.to_string(),
            fields: self.output_fields(),
            selection,
        };

        engine
            .exec(op.into())
            .and_then(|response| response.into_exported())
            .map_err(|err| err.context(Error::export(path)))
    }

    fn resolve_names<'a, S: AsRef<str>>(&self, names: &'a [S]) -> Result<HashSet<&'a str>> {
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                match self.position(name) {
                    Some(_) => Ok(name),
                    None => Err(Error::field_not_found(name)),
                }
            })
            .collect()
    }

    fn renumber(&mut self) {
        for (index, field) in self.fields.iter_mut().enumerate() {
            field.current_index = index;
        }
    }
}

/// Lists the fields of `source`, reporting any engine failure as an
/// unreachable source.
pub fn list_fields(engine: &mut dyn Engine, source: &str) -> Result<Vec<FieldInfo>> {
    debug!(%source, "listing fields");

    let op = operation::ListFields {
        source: source.to_string(),
    };

    engine
        .exec(op.into())
        .and_then(|response| response.into_fields())
        .map_err(|err| err.context(Error::source_not_found(source)))
}

fn name_counts<'a>(names: impl Iterator<Item = &'a str>) -> HashMap<&'a str, usize> {
    let mut counts = HashMap::new();
    for name in names {
        *counts.entry(name).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldType;
    use pretty_assertions::assert_eq;
    use std_util::prelude::*;

    fn mapping(names: &[&str]) -> FieldMapping {
        FieldMapping::from_fields(
            "mem_tracts",
            names
                .iter()
                .map(|name| FieldInfo::new(*name, FieldType::Text, "mem_tracts")),
        )
    }

    #[test]
    fn reorder_with_drop() {
        let mut m = mapping(&["GEOID10", "Name", "EstTotPop16"]);
        assert_ok!(m.reorder(&[2, 0], true));

        assert_eq!(m.current_order(), vec![(0, "EstTotPop16"), (1, "GEOID10")]);
        assert_eq!(m.fields()[0].original_index(), 2);
    }

    #[test]
    fn reorder_without_drop_appends_omitted() {
        let mut m = mapping(&["A", "B", "C", "D"]);
        assert_ok!(m.reorder(&[3, 1], false));

        assert_eq!(m.field_names(), vec!["D", "B", "A", "C"]);
    }

    #[test]
    fn reorder_indexes_current_order() {
        let mut m = mapping(&["A", "B", "C"]);
        assert_ok!(m.reorder(&[2, 1, 0], true));
        assert_ok!(m.reorder(&[0], true));

        assert_eq!(m.field_names(), vec!["C"]);
    }

    #[test]
    fn reorder_out_of_range_is_atomic() {
        let mut m = mapping(&["A", "B", "C"]);
        let before = m.clone();

        let err = assert_err!(m.reorder(&[0, 3], true));
        assert!(err.is_index_out_of_range());
        assert_eq!(err.to_string(), "index 3 is out of range for 3 fields");
        assert_eq!(m, before);
    }

    #[test]
    fn reorder_repeated_index() {
        let mut m = mapping(&["A", "B"]);
        let before = m.clone();

        let err = assert_err!(m.reorder(&[1, 1], false));
        assert!(err.is_invalid_reorder());
        assert_eq!(m, before);
    }

    #[test]
    fn reorder_to_nothing() {
        let mut m = mapping(&["A", "B"]);
        assert_ok!(m.reorder(&[], true));
        assert!(m.is_empty());
    }

    #[test]
    fn rename_field() {
        let mut m = mapping(&["GEOID10", "Name", "EstTotPop16"]);
        assert_ok!(m.rename_field("Name", "NhoodName"));

        assert_eq!(m.field_names(), vec!["GEOID10", "NhoodName", "EstTotPop16"]);

        let field = assert_some!(m.field("NhoodName"));
        assert_eq!(field.source_name, "Name");
        assert!(field.is_renamed());
    }

    #[test]
    fn rename_and_back() {
        let mut m = mapping(&["GEOID10", "Name"]);
        let before: Vec<String> = m.field_names().into_iter().map(String::from).collect();

        assert_ok!(m.rename_field("Name", "NhoodName"));
        assert_ok!(m.rename_field("NhoodName", "Name"));

        assert_eq!(m.field_names(), before);
        assert!(!m.fields()[1].is_renamed());
    }

    #[test]
    fn rename_missing_field() {
        let mut m = mapping(&["A"]);
        let err = assert_err!(m.rename_field("B", "C"));
        assert!(err.is_field_not_found());
    }

    #[test]
    fn rename_to_existing_name() {
        let mut m = mapping(&["A", "B"]);
        let err = assert_err!(m.rename_field("A", "B"));
        assert!(err.is_duplicate_name());
        assert_eq!(m.field_names(), vec!["A", "B"]);
    }

    #[test]
    fn rename_to_same_name() {
        let mut m = mapping(&["A", "B"]);
        assert_ok!(m.rename_field("A", "A"));
    }

    #[test]
    fn rename_by_split() {
        let mut m = mapping(&["OBJECTID", "mem_tracts$.GEOID10", "db.owner.Pop"]);
        assert_ok!(m.rename_by_split("."));

        assert_eq!(m.field_names(), vec!["OBJECTID", "GEOID10", "Pop"]);

        // Idempotent.
        assert_ok!(m.rename_by_split("."));
        assert_eq!(m.field_names(), vec!["OBJECTID", "GEOID10", "Pop"]);
    }

    #[test]
    fn rename_by_split_collision_is_atomic() {
        let mut m = mapping(&["GEOID10", "mem_tracts$.GEOID10", "a.Name"]);
        let before = m.clone();

        let err = assert_err!(m.rename_by_split("."));
        assert!(err.is_duplicate_name());
        assert_eq!(err.to_string(), "duplicate field name: `GEOID10`");
        assert_eq!(m, before);
    }

    #[test]
    fn rename_by_split_multi_char_delimiter() {
        let mut m = mapping(&["a__b__c", "plain"]);
        assert_ok!(m.rename_by_split("__"));
        assert_eq!(m.field_names(), vec!["c", "plain"]);
    }

    #[test]
    fn rename_to_empty_name() {
        let mut m = mapping(&["A", "B"]);
        let before = m.clone();

        for name in ["", "  "] {
            let err = assert_err!(m.rename_field("A", name));
            assert!(err.is_invalid_argument());
        }
        assert_eq!(m, before);
    }

    #[test]
    fn rename_by_split_empty_result_is_atomic() {
        let mut m = mapping(&["mem_x$.A", "Shape."]);
        let before = m.clone();

        let err = assert_err!(m.rename_by_split("."));
        assert!(err.is_invalid_argument());
        assert_eq!(
            err.to_string(),
            "invalid argument: splitting `Shape.` on `.` leaves an empty name"
        );
        assert_eq!(m, before);
    }

    #[test]
    fn rename_by_split_empty_delimiter() {
        let mut m = mapping(&["a.b"]);
        let err = assert_err!(m.rename_by_split(""));
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn drop_and_keep() {
        let mut m = mapping(&["A", "B", "C", "D"]);
        assert_ok!(m.drop_fields(&["B"]));
        assert_eq!(m.current_order(), vec![(0, "A"), (1, "C"), (2, "D")]);

        assert_ok!(m.keep_only(&["D", "A"]));
        assert_eq!(m.field_names(), vec!["A", "D"]);

        let err = assert_err!(m.drop_fields(&["A", "Z"]));
        assert!(err.is_field_not_found());
        assert_eq!(m.field_names(), vec!["A", "D"]);
    }

    #[test]
    fn joins_and_retain() {
        let mut m = FieldMapping::from_fields(
            "mem_parcels",
            vec![
                FieldInfo::new("OBJECTID", FieldType::ObjectId, "mem_parcels"),
                FieldInfo::new("ParcelID", FieldType::Text, "mem_parcels"),
                FieldInfo::new("mem_owners$.Owner", FieldType::Text, "mem_owners"),
                FieldInfo::new("mem_zones$.Zone", FieldType::Text, "mem_zones"),
            ],
        );

        assert_eq!(
            m.joins().into_iter().collect::<Vec<_>>(),
            vec!["mem_owners", "mem_zones"]
        );
        assert_eq!(m.fields_from("mem_owners").count(), 1);

        let listing: Vec<FieldInfo> = m
            .fields()
            .iter()
            .filter(|field| field.source_alias() != "mem_owners")
            .map(|field| FieldInfo::new(&field.source_name, field.ty.clone(), field.source_alias()))
            .collect();

        let dropped = m.retain_listed(&listing);
        assert_eq!(dropped, vec!["mem_owners$.Owner".to_string()]);
        assert_eq!(m.current_order()[2], (2, "mem_zones$.Zone"));
    }

    #[test]
    fn extend_listed_skips_known_fields() {
        let mut m = mapping(&["A", "B"]);
        assert_ok!(m.rename_field("B", "Bee"));

        let listing = vec![
            FieldInfo::new("A", FieldType::Text, "mem_tracts"),
            FieldInfo::new("B", FieldType::Text, "mem_tracts"),
            FieldInfo::new("mem_x$.C", FieldType::Text, "mem_x"),
        ];

        assert_eq!(m.extend_listed(listing), 1);
        assert_eq!(m.current_order(), vec![(0, "A"), (1, "Bee"), (2, "mem_x$.C")]);
        assert_eq!(m.fields()[2].original_index(), 2);
        assert_unique!(m.fields().iter().map(|field| &field.id));
    }

    #[test]
    fn output_fields_follow_current_order() {
        let mut m = mapping(&["GEOID10", "Name", "EstTotPop16"]);
        assert_ok!(m.reorder(&[2, 0, 1], false));
        assert_ok!(m.rename_field("Name", "NhoodName"));

        assert_eq!(
            m.output_fields(),
            vec![
                OutputField {
                    source_name: "EstTotPop16".into(),
                    name: "EstTotPop16".into()
                },
                OutputField {
                    source_name: "GEOID10".into(),
                    name: "GEOID10".into()
                },
                OutputField {
                    source_name: "Name".into(),
                    name: "NhoodName".into()
                },
            ]
        );
    }
}
