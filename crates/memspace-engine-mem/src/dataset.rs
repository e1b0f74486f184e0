use memspace_core::{
    schema::{DatasetKind, FieldInfo, FieldType},
    selection::SelectionState,
};

use std::fmt;

/// A table or feature layer held by [`MemEngine`](crate::MemEngine).
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    kind: DatasetKind,
    pub(crate) columns: Vec<Column>,
    pub(crate) rows: Vec<Row>,
    pub(crate) selection: SelectionState,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub ty: FieldType,

    /// Alias of the table the column belongs to.
    pub alias: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Object id, 1-based.
    pub oid: u64,
    pub values: Vec<Value>,

    /// Feature extent; `None` for table rows.
    pub envelope: Option<Envelope>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
}

/// Axis-aligned bounding box of a feature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Dataset {
    /// A feature layer with the given columns and no rows.
    pub fn layer<N: Into<String>>(columns: impl IntoIterator<Item = (N, FieldType)>) -> Dataset {
        Dataset::new(DatasetKind::Layer, columns)
    }

    /// A table with the given columns and no rows.
    pub fn table<N: Into<String>>(columns: impl IntoIterator<Item = (N, FieldType)>) -> Dataset {
        Dataset::new(DatasetKind::Table, columns)
    }

    fn new<N: Into<String>>(
        kind: DatasetKind,
        columns: impl IntoIterator<Item = (N, FieldType)>,
    ) -> Dataset {
        Dataset {
            kind,
            columns: columns
                .into_iter()
                .map(|(name, ty)| Column {
                    name: name.into(),
                    ty,
                    alias: String::new(),
                })
                .collect(),
            rows: vec![],
            selection: SelectionState::cleared(0),
        }
    }

    pub(crate) fn from_parts(kind: DatasetKind, columns: Vec<Column>, rows: Vec<Row>) -> Dataset {
        let total = rows.len() as u64;
        Dataset {
            kind,
            columns,
            rows,
            selection: SelectionState::cleared(total),
        }
    }

    /// Appends a table row.
    ///
    /// # Panics
    ///
    /// Panics if the number of values does not match the number of columns.
    pub fn with_row(mut self, values: impl IntoIterator<Item = Value>) -> Dataset {
        self.push(values.into_iter().collect(), None);
        self
    }

    /// Appends a feature with the given extent.
    ///
    /// # Panics
    ///
    /// Panics if the number of values does not match the number of columns.
    pub fn with_feature(
        mut self,
        envelope: Envelope,
        values: impl IntoIterator<Item = Value>,
    ) -> Dataset {
        self.push(values.into_iter().collect(), Some(envelope));
        self
    }

    fn push(&mut self, values: Vec<Value>, envelope: Option<Envelope>) {
        assert_eq!(
            values.len(),
            self.columns.len(),
            "row has {} values for {} columns",
            values.len(),
            self.columns.len()
        );

        let oid = self.rows.len() as u64 + 1;
        self.rows.push(Row {
            oid,
            values,
            envelope,
        });
        self.selection.total = self.rows.len() as u64;
    }

    pub fn kind(&self) -> DatasetKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.columns.iter().map(|column| column.name.as_str()).collect()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.name == name)
    }

    /// Values of one column, in row order.
    pub fn column_values(&self, name: &str) -> Option<Vec<&Value>> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().map(|row| &row.values[index]).collect())
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub(crate) fn field_infos(&self) -> Vec<FieldInfo> {
        self.columns
            .iter()
            .map(|column| FieldInfo::new(&column.name, column.ty.clone(), &column.alias))
            .collect()
    }

    /// Makes every column belong to the table aliased `alias`.
    pub(crate) fn set_alias(&mut self, alias: &str) {
        for column in &mut self.columns {
            column.alias = alias.to_string();
        }
    }

    pub(crate) fn into_kind(mut self, kind: DatasetKind) -> Dataset {
        if kind.is_table() {
            for row in &mut self.rows {
                row.envelope = None;
            }
        }
        self.kind = kind;
        self
    }

    /// Features whose extent is in use by a spatial query: the selected ones
    /// when a selection is active, otherwise all of them.
    pub(crate) fn active_envelopes(&self) -> impl Iterator<Item = &Envelope> {
        self.rows
            .iter()
            .filter(|row| !self.selection.active || self.selection.contains(row.oid))
            .filter_map(|row| row.envelope.as_ref())
    }
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub(crate) fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(v) => write!(f, "'{}'", v),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

impl Envelope {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Envelope {
        Envelope {
            min_x: min_x.min(max_x),
            min_y: min_y.min(max_y),
            max_x: min_x.max(max_x),
            max_y: min_y.max(max_y),
        }
    }

    /// A degenerate envelope covering one point.
    pub fn point(x: f64, y: f64) -> Envelope {
        Envelope::new(x, y, x, y)
    }

    /// Touching edges count as intersecting.
    pub fn intersects(&self, other: &Envelope) -> bool {
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }
}
