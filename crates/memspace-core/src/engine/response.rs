use crate::{schema::FieldInfo, selection::SelectionState, Error, Result};

#[derive(Debug)]
pub enum Response {
    /// Ordered field listing of a dataset.
    Fields(Vec<FieldInfo>),

    /// Selection state after a selection operation.
    Selection(SelectionState),

    /// Result of a successful export.
    Exported(ExportSummary),

    /// The operation completed and has nothing to report.
    Done,
}

/// What an export wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    /// Full path of the output dataset.
    pub path: String,

    /// Output column names, in order.
    pub fields: Vec<String>,

    /// Number of rows written.
    pub rows: u64,
}

impl Response {
    pub fn is_fields(&self) -> bool {
        matches!(self, Self::Fields(_))
    }

    pub fn is_selection(&self) -> bool {
        matches!(self, Self::Selection(_))
    }

    pub fn into_fields(self) -> Result<Vec<FieldInfo>> {
        match self {
            Self::Fields(fields) => Ok(fields),
            other => Err(unexpected("Fields", &other)),
        }
    }

    pub fn into_selection(self) -> Result<SelectionState> {
        match self {
            Self::Selection(state) => Ok(state),
            other => Err(unexpected("Selection", &other)),
        }
    }

    pub fn into_exported(self) -> Result<ExportSummary> {
        match self {
            Self::Exported(summary) => Ok(summary),
            other => Err(unexpected("Exported", &other)),
        }
    }

    fn variant(&self) -> &'static str {
        match self {
            Self::Fields(_) => "Fields",
            Self::Selection(_) => "Selection",
            Self::Exported(_) => "Exported",
            Self::Done => "Done",
        }
    }
}

fn unexpected(expected: &str, actual: &Response) -> Error {
    Error::engine(format!(
        "unexpected engine response; expected {}, got {}",
        expected,
        actual.variant()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatched_response_is_engine_error() {
        let err = Response::Done.into_fields().unwrap_err();
        assert!(err.is_engine());
        assert_eq!(
            err.to_string(),
            "unexpected engine response; expected Fields, got Done"
        );
    }
}
