use super::Error;

/// Error when a reorder index does not address a field.
#[derive(Debug)]
pub(super) struct IndexOutOfRangeError {
    index: usize,
    len: usize,
}

impl std::error::Error for IndexOutOfRangeError {}

impl core::fmt::Display for IndexOutOfRangeError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "index {} is out of range for {} fields",
            self.index, self.len
        )
    }
}

impl Error {
    /// Creates an index out of range error.
    pub fn index_out_of_range(index: usize, len: usize) -> Error {
        Error::from(super::ErrorKind::IndexOutOfRange(IndexOutOfRangeError {
            index,
            len,
        }))
    }

    /// Returns `true` if this error is an index out of range error.
    pub fn is_index_out_of_range(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::IndexOutOfRange(_))
    }
}
