use pyo3::exceptions::{PyIndexError, PyTypeError, PyValueError};
use pyo3::PyErr;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LinsysError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinsysError {
    #[error("The coordinates must be nonempty")]
    EmptyInput,

    #[error("The coordinates must be an iterable")]
    NonIterableInput,

    /// Two vectors, or a plane and a system, live in different dimensions
    #[error("Dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("Cannot normalize the zero vector")]
    ZeroVectorNormalization,

    #[error("Cannot compute an angle with the zero vector")]
    ZeroVectorAngle,

    /// Every coefficient of the vector is within tolerance of zero
    #[error("No nonzero elements found")]
    DegenerateRow,

    #[error("Row index {index} out of range for a system of {len} equations")]
    RowOutOfRange { index: isize, len: usize },

    #[error("Invalid numeric literal: {0:?}")]
    InvalidLiteral(String),
}

impl From<LinsysError> for PyErr {
    fn from(error: LinsysError) -> PyErr {
        match error {
            LinsysError::NonIterableInput => PyTypeError::new_err(error.to_string()),
            LinsysError::RowOutOfRange { .. } => PyIndexError::new_err(error.to_string()),
            _ => PyValueError::new_err(error.to_string()),
        }
    }
}

// --------------------------------------------------
//                      TESTS
// --------------------------------------------------
