//! Errors raised by table and sequence operations

use thiserror::Error;

use crate::types::ColumnType;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("column `{0}` does not exist")]
    MissingColumn(String),

    #[error("column `{column}` holds {actual} values, expected {expected}")]
    TypeMismatch {
        column: String,
        expected: &'static str,
        actual: ColumnType,
    },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("expected a one-dimensional sequence, got {ndim} dimensions")]
    Shape { ndim: usize },

    #[error("column `{column}` has {len} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        len: usize,
        expected: usize,
    },

    #[error("duplicate column `{0}`")]
    DuplicateColumn(String),

    #[error("column `{column}` uses category code {code}, but only {categories} categories exist")]
    InvalidCategoryCode {
        column: String,
        code: usize,
        categories: usize,
    },
}

impl DataError {
    /// Stable label for the error kind, used in API responses.
    pub fn kind(&self) -> &'static str {
        match self {
            DataError::MissingColumn(_) => "missing_column",
            DataError::TypeMismatch { .. } => "type_mismatch",
            DataError::InvalidParameter(_) => "invalid_parameter",
            DataError::Shape { .. } => "shape",
            DataError::LengthMismatch { .. }
            | DataError::DuplicateColumn(_)
            | DataError::InvalidCategoryCode { .. } => "invalid_table",
        }
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        DataError::InvalidParameter(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
