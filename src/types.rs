//! Table data types

use std::collections::HashSet;
use std::fmt;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::{DataError, Result};

/// Logical type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Text,
    Integer,
    Float,
    Categorical,
}

impl ColumnType {
    /// Text and categorical columns both carry string labels.
    pub fn is_textual(self) -> bool {
        matches!(self, ColumnType::Text | ColumnType::Categorical)
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Float)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ColumnType::Text => "text",
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Categorical => "categorical",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Values of a single column. `None` marks a missing cell; a `NaN` float is
/// treated as missing as well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ColumnData {
    Text {
        values: Vec<Option<String>>,
    },
    Integer {
        values: Vec<Option<i64>>,
    },
    Float {
        values: Vec<Option<f64>>,
    },
    Categorical {
        categories: Vec<String>,
        codes: Vec<Option<usize>>,
    },
}

impl ColumnData {
    pub fn column_type(&self) -> ColumnType {
        match self {
            ColumnData::Text { .. } => ColumnType::Text,
            ColumnData::Integer { .. } => ColumnType::Integer,
            ColumnData::Float { .. } => ColumnType::Float,
            ColumnData::Categorical { .. } => ColumnType::Categorical,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnData::Text { values } => values.len(),
            ColumnData::Integer { values } => values.len(),
            ColumnData::Float { values } => values.len(),
            ColumnData::Categorical { codes, .. } => codes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_missing(&self, row: usize) -> bool {
        match self {
            ColumnData::Text { values } => values[row].is_none(),
            ColumnData::Integer { values } => values[row].is_none(),
            ColumnData::Float { values } => values[row].map_or(true, f64::is_nan),
            ColumnData::Categorical { codes, .. } => codes[row].is_none(),
        }
    }

    /// Value at `row` as `f64`, or `None` for missing cells and non-numeric columns.
    pub fn numeric_value(&self, row: usize) -> Option<f64> {
        match self {
            ColumnData::Integer { values } => values[row].map(|v| v as f64),
            ColumnData::Float { values } => values[row].filter(|v| !v.is_nan()),
            _ => None,
        }
    }

    /// Label at `row` for text and categorical columns.
    pub fn text_value(&self, row: usize) -> Option<&str> {
        match self {
            ColumnData::Text { values } => values[row].as_deref(),
            ColumnData::Categorical { categories, codes } => {
                codes[row].map(|code| categories[code].as_str())
            }
            _ => None,
        }
    }

    /// Rows at `positions`, in that order. Categories are kept as-is.
    pub fn take(&self, positions: &[usize]) -> ColumnData {
        fn pick<T: Clone>(values: &[T], positions: &[usize]) -> Vec<T> {
            positions.iter().map(|&p| values[p].clone()).collect()
        }

        match self {
            ColumnData::Text { values } => ColumnData::Text {
                values: pick(values, positions),
            },
            ColumnData::Integer { values } => ColumnData::Integer {
                values: pick(values, positions),
            },
            ColumnData::Float { values } => ColumnData::Float {
                values: pick(values, positions),
            },
            ColumnData::Categorical { categories, codes } => ColumnData::Categorical {
                categories: categories.clone(),
                codes: pick(codes, positions),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(flatten)]
    pub data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn text<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        Self::new(
            name,
            ColumnData::Text {
                values: values.into_iter().map(|v| v.map(Into::into)).collect(),
            },
        )
    }

    pub fn integer(name: impl Into<String>, values: Vec<Option<i64>>) -> Self {
        Self::new(name, ColumnData::Integer { values })
    }

    pub fn float(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self::new(name, ColumnData::Float { values })
    }

    /// Categorical column; categories are registered in order of first appearance.
    pub fn categorical<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        let mut categories: Vec<String> = Vec::new();
        let codes = values
            .into_iter()
            .map(|v| {
                v.map(|label| {
                    let label = label.into();
                    match categories.iter().position(|c| *c == label) {
                        Some(code) => code,
                        None => {
                            categories.push(label);
                            categories.len() - 1
                        }
                    }
                })
            })
            .collect();

        Self::new(name, ColumnData::Categorical { categories, codes })
    }

    pub fn column_type(&self) -> ColumnType {
        self.data.column_type()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Values of a numeric column as a fully populated `f64` sequence.
    ///
    /// Fails on text columns and on any missing cell; drop those rows first.
    pub fn numeric_sequence(&self) -> Result<Array1<f64>> {
        let actual = self.column_type();
        if !actual.is_numeric() {
            return Err(DataError::TypeMismatch {
                column: self.name.clone(),
                expected: "numeric",
                actual,
            });
        }

        (0..self.len())
            .map(|row| {
                self.data.numeric_value(row).ok_or_else(|| {
                    DataError::invalid(format!(
                        "column `{}` has a missing value at position {row}",
                        self.name
                    ))
                })
            })
            .collect()
    }
}

/// Column-oriented table with a stable row index.
///
/// Every column has exactly `index.len()` rows and column names are unique.
/// Both constructors and deserialization enforce this, so operations can rely
/// on it without re-checking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TableInput")]
pub struct Table {
    index: Vec<usize>,
    columns: Vec<Column>,
}

/// Unvalidated table as it arrives over the wire; `index` defaults to `0..n`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableInput {
    #[serde(default)]
    pub index: Option<Vec<usize>>,
    pub columns: Vec<Column>,
}

impl TryFrom<TableInput> for Table {
    type Error = DataError;

    fn try_from(raw: TableInput) -> Result<Self> {
        match raw.index {
            Some(index) => Table::with_index(index, raw.columns),
            None => Table::new(raw.columns),
        }
    }
}

impl Table {
    /// Table labelled `0..n`, where `n` is the length of the first column.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let n_rows = columns.first().map_or(0, Column::len);
        Self::with_index((0..n_rows).collect(), columns)
    }

    pub fn with_index(index: Vec<usize>, columns: Vec<Column>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(DataError::DuplicateColumn(column.name.clone()));
            }
            if column.len() != index.len() {
                return Err(DataError::LengthMismatch {
                    column: column.name.clone(),
                    len: column.len(),
                    expected: index.len(),
                });
            }
            if let ColumnData::Categorical { categories, codes } = &column.data {
                if let Some(code) = codes.iter().flatten().find(|&&c| c >= categories.len()) {
                    return Err(DataError::InvalidCategoryCode {
                        column: column.name.clone(),
                        code: *code,
                        categories: categories.len(),
                    });
                }
            }
        }

        Ok(Self { index, columns })
    }

    pub fn n_rows(&self) -> usize {
        self.index.len()
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn index(&self) -> &[usize] {
        &self.index
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| DataError::MissingColumn(name.to_string()))
    }

    pub(crate) fn column_mut(&mut self, name: &str) -> Result<&mut Column> {
        self.columns
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| DataError::MissingColumn(name.to_string()))
    }

    /// Rows at `positions`, keeping their index labels. Positions come from
    /// `0..n_rows()`.
    pub(crate) fn take_rows(&self, positions: &[usize]) -> Table {
        Table {
            index: positions.iter().map(|&p| self.index[p]).collect(),
            columns: self
                .columns
                .iter()
                .map(|c| Column::new(c.name.clone(), c.data.take(positions)))
                .collect(),
        }
    }
}
