//! Row and column cleaning for tables

use tracing::debug;

use crate::error::{DataError, Result};
use crate::types::{Column, ColumnData, ColumnType, Table};

/// Quantile of already sorted values, linearly interpolated between the
/// closest ranks (`h = (n - 1) * p`).
///
/// Returns `None` for an empty slice or `p` outside `[0, 1]`.
pub fn quantile(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&p) {
        return None;
    }

    let h = (sorted.len() - 1) as f64 * p;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    let (a, b) = (sorted[lo], sorted[hi]);

    let t = h - lo as f64;
    if a == b {
        Some(a)
    } else if (b - a).is_finite() {
        Some(a + t * (b - a))
    } else {
        // b - a overflows; the weighted form stays inside [a, b]
        Some((1.0 - t) * a + t * b)
    }
}

/// Tukey fences `[Q1 - k*IQR, Q3 + k*IQR]`, bounds inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IqrBounds {
    pub q1: f64,
    pub q3: f64,
    pub lower: f64,
    pub upper: f64,
}

impl IqrBounds {
    /// Fences for `values` (any order). `None` when `values` is empty.
    pub fn compute(values: &[f64], factor: f64) -> Option<Self> {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let q1 = quantile(&sorted, 0.25)?;
        let q3 = quantile(&sorted, 0.75)?;
        // IQR may overflow to inf for finite data; 0 * inf would be NaN
        let spread = if factor == 0.0 { 0.0 } else { factor * (q3 - q1) };

        Some(Self {
            q1,
            q3,
            lower: q1 - spread,
            upper: q3 + spread,
        })
    }

    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

pub struct TableCleaner;

impl TableCleaner {
    /// Strip leading and trailing whitespace in the given text columns.
    ///
    /// Categorical columns are trimmed through their labels; labels that
    /// become equal after trimming are merged into one category. Every name is
    /// checked before anything is transformed.
    pub fn trim_strings<S: AsRef<str>>(table: &Table, columns: &[S]) -> Result<Table> {
        for name in columns {
            require_column(table, name.as_ref(), ColumnType::is_textual, "text")?;
        }

        let mut cleaned = table.clone();
        for name in columns {
            let column = cleaned.column_mut(name.as_ref())?;
            column.data = trim_column(&column.data);
        }

        debug!(
            columns = columns.len(),
            rows = table.n_rows(),
            "trimmed string columns"
        );
        Ok(cleaned)
    }

    /// Drop rows holding a missing value in any of `columns`.
    pub fn drop_invalid_rows<S: AsRef<str>>(table: &Table, columns: &[S]) -> Result<Table> {
        let selected = columns
            .iter()
            .map(|name| table.column(name.as_ref()).map(|c| &c.data))
            .collect::<Result<Vec<_>>>()?;

        let keep: Vec<usize> = (0..table.n_rows())
            .filter(|&row| selected.iter().all(|data| !data.is_missing(row)))
            .collect();

        debug!(
            rows_in = table.n_rows(),
            rows_out = keep.len(),
            "dropped rows with missing values"
        );
        Ok(table.take_rows(&keep))
    }

    /// Keep rows whose value in `column` lies inside the IQR fences.
    ///
    /// Quartiles come from the non-missing values of the column. Rows with a
    /// missing value are dropped, since they cannot be shown to be in bounds.
    /// When the IQR is zero the fences collapse onto the constant and only
    /// rows equal to it survive.
    pub fn remove_outliers_iqr(table: &Table, column: &str, factor: f64) -> Result<Table> {
        let data = &require_column(table, column, ColumnType::is_numeric, "numeric")?.data;

        if !factor.is_finite() || factor < 0.0 {
            return Err(DataError::invalid(format!(
                "IQR factor must be a finite non-negative number, got {factor}"
            )));
        }

        let observed: Vec<f64> = (0..table.n_rows())
            .filter_map(|row| data.numeric_value(row))
            .collect();
        let bounds = IqrBounds::compute(&observed, factor).ok_or_else(|| {
            DataError::invalid(format!("column `{column}` has no non-missing values"))
        })?;

        let keep: Vec<usize> = (0..table.n_rows())
            .filter(|&row| data.numeric_value(row).is_some_and(|v| bounds.contains(v)))
            .collect();

        debug!(
            column,
            factor,
            q1 = bounds.q1,
            q3 = bounds.q3,
            lower = bounds.lower,
            upper = bounds.upper,
            rows_in = table.n_rows(),
            rows_out = keep.len(),
            "removed IQR outliers"
        );
        Ok(table.take_rows(&keep))
    }
}

fn require_column<'a>(
    table: &'a Table,
    name: &str,
    accepts: fn(ColumnType) -> bool,
    expected: &'static str,
) -> Result<&'a Column> {
    let column = table.column(name)?;
    let actual = column.column_type();
    if !accepts(actual) {
        return Err(DataError::TypeMismatch {
            column: column.name.clone(),
            expected,
            actual,
        });
    }
    Ok(column)
}

fn trim_column(data: &ColumnData) -> ColumnData {
    match data {
        ColumnData::Text { values } => ColumnData::Text {
            values: values
                .iter()
                .map(|v| v.as_deref().map(|s| s.trim().to_string()))
                .collect(),
        },
        ColumnData::Categorical { categories, codes } => {
            let mut merged: Vec<String> = Vec::with_capacity(categories.len());
            let remap: Vec<usize> = categories
                .iter()
                .map(|label| {
                    let label = label.trim();
                    match merged.iter().position(|c| c == label) {
                        Some(code) => code,
                        None => {
                            merged.push(label.to_string());
                            merged.len() - 1
                        }
                    }
                })
                .collect();

            ColumnData::Categorical {
                categories: merged,
                codes: codes.iter().map(|c| c.map(|code| remap[code])).collect(),
            }
        }
        other => other.clone(),
    }
}
