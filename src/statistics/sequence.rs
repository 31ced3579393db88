//! Statistics over one-dimensional numeric sequences

use ndarray::{Array1, ArrayBase, Data, Dimension, Ix1};
use tracing::debug;

use crate::error::{DataError, Result};

/// Elements must convert losslessly into `f64` (`f64`, `f32`, `i32`, `u32`
/// and narrower). Integer table columns, stored as `i64`, go through
/// [`Column::numeric_sequence`](crate::types::Column::numeric_sequence).
pub struct SequenceStatistics;

impl SequenceStatistics {
    /// Mean of every contiguous window of `window` elements.
    ///
    /// The result holds `len - window + 1` values; element `i` is the mean of
    /// `sequence[i..i + window]`.
    pub fn moving_average<S, D, A>(sequence: &ArrayBase<S, D>, window: usize) -> Result<Array1<f64>>
    where
        S: Data<Elem = A>,
        D: Dimension,
        A: Copy + Into<f64>,
    {
        let values = to_sequence(sequence)?;

        if window == 0 || window > values.len() {
            return Err(DataError::invalid(format!(
                "window must be between 1 and {}, got {window}",
                values.len()
            )));
        }

        let averages: Array1<f64> = values
            .windows(window)
            .into_iter()
            .map(|w| w.sum() / window as f64)
            .collect();

        debug!(len = values.len(), window, "computed moving average");
        Ok(averages)
    }

    /// Standard scores `(x - mean) / std` with the population standard deviation.
    pub fn zscore<S, D, A>(sequence: &ArrayBase<S, D>) -> Result<Array1<f64>>
    where
        S: Data<Elem = A>,
        D: Dimension,
        A: Copy + Into<f64>,
    {
        let values = to_sequence(sequence)?;
        let (min, max) = value_range(&values)?;
        if min == max {
            return Err(DataError::invalid(
                "standard deviation is zero for a constant sequence",
            ));
        }

        let mean = values
            .mean()
            .ok_or_else(|| DataError::invalid("sequence is empty"))?;
        let std_dev = values.std(0.0);
        if std_dev == 0.0 {
            return Err(DataError::invalid("standard deviation is zero"));
        }
        if !mean.is_finite() || !std_dev.is_finite() {
            return Err(DataError::invalid(
                "mean or standard deviation overflows f64",
            ));
        }

        debug!(len = values.len(), mean, std_dev, "computed z-scores");
        Ok(values.mapv(|x| (x - mean) / std_dev))
    }

    /// Rescale into `[0, 1]` with `(x - min) / (max - min)`.
    pub fn min_max_scale<S, D, A>(sequence: &ArrayBase<S, D>) -> Result<Array1<f64>>
    where
        S: Data<Elem = A>,
        D: Dimension,
        A: Copy + Into<f64>,
    {
        let values = to_sequence(sequence)?;
        let (min, max) = value_range(&values)?;
        if min == max {
            return Err(DataError::invalid(
                "range is zero for a constant sequence",
            ));
        }

        let range = max - min;
        if !range.is_finite() {
            return Err(DataError::invalid(format!(
                "range between {min} and {max} overflows f64"
            )));
        }

        debug!(len = values.len(), min, max, "computed min-max scaling");
        Ok(values.mapv(|x| (x - min) / range))
    }
}

/// Copy `sequence` into an owned `f64` vector, rejecting anything that is not
/// one-dimensional or not fully populated.
fn to_sequence<S, D, A>(sequence: &ArrayBase<S, D>) -> Result<Array1<f64>>
where
    S: Data<Elem = A>,
    D: Dimension,
    A: Copy + Into<f64>,
{
    let view = sequence
        .view()
        .into_dimensionality::<Ix1>()
        .map_err(|_| DataError::Shape {
            ndim: sequence.ndim(),
        })?;

    let values = view.mapv(|v| -> f64 { v.into() });
    if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
        return Err(DataError::invalid(format!(
            "sequence holds a non-finite value at position {pos}"
        )));
    }

    Ok(values)
}

fn value_range(values: &Array1<f64>) -> Result<(f64, f64)> {
    if values.is_empty() {
        return Err(DataError::invalid("sequence is empty"));
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Ok((min, max))
}
