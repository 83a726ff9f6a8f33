//! Statistical functions for light-curve analysis

use thiserror::Error;

/// Scale factor converting a median absolute deviation into a Gaussian
/// standard deviation.
pub const MAD_TO_SIGMA: f64 = 1.4826;

/// Errors from statistical reductions.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatsError {
    /// No usable values were supplied.
    #[error("insufficient data points: {total} total values, 0 valid (all NaN or empty)")]
    Empty {
        /// Number of values passed in, including NaN
        total: usize,
    },
}

/// Calculate median of a slice of f64 values
///
/// This function computes the median while filtering out NaN values but including
/// infinite values (±inf). For even-length data, returns the average of the two
/// middle values.
///
/// # Returns
///
/// * `Ok(median)` - The median value
/// * `Err(StatsError::Empty)` - If no valid values remain after filtering NaN
pub fn median(values: &[f64]) -> Result<f64, StatsError> {
    let mut valid_values: Vec<f64> = values.iter().filter(|v| !v.is_nan()).copied().collect();

    if valid_values.is_empty() {
        return Err(StatsError::Empty {
            total: values.len(),
        });
    }

    valid_values.sort_by(f64::total_cmp);

    let mid = valid_values.len() / 2;
    let median_value = if valid_values.len() % 2 == 0 {
        (valid_values[mid - 1] + valid_values[mid]) / 2.0
    } else {
        valid_values[mid]
    };

    Ok(median_value)
}

/// Median absolute deviation around the median.
pub fn mad(values: &[f64]) -> Result<f64, StatsError> {
    let center = median(values)?;
    let deviations: Vec<f64> = values
        .iter()
        .filter(|v| !v.is_nan())
        .map(|v| (v - center).abs())
        .collect();
    median(&deviations)
}

/// Outlier-resistant estimate of the standard deviation (`1.4826 * MAD`).
pub fn robust_sigma(values: &[f64]) -> Result<f64, StatsError> {
    Ok(MAD_TO_SIGMA * mad(values)?)
}

/// Arithmetic mean. Returns NaN for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator).
///
/// Returns 0.0 for fewer than two values.
pub fn std_dev(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let mu = mean(values);
    let variance = values.iter().map(|x| (x - mu).powi(2)).sum::<f64>() / (n - 1) as f64;
    variance.sqrt()
}
