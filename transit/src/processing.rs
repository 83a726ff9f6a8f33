//! Light-curve cleaning and smoothing.
//!
//! Cleaning removes slow stellar variability by dividing out a running-median
//! trend, then sigma-clips residual outliers against a MAD-based noise
//! estimate. Smoothing applies a fixed-width median filter, keeps only the
//! samples with full filter support on both sides and renormalizes the flux
//! to a median of 1.0.
//!
//! A running median follows any feature that fills more than half its
//! window, so box-shaped transit dips shorter than half the trend window
//! survive detrending while longer ones are absorbed into the trend.

use serde::{Deserialize, Serialize};

use crate::error::TransitError;
use crate::light_curve::LightCurve;
use exo_math::{median, robust_sigma};

/// Below this scatter the curve is treated as noiseless and not clipped.
const MIN_CLIP_SIGMA: f64 = 1e-12;

/// Parameters for [`LightCurveProcessor`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Running-median window for the detrending trend (samples, odd)
    pub flatten_window: usize,
    /// Clip points this many robust sigmas above the trend
    pub outlier_sigma_upper: f64,
    /// Clip points this many robust sigmas below the trend; `None` disables
    /// lower clipping so transit dips are never removed
    pub outlier_sigma_lower: Option<f64>,
    /// Maximum sigma-clipping passes
    pub max_clip_iterations: usize,
    /// Median filter width used by `smooth` (samples, odd)
    pub smoothing_window: usize,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            flatten_window: 101,
            outlier_sigma_upper: 5.0,
            outlier_sigma_lower: None,
            max_clip_iterations: 5,
            smoothing_window: 25,
        }
    }
}

impl ProcessingConfig {
    /// Check window sizes and clipping thresholds.
    pub fn validate(&self) -> Result<(), TransitError> {
        if self.flatten_window == 0 || self.flatten_window % 2 == 0 {
            return Err(TransitError::InvalidConfig(format!(
                "flatten_window must be odd and positive, got {}",
                self.flatten_window
            )));
        }
        if self.smoothing_window == 0 || self.smoothing_window % 2 == 0 {
            return Err(TransitError::InvalidConfig(format!(
                "smoothing_window must be odd and positive, got {}",
                self.smoothing_window
            )));
        }
        if !(self.outlier_sigma_upper > 0.0) {
            return Err(TransitError::InvalidConfig(format!(
                "outlier_sigma_upper must be positive, got {}",
                self.outlier_sigma_upper
            )));
        }
        if let Some(lower) = self.outlier_sigma_lower {
            if !(lower > 0.0) {
                return Err(TransitError::InvalidConfig(format!(
                    "outlier_sigma_lower must be positive, got {lower}"
                )));
            }
        }
        Ok(())
    }
}

/// Cleans and smooths raw light curves.
#[derive(Debug, Clone, Default)]
pub struct LightCurveProcessor {
    config: ProcessingConfig,
}

impl LightCurveProcessor {
    /// Create a processor with the given parameters.
    pub fn new(config: ProcessingConfig) -> Self {
        Self { config }
    }

    /// Parameters in use.
    pub fn config(&self) -> &ProcessingConfig {
        &self.config
    }

    /// Remove long-timescale variability and outliers.
    ///
    /// The returned flux is the raw flux divided by its running-median trend,
    /// so it is centered near 1.0.
    ///
    /// # Errors
    /// * [`TransitError::InvalidConfig`] for bad window or clip settings
    /// * [`TransitError::InsufficientData`] for an empty curve or when every
    ///   sample is clipped
    /// * [`TransitError::InvalidLightCurve`] when the trend is not positive
    pub fn clean(&self, raw: &LightCurve) -> Result<LightCurve, TransitError> {
        self.config.validate()?;
        if raw.is_empty() {
            return Err(TransitError::InsufficientData {
                required: 1,
                actual: 0,
            });
        }

        let flux = raw.flux().to_vec();
        let trend = running_median(&flux, self.config.flatten_window);

        let mut detrended = Vec::with_capacity(flux.len());
        for (i, (&f, &t)) in flux.iter().zip(trend.iter()).enumerate() {
            if !(t > 0.0) {
                return Err(TransitError::InvalidLightCurve(format!(
                    "non-positive trend value {t} at index {i}"
                )));
            }
            detrended.push(f / t);
        }

        let keep = self.clip_outliers(&detrended);
        let kept = keep.iter().filter(|&&k| k).count();
        log::debug!(
            "Cleaned light curve: kept {} of {} samples ({} clipped)",
            kept,
            raw.len(),
            raw.len() - kept
        );
        if kept == 0 {
            return Err(TransitError::InsufficientData {
                required: 1,
                actual: 0,
            });
        }

        let flattened = LightCurve::from_vecs(raw.time().to_vec(), detrended)?;
        Ok(flattened.select(&keep))
    }

    /// Iterative sigma clipping of detrended flux around 1.0.
    fn clip_outliers(&self, detrended: &[f64]) -> Vec<bool> {
        let mut keep = vec![true; detrended.len()];

        for iteration in 0..self.config.max_clip_iterations {
            let residuals: Vec<f64> = detrended
                .iter()
                .zip(keep.iter())
                .filter(|(_, &k)| k)
                .map(|(f, _)| f - 1.0)
                .collect();

            let sigma = match robust_sigma(&residuals) {
                Ok(s) if s > MIN_CLIP_SIGMA => s,
                _ => break,
            };
            let center = median(&residuals).unwrap_or(0.0);

            let mut changed = 0usize;
            for (k, f) in keep.iter_mut().zip(detrended.iter()) {
                if !*k {
                    continue;
                }
                let r = f - 1.0 - center;
                let too_high = r > self.config.outlier_sigma_upper * sigma;
                let too_low = self
                    .config
                    .outlier_sigma_lower
                    .is_some_and(|lower| r < -lower * sigma);
                if too_high || too_low {
                    *k = false;
                    changed += 1;
                }
            }

            log::debug!("Sigma clip pass {iteration}: sigma={sigma:.3e}, clipped {changed}");
            if changed == 0 {
                break;
            }
        }

        keep
    }

    /// Median-filter the flux and renormalize to a median of 1.0.
    ///
    /// The first and last `window / 2` samples lack full filter support and
    /// are dropped, so the output has `len - 2 * (window / 2)` samples.
    ///
    /// # Errors
    /// * [`TransitError::InsufficientData`] if the curve is shorter than the
    ///   window
    /// * [`TransitError::InvalidConfig`] for an even or zero window
    /// * [`TransitError::InvalidLightCurve`] if the smoothed median is not positive
    pub fn smooth(&self, cleaned: &LightCurve) -> Result<LightCurve, TransitError> {
        self.config.validate()?;
        let window = self.config.smoothing_window;
        if cleaned.len() < window {
            return Err(TransitError::InsufficientData {
                required: window,
                actual: cleaned.len(),
            });
        }

        let half = window / 2;
        let flux = cleaned.flux().to_vec();
        let mut smoothed: Vec<f64> = flux
            .windows(window)
            .filter_map(|w| median(w).ok())
            .collect();

        let center = median(&smoothed).map_err(|e| TransitError::InvalidLightCurve(e.to_string()))?;
        if !(center > 0.0) {
            return Err(TransitError::InvalidLightCurve(format!(
                "cannot normalize by non-positive median flux {center}"
            )));
        }
        for value in smoothed.iter_mut() {
            *value /= center;
        }

        let time = cleaned.time().to_vec();
        let trimmed_time = time[half..time.len() - half].to_vec();
        log::debug!(
            "Smoothed light curve with window {}: {} -> {} samples",
            window,
            cleaned.len(),
            smoothed.len()
        );

        LightCurve::from_vecs(trimmed_time, smoothed)
    }
}

/// Centered running median.
///
/// The series is extended past each end by point reflection about the end
/// sample (`2 * v[0] - v[k]`), so linear trends are followed exactly up to
/// the boundaries.
pub fn running_median(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }
    let half = window / 2;
    let first = values[0];
    let last = values[n - 1];

    let mut padded = Vec::with_capacity(n + 2 * half);
    padded.extend((1..=half).rev().map(|k| 2.0 * first - values[k.min(n - 1)]));
    padded.extend_from_slice(values);
    padded.extend((1..=half).map(|k| 2.0 * last - values[(n - 1).saturating_sub(k)]));

    padded
        .windows(2 * half + 1)
        .filter_map(|w| median(w).ok())
        .collect()
}
