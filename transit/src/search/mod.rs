//! Periodic transit search.
//!
//! [`TransitSearch::search`] runs two passes over a cleaned light curve:
//!
//! 1. a coarse box-least-squares periodogram ([`bls`]) over a geometric
//!    period grid, evaluated in parallel
//! 2. an oversampled refinement around the strongest peak that fits a box
//!    model and estimates the depth uncertainty
//!
//! The search is deterministic: the same curve and configuration always
//! yield the same candidate.

pub mod bls;
pub mod fold;
mod refine;
mod scatter;

use serde::{Deserialize, Serialize};

use crate::error::TransitError;
use crate::light_curve::LightCurve;
use exo_math::Measurement;

/// Parameters for [`TransitSearch`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Shortest trial period in days
    pub min_period: f64,
    /// Longest trial period in days; half the baseline when unset
    pub max_period: Option<f64>,
    /// Trial transit durations in days
    pub durations: Vec<f64>,
    /// Durations longer than this fraction of the period are skipped
    pub max_duty_cycle: f64,
    /// Coarse period grid density
    pub period_oversample: f64,
    /// Phase bins per shortest duration in the coarse pass
    pub phase_oversample: usize,
    /// Minimum samples inside a box
    pub min_in_transit: usize,
    /// Detection threshold on the coarse power
    pub min_snr: f64,
    /// Refinement grid points per coarse step (at least 5)
    pub oversampling_factor: usize,
    /// Multiplicative step of the refinement duration grid
    pub duration_grid_step: f64,
    /// Attach the folded curve and box model to the candidate
    pub keep_folded_model: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_period: 0.5,
            max_period: None,
            durations: vec![0.04, 0.08, 0.12, 0.16, 0.24, 0.32],
            max_duty_cycle: 0.2,
            period_oversample: 2.0,
            phase_oversample: 4,
            min_in_transit: 3,
            min_snr: 7.0,
            oversampling_factor: 5,
            duration_grid_step: 1.02,
            keep_folded_model: true,
        }
    }
}

impl SearchConfig {
    /// Check grid and threshold settings.
    pub fn validate(&self) -> Result<(), TransitError> {
        let invalid = |msg: String| Err(TransitError::InvalidConfig(msg));

        if !(self.min_period > 0.0 && self.min_period.is_finite()) {
            return invalid(format!("min_period must be positive, got {}", self.min_period));
        }
        if let Some(max) = self.max_period {
            if !(max > self.min_period && max.is_finite()) {
                return invalid(format!(
                    "max_period {max} must exceed min_period {}",
                    self.min_period
                ));
            }
        }
        if self.durations.is_empty() {
            return invalid("durations must not be empty".to_string());
        }
        if let Some(d) = self.durations.iter().find(|d| !(**d > 0.0 && d.is_finite())) {
            return invalid(format!("durations must be positive, got {d}"));
        }
        if !(self.max_duty_cycle > 0.0 && self.max_duty_cycle < 1.0) {
            return invalid(format!(
                "max_duty_cycle must be in (0, 1), got {}",
                self.max_duty_cycle
            ));
        }
        if !(self.period_oversample > 0.0 && self.period_oversample.is_finite()) {
            return invalid(format!(
                "period_oversample must be positive, got {}",
                self.period_oversample
            ));
        }
        if self.phase_oversample == 0 {
            return invalid("phase_oversample must be at least 1".to_string());
        }
        if self.min_in_transit == 0 {
            return invalid("min_in_transit must be at least 1".to_string());
        }
        if !(self.min_snr >= 0.0 && self.min_snr.is_finite()) {
            return invalid(format!("min_snr must be non-negative, got {}", self.min_snr));
        }
        if self.oversampling_factor < 5 {
            return invalid(format!(
                "oversampling_factor must be at least 5, got {}",
                self.oversampling_factor
            ));
        }
        if !(self.duration_grid_step > 1.0 && self.duration_grid_step.is_finite()) {
            return invalid(format!(
                "duration_grid_step must exceed 1, got {}",
                self.duration_grid_step
            ));
        }
        Ok(())
    }
}

/// Folded light curve with the fitted box model, ready for plotting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoldedModel {
    /// Time from mid-transit in days, ascending
    pub phase: Vec<f64>,
    /// Observed flux
    pub flux: Vec<f64>,
    /// Box model flux
    pub model: Vec<f64>,
}

/// Best periodic transit signal found in a light curve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitCandidate {
    /// Orbital period in days
    pub period: f64,
    /// Mid-time of the first transit in the data
    pub epoch: f64,
    /// Transit duration in days
    pub duration: f64,
    /// Fractional flux decrement `(F_out - F_in) / F_out`
    pub depth: Measurement,
    /// Depth over its uncertainty
    pub snr: f64,
    /// Signal detection efficiency of the periodogram peak
    pub sde: f64,
    /// Coarse periodogram power at the detection
    pub power: f64,
    /// Number of distinct transits with in-transit samples
    pub transit_count: usize,
    /// Folded curve and model, when requested
    pub folded: Option<FoldedModel>,
}

/// Box-least-squares transit finder.
#[derive(Debug, Clone, Default)]
pub struct TransitSearch {
    config: SearchConfig,
}

impl TransitSearch {
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Coarse periodogram of `curve` without the detection threshold.
    ///
    /// # Errors
    /// Same input checks as [`TransitSearch::search`].
    pub fn periodogram(&self, curve: &LightCurve) -> Result<bls::Periodogram, TransitError> {
        self.config.validate()?;

        let required = 2 * self.config.min_in_transit;
        if curve.len() < required {
            return Err(TransitError::InsufficientData {
                required,
                actual: curve.len(),
            });
        }

        let baseline = curve.baseline();
        let max_period = self.config.max_period.unwrap_or(0.5 * baseline);
        if max_period < self.config.min_period {
            return Err(TransitError::InvalidLightCurve(format!(
                "baseline of {baseline:.3} d is too short for a minimum period of {} d",
                self.config.min_period
            )));
        }

        let cadence = curve.median_cadence().unwrap_or(baseline);
        let min_duration = self
            .config
            .durations
            .iter()
            .copied()
            .fold(f64::INFINITY, f64::min);
        let periods = bls::period_grid(
            self.config.min_period,
            max_period,
            baseline,
            min_duration,
            self.config.period_oversample,
        );
        log::info!(
            "Searching {} trial periods between {:.3} and {:.3} d over {} samples",
            periods.len(),
            self.config.min_period,
            max_period,
            curve.len()
        );

        let time = curve.time().to_vec();
        let flux = curve.flux().to_vec();
        Ok(bls::periodogram(&time, &flux, cadence, periods, &self.config))
    }

    /// Find the strongest periodic dip in `curve`.
    ///
    /// # Errors
    /// * [`TransitError::InvalidConfig`] for inconsistent search settings
    /// * [`TransitError::InsufficientData`] for too few samples
    /// * [`TransitError::InvalidLightCurve`] when the baseline cannot hold
    ///   two transits at the minimum period
    /// * [`TransitError::NoTransitDetected`] when the peak power is below
    ///   `min_snr`
    /// * [`TransitError::UnphysicalDepth`] when the fitted depth is not in
    ///   (0, 1)
    pub fn search(&self, curve: &LightCurve) -> Result<TransitCandidate, TransitError> {
        let periodogram = self.periodogram(curve)?;
        let sde = periodogram.sde();

        let best = match periodogram.best {
            Some(best) if best.power >= self.config.min_snr => best,
            other => {
                let best_power = other.map_or(0.0, |b| b.power);
                log::info!(
                    "No transit above threshold: best power {best_power:.2} < {:.2}",
                    self.config.min_snr
                );
                return Err(TransitError::NoTransitDetected {
                    best_power,
                    threshold: self.config.min_snr,
                });
            }
        };
        log::debug!(
            "Coarse peak: P={:.5} d, T0={:.5}, dur={:.3} d, power={:.2}, SDE={sde:.2}",
            best.period,
            best.epoch,
            best.duration,
            best.power
        );

        let time = curve.time().to_vec();
        let flux = curve.flux().to_vec();
        let cadence = curve.median_cadence().unwrap_or_else(|| curve.baseline());
        let coarse_step = periodogram.grid_step(best.period).unwrap_or_else(|| {
            let min_duration = self
                .config
                .durations
                .iter()
                .copied()
                .fold(f64::INFINITY, f64::min);
            best.period * min_duration / (self.config.period_oversample * curve.baseline())
        });
        let fit = refine::refine(&time, &flux, cadence, &best, coarse_step, &self.config)?;

        log::info!(
            "Transit candidate: P={:.5} d, depth={}, SNR={:.1}, {} transits",
            fit.period,
            fit.depth,
            fit.snr,
            fit.transit_count
        );

        Ok(TransitCandidate {
            period: fit.period,
            epoch: fit.epoch,
            duration: fit.duration,
            depth: fit.depth,
            snr: fit.snr,
            sde,
            power: best.power,
            transit_count: fit.transit_count,
            folded: self.config.keep_folded_model.then_some(fit.folded),
        })
    }
}
