//! Seeded synthetic light curves.
//!
//! Generates evenly sampled photometry with Gaussian noise, optional
//! sinusoidal stellar variability and an optional box-shaped transit train.
//! The same seed always produces the same curve, which keeps tests and
//! benchmarks reproducible.
//!
//! # Usage
//!
//! ```
//! use transit::{SyntheticLightCurve, SyntheticTransit};
//!
//! let curve = SyntheticLightCurve::default()
//!     .with_transit(SyntheticTransit {
//!         period: 3.0,
//!         epoch: 1.3,
//!         duration: 0.3,
//!         depth: 0.01,
//!     })
//!     .generate()
//!     .unwrap();
//! assert_eq!(curve.len(), 2001);
//! ```

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::error::TransitError;
use crate::light_curve::LightCurve;
use crate::search::fold::wrap_phase;

/// Box-shaped periodic transit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SyntheticTransit {
    /// Orbital period in days
    pub period: f64,
    /// Mid-time of a reference transit in days
    pub epoch: f64,
    /// Full transit duration in days
    pub duration: f64,
    /// Fractional flux decrement
    pub depth: f64,
}

impl SyntheticTransit {
    /// True when `time` falls inside a transit.
    pub fn in_transit(&self, time: f64) -> bool {
        wrap_phase(time - self.epoch, self.period).abs() < 0.5 * self.duration
    }
}

/// Parameters for an evenly sampled synthetic light curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticLightCurve {
    /// Time of the first sample in days
    pub start_time: f64,
    /// Total time span in days
    pub baseline: f64,
    /// Sample spacing in days
    pub cadence: f64,
    /// Out-of-transit flux level
    pub flux_level: f64,
    /// Gaussian noise sigma relative to `flux_level`
    pub noise_sigma: f64,
    /// Fractional amplitude of sinusoidal variability
    pub variability_amplitude: f64,
    /// Period of the variability in days
    pub variability_period: f64,
    /// Injected transit train
    pub transit: Option<SyntheticTransit>,
    /// RNG seed
    pub seed: u64,
}

impl Default for SyntheticLightCurve {
    fn default() -> Self {
        Self {
            start_time: 0.0,
            baseline: 20.0,
            cadence: 0.01,
            flux_level: 1.0,
            noise_sigma: 0.001,
            variability_amplitude: 0.0,
            variability_period: 5.0,
            transit: None,
            seed: 42,
        }
    }
}

impl SyntheticLightCurve {
    /// Inject a transit train.
    pub fn with_transit(mut self, transit: SyntheticTransit) -> Self {
        self.transit = Some(transit);
        self
    }

    /// Add sinusoidal stellar variability.
    pub fn with_variability(mut self, amplitude: f64, period: f64) -> Self {
        self.variability_amplitude = amplitude;
        self.variability_period = period;
        self
    }

    /// Sample the curve.
    ///
    /// # Errors
    /// [`TransitError::InvalidConfig`] for a non-positive cadence or
    /// baseline, a negative noise sigma, or an invalid transit.
    pub fn generate(&self) -> Result<LightCurve, TransitError> {
        if !(self.cadence > 0.0 && self.baseline > 0.0) {
            return Err(TransitError::InvalidConfig(format!(
                "cadence ({}) and baseline ({}) must be positive",
                self.cadence, self.baseline
            )));
        }
        if let Some(transit) = &self.transit {
            if !(transit.period > 0.0 && transit.duration > 0.0) {
                return Err(TransitError::InvalidConfig(format!(
                    "transit period ({}) and duration ({}) must be positive",
                    transit.period, transit.duration
                )));
            }
        }
        let noise = Normal::new(0.0, self.noise_sigma * self.flux_level).map_err(|e| {
            TransitError::InvalidConfig(format!("noise sigma {}: {e}", self.noise_sigma))
        })?;

        let mut rng = StdRng::seed_from_u64(self.seed);
        let n_samples = (self.baseline / self.cadence).round() as usize + 1;

        let (time, flux): (Vec<f64>, Vec<f64>) = (0..n_samples)
            .map(|i| {
                let t = self.start_time + i as f64 * self.cadence;
                let mut f = self.flux_level;
                if self.variability_amplitude != 0.0 {
                    let phase = 2.0 * std::f64::consts::PI * t / self.variability_period;
                    f *= 1.0 + self.variability_amplitude * phase.sin();
                }
                if let Some(transit) = &self.transit {
                    if transit.in_transit(t) {
                        f *= 1.0 - transit.depth;
                    }
                }
                (t, f + noise.sample(&mut rng))
            })
            .unzip();

        LightCurve::from_vecs(time, flux)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sample_count_and_spacing() {
        let curve = SyntheticLightCurve::default().generate().unwrap();
        assert_eq!(curve.len(), 2001);
        assert_relative_eq!(curve.baseline(), 20.0, epsilon = 1e-9);
        assert_relative_eq!(curve.median_cadence().unwrap(), 0.01, epsilon = 1e-12);
    }

    #[test]
    fn test_same_seed_same_curve() {
        let a = SyntheticLightCurve::default().generate().unwrap();
        let b = SyntheticLightCurve::default().generate().unwrap();
        let c = SyntheticLightCurve {
            seed: 1,
            ..SyntheticLightCurve::default()
        }
        .generate()
        .unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_noiseless_transit_depth() {
        let transit = SyntheticTransit {
            period: 2.0,
            epoch: 0.5,
            duration: 0.2,
            depth: 0.02,
        };
        let curve = SyntheticLightCurve {
            noise_sigma: 0.0,
            ..SyntheticLightCurve::default()
        }
        .with_transit(transit)
        .generate()
        .unwrap();

        for (t, f) in curve.samples() {
            let expected = if transit.in_transit(t) { 0.98 } else { 1.0 };
            assert_relative_eq!(f, expected, epsilon = 1e-12);
        }
        assert!(transit.in_transit(0.5));
        assert!(transit.in_transit(2.55));
        assert!(!transit.in_transit(1.5));
    }

    #[test]
    fn test_variability_amplitude() {
        let curve = SyntheticLightCurve {
            noise_sigma: 0.0,
            ..SyntheticLightCurve::default()
        }
        .with_variability(0.05, 4.0)
        .generate()
        .unwrap();

        let max = curve.flux().iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = curve.flux().iter().copied().fold(f64::INFINITY, f64::min);
        assert_relative_eq!(max, 1.05, epsilon = 1e-6);
        assert_relative_eq!(min, 0.95, epsilon = 1e-6);
    }

    #[test]
    fn test_invalid_parameters() {
        let bad_cadence = SyntheticLightCurve {
            cadence: 0.0,
            ..SyntheticLightCurve::default()
        };
        assert!(bad_cadence.generate().is_err());

        let bad_noise = SyntheticLightCurve {
            noise_sigma: -1.0,
            ..SyntheticLightCurve::default()
        };
        assert!(bad_noise.generate().is_err());
    }
}
