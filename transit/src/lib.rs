//! Transit detection for photometric time series.
//!
//! This crate turns a raw brightness time series into a single best transit
//! candidate:
//!
//! 1. [`LightCurve`] holds validated `(time, flux)` samples and reads/writes CSV
//! 2. [`LightCurveProcessor`] removes outliers and slow stellar variability,
//!    then median-smooths the result
//! 3. [`TransitSearch`] runs a box-least-squares periodogram followed by an
//!    oversampled grid refinement and returns a [`TransitCandidate`]
//!
//! The [`synthetic`] module generates seeded light curves with injected
//! transits for tests, benchmarks and demos.

pub mod error;
pub mod light_curve;
pub mod processing;
pub mod search;
pub mod synthetic;

// Re-exports for easier access
pub use error::TransitError;
pub use light_curve::LightCurve;
pub use processing::{LightCurveProcessor, ProcessingConfig};
pub use search::bls::Periodogram;
pub use search::fold::{fold, FoldedCurve};
pub use search::{FoldedModel, SearchConfig, TransitCandidate, TransitSearch};
pub use synthetic::{SyntheticLightCurve, SyntheticTransit};
