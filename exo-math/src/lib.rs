//! exo-math - Numeric foundation for the habitability pipeline
//!
//! This crate provides the small amount of numerical machinery shared by the
//! transit search and the physical derivations:
//!
//! - **Measurement** - A value with a one-sigma uncertainty and first-order
//!   error propagation through arithmetic, powers and logarithms
//! - **Statistics** - Robust statistics (median, MAD, standard deviation)
//!
//! # Example
//!
//! ```
//! use exo_math::Measurement;
//!
//! let area = Measurement::new(4.0, 0.2).unwrap();
//! let side = area.pow(0.5).unwrap();
//! assert!((side.nominal - 2.0).abs() < 1e-12);
//! assert!((side.sigma - 0.05).abs() < 1e-12);
//! ```

pub mod measurement;
pub mod stats;

// Re-export commonly used types
pub use measurement::{Measurement, MeasurementError};
pub use stats::{mad, mean, median, robust_sigma, std_dev, StatsError, MAD_TO_SIGMA};
