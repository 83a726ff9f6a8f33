use thiserror::Error;

/// Errors produced while loading, cleaning or searching a light curve.
#[derive(Error, Debug)]
pub enum TransitError {
    /// Not enough samples for the requested operation.
    #[error("insufficient data: need at least {required} samples, got {actual}")]
    InsufficientData {
        /// Minimum number of samples needed.
        required: usize,
        /// Number of samples available.
        actual: usize,
    },

    /// No period produced a dip above the detection threshold.
    #[error("no transit detected: best power {best_power:.2} below threshold {threshold:.2}")]
    NoTransitDetected {
        /// Highest detection power found anywhere in the grid.
        best_power: f64,
        /// Configured detection threshold.
        threshold: f64,
    },

    /// Samples violate the light-curve invariants.
    #[error("invalid light curve: {0}")]
    InvalidLightCurve(String),

    /// Processing or search parameters are inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The fitted depth lies outside (0, 1).
    #[error("unphysical transit depth {0:.6}")]
    UnphysicalDepth(f64),

    /// Reading or writing a light-curve file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing or serialization failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
