//! Values with symmetric one-sigma uncertainty.
//!
//! A [`Measurement`] pairs a nominal value with its standard uncertainty and
//! carries that uncertainty through arithmetic using linear (first-order)
//! error propagation. Inputs are treated as uncorrelated.
//!
//! The operations are named methods rather than operator overloads so that
//! every propagation rule is visible at the call site:
//!
//! | operation | nominal | sigma |
//! |-----------|---------|-------|
//! | `add`/`sub` | `a ± b` | `sqrt(sa² + sb²)` |
//! | `mul`/`div` | `a * b`, `a / b` | `|r| * sqrt((sa/a)² + (sb/b)²)` |
//! | `pow(e)` | `a^e` | `|e * a^(e-1)| * sa` |
//! | `log10` | `log10(a)` | `sa / (a * ln 10)` |
//! | `ln` | `ln(a)` | `sa / a` |
//!
//! Comparisons look at nominal values only; sigma never affects them.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced when constructing or combining measurements.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeasurementError {
    /// Sigma was negative or not finite.
    #[error("sigma must be finite and non-negative, got {0}")]
    InvalidSigma(f64),

    /// Nominal value was NaN or infinite.
    #[error("nominal value must be finite, got {0}")]
    NonFinite(f64),

    /// Division by a measurement whose nominal value is zero.
    #[error("division by a measurement with zero nominal value")]
    DivisionByZero,

    /// Logarithm of a non-positive nominal value.
    #[error("logarithm undefined for non-positive value {0}")]
    LogarithmDomain(f64),

    /// Text could not be parsed as a measurement.
    #[error(
        "cannot parse measurement from '{0}', expected 'value', 'value:sigma' or 'value+-sigma'"
    )]
    Parse(String),
}

#[derive(Deserialize)]
struct RawMeasurement {
    nominal: f64,
    #[serde(default)]
    sigma: f64,
}

impl TryFrom<RawMeasurement> for Measurement {
    type Error = MeasurementError;

    fn try_from(raw: RawMeasurement) -> Result<Self, Self::Error> {
        Measurement::new(raw.nominal, raw.sigma)
    }
}

/// A physical quantity with a one-sigma uncertainty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMeasurement")]
pub struct Measurement {
    /// Best estimate of the quantity
    pub nominal: f64,
    /// One-sigma uncertainty, always >= 0
    pub sigma: f64,
}

impl Measurement {
    /// Create a measurement, validating that both parts are finite and
    /// sigma is non-negative.
    pub fn new(nominal: f64, sigma: f64) -> Result<Self, MeasurementError> {
        if !nominal.is_finite() {
            return Err(MeasurementError::NonFinite(nominal));
        }
        if !sigma.is_finite() || sigma < 0.0 {
            return Err(MeasurementError::InvalidSigma(sigma));
        }
        Ok(Self { nominal, sigma })
    }

    /// A measurement with no uncertainty.
    ///
    /// Intended for literal constants. Values read from input should go
    /// through [`Measurement::new`], which rejects non-finite nominals.
    pub fn exact(nominal: f64) -> Self {
        debug_assert!(nominal.is_finite(), "exact measurement must be finite");
        Self {
            nominal,
            sigma: 0.0,
        }
    }

    /// Sigma as a fraction of the nominal magnitude. Zero when sigma is zero.
    pub fn relative_sigma(&self) -> f64 {
        if self.sigma == 0.0 {
            0.0
        } else {
            self.sigma / self.nominal.abs()
        }
    }

    /// Sum with quadrature-combined sigma.
    pub fn add(&self, other: &Measurement) -> Measurement {
        Measurement {
            nominal: self.nominal + other.nominal,
            sigma: self.sigma.hypot(other.sigma),
        }
    }

    /// Difference with quadrature-combined sigma.
    pub fn sub(&self, other: &Measurement) -> Measurement {
        Measurement {
            nominal: self.nominal - other.nominal,
            sigma: self.sigma.hypot(other.sigma),
        }
    }

    /// Product with relative sigmas combined in quadrature.
    ///
    /// Evaluated as `sqrt((b * sa)² + (a * sb)²)`, which equals
    /// `|a * b| * sqrt((sa/a)² + (sb/b)²)` but stays defined when either
    /// nominal is zero.
    pub fn mul(&self, other: &Measurement) -> Measurement {
        Measurement {
            nominal: self.nominal * other.nominal,
            sigma: (other.nominal * self.sigma).hypot(self.nominal * other.sigma),
        }
    }

    /// Quotient with relative sigmas combined in quadrature.
    ///
    /// # Errors
    /// [`MeasurementError::DivisionByZero`] if `other.nominal == 0`.
    pub fn div(&self, other: &Measurement) -> Result<Measurement, MeasurementError> {
        if other.nominal == 0.0 {
            return Err(MeasurementError::DivisionByZero);
        }
        let nominal = self.nominal / other.nominal;
        let sigma = (self.sigma / other.nominal)
            .hypot(self.nominal * other.sigma / (other.nominal * other.nominal));
        Ok(Measurement { nominal, sigma })
    }

    /// Multiply by an exact scalar, e.g. a unit conversion factor.
    pub fn scale(&self, factor: f64) -> Measurement {
        Measurement {
            nominal: self.nominal * factor,
            sigma: (self.sigma * factor).abs(),
        }
    }

    /// Raise to a real power with linear error propagation.
    ///
    /// Used for square roots (`0.5`) and cube roots (`1/3`).
    ///
    /// # Errors
    /// [`MeasurementError::NonFinite`] or [`MeasurementError::InvalidSigma`]
    /// when the result leaves the real domain, e.g. a fractional power of a
    /// negative value or a negative power of zero.
    pub fn pow(&self, exponent: f64) -> Result<Measurement, MeasurementError> {
        let nominal = self.nominal.powf(exponent);
        let sigma = if self.sigma == 0.0 {
            0.0
        } else {
            (exponent * self.nominal.powf(exponent - 1.0)).abs() * self.sigma
        };
        Measurement::new(nominal, sigma)
    }

    /// Base-10 logarithm.
    ///
    /// # Errors
    /// [`MeasurementError::LogarithmDomain`] for a non-positive nominal.
    pub fn log10(&self) -> Result<Measurement, MeasurementError> {
        if self.nominal <= 0.0 {
            return Err(MeasurementError::LogarithmDomain(self.nominal));
        }
        Ok(Measurement {
            nominal: self.nominal.log10(),
            sigma: self.sigma / (self.nominal * std::f64::consts::LN_10),
        })
    }

    /// Natural logarithm.
    ///
    /// # Errors
    /// [`MeasurementError::LogarithmDomain`] for a non-positive nominal.
    pub fn ln(&self) -> Result<Measurement, MeasurementError> {
        if self.nominal <= 0.0 {
            return Err(MeasurementError::LogarithmDomain(self.nominal));
        }
        Ok(Measurement {
            nominal: self.nominal.ln(),
            sigma: self.sigma / self.nominal,
        })
    }

    /// Compare the nominal value against a threshold. Sigma is ignored.
    pub fn compare_to(&self, threshold: f64) -> Ordering {
        self.nominal.total_cmp(&threshold)
    }

    /// Compare nominal values of two measurements. Sigmas are ignored.
    pub fn compare_to_measurement(&self, other: &Measurement) -> Ordering {
        self.nominal.total_cmp(&other.nominal)
    }

    /// True when `low <= nominal <= high`.
    pub fn within_inclusive(&self, low: f64, high: f64) -> bool {
        self.compare_to(low) != Ordering::Less && self.compare_to(high) != Ordering::Greater
    }

    /// True when `low < nominal < high` for measurement bounds.
    pub fn strictly_between(&self, low: &Measurement, high: &Measurement) -> bool {
        self.compare_to_measurement(low) == Ordering::Greater
            && self.compare_to_measurement(high) == Ordering::Less
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match f.precision() {
            Some(p) => write!(f, "{:.*} ± {:.*}", p, self.nominal, p, self.sigma),
            None => write!(f, "{} ± {}", self.nominal, self.sigma),
        }
    }
}

impl FromStr for Measurement {
    type Err = MeasurementError;

    /// Accepts `"value"`, `"value:sigma"`, `"value+-sigma"` or `"value±sigma"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_err = || MeasurementError::Parse(s.to_string());
        let trimmed = s.trim();

        let (nominal, sigma) = if let Some((n, e)) = trimmed.split_once("+-") {
            (n, Some(e))
        } else if let Some((n, e)) = trimmed.split_once('±') {
            (n, Some(e))
        } else if let Some((n, e)) = trimmed.split_once(':') {
            (n, Some(e))
        } else {
            (trimmed, None)
        };

        let nominal = nominal.trim().parse::<f64>().map_err(|_| parse_err())?;
        let sigma = match sigma {
            Some(e) => e.trim().parse::<f64>().map_err(|_| parse_err())?,
            None => 0.0,
        };
        Measurement::new(nominal, sigma)
    }
}
