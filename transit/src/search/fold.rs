//! Phase folding around a transit ephemeris.

use serde::Serialize;

use crate::error::TransitError;
use crate::light_curve::LightCurve;

/// Light curve folded on a period, sorted by phase.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoldedCurve {
    /// Time from mid-transit in days, in `[-period/2, period/2)`
    pub phase: Vec<f64>,
    /// Flux at each phase
    pub flux: Vec<f64>,
}

/// Map a time offset onto `[-period/2, period/2)`.
pub(crate) fn wrap_phase(dt: f64, period: f64) -> f64 {
    (dt + 0.5 * period).rem_euclid(period) - 0.5 * period
}

/// Fold a light curve at `period` around the mid-transit time `epoch`.
///
/// # Errors
/// [`TransitError::InvalidConfig`] for a non-positive or non-finite period.
pub fn fold(curve: &LightCurve, period: f64, epoch: f64) -> Result<FoldedCurve, TransitError> {
    if !(period.is_finite() && period > 0.0) {
        return Err(TransitError::InvalidConfig(format!(
            "fold period must be positive, got {period}"
        )));
    }

    let mut pairs: Vec<(f64, f64)> = curve
        .samples()
        .map(|(t, f)| (wrap_phase(t - epoch, period), f))
        .collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

    let (phase, flux) = pairs.into_iter().unzip();
    Ok(FoldedCurve { phase, flux })
}
