//! Physical quantities derived from transit and stellar measurements.
//!
//! Every function returns a [`Measurement`] so input uncertainties flow
//! through to the derived value. Inputs that are zero, negative or
//! otherwise unphysical are rejected with
//! [`DerivationError::InvalidParameter`] rather than producing NaN.

use exo_math::{Measurement, MeasurementError};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use thiserror::Error;

use crate::constants::{CM_PER_M, HZ_INNER_FLUX, HZ_OUTER_FLUX, SI};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DerivationError {
    /// A parameter is outside its physical range.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter {
        name: &'static str,
        reason: String,
    },

    #[error(transparent)]
    Measurement(#[from] MeasurementError),
}

fn require_positive(name: &'static str, value: &Measurement) -> Result<(), DerivationError> {
    if value.nominal > 0.0 {
        Ok(())
    } else {
        Err(DerivationError::InvalidParameter {
            name,
            reason: format!("must be positive, got {value}"),
        })
    }
}

/// Derived planet and orbit quantities; absent when their inputs were.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedParameters {
    /// Planet radius in Earth radii
    pub planet_radius: Option<Measurement>,
    /// Orbital semi-major axis in AU
    pub orbital_radius: Option<Measurement>,
    /// Inner habitable-zone edge in AU
    pub habitable_zone_inner: Option<Measurement>,
    /// Outer habitable-zone edge in AU
    pub habitable_zone_outer: Option<Measurement>,
}

/// Habitable-zone edges in AU for a luminosity in solar units.
///
/// `inner = sqrt(L / 1.1)`, `outer = sqrt(L / 0.53)`.
pub fn habitable_zone(
    luminosity: &Measurement,
) -> Result<(Measurement, Measurement), DerivationError> {
    require_positive("luminosity", luminosity)?;
    let inner = luminosity.scale(1.0 / HZ_INNER_FLUX).pow(0.5)?;
    let outer = luminosity.scale(1.0 / HZ_OUTER_FLUX).pow(0.5)?;
    Ok((inner, outer))
}

/// Semi-major axis in AU from Kepler's third law.
///
/// The period is exact; only the stellar mass (solar masses) carries
/// uncertainty, which propagates through the cube root.
pub fn orbital_radius(
    period_days: f64,
    stellar_mass: &Measurement,
) -> Result<Measurement, DerivationError> {
    if !(period_days > 0.0 && period_days.is_finite()) {
        return Err(DerivationError::InvalidParameter {
            name: "period",
            reason: format!("must be positive, got {period_days} d"),
        });
    }
    require_positive("stellar mass", stellar_mass)?;

    let period_s = period_days * SI::SECONDS_PER_DAY;
    let factor =
        SI::GRAVITATIONAL_CONSTANT * SI::SOLAR_MASS * period_s * period_s / (4.0 * PI * PI);
    let a_meters = stellar_mass.scale(factor).pow(1.0 / 3.0)?;
    Ok(a_meters.scale(1.0 / SI::ASTRONOMICAL_UNIT))
}

/// Planet radius in Earth radii from transit depth and stellar radius
/// (solar radii): `R_p = R_star * sqrt(depth)`.
pub fn planet_radius(
    depth: &Measurement,
    stellar_radius: &Measurement,
) -> Result<Measurement, DerivationError> {
    if !(depth.nominal > 0.0 && depth.nominal < 1.0) {
        return Err(DerivationError::InvalidParameter {
            name: "depth",
            reason: format!("must be in (0, 1), got {depth}"),
        });
    }
    require_positive("stellar radius", stellar_radius)?;

    let radius_m = stellar_radius.scale(SI::SOLAR_RADIUS).mul(&depth.pow(0.5)?);
    Ok(radius_m.scale(1.0 / SI::EARTH_RADIUS))
}

/// Stellar surface gravity `log10(g)` with `g` in cm s⁻².
pub fn surface_gravity(
    mass: &Measurement,
    radius: &Measurement,
) -> Result<Measurement, DerivationError> {
    require_positive("stellar mass", mass)?;
    require_positive("stellar radius", radius)?;

    let gm = mass.scale(SI::GRAVITATIONAL_CONSTANT * SI::SOLAR_MASS);
    let r_squared = radius.scale(SI::SOLAR_RADIUS).pow(2.0)?;
    let g_si = gm.div(&r_squared)?;
    Ok(g_si.scale(CM_PER_M).log10()?)
}

/// Kilometres to Earth radii.
pub fn km_to_earth_radii(km: &Measurement) -> Measurement {
    km.scale(1000.0 / SI::EARTH_RADIUS)
}

/// Kilometres to astronomical units.
pub fn km_to_au(km: &Measurement) -> Measurement {
    km.scale(1000.0 / SI::ASTRONOMICAL_UNIT)
}
