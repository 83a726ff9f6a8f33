//! Physical constants and unit conversions.
//!
//! Values follow the IAU 2015 nominal solar values and CODATA 2018.

/// SI constants used by the derivations.
pub struct SI {}

impl SI {
    /// Newtonian gravitational constant
    /// Units: m³ kg⁻¹ s⁻²
    pub const GRAVITATIONAL_CONSTANT: f64 = 6.67430e-11;

    /// Solar mass
    /// Units: kg
    pub const SOLAR_MASS: f64 = 1.988409870698051e30;

    /// Nominal solar radius
    /// Units: m
    pub const SOLAR_RADIUS: f64 = 6.957e8;

    /// Nominal equatorial Earth radius
    /// Units: m
    pub const EARTH_RADIUS: f64 = 6.3781e6;

    /// Astronomical unit
    /// Units: m
    pub const ASTRONOMICAL_UNIT: f64 = 1.495978707e11;

    /// Seconds in one day
    pub const SECONDS_PER_DAY: f64 = 86_400.0;
}

/// Metres to centimetres.
pub const CM_PER_M: f64 = 100.0;

/// Habitable-zone inner edge flux constant (`a_inner = sqrt(L / 1.1)`).
pub const HZ_INNER_FLUX: f64 = 1.1;

/// Habitable-zone outer edge flux constant (`a_outer = sqrt(L / 0.53)`).
pub const HZ_OUTER_FLUX: f64 = 0.53;
