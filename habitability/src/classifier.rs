//! Multi-criterion habitability verdict.
//!
//! Four independent checks are made on nominal values:
//!
//! | criterion | passes when |
//! |-----------|-------------|
//! | radius | `min_planet_radius <= R <= max_planet_radius` (Earth radii) |
//! | spectral type | the class is in `allowed_spectral_types` |
//! | temperature | `min_temperature <= T <= max_temperature` (K) |
//! | zone | `inner < a < outer` (strict) |
//!
//! A check whose input is missing is [`Check::Unknown`]. The aggregate fails
//! as soon as any check fails, is unknown while any check is unknown, and
//! passes only when all four pass.

use std::fmt;

use exo_math::Measurement;
use serde::{Deserialize, Serialize};

use crate::derivation::DerivedParameters;
use crate::stellar::{SpectralType, StellarParameters};

/// Outcome of a single criterion or of the aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Check {
    Pass,
    Fail,
    Unknown,
}

impl Check {
    pub fn from_bool(passed: bool) -> Self {
        if passed {
            Check::Pass
        } else {
            Check::Fail
        }
    }

    pub fn is_pass(self) -> bool {
        self == Check::Pass
    }

    pub fn is_known(self) -> bool {
        self != Check::Unknown
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let str = match self {
            Check::Pass => "pass",
            Check::Fail => "fail",
            Check::Unknown => "unknown",
        };
        write!(f, "{}", str)
    }
}

/// The individual habitability criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Criterion {
    Radius,
    SpectralType,
    Temperature,
    Zone,
}

impl Criterion {
    pub const ALL: [Criterion; 4] = [
        Criterion::Radius,
        Criterion::SpectralType,
        Criterion::Temperature,
        Criterion::Zone,
    ];
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let str = match self {
            Criterion::Radius => "radius_ok",
            Criterion::SpectralType => "type_ok",
            Criterion::Temperature => "temp_ok",
            Criterion::Zone => "zone_ok",
        };
        write!(f, "{}", str)
    }
}

/// Bounds used by the classifier.
///
/// The default is the canonical set: radius `[0.5, 2.0]` Earth radii
/// inclusive, temperature `[4800, 6300]` K inclusive, classes F/G/K/M.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HabitabilityCriteria {
    pub min_planet_radius: f64,
    pub max_planet_radius: f64,
    pub min_temperature: f64,
    pub max_temperature: f64,
    pub allowed_spectral_types: Vec<SpectralType>,
}

impl Default for HabitabilityCriteria {
    fn default() -> Self {
        Self {
            min_planet_radius: 0.5,
            max_planet_radius: 2.0,
            min_temperature: 4800.0,
            max_temperature: 6300.0,
            allowed_spectral_types: vec![
                SpectralType::F,
                SpectralType::G,
                SpectralType::K,
                SpectralType::M,
            ],
        }
    }
}

impl HabitabilityCriteria {
    /// Check that every range is ordered and the class list is non-empty.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.min_planet_radius <= self.max_planet_radius) {
            return Err(format!(
                "planet radius range [{}, {}] is empty",
                self.min_planet_radius, self.max_planet_radius
            ));
        }
        if !(self.min_temperature <= self.max_temperature) {
            return Err(format!(
                "temperature range [{}, {}] is empty",
                self.min_temperature, self.max_temperature
            ));
        }
        if self.allowed_spectral_types.is_empty() {
            return Err("allowed_spectral_types must not be empty".to_string());
        }
        Ok(())
    }

    pub fn radius_ok(&self, planet_radius: Option<&Measurement>) -> Check {
        planet_radius.map_or(Check::Unknown, |r| {
            Check::from_bool(r.within_inclusive(self.min_planet_radius, self.max_planet_radius))
        })
    }

    pub fn type_ok(&self, spectral_type: Option<SpectralType>) -> Check {
        spectral_type.map_or(Check::Unknown, |t| {
            Check::from_bool(self.allowed_spectral_types.contains(&t))
        })
    }

    pub fn temp_ok(&self, temperature: Option<&Measurement>) -> Check {
        temperature.map_or(Check::Unknown, |t| {
            Check::from_bool(t.within_inclusive(self.min_temperature, self.max_temperature))
        })
    }

    pub fn zone_ok(
        &self,
        orbital_radius: Option<&Measurement>,
        inner: Option<&Measurement>,
        outer: Option<&Measurement>,
    ) -> Check {
        match (orbital_radius, inner, outer) {
            (Some(a), Some(inner), Some(outer)) => {
                Check::from_bool(a.strictly_between(inner, outer))
            }
            _ => Check::Unknown,
        }
    }
}

/// Per-criterion results and their aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitabilityVerdict {
    pub radius_ok: Check,
    pub type_ok: Check,
    pub temp_ok: Check,
    pub zone_ok: Check,
    pub habitable: Check,
}

impl HabitabilityVerdict {
    /// Build a verdict from the four checks, computing the aggregate.
    ///
    /// The aggregate is the AND of the criteria that could be evaluated: a
    /// single `Fail` makes the planet uninhabitable even when other inputs
    /// are missing, so `Fail` takes precedence over `Unknown`. Radius bounds
    /// are inclusive and zone bounds strict; see [`HabitabilityCriteria`].
    pub fn new(radius_ok: Check, type_ok: Check, temp_ok: Check, zone_ok: Check) -> Self {
        let checks = [radius_ok, type_ok, temp_ok, zone_ok];
        let habitable = if checks.contains(&Check::Fail) {
            Check::Fail
        } else if checks.contains(&Check::Unknown) {
            Check::Unknown
        } else {
            Check::Pass
        };
        Self {
            radius_ok,
            type_ok,
            temp_ok,
            zone_ok,
            habitable,
        }
    }

    pub fn get(&self, criterion: Criterion) -> Check {
        match criterion {
            Criterion::Radius => self.radius_ok,
            Criterion::SpectralType => self.type_ok,
            Criterion::Temperature => self.temp_ok,
            Criterion::Zone => self.zone_ok,
        }
    }

    /// Criteria that had the inputs they need.
    pub fn checked(&self) -> Vec<Criterion> {
        Criterion::ALL
            .into_iter()
            .filter(|c| self.get(*c).is_known())
            .collect()
    }

    /// Criteria left undecided by missing inputs.
    pub fn unknown(&self) -> Vec<Criterion> {
        Criterion::ALL
            .into_iter()
            .filter(|c| !self.get(*c).is_known())
            .collect()
    }
}

impl fmt::Display for HabitabilityVerdict {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for criterion in Criterion::ALL {
            writeln!(f, "{:<10} {}", criterion.to_string(), self.get(criterion))?;
        }
        write!(f, "{:<10} {}", "habitable", self.habitable)
    }
}

/// Evaluates [`HabitabilityCriteria`] against derived and stellar values.
#[derive(Debug, Clone, Default)]
pub struct HabitabilityClassifier {
    criteria: HabitabilityCriteria,
}

impl HabitabilityClassifier {
    pub fn new(criteria: HabitabilityCriteria) -> Self {
        Self { criteria }
    }

    pub fn criteria(&self) -> &HabitabilityCriteria {
        &self.criteria
    }

    /// Pure function of its inputs: identical inputs give identical verdicts.
    pub fn classify(
        &self,
        derived: &DerivedParameters,
        star: &StellarParameters,
    ) -> HabitabilityVerdict {
        HabitabilityVerdict::new(
            self.criteria.radius_ok(derived.planet_radius.as_ref()),
            self.criteria.type_ok(star.spectral_type),
            self.criteria.temp_ok(star.temperature.as_ref()),
            self.criteria.zone_ok(
                derived.orbital_radius.as_ref(),
                derived.habitable_zone_inner.as_ref(),
                derived.habitable_zone_outer.as_ref(),
            ),
        )
    }
}
