//! Request-scoped assessment pipeline.
//!
//! A [`PipelineContext`] is built once from a [`PipelineConfig`] and holds
//! every stage. It carries no mutable state, so one context can serve many
//! independent assessments.
//!
//! Two entry points exist:
//!
//! * [`PipelineContext::assess_manual`] takes planet and stellar values as
//!   given; anything absent leaves its criterion unknown
//! * [`PipelineContext::assess_light_curve`] detects a transit first and
//!   requires stellar mass and radius to turn it into physical quantities

use exo_math::Measurement;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use transit::{LightCurve, LightCurveProcessor, TransitCandidate, TransitError, TransitSearch};

use crate::classifier::{HabitabilityClassifier, HabitabilityVerdict};
use crate::config::{ConfigError, PipelineConfig};
use crate::derivation::{
    habitable_zone, orbital_radius, planet_radius, surface_gravity, DerivationError,
    DerivedParameters,
};
use crate::stellar::StellarParameters;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Transit(#[from] TransitError),

    #[error(transparent)]
    Derivation(#[from] DerivationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A stellar parameter required by the light-curve path is absent.
    #[error("missing required stellar parameter: {0}")]
    MissingParameter(&'static str),
}

/// Values supplied directly on the manual path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManualInput {
    pub star: StellarParameters,
    /// Planet radius in Earth radii
    pub planet_radius: Option<Measurement>,
    /// Orbital semi-major axis in AU
    pub orbital_radius: Option<Measurement>,
    /// Orbital period in days, used when no orbital radius is given
    pub orbital_period: Option<f64>,
}

/// Everything produced by one assessment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    /// Detected transit, on the light-curve path only
    pub candidate: Option<TransitCandidate>,
    pub derived: DerivedParameters,
    /// Stellar `log g` (cgs) when mass and radius are known
    pub stellar_log_g: Option<Measurement>,
    pub verdict: HabitabilityVerdict,
}

/// Stages configured for one or more requests.
#[derive(Debug, Clone)]
pub struct PipelineContext {
    config: PipelineConfig,
    processor: LightCurveProcessor,
    search: TransitSearch,
    classifier: HabitabilityClassifier,
}

impl PipelineContext {
    /// Validate `config` and build every stage from it.
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self {
            processor: LightCurveProcessor::new(config.processing.clone()),
            search: TransitSearch::new(config.search.clone()),
            classifier: HabitabilityClassifier::new(config.criteria.clone()),
            config,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Clean, smooth and search a raw light curve.
    pub fn detect(&self, raw: &LightCurve) -> Result<TransitCandidate, PipelineError> {
        let cleaned = self.processor.clean(raw)?;
        let smoothed = self.processor.smooth(&cleaned)?;
        log::debug!(
            "Light curve: {} raw, {} cleaned, {} smoothed samples",
            raw.len(),
            cleaned.len(),
            smoothed.len()
        );
        Ok(self.search.search(&smoothed)?)
    }

    /// Assess directly supplied values.
    ///
    /// The orbital radius is taken from the input, or derived from the
    /// orbital period and stellar mass when both are present.
    pub fn assess_manual(&self, input: &ManualInput) -> Result<Assessment, PipelineError> {
        let star = &input.star;
        let orbital = match (input.orbital_radius, input.orbital_period, star.mass) {
            (Some(a), _, _) => Some(a),
            (None, Some(period), Some(mass)) => Some(orbital_radius(period, &mass)?),
            _ => None,
        };

        let derived = self.derive(star, input.planet_radius, orbital)?;
        self.finish(None, derived, star)
    }

    /// Detect a transit in `raw` and assess the resulting planet.
    ///
    /// # Errors
    /// [`PipelineError::MissingParameter`] when stellar mass or radius is
    /// absent, checked before the search runs.
    pub fn assess_light_curve(
        &self,
        raw: &LightCurve,
        star: &StellarParameters,
    ) -> Result<Assessment, PipelineError> {
        require(star)?;
        let candidate = self.detect(raw)?;
        self.assess_candidate(candidate, star)
    }

    /// Assess an already detected transit.
    pub fn assess_candidate(
        &self,
        candidate: TransitCandidate,
        star: &StellarParameters,
    ) -> Result<Assessment, PipelineError> {
        let (mass, radius) = require(star)?;
        let planet = planet_radius(&candidate.depth, &radius)?;
        let orbital = orbital_radius(candidate.period, &mass)?;

        let derived = self.derive(star, Some(planet), Some(orbital))?;
        self.finish(Some(candidate), derived, star)
    }

    fn derive(
        &self,
        star: &StellarParameters,
        planet_radius: Option<Measurement>,
        orbital_radius: Option<Measurement>,
    ) -> Result<DerivedParameters, DerivationError> {
        let zone = star.luminosity.as_ref().map(habitable_zone).transpose()?;
        Ok(DerivedParameters {
            planet_radius,
            orbital_radius,
            habitable_zone_inner: zone.map(|(inner, _)| inner),
            habitable_zone_outer: zone.map(|(_, outer)| outer),
        })
    }

    fn finish(
        &self,
        candidate: Option<TransitCandidate>,
        derived: DerivedParameters,
        star: &StellarParameters,
    ) -> Result<Assessment, PipelineError> {
        let stellar_log_g = match (star.mass, star.radius) {
            (Some(mass), Some(radius)) => Some(surface_gravity(&mass, &radius)?),
            _ => None,
        };

        let verdict = self.classifier.classify(&derived, star);
        let unknown = verdict.unknown();
        if unknown.is_empty() {
            log::info!("Habitability verdict: {}", verdict.habitable);
        } else {
            log::info!(
                "Habitability verdict: {} ({} criteria unknown)",
                verdict.habitable,
                unknown.len()
            );
        }

        Ok(Assessment {
            candidate,
            derived,
            stellar_log_g,
            verdict,
        })
    }
}

fn require(star: &StellarParameters) -> Result<(Measurement, Measurement), PipelineError> {
    let mass = star.mass.ok_or(PipelineError::MissingParameter("mass"))?;
    let radius = star.radius.ok_or(PipelineError::MissingParameter("radius"))?;
    Ok((mass, radius))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Check;
    use crate::stellar::SpectralType;
    use approx::assert_abs_diff_eq;

    fn context() -> PipelineContext {
        PipelineContext::new(PipelineConfig::default()).unwrap()
    }

    fn sun() -> StellarParameters {
        StellarParameters::default()
            .with_mass(Measurement::exact(1.0))
            .with_radius(Measurement::exact(1.0))
            .with_luminosity(Measurement::exact(1.0))
            .with_temperature(Measurement::exact(5772.0))
            .with_spectral_type(SpectralType::G)
    }

    #[test]
    fn test_manual_earth() {
        let input = ManualInput {
            star: sun(),
            planet_radius: Some(Measurement::exact(1.0)),
            orbital_radius: Some(Measurement::exact(1.0)),
            orbital_period: None,
        };
        let assessment = context().assess_manual(&input).unwrap();
        assert_eq!(assessment.verdict.habitable, Check::Pass);
        assert!(assessment.candidate.is_none());
        assert_abs_diff_eq!(assessment.stellar_log_g.unwrap().nominal, 4.438, epsilon = 1e-3);
    }

    #[test]
    fn test_manual_derives_orbit_from_period() {
        let input = ManualInput {
            star: sun(),
            planet_radius: Some(Measurement::exact(1.0)),
            orbital_radius: None,
            orbital_period: Some(365.25),
        };
        let assessment = context().assess_manual(&input).unwrap();
        let a = assessment.derived.orbital_radius.unwrap();
        assert_abs_diff_eq!(a.nominal, 1.0, epsilon = 1e-3);
        assert_eq!(assessment.verdict.zone_ok, Check::Pass);
    }

    #[test]
    fn test_manual_missing_inputs_are_unknown() {
        let input = ManualInput {
            star: StellarParameters::default().with_spectral_type(SpectralType::K),
            ..ManualInput::default()
        };
        let assessment = context().assess_manual(&input).unwrap();
        assert_eq!(assessment.verdict.type_ok, Check::Pass);
        assert_eq!(assessment.verdict.radius_ok, Check::Unknown);
        assert_eq!(assessment.verdict.zone_ok, Check::Unknown);
        assert_eq!(assessment.verdict.habitable, Check::Unknown);
        assert!(assessment.stellar_log_g.is_none());
    }

    #[test]
    fn test_manual_rejects_non_positive_luminosity() {
        let input = ManualInput {
            star: StellarParameters::default().with_luminosity(Measurement::exact(0.0)),
            ..ManualInput::default()
        };
        assert!(matches!(
            context().assess_manual(&input),
            Err(PipelineError::Derivation(DerivationError::InvalidParameter { .. }))
        ));
    }

    #[test]
    fn test_light_curve_requires_mass_and_radius() {
        let curve = LightCurve::from_vecs(vec![0.0, 1.0], vec![1.0, 1.0]).unwrap();
        let star = StellarParameters::default().with_radius(Measurement::exact(1.0));
        assert!(matches!(
            context().assess_light_curve(&curve, &star),
            Err(PipelineError::MissingParameter("mass"))
        ));

        let star = StellarParameters::default().with_mass(Measurement::exact(1.0));
        assert!(matches!(
            context().assess_light_curve(&curve, &star),
            Err(PipelineError::MissingParameter("radius"))
        ));
    }

    #[test]
    fn test_light_curve_too_short_to_smooth() {
        let curve = LightCurve::from_vecs(
            (0..10).map(|i| i as f64).collect(),
            vec![1.0; 10],
        )
        .unwrap();
        assert!(matches!(
            context().assess_light_curve(&curve, &sun()),
            Err(PipelineError::Transit(TransitError::InsufficientData { .. }))
        ));
    }

    #[test]
    fn test_context_rejects_invalid_config() {
        let mut config = PipelineConfig::default();
        config.search.oversampling_factor = 2;
        assert!(matches!(
            PipelineContext::new(config),
            Err(PipelineError::Config(ConfigError::Invalid(_)))
        ));
    }
}
