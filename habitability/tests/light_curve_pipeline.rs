//! Synthetic light curves through cleaning, smoothing, search and derivation.

use exo_math::Measurement;
use habitability::{
    Check, PipelineConfig, PipelineContext, PipelineError, SpectralType, StellarParameters,
};
use transit::{LightCurve, SyntheticLightCurve, SyntheticTransit, TransitError};

fn sun() -> StellarParameters {
    StellarParameters::default()
        .with_mass(Measurement::new(1.0, 0.02).unwrap())
        .with_radius(Measurement::new(1.0, 0.01).unwrap())
        .with_luminosity(Measurement::new(1.0, 0.05).unwrap())
        .with_temperature(Measurement::new(5772.0, 50.0).unwrap())
        .with_spectral_type(SpectralType::G)
}

fn variable_star_with_transit() -> LightCurve {
    SyntheticLightCurve::default()
        .with_transit(SyntheticTransit {
            period: 3.0,
            epoch: 1.3,
            duration: 0.3,
            depth: 0.01,
        })
        .with_variability(0.005, 6.0)
        .generate()
        .unwrap()
}

#[test]
fn test_detects_transit_through_variability() {
    let context = PipelineContext::new(PipelineConfig::default()).unwrap();
    let candidate = context.detect(&variable_star_with_transit()).unwrap();

    assert!(
        (candidate.period - 3.0).abs() / 3.0 < 0.01,
        "period = {}",
        candidate.period
    );
    assert!(
        candidate.depth.nominal > 0.009 && candidate.depth.nominal < 0.011,
        "depth = {}",
        candidate.depth
    );
    assert!(candidate.depth.sigma > 0.0);
    assert!(candidate.transit_count >= 6);
}

#[test]
fn test_full_assessment_of_synthetic_curve() {
    let context = PipelineContext::new(PipelineConfig::default()).unwrap();
    let assessment = context
        .assess_light_curve(&variable_star_with_transit(), &sun())
        .unwrap();

    let candidate = assessment.candidate.as_ref().unwrap();
    let derived = &assessment.derived;

    // A 1% dip on a solar-radius star is a ~10.9 Earth-radius planet
    let radius = derived.planet_radius.unwrap();
    assert!(radius.nominal > 9.0 && radius.nominal < 12.5, "radius = {radius}");
    assert!(radius.sigma > 0.0);

    // A 3 day orbit around a solar-mass star sits near 0.04 AU
    let orbit = derived.orbital_radius.unwrap();
    assert!((orbit.nominal - 0.0407).abs() < 0.001, "orbit = {orbit}");
    assert!(candidate.period > 2.97 && candidate.period < 3.03);

    let verdict = assessment.verdict;
    assert_eq!(verdict.radius_ok, Check::Fail);
    assert_eq!(verdict.zone_ok, Check::Fail);
    assert_eq!(verdict.type_ok, Check::Pass);
    assert_eq!(verdict.temp_ok, Check::Pass);
    assert_eq!(verdict.habitable, Check::Fail);
}

#[test]
fn test_missing_luminosity_leaves_zone_unknown() {
    let star = StellarParameters {
        luminosity: None,
        ..sun()
    };
    let context = PipelineContext::new(PipelineConfig::default()).unwrap();
    let assessment = context
        .assess_light_curve(&variable_star_with_transit(), &star)
        .unwrap();

    assert_eq!(assessment.verdict.zone_ok, Check::Unknown);
    assert!(assessment.derived.habitable_zone_inner.is_none());
    // radius already fails, so the aggregate is decided regardless
    assert_eq!(assessment.verdict.habitable, Check::Fail);
}

#[test]
fn test_curve_shorter_than_smoothing_window() {
    let curve = SyntheticLightCurve {
        baseline: 0.2,
        ..SyntheticLightCurve::default()
    }
    .generate()
    .unwrap();
    assert_eq!(curve.len(), 21);

    let context = PipelineContext::new(PipelineConfig::default()).unwrap();
    match context.assess_light_curve(&curve, &sun()) {
        Err(PipelineError::Transit(TransitError::InsufficientData { required, actual })) => {
            assert_eq!(required, 25);
            assert_eq!(actual, 21);
        }
        other => panic!("expected InsufficientData, got {other:?}"),
    }
}

#[test]
fn test_csv_roundtrip_feeds_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("synthetic.csv");
    let curve = variable_star_with_transit();
    curve.save_csv(&path).unwrap();

    let loaded = LightCurve::from_csv_path(&path).unwrap();
    let context = PipelineContext::new(PipelineConfig::default()).unwrap();
    let from_file = context.detect(&loaded).unwrap();
    let from_memory = context.detect(&curve).unwrap();
    assert!((from_file.period - from_memory.period).abs() < 1e-9);
}
