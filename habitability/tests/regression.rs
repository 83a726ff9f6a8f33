//! Fixed regression scenario: a TRAPPIST-1-like ultracool M dwarf host.

use approx::{assert_abs_diff_eq, assert_relative_eq};
use exo_math::Measurement;
use habitability::{
    Check, Criterion, ManualInput, PipelineConfig, PipelineContext, SpectralType,
    StellarParameters,
};
use transit::TransitCandidate;

fn m(nominal: f64, sigma: f64) -> Measurement {
    Measurement::new(nominal, sigma).unwrap()
}

fn trappist_star() -> StellarParameters {
    StellarParameters::default()
        .with_mass(m(0.0898, 0.0023))
        .with_radius(m(0.1192, 0.0013))
        .with_luminosity(m(0.000522, 0.000022))
        .with_temperature(m(2566.0, 26.0))
        .with_spectral_type(SpectralType::M)
}

fn trappist_candidate() -> TransitCandidate {
    TransitCandidate {
        period: 1.51,
        epoch: 0.0,
        duration: 0.025,
        depth: m(0.0076, 0.0003),
        snr: 25.0,
        sde: 12.0,
        power: 30.0,
        transit_count: 12,
        folded: None,
    }
}

#[test]
fn test_trappist_verdict() {
    let context = PipelineContext::new(PipelineConfig::default()).unwrap();
    let assessment = context
        .assess_candidate(trappist_candidate(), &trappist_star())
        .unwrap();
    let verdict = assessment.verdict;

    assert_eq!(verdict.type_ok, Check::Pass);
    assert_eq!(verdict.temp_ok, Check::Fail);
    assert_eq!(verdict.radius_ok, Check::Pass);
    // 0.0115 AU lies inside the 0.0218 AU inner edge
    assert_eq!(verdict.zone_ok, Check::Fail);
    assert_eq!(verdict.habitable, Check::Fail);
    assert_eq!(verdict.checked(), Criterion::ALL.to_vec());
}

#[test]
fn test_trappist_derived_values() {
    let context = PipelineContext::new(PipelineConfig::default()).unwrap();
    let assessment = context
        .assess_candidate(trappist_candidate(), &trappist_star())
        .unwrap();
    let derived = assessment.derived;

    let radius = derived.planet_radius.unwrap();
    assert_abs_diff_eq!(radius.nominal, 1.13, epsilon = 0.01);
    let expected_rel = ((0.5 * 0.0003 / 0.0076_f64).powi(2) + (0.0013 / 0.1192_f64).powi(2)).sqrt();
    assert_relative_eq!(radius.relative_sigma(), expected_rel, epsilon = 1e-9);

    let orbit = derived.orbital_radius.unwrap();
    assert_abs_diff_eq!(orbit.nominal, 0.01154, epsilon = 2e-4);
    assert_relative_eq!(orbit.relative_sigma(), 0.0023 / 0.0898 / 3.0, epsilon = 1e-9);

    assert_abs_diff_eq!(derived.habitable_zone_inner.unwrap().nominal, 0.02178, epsilon = 2e-4);
    assert_abs_diff_eq!(derived.habitable_zone_outer.unwrap().nominal, 0.03138, epsilon = 2e-4);
}

#[test]
fn test_trappist_manual_path_matches() {
    let context = PipelineContext::new(PipelineConfig::default()).unwrap();
    let from_candidate = context
        .assess_candidate(trappist_candidate(), &trappist_star())
        .unwrap();

    let input = ManualInput {
        star: trappist_star(),
        planet_radius: from_candidate.derived.planet_radius,
        orbital_radius: None,
        orbital_period: Some(1.51),
    };
    let manual = context.assess_manual(&input).unwrap();

    assert_eq!(manual.derived, from_candidate.derived);
    assert_eq!(manual.verdict, from_candidate.verdict);
}

#[test]
fn test_trappist_is_repeatable_and_serializable() {
    let context = PipelineContext::new(PipelineConfig::default()).unwrap();
    let first = context
        .assess_candidate(trappist_candidate(), &trappist_star())
        .unwrap();
    let second = context
        .assess_candidate(trappist_candidate(), &trappist_star())
        .unwrap();
    assert_eq!(first, second);

    let json = serde_json::to_value(&first).unwrap();
    assert_eq!(json["verdict"]["habitable"], "fail");
    assert_eq!(json["verdict"]["type_ok"], "pass");
    assert!(json["candidate"]["depth"]["nominal"].as_f64().is_some());
}
