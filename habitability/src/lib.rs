//! Habitability assessment for exoplanet candidates.
//!
//! Combines a detected (or directly supplied) planet with its host star:
//!
//! - [`derivation`] converts transit depth, period and stellar parameters into
//!   planet radius, orbital radius and habitable-zone edges, carrying
//!   uncertainty through [`exo_math::Measurement`]
//! - [`classifier`] applies the four habitability criteria
//! - [`pipeline`] wires light-curve processing, transit search, derivation
//!   and classification into a per-request [`PipelineContext`]
//! - [`catalog`] filters known planets with the same criteria for
//!   comparison
//!
//! # Example
//!
//! ```
//! use exo_math::Measurement;
//! use habitability::{
//!     Check, ManualInput, PipelineConfig, PipelineContext, SpectralType, StellarParameters,
//! };
//!
//! let context = PipelineContext::new(PipelineConfig::default()).unwrap();
//! let input = ManualInput {
//!     star: StellarParameters::default()
//!         .with_luminosity(Measurement::exact(1.0))
//!         .with_temperature(Measurement::exact(5772.0))
//!         .with_spectral_type(SpectralType::G),
//!     planet_radius: Some(Measurement::exact(1.0)),
//!     orbital_radius: Some(Measurement::exact(1.0)),
//!     orbital_period: None,
//! };
//! let assessment = context.assess_manual(&input).unwrap();
//! assert_eq!(assessment.verdict.habitable, Check::Pass);
//! ```

pub mod catalog;
pub mod classifier;
pub mod config;
pub mod constants;
pub mod derivation;
pub mod pipeline;
pub mod stellar;

pub use catalog::{
    CatalogError, CatalogFilter, CatalogRecord, CatalogSource, CsvCatalog, ZoneTolerance,
};
pub use classifier::{
    Check, Criterion, HabitabilityClassifier, HabitabilityCriteria, HabitabilityVerdict,
};
pub use config::{ConfigError, PipelineConfig};
pub use derivation::{
    habitable_zone, km_to_au, km_to_earth_radii, orbital_radius, planet_radius, surface_gravity,
    DerivationError, DerivedParameters,
};
pub use pipeline::{Assessment, ManualInput, PipelineContext, PipelineError};
pub use stellar::{SpectralType, StellarParameters};
