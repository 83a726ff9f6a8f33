//! Known-planet catalog comparison.
//!
//! Catalog records are only used to show which confirmed planets pass the
//! same criteria as the candidate. They never feed the candidate's verdict.
//!
//! The habitable zone of each record is computed from its luminosity and
//! then widened by a [`ZoneTolerance`] so planets just outside the nominal
//! edges can still be listed.

use std::io::Read;
use std::path::{Path, PathBuf};

use exo_math::Measurement;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::classifier::{Check, HabitabilityCriteria};
use crate::derivation::habitable_zone;
use crate::stellar::SpectralType;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse catalog: {0}")]
    Csv(#[from] csv::Error),
}

/// One confirmed planet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub name: String,
    pub host: String,
    /// Planet radius in Earth radii
    pub radius: Option<f64>,
    /// Orbital period in days
    pub orbital_period: Option<f64>,
    /// Host effective temperature in kelvin
    pub effective_temperature: Option<f64>,
    /// Host spectral type as published, e.g. `"G2 V"`
    pub spectral_type: Option<String>,
    /// Host luminosity in solar luminosities
    pub luminosity: Option<f64>,
    /// Orbital semi-major axis in AU
    pub semi_major_axis: Option<f64>,
}

impl CatalogRecord {
    /// Spectral class parsed from the leading letter, if recognised.
    pub fn spectral_class(&self) -> Option<SpectralType> {
        self.spectral_type.as_deref().and_then(|s| s.parse().ok())
    }
}

/// Anything that can supply catalog records.
pub trait CatalogSource {
    fn records(&self) -> Result<Vec<CatalogRecord>, CatalogError>;
}

/// Catalog exported to a local CSV file with a header row.
#[derive(Debug, Clone)]
pub struct CsvCatalog {
    path: PathBuf,
}

impl CsvCatalog {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Parse records from any CSV reader.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<CatalogRecord>, CatalogError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let records = csv_reader
            .deserialize()
            .collect::<Result<Vec<CatalogRecord>, _>>()?;
        log::debug!("Parsed {} catalog records", records.len());
        Ok(records)
    }
}

impl CatalogSource for CsvCatalog {
    fn records(&self) -> Result<Vec<CatalogRecord>, CatalogError> {
        let file = std::fs::File::open(&self.path)?;
        Self::parse(std::io::BufReader::new(file))
    }
}

impl CatalogSource for Vec<CatalogRecord> {
    fn records(&self) -> Result<Vec<CatalogRecord>, CatalogError> {
        Ok(self.clone())
    }
}

/// How far the zone edges are widened when filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneTolerance {
    /// ±5%
    #[default]
    Strict,
    /// ±15%
    Loose,
}

impl ZoneTolerance {
    pub fn fraction(self) -> f64 {
        match self {
            ZoneTolerance::Strict => 0.05,
            ZoneTolerance::Loose => 0.15,
        }
    }
}

impl std::str::FromStr for ZoneTolerance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(ZoneTolerance::Strict),
            "loose" => Ok(ZoneTolerance::Loose),
            _ => Err(format!(
                "Unknown zone tolerance: {}. Valid options: strict, loose",
                s
            )),
        }
    }
}

/// Catalog exports may carry `NaN` for unknown values; treat those as absent.
fn exact_value(value: f64) -> Option<Measurement> {
    Measurement::new(value, 0.0).ok()
}

/// Selects catalog planets that pass every criterion.
///
/// Records missing any value needed by a criterion are excluded.
#[derive(Debug, Clone, Default)]
pub struct CatalogFilter {
    criteria: HabitabilityCriteria,
    tolerance: ZoneTolerance,
}

impl CatalogFilter {
    pub fn new(criteria: HabitabilityCriteria, tolerance: ZoneTolerance) -> Self {
        Self {
            criteria,
            tolerance,
        }
    }

    pub fn matches(&self, record: &CatalogRecord) -> bool {
        let radius = record.radius.and_then(exact_value);
        let temperature = record.effective_temperature.and_then(exact_value);

        self.criteria.radius_ok(radius.as_ref()) == Check::Pass
            && self.criteria.temp_ok(temperature.as_ref()) == Check::Pass
            && self.criteria.type_ok(record.spectral_class()) == Check::Pass
            && self.in_widened_zone(record)
    }

    fn in_widened_zone(&self, record: &CatalogRecord) -> bool {
        let (Some(luminosity), Some(a)) = (
            record.luminosity.and_then(exact_value),
            record.semi_major_axis.and_then(exact_value),
        ) else {
            return false;
        };
        let Ok((inner, outer)) = habitable_zone(&luminosity) else {
            return false;
        };
        let tolerance = self.tolerance.fraction();
        let inner = inner.scale(1.0 - tolerance);
        let outer = outer.scale(1.0 + tolerance);
        a.strictly_between(&inner, &outer)
    }

    /// Records from `source` that pass the filter, in source order.
    pub fn apply(&self, source: &dyn CatalogSource) -> Result<Vec<CatalogRecord>, CatalogError> {
        let records = source.records()?;
        let total = records.len();
        let kept: Vec<CatalogRecord> = records.into_iter().filter(|r| self.matches(r)).collect();
        log::info!(
            "{} of {} catalog planets pass the criteria ({:?} zone tolerance)",
            kept.len(),
            total,
            self.tolerance
        );
        Ok(kept)
    }
}
