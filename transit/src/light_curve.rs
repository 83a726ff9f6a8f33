//! Photometric time series storage and CSV I/O.
//!
//! A [`LightCurve`] is an ordered set of `(time, flux)` samples with time in
//! days. The constructor enforces the invariants every downstream stage
//! relies on: matching lengths, finite values and strictly increasing time.
//!
//! CSV files use a header row with at least `time` and `flux` columns. Extra
//! columns (for example `flux_err`) are ignored. Rows with a missing or
//! non-finite flux are dropped with a warning, mirroring how photometry
//! exports mark gaps.

use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;

use crate::error::TransitError;

#[derive(Debug, Deserialize)]
struct CsvSample {
    time: f64,
    flux: Option<f64>,
}

#[derive(Debug, Serialize)]
struct CsvRecord {
    time: f64,
    flux: f64,
}

/// Validated brightness time series.
#[derive(Debug, Clone, PartialEq)]
pub struct LightCurve {
    time: Array1<f64>,
    flux: Array1<f64>,
}

impl LightCurve {
    /// Build a light curve from time and flux columns.
    ///
    /// # Errors
    /// [`TransitError::InvalidLightCurve`] when lengths differ, a value is not
    /// finite, or time is not strictly increasing.
    pub fn new(time: Array1<f64>, flux: Array1<f64>) -> Result<Self, TransitError> {
        if time.len() != flux.len() {
            return Err(TransitError::InvalidLightCurve(format!(
                "time has {} samples but flux has {}",
                time.len(),
                flux.len()
            )));
        }

        if let Some(i) = time.iter().position(|t| !t.is_finite()) {
            return Err(TransitError::InvalidLightCurve(format!(
                "non-finite time at index {i}"
            )));
        }
        if let Some(i) = flux.iter().position(|f| !f.is_finite()) {
            return Err(TransitError::InvalidLightCurve(format!(
                "non-finite flux at index {i}"
            )));
        }

        for i in 1..time.len() {
            if time[i] <= time[i - 1] {
                return Err(TransitError::InvalidLightCurve(format!(
                    "time must be strictly increasing: t[{}]={} <= t[{}]={}",
                    i,
                    time[i],
                    i - 1,
                    time[i - 1]
                )));
            }
        }

        Ok(Self { time, flux })
    }

    /// Build a light curve from plain vectors.
    pub fn from_vecs(time: Vec<f64>, flux: Vec<f64>) -> Result<Self, TransitError> {
        Self::new(Array1::from(time), Array1::from(flux))
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// True when the curve holds no samples.
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Sample times in days.
    pub fn time(&self) -> ArrayView1<'_, f64> {
        self.time.view()
    }

    /// Flux values (dimensionless after normalization).
    pub fn flux(&self) -> ArrayView1<'_, f64> {
        self.flux.view()
    }

    /// Iterate over `(time, flux)` pairs.
    pub fn samples(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.time.iter().copied().zip(self.flux.iter().copied())
    }

    /// Time span between the first and last sample in days.
    pub fn baseline(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.time[self.len() - 1] - self.time[0]
    }

    /// Median spacing between consecutive samples in days.
    ///
    /// Returns `None` for curves with fewer than two samples.
    pub fn median_cadence(&self) -> Option<f64> {
        if self.len() < 2 {
            return None;
        }
        let diffs: Vec<f64> = self.time.windows(2).into_iter().map(|w| w[1] - w[0]).collect();
        exo_math::median(&diffs).ok()
    }

    /// Keep the samples whose mask entry is true.
    pub(crate) fn select(&self, keep: &[bool]) -> LightCurve {
        let (time, flux): (Vec<f64>, Vec<f64>) = self
            .samples()
            .zip(keep.iter())
            .filter(|(_, &k)| k)
            .map(|(sample, _)| sample)
            .unzip();
        LightCurve {
            time: Array1::from(time),
            flux: Array1::from(flux),
        }
    }

    /// Read `time,flux` CSV from any reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, TransitError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        for column in ["time", "flux"] {
            if !headers.iter().any(|h| h == column) {
                return Err(TransitError::InvalidLightCurve(format!(
                    "CSV is missing required '{column}' column"
                )));
            }
        }

        let mut time = Vec::new();
        let mut flux = Vec::new();
        let mut dropped = 0usize;

        for row in csv_reader.deserialize::<CsvSample>() {
            let sample = row?;
            match sample.flux {
                Some(f) if f.is_finite() && sample.time.is_finite() => {
                    time.push(sample.time);
                    flux.push(f);
                }
                _ => dropped += 1,
            }
        }

        if dropped > 0 {
            log::warn!("Dropped {dropped} CSV rows with missing or non-finite values");
        }
        log::debug!("Loaded {} light-curve samples", time.len());

        Self::from_vecs(time, flux)
    }

    /// Read a `time,flux` CSV file.
    pub fn from_csv_path(path: &Path) -> Result<Self, TransitError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// Write the samples as `time,flux` CSV.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), TransitError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for (time, flux) in self.samples() {
            csv_writer.serialize(CsvRecord { time, flux })?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    /// Write the samples to a CSV file, creating parent directories.
    pub fn save_csv(&self, path: &Path) -> Result<(), TransitError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = std::fs::File::create(path)?;
        self.write_csv(std::io::BufWriter::new(file))
    }
}
