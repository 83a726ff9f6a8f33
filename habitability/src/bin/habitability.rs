//! Command-line front end for the habitability pipeline.
//!
//! ```text
//! habitability manual --planet-radius 1.0 --orbital-radius 1.0 \
//!     --luminosity 1.0:0.05 --temperature 5772 --type G
//! habitability light-curve curve.csv --mass 0.0898:0.0023 --radius 0.1192:0.0013
//! habitability simulate synthetic.csv --period 3.0 --depth 0.01
//! habitability catalog planets.csv --tolerance loose
//! ```
//!
//! Measurements are given as `value` or `value:sigma`. `--json` prints
//! machine-readable output; `--config` loads a pipeline configuration file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use exo_math::Measurement;
use habitability::{
    km_to_au, km_to_earth_radii, Assessment, CatalogFilter, CsvCatalog, ManualInput,
    PipelineConfig, PipelineContext, SpectralType, StellarParameters, ZoneTolerance,
};
use transit::{FoldedModel, LightCurve, SyntheticLightCurve, SyntheticTransit};

#[derive(Parser)]
#[command(author, version, about = "Assess exoplanet habitability", long_about = None)]
struct Cli {
    /// Pipeline configuration JSON file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print JSON instead of a text summary
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Host-star parameters shared by the assessment commands
#[derive(Args, Debug, Clone)]
struct StarArgs {
    /// Stellar mass in solar masses
    #[arg(long)]
    mass: Option<Measurement>,

    /// Stellar radius in solar radii
    #[arg(long)]
    radius: Option<Measurement>,

    /// Stellar luminosity in solar luminosities
    #[arg(long)]
    luminosity: Option<Measurement>,

    /// Effective temperature in kelvin
    #[arg(long)]
    temperature: Option<Measurement>,

    /// Spectral type (O, B, A, F, G, K or M)
    #[arg(long = "type")]
    spectral_type: Option<SpectralType>,
}

impl StarArgs {
    fn to_parameters(&self) -> StellarParameters {
        StellarParameters {
            mass: self.mass,
            radius: self.radius,
            luminosity: self.luminosity,
            temperature: self.temperature,
            spectral_type: self.spectral_type,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Assess directly supplied planet and star values
    Manual {
        #[command(flatten)]
        star: StarArgs,

        /// Planet radius in Earth radii
        #[arg(long, conflicts_with = "planet_radius_km")]
        planet_radius: Option<Measurement>,

        /// Planet radius in kilometres
        #[arg(long)]
        planet_radius_km: Option<Measurement>,

        /// Orbital radius in AU
        #[arg(long, conflicts_with = "orbital_radius_km")]
        orbital_radius: Option<Measurement>,

        /// Orbital radius in kilometres
        #[arg(long)]
        orbital_radius_km: Option<Measurement>,

        /// Orbital period in days, used with --mass when no orbital radius is given
        #[arg(long)]
        period_days: Option<f64>,
    },

    /// Detect a transit in a time,flux CSV and assess the planet
    LightCurve {
        /// Light-curve CSV with `time` (days) and `flux` columns
        csv: PathBuf,

        #[command(flatten)]
        star: StarArgs,

        /// Write the folded curve and box model to this CSV
        #[arg(long)]
        folded_output: Option<PathBuf>,
    },

    /// Write a synthetic light curve with an injected transit
    Simulate {
        /// Output CSV path
        output: PathBuf,

        /// Baseline in days
        #[arg(long, default_value_t = 27.0)]
        baseline: f64,

        /// Cadence in days
        #[arg(long, default_value_t = 0.01)]
        cadence: f64,

        /// Gaussian noise sigma (relative flux)
        #[arg(long, default_value_t = 0.001)]
        noise: f64,

        /// Transit period in days
        #[arg(long, default_value_t = 3.0)]
        period: f64,

        /// Mid-time of a reference transit in days
        #[arg(long, default_value_t = 1.3)]
        epoch: f64,

        /// Transit duration in days
        #[arg(long, default_value_t = 0.3)]
        duration: f64,

        /// Transit depth (fractional)
        #[arg(long, default_value_t = 0.01)]
        depth: f64,

        /// Sinusoidal variability amplitude (fractional)
        #[arg(long, default_value_t = 0.0)]
        variability: f64,

        /// Variability period in days
        #[arg(long, default_value_t = 5.0)]
        variability_period: f64,

        /// Random seed
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },

    /// List catalog planets that pass the habitability criteria
    Catalog {
        /// Catalog CSV export
        csv: PathBuf,

        /// Zone tolerance: strict (±5%) or loose (±15%)
        #[arg(long, default_value = "strict")]
        tolerance: ZoneTolerance,
    },

    /// Write the default pipeline configuration as JSON
    InitConfig {
        /// Output JSON path
        output: PathBuf,
    },
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => PipelineConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(PipelineConfig::default()),
    }
}

fn print_assessment(assessment: &Assessment, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(assessment)?);
        return Ok(());
    }

    if let Some(candidate) = &assessment.candidate {
        println!("Transit candidate");
        println!("  period:        {:.5} d", candidate.period);
        println!("  epoch:         {:.5} d", candidate.epoch);
        println!("  duration:      {:.4} d", candidate.duration);
        println!("  depth:         {:.6}", candidate.depth);
        println!("  SNR:           {:.1}", candidate.snr);
        println!("  SDE:           {:.1}", candidate.sde);
        println!("  transits:      {}", candidate.transit_count);
        println!();
    }

    let show = |label: &str, value: Option<Measurement>, unit: &str| match value {
        Some(m) => println!("  {label:<14} {m:.4} {unit}"),
        None => println!("  {label:<14} unknown"),
    };
    let derived = &assessment.derived;
    println!("Derived parameters");
    show("planet radius:", derived.planet_radius, "R_earth");
    show("orbital radius:", derived.orbital_radius, "AU");
    show("HZ inner:", derived.habitable_zone_inner, "AU");
    show("HZ outer:", derived.habitable_zone_outer, "AU");
    show("stellar log g:", assessment.stellar_log_g, "cgs");
    println!();

    println!("Verdict");
    for line in assessment.verdict.to_string().lines() {
        println!("  {line}");
    }
    Ok(())
}

fn write_folded(path: &Path, folded: &FoldedModel) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    writer.write_record(["phase", "flux", "model"])?;
    for ((phase, flux), model) in folded
        .phase
        .iter()
        .zip(folded.flux.iter())
        .zip(folded.model.iter())
    {
        writer.write_record(&[phase.to_string(), flux.to_string(), model.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Manual {
            star,
            planet_radius,
            planet_radius_km,
            orbital_radius,
            orbital_radius_km,
            period_days,
        } => {
            let context = PipelineContext::new(load_config(cli.config.as_deref())?)?;
            let input = ManualInput {
                star: star.to_parameters(),
                planet_radius: planet_radius.or(planet_radius_km.as_ref().map(km_to_earth_radii)),
                orbital_radius: orbital_radius.or(orbital_radius_km.as_ref().map(km_to_au)),
                orbital_period: period_days,
            };
            let assessment = context
                .assess_manual(&input)
                .context("Manual assessment failed")?;
            print_assessment(&assessment, cli.json)?;
        }

        Commands::LightCurve {
            csv,
            star,
            folded_output,
        } => {
            let context = PipelineContext::new(load_config(cli.config.as_deref())?)?;
            let curve = LightCurve::from_csv_path(&csv)
                .with_context(|| format!("Failed to read light curve {}", csv.display()))?;
            log::info!("Loaded {} samples from {}", curve.len(), csv.display());

            let assessment = context
                .assess_light_curve(&curve, &star.to_parameters())
                .context("Light-curve assessment failed")?;

            if let Some(path) = folded_output {
                match assessment.candidate.as_ref().and_then(|c| c.folded.as_ref()) {
                    Some(folded) => {
                        write_folded(&path, folded)?;
                        log::info!("Wrote folded light curve to {}", path.display());
                    }
                    None => log::warn!("Folded model disabled in config; nothing written"),
                }
            }
            print_assessment(&assessment, cli.json)?;
        }

        Commands::Simulate {
            output,
            baseline,
            cadence,
            noise,
            period,
            epoch,
            duration,
            depth,
            variability,
            variability_period,
            seed,
        } => {
            let curve = SyntheticLightCurve {
                baseline,
                cadence,
                noise_sigma: noise,
                seed,
                ..SyntheticLightCurve::default()
            }
            .with_transit(SyntheticTransit {
                period,
                epoch,
                duration,
                depth,
            })
            .with_variability(variability, variability_period)
            .generate()
            .context("Failed to generate synthetic light curve")?;

            curve
                .save_csv(&output)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            log::info!("Wrote {} samples to {}", curve.len(), output.display());
        }

        Commands::Catalog { csv, tolerance } => {
            let config = load_config(cli.config.as_deref())?;
            let filter = CatalogFilter::new(config.criteria, tolerance);
            let kept = filter
                .apply(&CsvCatalog::new(&csv))
                .with_context(|| format!("Failed to filter catalog {}", csv.display()))?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&kept)?);
            } else {
                println!("{:<24} {:<16} {:>8} {:>10}", "planet", "host", "R_earth", "a (AU)");
                for record in &kept {
                    println!(
                        "{:<24} {:<16} {:>8.2} {:>10.3}",
                        record.name,
                        record.host,
                        record.radius.unwrap_or(f64::NAN),
                        record.semi_major_axis.unwrap_or(f64::NAN)
                    );
                }
            }
        }

        Commands::InitConfig { output } => {
            PipelineConfig::default()
                .save_to_file(&output)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("Wrote default configuration to {}", output.display());
        }
    }

    Ok(())
}
