//! Oversampled refinement of a coarse periodogram peak.
//!
//! The refinement zooms in on the coarse `(period, epoch, duration)` in
//! [`REFINE_PASSES`] passes. The first pass scans
//!
//! * periods `P0 + k * step / os` for `k` in `-os..=os`, where `step` is
//!   the coarse grid spacing at `P0`, so the pass covers one coarse step
//!   either side
//! * epoch offsets `j * d0 / (2 * os)` for `j` in `-os..=os`
//! * durations `d0 * ratio^j` spanning `[d0 / 2, 2 * d0]`
//!
//! and each later pass recentres on the best trial with period and epoch
//! steps divided by `os` again and durations within `ratio^±os`. The
//! reference epoch is moved to the transit nearest the middle of the data,
//! so a residual period error smears the outermost transits symmetrically.
//!
//! For each trial period the curve is folded once and sorted, so every
//! epoch/duration box is two binary searches into prefix sums. The box with
//! the largest `s_in^2 * N / (n_in * n_out)` wins, and depth plus its
//! uncertainty come from a box model fitted at that ephemeris.

use std::collections::BTreeSet;

use exo_math::Measurement;

use super::bls::BoxFit;
use super::fold::wrap_phase;
use super::scatter::{red_noise_factor, SIGMA_FLOOR};
use super::{FoldedModel, SearchConfig};
use crate::error::TransitError;

/// Number of zoom passes over the refinement grid.
pub(crate) const REFINE_PASSES: usize = 2;

/// Result of the refinement pass.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RefinedFit {
    pub period: f64,
    pub epoch: f64,
    pub duration: f64,
    pub depth: Measurement,
    pub snr: f64,
    pub transit_count: usize,
    pub folded: FoldedModel,
}

#[derive(Debug, Clone, Copy)]
struct Trial {
    period: f64,
    epoch: f64,
    duration: f64,
    statistic: f64,
}

/// Grid scanned by one refinement pass, centred on `center`.
struct Grid {
    center: Trial,
    period_step: f64,
    epoch_step: f64,
    durations: Vec<f64>,
}

/// Refine `coarse` on the oversampled grid and fit a box model.
///
/// `coarse_step` is the spacing of the coarse period grid at
/// `coarse.period`.
///
/// # Errors
/// [`TransitError::UnphysicalDepth`] when the fitted depth is not in (0, 1).
pub(crate) fn refine(
    time: &[f64],
    flux: &[f64],
    cadence: f64,
    coarse: &BoxFit,
    coarse_step: f64,
    config: &SearchConfig,
) -> Result<RefinedFit, TransitError> {
    let os = config.oversampling_factor as f64;
    let (p0, d0) = (coarse.period, coarse.duration);
    let t_first = time.first().copied().unwrap_or(coarse.epoch);
    let t_last = time.last().copied().unwrap_or(coarse.epoch);
    let middle = 0.5 * (t_first + t_last);
    let t0 = coarse.epoch + ((middle - coarse.epoch) / p0).round() * p0;

    let octave = (2.0f64.ln() / config.duration_grid_step.ln()).ceil() as i32;
    let mut grid = Grid {
        center: Trial {
            period: p0,
            epoch: t0,
            duration: d0,
            statistic: f64::NEG_INFINITY,
        },
        period_step: coarse_step / os,
        epoch_step: d0 / (2.0 * os),
        durations: duration_span(d0, octave, config),
    };

    let mean = exo_math::mean(flux);
    let residual: Vec<f64> = flux.iter().map(|f| f - mean).collect();

    let mut best = scan(time, &residual, &grid, config);
    for pass in 1..REFINE_PASSES {
        grid = Grid {
            center: best,
            period_step: grid.period_step / os,
            epoch_step: grid.epoch_step / os,
            durations: duration_span(best.duration, config.oversampling_factor as i32, config),
        };
        best = scan(time, &residual, &grid, config);
        log::debug!(
            "Refinement pass {pass}: P={:.6} d, T0={:.5}, dur={:.4} d",
            best.period,
            best.epoch,
            best.duration
        );
    }

    fit_box(time, flux, cadence, &best, config)
}

/// Durations `center * ratio^j` for `j` in `-steps..=steps`.
fn duration_span(center: f64, steps: i32, config: &SearchConfig) -> Vec<f64> {
    (-steps..=steps)
        .map(|j| center * config.duration_grid_step.powi(j))
        .collect()
}

/// Best trial on `grid`; the centre itself when nothing qualifies.
fn scan(time: &[f64], residual: &[f64], grid: &Grid, config: &SearchConfig) -> Trial {
    let os = config.oversampling_factor as i64;
    let total = residual.len();
    let center = grid.center;
    let mut best = center;

    for k in -os..=os {
        let period = center.period + k as f64 * grid.period_step;
        if period <= 0.0 {
            continue;
        }

        let mut folded: Vec<(f64, f64)> = time
            .iter()
            .zip(residual.iter())
            .map(|(&t, &y)| (wrap_phase(t - center.epoch, period), y))
            .collect();
        folded.sort_by(|a, b| a.0.total_cmp(&b.0));

        let phases: Vec<f64> = folded.iter().map(|p| p.0).collect();
        let mut prefix = Vec::with_capacity(total + 1);
        prefix.push(0.0);
        for (_, y) in &folded {
            prefix.push(prefix[prefix.len() - 1] + y);
        }

        for j in -os..=os {
            let offset = j as f64 * grid.epoch_step;
            for &duration in &grid.durations {
                if duration > config.max_duty_cycle * period {
                    continue;
                }
                let lo = phases.partition_point(|&x| x < offset - 0.5 * duration);
                let hi = phases.partition_point(|&x| x < offset + 0.5 * duration);
                let n_in = hi - lo;
                let n_out = total - n_in;
                if n_in < config.min_in_transit || n_out == 0 {
                    continue;
                }
                let s_in = prefix[hi] - prefix[lo];
                if s_in >= 0.0 {
                    continue;
                }

                let statistic = s_in * s_in * total as f64 / (n_in as f64 * n_out as f64);
                if statistic > best.statistic {
                    best = Trial {
                        period,
                        epoch: center.epoch + offset,
                        duration,
                        statistic,
                    };
                }
            }
        }
    }

    best
}

/// Fit a box model at a fixed ephemeris.
fn fit_box(
    time: &[f64],
    flux: &[f64],
    cadence: f64,
    trial: &Trial,
    config: &SearchConfig,
) -> Result<RefinedFit, TransitError> {
    let Trial {
        period, duration, ..
    } = *trial;

    // First mid-transit at or after the start of the data
    let t_start = time.first().copied().unwrap_or(trial.epoch);
    let epoch = trial.epoch - ((trial.epoch - t_start) / period).floor() * period;

    let phases: Vec<f64> = time.iter().map(|&t| wrap_phase(t - epoch, period)).collect();
    let in_transit: Vec<bool> = phases
        .iter()
        .map(|&x| x >= -0.5 * duration && x < 0.5 * duration)
        .collect();

    let (mut sum_in, mut sum_out, mut n_in, mut n_out) = (0.0, 0.0, 0usize, 0usize);
    let mut transits = BTreeSet::new();
    for ((&t, &f), &inside) in time.iter().zip(flux.iter()).zip(in_transit.iter()) {
        if inside {
            sum_in += f;
            n_in += 1;
            transits.insert(((t - epoch) / period).round() as i64);
        } else {
            sum_out += f;
            n_out += 1;
        }
    }
    if n_in < config.min_in_transit || n_out == 0 {
        return Err(TransitError::InsufficientData {
            required: config.min_in_transit,
            actual: n_in,
        });
    }

    let mean_in = sum_in / n_in as f64;
    let mean_out = sum_out / n_out as f64;
    let depth = (mean_out - mean_in) / mean_out;
    if !(depth > 0.0 && depth < 1.0) {
        return Err(TransitError::UnphysicalDepth(depth));
    }

    let model: Vec<f64> = in_transit
        .iter()
        .map(|&inside| if inside { mean_in } else { mean_out })
        .collect();
    let residuals: Vec<f64> = flux.iter().zip(model.iter()).map(|(f, m)| f - m).collect();

    let samples_per_box = (duration / cadence).round().max(1.0) as usize;
    let beta = red_noise_factor(&residuals, samples_per_box);
    let sigma = exo_math::std_dev(&residuals).max(SIGMA_FLOOR);
    let depth_sigma = sigma * beta * (1.0 / n_in as f64 + 1.0 / n_out as f64).sqrt() / mean_out;
    let depth = Measurement::new(depth, depth_sigma)
        .map_err(|_| TransitError::UnphysicalDepth(depth))?;

    log::debug!(
        "Box fit: P={period:.5} d, T0={epoch:.5}, dur={duration:.4} d, depth={depth}, \
         beta={beta:.2}"
    );

    let mut order: Vec<usize> = (0..time.len()).collect();
    order.sort_by(|&a, &b| phases[a].total_cmp(&phases[b]));
    let folded = FoldedModel {
        phase: order.iter().map(|&i| phases[i]).collect(),
        flux: order.iter().map(|&i| flux[i]).collect(),
        model: order.iter().map(|&i| model[i]).collect(),
    };

    Ok(RefinedFit {
        period,
        epoch,
        duration,
        snr: depth.nominal / depth.sigma,
        depth,
        transit_count: transits.len(),
        folded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn noiseless(period: f64, epoch: f64, duration: f64, depth: f64) -> (Vec<f64>, Vec<f64>) {
        let time: Vec<f64> = (0..2000).map(|i| i as f64 * 0.01).collect();
        let flux = time
            .iter()
            .map(|&t| {
                if wrap_phase(t - epoch, period).abs() < 0.5 * duration {
                    1.0 - depth
                } else {
                    1.0
                }
            })
            .collect();
        (time, flux)
    }

    fn coarse(period: f64, epoch: f64, duration: f64) -> BoxFit {
        BoxFit {
            period,
            power: 50.0,
            epoch,
            duration,
            depth: 0.01,
            n_in: 100,
        }
    }

    /// Default coarse grid spacing at `period` for the 20 day test curves.
    fn coarse_step(period: f64) -> f64 {
        let config = SearchConfig::default();
        period * 0.04 / (config.period_oversample * 20.0)
    }

    fn run(time: &[f64], flux: &[f64], guess: BoxFit) -> RefinedFit {
        let step = coarse_step(guess.period);
        refine(time, flux, 0.01, &guess, step, &SearchConfig::default()).unwrap()
    }

    #[test]
    fn test_refine_recovers_offset_ephemeris() {
        let (time, flux) = noiseless(3.0, 1.3, 0.3, 0.01);
        // Coarse guess off in epoch and duration
        let fit = run(&time, &flux, coarse(3.0, 1.36, 0.24));

        assert!((fit.period - 3.0).abs() < 1e-3, "period = {}", fit.period);
        assert!((fit.epoch - 1.3).abs() < 0.01, "epoch = {}", fit.epoch);
        assert!((fit.duration - 0.3).abs() < 0.02, "duration = {}", fit.duration);
        assert!((fit.depth.nominal - 0.01).abs() < 2e-4, "depth = {}", fit.depth);
        assert_eq!(fit.transit_count, 7);
    }

    #[test]
    fn test_refine_corrects_period_one_coarse_step_off() {
        let (time, flux) = noiseless(3.0, 1.3, 0.3, 0.01);
        let guess = coarse(3.0 + coarse_step(3.0), 1.3, 0.24);
        let fit = run(&time, &flux, guess);

        assert!((fit.period - 3.0).abs() < 2e-4, "period = {}", fit.period);
        assert!((fit.depth.nominal - 0.01).abs() < 2e-4, "depth = {}", fit.depth);
        assert_eq!(fit.transit_count, 7);
    }

    #[test]
    fn test_epoch_is_first_transit_after_start() {
        let (time, flux) = noiseless(3.0, 1.3, 0.3, 0.01);
        let fit = run(&time, &flux, coarse(3.0, 13.3, 0.3));
        assert!(fit.epoch >= 0.0 && fit.epoch < 3.0, "epoch = {}", fit.epoch);
    }

    #[test]
    fn test_folded_model_is_sorted_box() {
        let (time, flux) = noiseless(3.0, 1.3, 0.3, 0.01);
        let fit = run(&time, &flux, coarse(3.0, 1.3, 0.3));

        let folded = &fit.folded;
        assert_eq!(folded.phase.len(), time.len());
        assert!(folded.phase.windows(2).all(|w| w[0] <= w[1]));
        let min_model = folded.model.iter().copied().fold(f64::INFINITY, f64::min);
        let max_model = folded.model.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        assert_relative_eq!(max_model - min_model, fit.depth.nominal * max_model, epsilon = 1e-9);
    }

    #[test]
    fn test_rejects_brightening() {
        let time: Vec<f64> = (0..2000).map(|i| i as f64 * 0.01).collect();
        let flux: Vec<f64> = time
            .iter()
            .map(|&t| if wrap_phase(t - 1.0, 2.0).abs() < 0.1 { 1.01 } else { 1.0 })
            .collect();
        let trial = Trial {
            period: 2.0,
            epoch: 1.0,
            duration: 0.2,
            statistic: 0.0,
        };
        let result = fit_box(&time, &flux, 0.01, &trial, &SearchConfig::default());
        assert!(matches!(result, Err(TransitError::UnphysicalDepth(_))));
    }
}
