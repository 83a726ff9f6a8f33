//! Coarse box-least-squares periodogram.
//!
//! Each trial period folds the mean-subtracted flux into phase bins of width
//! `min_duration / phase_oversample`. A box of each trial duration slides
//! across the bins (wrapping at phase 1) and the deepest box defines the
//! power at that period:
//!
//! ```text
//! power = -s_in * sqrt(N / (n_in * n_out)) / sigma_eff(duration)
//! ```
//!
//! where `s_in` is the summed residual inside the box. Only dips count.
//! `sigma_eff` comes from binned scatter so correlated noise does not
//! inflate the power.

use rayon::prelude::*;

use super::scatter::effective_sigma;
use super::SearchConfig;

/// Upper bound on trial periods; denser grids are coarsened.
const MAX_TRIAL_PERIODS: usize = 200_000;

/// Best box found at one trial period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxFit {
    /// Trial period in days
    pub period: f64,
    /// Detection power (signal-to-noise of the box)
    pub power: f64,
    /// Mid-transit time of the box in days
    pub epoch: f64,
    /// Box duration in days
    pub duration: f64,
    /// Mean flux deficit inside the box
    pub depth: f64,
    /// Samples inside the box
    pub n_in: usize,
}

/// Full periodogram with the strongest peak.
#[derive(Debug, Clone, PartialEq)]
pub struct Periodogram {
    /// Trial periods in ascending order
    pub periods: Vec<f64>,
    /// Power at each trial period (0 where no dip qualified)
    pub power: Vec<f64>,
    /// Strongest box; ties resolve to the shortest period
    pub best: Option<BoxFit>,
}

impl Periodogram {
    /// Signal detection efficiency of the peak: `(peak - mean) / std`.
    pub fn sde(&self) -> f64 {
        let Some(best) = self.best else {
            return 0.0;
        };
        let mean = exo_math::mean(&self.power);
        let std = exo_math::std_dev(&self.power);
        if std > 0.0 {
            (best.power - mean) / std
        } else {
            0.0
        }
    }

    /// Gap between the first trial at or above `period` and the next one,
    /// clamped to the last gap. `None` for fewer than two trials.
    pub fn grid_step(&self, period: f64) -> Option<f64> {
        if self.periods.len() < 2 {
            return None;
        }
        let i = self
            .periods
            .partition_point(|&p| p < period)
            .min(self.periods.len() - 2);
        Some(self.periods[i + 1] - self.periods[i])
    }
}

/// Geometric period grid from `min_period` to `max_period`.
///
/// Consecutive periods differ by `1 + min_duration / (oversample * baseline)`,
/// which keeps the accumulated phase drift over the baseline below a fraction
/// of the shortest box.
pub fn period_grid(
    min_period: f64,
    max_period: f64,
    baseline: f64,
    min_duration: f64,
    oversample: f64,
) -> Vec<f64> {
    if !(min_period > 0.0 && max_period >= min_period && baseline > 0.0) {
        return Vec::new();
    }

    let mut ratio = 1.0 + min_duration / (oversample * baseline);
    let needed = (max_period / min_period).ln() / ratio.ln();
    if needed > MAX_TRIAL_PERIODS as f64 {
        log::warn!(
            "Period grid would need {needed:.0} trials; coarsening to {MAX_TRIAL_PERIODS}"
        );
        ratio = (max_period / min_period).powf(1.0 / MAX_TRIAL_PERIODS as f64);
    }

    let mut periods = Vec::new();
    let mut period = min_period;
    while period <= max_period {
        periods.push(period);
        period *= ratio;
    }
    periods
}

/// Inputs shared by every trial period.
struct Prepared<'a> {
    time: &'a [f64],
    residual: Vec<f64>,
    t_ref: f64,
    durations: Vec<f64>,
    sigmas: Vec<f64>,
    bin_width: f64,
    min_in_transit: usize,
    max_duty_cycle: f64,
}

/// Compute the periodogram over `periods`.
///
/// Periods are evaluated in parallel; results keep the grid order so the
/// outcome does not depend on thread scheduling.
pub fn periodogram(
    time: &[f64],
    flux: &[f64],
    cadence: f64,
    periods: Vec<f64>,
    config: &SearchConfig,
) -> Periodogram {
    let mean = exo_math::mean(flux);
    let residual: Vec<f64> = flux.iter().map(|f| f - mean).collect();

    let durations = config.durations.clone();
    let sigmas: Vec<f64> = durations
        .iter()
        .map(|d| {
            let samples = (d / cadence).round().max(1.0) as usize;
            effective_sigma(&residual, samples)
        })
        .collect();
    let min_duration = durations.iter().copied().fold(f64::INFINITY, f64::min);

    let prepared = Prepared {
        time,
        t_ref: time.first().copied().unwrap_or(0.0),
        residual,
        durations,
        sigmas,
        bin_width: min_duration / config.phase_oversample as f64,
        min_in_transit: config.min_in_transit,
        max_duty_cycle: config.max_duty_cycle,
    };

    let fits: Vec<Option<BoxFit>> = periods
        .par_iter()
        .map(|&period| evaluate_period(&prepared, period))
        .collect();

    let mut best: Option<BoxFit> = None;
    for fit in fits.iter().flatten() {
        if best.map_or(true, |b| fit.power > b.power) {
            best = Some(*fit);
        }
    }

    let power = fits
        .iter()
        .map(|fit| fit.map_or(0.0, |f| f.power))
        .collect();

    Periodogram {
        periods,
        power,
        best,
    }
}

/// Deepest qualifying box at one period.
fn evaluate_period(prepared: &Prepared<'_>, period: f64) -> Option<BoxFit> {
    let n_bins = ((period / prepared.bin_width).ceil() as usize).max(1);
    let bin_width = period / n_bins as f64;

    let mut counts = vec![0usize; n_bins];
    let mut sums = vec![0.0f64; n_bins];
    for (&t, &y) in prepared.time.iter().zip(prepared.residual.iter()) {
        let phase = (t - prepared.t_ref).rem_euclid(period);
        let bin = ((phase / bin_width) as usize).min(n_bins - 1);
        counts[bin] += 1;
        sums[bin] += y;
    }

    // Prefix sums over two revolutions so boxes can wrap past phase 1
    let mut count_prefix = vec![0usize; 2 * n_bins + 1];
    let mut sum_prefix = vec![0.0f64; 2 * n_bins + 1];
    for i in 0..2 * n_bins {
        count_prefix[i + 1] = count_prefix[i] + counts[i % n_bins];
        sum_prefix[i + 1] = sum_prefix[i] + sums[i % n_bins];
    }

    let total = prepared.time.len();
    let mut best: Option<BoxFit> = None;

    for (&duration, &sigma) in prepared.durations.iter().zip(prepared.sigmas.iter()) {
        if duration > prepared.max_duty_cycle * period {
            continue;
        }
        let width = ((duration / bin_width).round() as usize).max(1);
        if width >= n_bins {
            continue;
        }

        for start in 0..n_bins {
            let n_in = count_prefix[start + width] - count_prefix[start];
            let n_out = total - n_in;
            if n_in < prepared.min_in_transit || n_out == 0 {
                continue;
            }
            let s_in = sum_prefix[start + width] - sum_prefix[start];
            if s_in >= 0.0 {
                continue;
            }

            let (n_in_f, n_out_f, total_f) = (n_in as f64, n_out as f64, total as f64);
            let power = -s_in * (total_f / (n_in_f * n_out_f)).sqrt() / sigma;
            if best.map_or(true, |b| power > b.power) {
                let center = (start as f64 + 0.5 * width as f64) * bin_width;
                best = Some(BoxFit {
                    period,
                    power,
                    epoch: prepared.t_ref + center.rem_euclid(period),
                    duration,
                    depth: -s_in * total_f / (n_in_f * n_out_f),
                    n_in,
                });
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn boxed_series(period: f64, epoch: f64, duration: f64, depth: f64) -> (Vec<f64>, Vec<f64>) {
        let time: Vec<f64> = (0..2000).map(|i| i as f64 * 0.01).collect();
        let flux = time
            .iter()
            .map(|&t| {
                let dt = crate::search::fold::wrap_phase(t - epoch, period);
                if dt.abs() < 0.5 * duration {
                    1.0 - depth
                } else {
                    1.0
                }
            })
            .collect();
        (time, flux)
    }

    #[test]
    fn test_period_grid_is_geometric() {
        let grid = period_grid(0.5, 10.0, 20.0, 0.04, 2.0);
        assert_relative_eq!(grid[0], 0.5);
        assert!(*grid.last().unwrap() <= 10.0);
        let ratio = grid[1] / grid[0];
        assert_relative_eq!(ratio, 1.001, epsilon = 1e-12);
        assert_relative_eq!(grid[100] / grid[99], ratio, epsilon = 1e-9);
        assert!(grid.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_period_grid_empty_when_range_inverted() {
        assert!(period_grid(5.0, 1.0, 20.0, 0.04, 2.0).is_empty());
        assert!(period_grid(0.0, 1.0, 20.0, 0.04, 2.0).is_empty());
    }

    #[test]
    fn test_period_grid_is_capped() {
        let grid = period_grid(0.01, 1000.0, 1e6, 0.001, 10.0);
        assert!(grid.len() <= MAX_TRIAL_PERIODS + 1);
    }

    #[test]
    fn test_noiseless_box_peaks_at_true_period() {
        let (time, flux) = boxed_series(2.5, 1.0, 0.24, 0.01);
        let config = SearchConfig::default();
        let periods = vec![1.9, 2.2, 2.5, 2.8, 3.1];
        let pg = periodogram(&time, &flux, 0.01, periods, &config);

        let best = pg.best.unwrap();
        assert_relative_eq!(best.period, 2.5);
        assert!((best.epoch - 1.0).abs() < 0.03, "epoch = {}", best.epoch);
        assert!((best.depth - 0.01).abs() < 0.002, "depth = {}", best.depth);
        assert_eq!(pg.power.len(), 5);
        assert!(pg.sde() > 0.0);
    }

    #[test]
    fn test_flat_curve_has_no_peak() {
        // Constant flux has no dip anywhere: every power is zero
        let time: Vec<f64> = (0..500).map(|i| i as f64 * 0.01).collect();
        let flux = vec![1.0; 500];
        let pg = periodogram(&time, &flux, 0.01, vec![0.6, 0.8, 1.0], &SearchConfig::default());
        assert!(pg.best.is_none());
        assert_eq!(pg.power, vec![0.0, 0.0, 0.0]);
        assert_eq!(pg.sde(), 0.0);
    }

    #[test]
    fn test_duty_cycle_limits_durations() {
        let (time, flux) = boxed_series(0.5, 0.2, 0.3, 0.01);
        let config = SearchConfig {
            durations: vec![0.3],
            max_duty_cycle: 0.2,
            ..SearchConfig::default()
        };
        // 0.3 d boxes exceed 20% of a 0.5 d period, so nothing is evaluated
        let pg = periodogram(&time, &flux, 0.01, vec![0.5], &config);
        assert!(pg.best.is_none());
    }

    #[test]
    fn test_equal_power_prefers_shortest_period() {
        // A single dip in data shorter than every trial period folds
        // identically at each one, and 0.25 d bins divide all three periods
        // exactly, so the powers are bitwise equal
        let time: Vec<f64> = (0..500).map(|i| 0.005 + i as f64 * 0.01).collect();
        let flux: Vec<f64> = (0..500)
            .map(|i| if (100..125).contains(&i) { 0.99 } else { 1.0 })
            .collect();
        let config = SearchConfig {
            durations: vec![0.25],
            phase_oversample: 1,
            ..SearchConfig::default()
        };

        let pg = periodogram(&time, &flux, 0.01, vec![6.0, 7.0, 8.0], &config);

        assert!(pg.power[0] > 0.0);
        assert_eq!(pg.power[0], pg.power[1]);
        assert_eq!(pg.power[1], pg.power[2]);
        assert_eq!(pg.best.unwrap().period, 6.0);
    }

    #[test]
    fn test_grid_step_at_trial_period() {
        let pg = Periodogram {
            periods: vec![1.0, 1.5, 2.5],
            power: vec![0.0; 3],
            best: None,
        };
        assert_eq!(pg.grid_step(1.0), Some(0.5));
        assert_eq!(pg.grid_step(1.5), Some(1.0));
        assert_eq!(pg.grid_step(9.0), Some(1.0));

        let single = Periodogram {
            periods: vec![1.0],
            power: vec![0.0],
            best: None,
        };
        assert_eq!(single.grid_step(1.0), None);
    }
}
