//! Noise estimates for detection statistics.
//!
//! Smoothing and residual stellar variability leave correlated noise that
//! does not average down as `1/sqrt(n)`. The binned scatter captures that by
//! measuring the spread of window means at the timescale of a transit and
//! rescaling it to a per-point sigma.

use exo_math::robust_sigma;

/// Minimum number of window means for a binned estimate.
const MIN_BINS: usize = 5;

/// Smallest sigma used as a divisor.
pub(crate) const SIGMA_FLOOR: f64 = 1e-12;

/// Robust per-point scatter of `values`.
pub(crate) fn white_scatter(values: &[f64]) -> f64 {
    robust_sigma(values).unwrap_or(0.0).max(SIGMA_FLOOR)
}

/// Robust scatter of means over consecutive windows of `samples_per_bin`,
/// scaled by `sqrt(samples_per_bin)` so white noise returns the point sigma.
///
/// Returns `None` when there are too few full windows.
pub(crate) fn binned_scatter(values: &[f64], samples_per_bin: usize) -> Option<f64> {
    let m = samples_per_bin.max(1);
    let means: Vec<f64> = values
        .chunks_exact(m)
        .map(|chunk| chunk.iter().sum::<f64>() / m as f64)
        .collect();
    if means.len() < MIN_BINS {
        return None;
    }
    robust_sigma(&means).ok().map(|s| s * (m as f64).sqrt())
}

/// Effective per-point sigma for a box of `samples_per_bin` samples.
///
/// Never smaller than the white-noise estimate.
pub(crate) fn effective_sigma(values: &[f64], samples_per_bin: usize) -> f64 {
    let white = white_scatter(values);
    binned_scatter(values, samples_per_bin).map_or(white, |binned| binned.max(white))
}

/// Ratio of binned to white scatter, at least one.
pub(crate) fn red_noise_factor(values: &[f64], samples_per_bin: usize) -> f64 {
    let white = white_scatter(values);
    match binned_scatter(values, samples_per_bin) {
        Some(binned) => (binned / white).max(1.0),
        None => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rand_distr::{Distribution, Normal};

    fn white_noise(n: usize, sigma: f64, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let normal = Normal::new(0.0, sigma).unwrap();
        (0..n).map(|_| normal.sample(&mut rng)).collect()
    }

    #[test]
    fn test_white_noise_binned_matches_point_sigma() {
        let values = white_noise(20_000, 1.0, 3);
        let white = white_scatter(&values);
        let binned = binned_scatter(&values, 20).unwrap();

        assert!((white - 1.0).abs() < 0.05, "white = {white}");
        assert!((binned - 1.0).abs() < 0.2, "binned = {binned}");
    }

    #[test]
    fn test_correlated_noise_raises_factor() {
        // Repeat each random value 20 times: fully correlated over 20 samples
        let base = white_noise(1_000, 1.0, 9);
        let values: Vec<f64> = base.iter().flat_map(|&v| std::iter::repeat(v).take(20)).collect();

        let factor = red_noise_factor(&values, 20);
        assert!(factor > 3.0, "factor = {factor}");
        assert!(effective_sigma(&values, 20) > white_scatter(&values));
    }

    #[test]
    fn test_too_few_bins_falls_back() {
        let values = white_noise(40, 1.0, 1);
        assert!(binned_scatter(&values, 10).is_none());
        assert_eq!(red_noise_factor(&values, 10), 1.0);
        assert_eq!(effective_sigma(&values, 10), white_scatter(&values));
    }

    #[test]
    fn test_constant_series_uses_floor() {
        let values = vec![1.0; 100];
        assert_eq!(white_scatter(&values), SIGMA_FLOOR);
    }
}
