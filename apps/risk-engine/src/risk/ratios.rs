//! Statistical helpers and risk-ratio calculators.
//!
//! All functions here are pure derivations over the observed return window
//! and the latest running aggregates. Degenerate inputs never raise: each
//! ratio has a documented fallback (an absent value for Sharpe, 0.0 for the
//! rest) so a half-warm aggregator still produces a usable snapshot.

/// Absolute tolerance for near-zero comparisons.
const EPSILON_ABS: f64 = 1e-6;

/// Relative tolerance for near-zero comparisons.
const EPSILON_REL: f64 = 1e-6;

/// Tolerance-based float equality.
///
/// Division by a denominator that is merely floating-point noise away from
/// zero is as meaningless as division by exact zero, so every degeneracy
/// guard in this module goes through here rather than `==`.
#[must_use]
pub fn tolerant_equals(a: f64, b: f64) -> bool {
    (a - b).abs() <= EPSILON_ABS + EPSILON_REL * b.abs()
}

/// Arithmetic mean. `None` for an empty slice.
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (ddof = 1). `None` below 2 observations.
#[must_use]
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let avg = mean(values)?;
    let variance_sum: f64 = values.iter().map(|v| (v - avg) * (v - avg)).sum();
    Some((variance_sum / (values.len() - 1) as f64).sqrt())
}

/// Sample covariance (ddof = 1). `None` below 2 pairs or on length mismatch.
#[must_use]
pub fn sample_covariance(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let mean_x = mean(x)?;
    let mean_y = mean(y)?;
    let sum: f64 = x
        .iter()
        .zip(y.iter())
        .map(|(a, b)| (a - mean_x) * (b - mean_y))
        .sum();
    Some(sum / (x.len() - 1) as f64)
}

/// Annualized volatility of a return window.
///
/// Sample standard deviation scaled by the square root of the period count
/// per year. 0.0 below 2 observations, where the ddof = 1 statistic is
/// undefined.
#[must_use]
pub fn annualized_volatility(returns: &[f64], periods_per_year: f64) -> f64 {
    sample_std_dev(returns).map_or(0.0, |sd| sd * periods_per_year.sqrt())
}

/// Compounded period return: prod(1 + r) - 1 over the window.
#[must_use]
pub fn period_return(returns: &[f64]) -> f64 {
    returns.iter().map(|r| 1.0 + r).product::<f64>() - 1.0
}

/// Sharpe ratio: (annualized mean return - treasury return) / volatility.
///
/// `None` when the volatility is within tolerance of zero or any input is
/// non-finite; an absent ratio, not an error.
#[must_use]
pub fn sharpe_ratio(
    algorithm_volatility: f64,
    annualized_return: f64,
    treasury_return: f64,
) -> Option<f64> {
    if tolerant_equals(algorithm_volatility, 0.0)
        || !algorithm_volatility.is_finite()
        || !annualized_return.is_finite()
        || !treasury_return.is_finite()
    {
        return None;
    }
    Some((annualized_return - treasury_return) / algorithm_volatility)
}

/// Annualized downside deviation of returns below `mar`.
///
/// Square root of the mean squared below-threshold shortfall, over the full
/// window count, scaled like a volatility.
#[must_use]
pub fn downside_risk(returns: &[f64], mar: f64, periods_per_year: f64) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    let shortfall_sq: f64 = returns
        .iter()
        .map(|r| (r - mar).min(0.0))
        .map(|d| d * d)
        .sum();
    (shortfall_sq / returns.len() as f64).sqrt() * periods_per_year.sqrt()
}

/// Sortino ratio: (period return - mar) / downside risk.
///
/// 0.0 when the downside risk is within tolerance of zero (no observed
/// shortfall to normalize against).
#[must_use]
pub fn sortino_ratio(returns: &[f64], algorithm_period_return: f64, mar: f64, periods_per_year: f64) -> f64 {
    let dr = downside_risk(returns, mar, periods_per_year);
    if tolerant_equals(dr, 0.0) {
        return 0.0;
    }
    (algorithm_period_return - mar) / dr
}

/// Information ratio of strategy returns against benchmark returns.
///
/// Mean of the per-period relative return over its sample standard
/// deviation; 0.0 when the deviation is undefined or within tolerance of
/// zero.
#[must_use]
pub fn information_ratio(algorithm_returns: &[f64], benchmark_returns: &[f64]) -> f64 {
    let relative: Vec<f64> = algorithm_returns
        .iter()
        .zip(benchmark_returns.iter())
        .map(|(a, b)| a - b)
        .collect();

    let Some(deviation) = sample_std_dev(&relative) else {
        return 0.0;
    };
    if tolerant_equals(deviation, 0.0) || deviation.is_nan() {
        return 0.0;
    }
    mean(&relative).map_or(0.0, |m| m / deviation)
}

/// CAPM alpha: period return unexplained by benchmark exposure.
#[must_use]
pub fn alpha(
    algorithm_period_return: f64,
    treasury_period_return: f64,
    benchmark_period_return: f64,
    beta: f64,
) -> f64 {
    algorithm_period_return
        - (treasury_period_return + beta * (benchmark_period_return - treasury_period_return))
}

/// CAPM beta: sample covariance over benchmark sample variance (ddof = 1).
///
/// Exactly 0.0 with fewer than 2 observed pairs or a benchmark variance
/// within tolerance of zero; a deliberate placeholder, not a derived
/// statistic.
#[must_use]
pub fn beta(algorithm_returns: &[f64], benchmark_returns: &[f64]) -> f64 {
    if algorithm_returns.len() < 2 {
        return 0.0;
    }
    let Some(covariance) = sample_covariance(algorithm_returns, benchmark_returns) else {
        return 0.0;
    };
    let Some(benchmark_deviation) = sample_std_dev(benchmark_returns) else {
        return 0.0;
    };
    let benchmark_variance = benchmark_deviation * benchmark_deviation;
    if tolerant_equals(benchmark_variance, 0.0) {
        return 0.0;
    }
    covariance / benchmark_variance
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use test_case::test_case;

    use super::*;

    fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
        (a - b).abs() < tolerance
    }

    #[test]
    fn test_mean_and_std_dev() {
        let values = [10.0, 20.0, 30.0, 40.0];
        assert_eq!(mean(&values), Some(25.0));
        // Sample std dev of the set is sqrt(500/3) ~ 12.9099.
        let sd = sample_std_dev(&values).unwrap();
        assert!(approx_eq(sd, 12.9099, 1e-3));

        assert_eq!(mean(&[]), None);
        assert_eq!(sample_std_dev(&[1.0]), None);
    }

    #[test]
    fn test_sample_covariance_matches_variance_on_self() {
        let values = [0.01, -0.02, 0.03, 0.005];
        let cov = sample_covariance(&values, &values).unwrap();
        let sd = sample_std_dev(&values).unwrap();
        assert!(approx_eq(cov, sd * sd, 1e-12));
    }

    #[test]
    fn test_period_return_compounds() {
        let returns = [0.01, -0.02, 0.03];
        let expected = 1.01_f64 * 0.98 * 1.03 - 1.0;
        assert!(approx_eq(period_return(&returns), expected, 1e-12));
    }

    #[test]
    fn test_period_return_is_order_independent() {
        let forward = [0.01, -0.02, 0.03, 0.004];
        let shuffled = [0.03, 0.004, 0.01, -0.02];
        assert!(approx_eq(period_return(&forward), period_return(&shuffled), 1e-12));
    }

    #[test]
    fn test_sharpe_defined() {
        let sharpe = sharpe_ratio(0.2, 0.12, 0.04).unwrap();
        assert!(approx_eq(sharpe, 0.4, 1e-12));
    }

    #[test_case(0.0 ; "exact zero volatility")]
    #[test_case(1e-9 ; "volatility below tolerance")]
    #[test_case(-1e-9 ; "negative noise volatility")]
    fn test_sharpe_absent_for_degenerate_volatility(volatility: f64) {
        assert_eq!(sharpe_ratio(volatility, 0.10, 0.02), None);
    }

    #[test]
    fn test_sharpe_absent_for_nan_treasury() {
        assert_eq!(sharpe_ratio(0.2, 0.10, f64::NAN), None);
    }

    #[test]
    fn test_sortino_zero_without_shortfall() {
        // Every return clears the threshold, so downside risk is zero.
        let returns = [0.01, 0.02, 0.015];
        assert_eq!(sortino_ratio(&returns, 0.046, 0.0, 252.0), 0.0);
    }

    #[test]
    fn test_sortino_penalizes_shortfall() {
        let returns = [0.01, -0.03, 0.02, -0.01];
        let pr = period_return(&returns);
        let sortino = sortino_ratio(&returns, pr, 0.0, 252.0);
        let dr = downside_risk(&returns, 0.0, 252.0);
        assert!(dr > 0.0);
        assert!(approx_eq(sortino, pr / dr, 1e-12));
    }

    #[test]
    fn test_information_ratio_zero_for_identical_series() {
        let returns = [0.01, -0.02, 0.03];
        assert_eq!(information_ratio(&returns, &returns), 0.0);
    }

    #[test]
    fn test_information_ratio_sign_tracks_outperformance() {
        let algorithm = [0.02, 0.01, 0.03];
        let benchmark = [0.01, 0.005, 0.02];
        assert!(information_ratio(&algorithm, &benchmark) > 0.0);
        assert!(information_ratio(&benchmark, &algorithm) < 0.0);
    }

    #[test_case(&[] , &[] ; "empty windows")]
    #[test_case(&[0.01], &[0.02] ; "single pair")]
    fn test_beta_placeholder_below_two_pairs(algorithm: &[f64], benchmark: &[f64]) {
        assert_eq!(beta(algorithm, benchmark), 0.0);
    }

    #[test]
    fn test_beta_one_for_identical_series() {
        let returns = [0.01, -0.02, 0.03, 0.005];
        assert!(approx_eq(beta(&returns, &returns), 1.0, 1e-12));
    }

    #[test]
    fn test_beta_zero_for_flat_benchmark() {
        let algorithm = [0.01, -0.02, 0.03];
        let benchmark = [0.005, 0.005, 0.005];
        assert_eq!(beta(&algorithm, &benchmark), 0.0);
    }

    #[test]
    fn test_beta_scales_with_leverage() {
        let benchmark = [0.01, -0.02, 0.03, 0.005, -0.01];
        let levered: Vec<f64> = benchmark.iter().map(|r| 2.0 * r).collect();
        assert!(approx_eq(beta(&levered, &benchmark), 2.0, 1e-9));
    }

    #[test]
    fn test_alpha_residual_zero_for_benchmark_itself() {
        // A strategy that is the benchmark has beta 1 and no residual.
        let a = alpha(0.05, 0.01, 0.05, 1.0);
        assert!(approx_eq(a, 0.0, 1e-12));
    }

    proptest! {
        /// Compounding is a product, so arrival order cannot matter.
        #[test]
        fn prop_period_return_is_order_independent(
            returns in prop::collection::vec(-0.2_f64..0.2, 1..32)
        ) {
            let mut reversed = returns.clone();
            reversed.reverse();
            prop_assert!((period_return(&returns) - period_return(&reversed)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_annualized_volatility() {
        let returns = [0.01, -0.02, 0.03, 0.005];
        let expected = sample_std_dev(&returns).unwrap() * 252.0_f64.sqrt();
        assert!(approx_eq(annualized_volatility(&returns, 252.0), expected, 1e-12));
        assert_eq!(annualized_volatility(&[0.01], 252.0), 0.0);
    }
}
