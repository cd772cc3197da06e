//! Point-in-time snapshot of the tracked risk metrics.

use serde::{Deserialize, Serialize};

/// Latest value of every tracked metric after an update.
///
/// Metric fields are `Option<f64>`: a metric that is not yet meaningful
/// (NaN or infinite under the hood) is reported as an explicit absent
/// value, never as raw sentinel data a consumer could mistake for zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskSnapshot {
    /// Number of observed trading periods so far.
    pub trading_days: usize,
    /// Annualized benchmark volatility.
    pub benchmark_volatility: Option<f64>,
    /// Annualized strategy volatility.
    pub algo_volatility: Option<f64>,
    /// Risk-free return over the period to date.
    pub treasury_period_return: Option<f64>,
    /// Compounded strategy return over the period to date.
    pub algorithm_period_return: Option<f64>,
    /// Compounded benchmark return over the period to date.
    pub benchmark_period_return: Option<f64>,
    /// CAPM beta against the benchmark.
    pub beta: Option<f64>,
    /// CAPM alpha against the benchmark.
    pub alpha: Option<f64>,
    /// Strategy period return in excess of the risk-free return.
    pub excess_return: Option<f64>,
    /// Worst peak-to-trough decline seen so far.
    pub max_drawdown: Option<f64>,
    /// Year-month of the latest update timestamp.
    pub period_label: String,
    /// Sharpe ratio.
    pub sharpe: Option<f64>,
    /// Sortino ratio.
    pub sortino: Option<f64>,
    /// Information ratio.
    pub information: Option<f64>,
}

/// Filter a raw metric for reporting: finite values pass through, NaN and
/// infinities become an explicit absent value.
#[must_use]
pub fn reportable(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Render an optional metric for the textual summary, with `NaN` as the
/// absent-value marker.
#[must_use]
pub fn format_metric(value: Option<f64>) -> String {
    value.map_or_else(|| "NaN".to_string(), |v| v.to_string())
}
