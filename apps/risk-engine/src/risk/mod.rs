//! Cumulative risk-statistics aggregation for backtest evaluation.
//!
//! Implements the standard cumulative risk metrics over a stream of paired
//! (strategy, benchmark) return observations:
//! - Sharpe ratio (risk-adjusted returns)
//! - Sortino ratio (downside risk-adjusted returns)
//! - Information ratio (benchmark-relative consistency)
//! - Alpha and beta (CAPM exposure decomposition)
//! - Maximum drawdown (peak-to-trough decline of compounded returns)
//! - Annualized volatility and compounded period returns
//!
//! # Example
//!
//! ```ignore
//! use risk_engine::calendar::{ReturnsFrequency, SimParams, TradingCalendar};
//! use risk_engine::risk::CumulativeRiskMetrics;
//! use risk_engine::treasury::TreasuryCurveTable;
//!
//! let calendar = TradingCalendar::weekdays(start, end);
//! let params = SimParams::new(period_start, period_end, ReturnsFrequency::Daily);
//! let treasury = TreasuryCurveTable::flat(start, 0.04);
//!
//! let mut metrics = CumulativeRiskMetrics::new(&params, &calendar, treasury)?;
//! metrics.update(day, 0.0123, 0.0087)?;
//! println!("{}", metrics.summary());
//! ```

mod cumulative;
mod drawdown;
mod error;
mod ratios;
mod returns;
mod snapshot;

pub use cumulative::{CumulativeRiskMetrics, MetricsTimeline};
pub use drawdown::DrawdownTracker;
pub use error::RiskError;
pub use ratios::{
    alpha, annualized_volatility, beta, downside_risk, information_ratio, mean, period_return,
    sample_covariance, sample_std_dev, sharpe_ratio, sortino_ratio, tolerant_equals,
};
pub use returns::ReturnBuffer;
pub use snapshot::{RiskSnapshot, format_metric, reportable};
