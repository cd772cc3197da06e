//! Time-indexed return storage over the continuous grid.

use chrono::{DateTime, Utc};
use tracing::trace;

use crate::calendar::TimeGrid;
use crate::risk::error::RiskError;
use crate::risk::ratios;

/// Append-only storage of strategy and benchmark returns over the grid.
///
/// Both series are pre-sized to the time grid and initialized to NaN
/// ("missing"). The observed view of a series is the ordered list of
/// non-missing entries; writes must arrive in non-decreasing timestamp
/// order, and a written slot is never overwritten by an update to an
/// earlier timestamp.
#[derive(Debug, Clone)]
pub struct ReturnBuffer {
    grid: TimeGrid,
    periods_per_year: f64,
    algorithm: Vec<f64>,
    benchmark: Vec<f64>,
    algorithm_observed: Vec<f64>,
    benchmark_observed: Vec<f64>,
    algorithm_indices: Vec<usize>,
    benchmark_indices: Vec<usize>,
    annualized_mean_returns: Vec<f64>,
}

impl ReturnBuffer {
    /// Create a buffer spanning `grid` with all entries missing.
    #[must_use]
    pub fn new(grid: TimeGrid, periods_per_year: f64) -> Self {
        let len = grid.len();
        Self {
            grid,
            periods_per_year,
            algorithm: vec![f64::NAN; len],
            benchmark: vec![f64::NAN; len],
            algorithm_observed: Vec::new(),
            benchmark_observed: Vec::new(),
            algorithm_indices: Vec::new(),
            benchmark_indices: Vec::new(),
            annualized_mean_returns: Vec::new(),
        }
    }

    /// Record both returns at timestamp `t` and refresh the derived
    /// annualized-mean series. Returns the grid position written.
    ///
    /// A NaN input leaves that series' observed view unchanged, which the
    /// caller's index-set check then surfaces as a data-consistency error.
    ///
    /// # Errors
    ///
    /// Returns [`RiskError::TimestampOutsideGrid`] when `t` does not exist
    /// on the configured grid; a configuration error, not recoverable
    /// mid-run.
    pub fn record(
        &mut self,
        t: DateTime<Utc>,
        algorithm_return: f64,
        benchmark_return: f64,
    ) -> Result<usize, RiskError> {
        let position = self.grid.position(t).ok_or(RiskError::TimestampOutsideGrid {
            dt: t,
            start: self.grid.first(),
            end: self.grid.last(),
        })?;

        self.algorithm[position] = algorithm_return;
        if !algorithm_return.is_nan() {
            self.algorithm_observed.push(algorithm_return);
            self.algorithm_indices.push(position);
        }

        self.benchmark[position] = benchmark_return;
        if !benchmark_return.is_nan() {
            self.benchmark_observed.push(benchmark_return);
            self.benchmark_indices.push(position);
        }

        if let Some(mean) = ratios::mean(&self.algorithm_observed) {
            self.annualized_mean_returns.push(mean * self.periods_per_year);
        }

        trace!(%t, position, "recorded return pair");
        Ok(position)
    }

    /// Observed (non-missing) strategy returns, in arrival order.
    #[must_use]
    pub fn observed_algorithm(&self) -> &[f64] {
        &self.algorithm_observed
    }

    /// Observed (non-missing) benchmark returns, in arrival order.
    #[must_use]
    pub fn observed_benchmark(&self) -> &[f64] {
        &self.benchmark_observed
    }

    /// Number of observed strategy-return entries.
    #[must_use]
    pub fn observed_count(&self) -> usize {
        self.algorithm_observed.len()
    }

    /// Whether the strategy and benchmark observed-index sets coincide.
    #[must_use]
    pub fn indices_match(&self) -> bool {
        self.algorithm_indices == self.benchmark_indices
    }

    /// Count of observed benchmark entries (for mismatch diagnostics).
    #[must_use]
    pub fn benchmark_count(&self) -> usize {
        self.benchmark_observed.len()
    }

    /// Derived annualized mean-return series, one entry per observed write.
    #[must_use]
    pub fn annualized_mean_returns(&self) -> &[f64] {
        &self.annualized_mean_returns
    }

    /// Grid timestamp of the latest observed strategy return.
    #[must_use]
    pub fn last_observed_timestamp(&self) -> Option<DateTime<Utc>> {
        self.algorithm_indices
            .last()
            .and_then(|&position| self.grid.timestamp(position))
    }

    /// The continuous time grid backing this buffer.
    #[must_use]
    pub const fn grid(&self) -> &TimeGrid {
        &self.grid
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};

    use crate::calendar::{ReturnsFrequency, SimParams, TimeGrid, TradingCalendar};

    use super::*;

    fn dt(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_time(NaiveTime::MIN)
            .and_utc()
    }

    fn daily_buffer() -> ReturnBuffer {
        let cal = TradingCalendar::weekdays(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        );
        let params = SimParams::new(dt(2024, 1, 1), dt(2024, 1, 31), ReturnsFrequency::Daily);
        let grid = TimeGrid::build(&params, &cal, ReturnsFrequency::Daily).unwrap();
        ReturnBuffer::new(grid, ReturnsFrequency::Daily.periods_per_year())
    }

    #[test]
    fn test_record_grows_observed_view() {
        let mut buffer = daily_buffer();
        assert_eq!(buffer.observed_count(), 0);

        buffer.record(dt(2024, 1, 1), 0.01, 0.005).unwrap();
        buffer.record(dt(2024, 1, 2), -0.02, -0.01).unwrap();

        assert_eq!(buffer.observed_count(), 2);
        assert_eq!(buffer.observed_algorithm(), &[0.01, -0.02]);
        assert_eq!(buffer.observed_benchmark(), &[0.005, -0.01]);
        assert!(buffer.indices_match());
        assert_eq!(buffer.last_observed_timestamp(), Some(dt(2024, 1, 2)));
    }

    #[test]
    fn test_record_outside_grid_is_fatal() {
        let mut buffer = daily_buffer();
        let result = buffer.record(dt(2024, 6, 1), 0.01, 0.005);
        assert!(matches!(result, Err(RiskError::TimestampOutsideGrid { .. })));
        assert_eq!(buffer.observed_count(), 0);
    }

    #[test]
    fn test_weekend_timestamp_is_off_grid() {
        let mut buffer = daily_buffer();
        let result = buffer.record(dt(2024, 1, 6), 0.01, 0.005);
        assert!(matches!(result, Err(RiskError::TimestampOutsideGrid { .. })));
    }

    #[test]
    fn test_nan_benchmark_diverges_indices() {
        let mut buffer = daily_buffer();
        buffer.record(dt(2024, 1, 1), 0.01, 0.005).unwrap();
        buffer.record(dt(2024, 1, 2), 0.02, f64::NAN).unwrap();

        assert!(!buffer.indices_match());
        assert_eq!(buffer.observed_count(), 2);
        assert_eq!(buffer.benchmark_count(), 1);
    }

    #[test]
    fn test_annualized_mean_tracks_observed_window() {
        let mut buffer = daily_buffer();
        buffer.record(dt(2024, 1, 1), 0.01, 0.005).unwrap();
        buffer.record(dt(2024, 1, 2), 0.03, 0.01).unwrap();

        let means = buffer.annualized_mean_returns();
        assert_eq!(means.len(), 2);
        assert!((means[0] - 0.01 * 252.0).abs() < 1e-12);
        assert!((means[1] - 0.02 * 252.0).abs() < 1e-12);
    }
}
