//! Cumulative risk-statistics aggregator.
//!
//! Instantiate [`CumulativeRiskMetrics`] once per backtest run and call
//! [`CumulativeRiskMetrics::update`] on every simulated period, strictly in
//! chronological order. Every update appends to the running series, never
//! overwrites, so the full metric history stays available for inspection
//! alongside the latest snapshot.

use std::fmt::Write;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::calendar::{ReturnsFrequency, SimParams, TimeGrid, TradingCalendar};
use crate::risk::drawdown::DrawdownTracker;
use crate::risk::error::RiskError;
use crate::risk::ratios;
use crate::risk::returns::ReturnBuffer;
use crate::risk::snapshot::{RiskSnapshot, format_metric, reportable};
use crate::treasury::{DailyTreasuryCache, TreasuryCurveSource};

/// Grid-indexed table of the headline metrics, one row per update.
///
/// Columns are pre-sized to the time grid and initialized to NaN; the row
/// for a timestamp is written exactly once, when the update for that
/// timestamp runs.
#[derive(Debug, Clone)]
pub struct MetricsTimeline {
    alpha: Vec<f64>,
    beta: Vec<f64>,
    sharpe: Vec<f64>,
}

impl MetricsTimeline {
    fn new(len: usize) -> Self {
        Self {
            alpha: vec![f64::NAN; len],
            beta: vec![f64::NAN; len],
            sharpe: vec![f64::NAN; len],
        }
    }

    fn write(&mut self, position: usize, beta: f64, alpha: f64, sharpe: f64) {
        self.beta[position] = beta;
        self.alpha[position] = alpha;
        self.sharpe[position] = sharpe;
    }

    /// Alpha column over the full grid (NaN where no update ran).
    #[must_use]
    pub fn alpha(&self) -> &[f64] {
        &self.alpha
    }

    /// Beta column over the full grid (NaN where no update ran).
    #[must_use]
    pub fn beta(&self) -> &[f64] {
        &self.beta
    }

    /// Sharpe column over the full grid (NaN where no update ran).
    #[must_use]
    pub fn sharpe(&self) -> &[f64] {
        &self.sharpe
    }
}

/// Stateful accumulator of cumulative backtest risk statistics.
///
/// Single-threaded by contract: exactly one caller advances simulated time
/// forward through `update`; reads may happen between updates. The `&mut`
/// receiver on `update` lets the borrow checker enforce the single-writer
/// rule.
#[derive(Debug)]
pub struct CumulativeRiskMetrics<C: TreasuryCurveSource> {
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    frequency: ReturnsFrequency,
    returns: ReturnBuffer,
    compounded_log_returns: Vec<f64>,
    drawdown: DrawdownTracker,
    algorithm_volatility: Vec<f64>,
    benchmark_volatility: Vec<f64>,
    algorithm_period_returns: Vec<f64>,
    benchmark_period_returns: Vec<f64>,
    treasury_period_returns: Vec<f64>,
    excess_returns: Vec<f64>,
    sortino: Vec<f64>,
    information: Vec<f64>,
    metrics: MetricsTimeline,
    treasury_cache: DailyTreasuryCache,
    treasury: C,
    latest_dt: DateTime<Utc>,
    latest_position: Option<usize>,
}

impl<C: TreasuryCurveSource> CumulativeRiskMetrics<C> {
    /// Construct the aggregator using the simulation emission rate for the
    /// grid granularity.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when no timestamp falls inside the
    /// configured period.
    pub fn new(
        params: &SimParams,
        calendar: &TradingCalendar,
        treasury: C,
    ) -> Result<Self, RiskError> {
        Self::with_frequency(params, calendar, params.emission_rate, treasury)
    }

    /// Construct the aggregator with an explicit returns frequency
    /// overriding the simulation emission rate.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when no timestamp falls inside the
    /// configured period.
    pub fn with_frequency(
        params: &SimParams,
        calendar: &TradingCalendar,
        frequency: ReturnsFrequency,
        treasury: C,
    ) -> Result<Self, RiskError> {
        let grid = TimeGrid::build(params, calendar, frequency)?;
        let latest_dt = grid.first();
        let timeline = MetricsTimeline::new(grid.len());

        info!(
            start = %params.period_start,
            end = %params.period_end,
            ?frequency,
            grid_points = grid.len(),
            "initialized cumulative risk metrics"
        );

        Ok(Self {
            start_date: params.period_start,
            end_date: params.period_end,
            frequency,
            returns: ReturnBuffer::new(grid, frequency.periods_per_year()),
            compounded_log_returns: Vec::new(),
            drawdown: DrawdownTracker::new(),
            algorithm_volatility: Vec::new(),
            benchmark_volatility: Vec::new(),
            algorithm_period_returns: Vec::new(),
            benchmark_period_returns: Vec::new(),
            treasury_period_returns: Vec::new(),
            excess_returns: Vec::new(),
            sortino: Vec::new(),
            information: Vec::new(),
            metrics: timeline,
            treasury_cache: DailyTreasuryCache::new(),
            treasury,
            latest_dt,
            latest_position: None,
        })
    }

    /// Ingest one simulated period.
    ///
    /// Records both returns at `t`, refreshes every running aggregate, and
    /// appends the derived ratios for this period. Calls must arrive in
    /// non-decreasing timestamp order.
    ///
    /// # Errors
    ///
    /// [`RiskError::TimestampOutsideGrid`] when `t` is not on the
    /// configured grid, and [`RiskError::ReturnSeriesMismatch`] when the
    /// strategy and benchmark observed-index sets diverge after the write.
    /// Both are fatal: the risk timeline cannot be trusted past either.
    pub fn update(
        &mut self,
        t: DateTime<Utc>,
        algorithm_return: f64,
        benchmark_return: f64,
    ) -> Result<(), RiskError> {
        // 1. Record both returns; the buffer refreshes the annualized mean.
        let position = self.returns.record(t, algorithm_return, benchmark_return)?;

        // 2. Extend the compounded log history, then verify the two series
        //    are still sampled at exactly the same timestamps.
        self.update_compounded_log_returns();
        if !self.returns.indices_match() {
            return Err(RiskError::ReturnSeriesMismatch {
                benchmark_count: self.returns.benchmark_count(),
                algorithm_count: self.returns.observed_count(),
                start: self.start_date,
                end: self.end_date,
                dt: t,
            });
        }

        // 3. Period returns over the observed windows.
        let algorithm_period_return = ratios::period_return(self.returns.observed_algorithm());
        let benchmark_period_return = ratios::period_return(self.returns.observed_benchmark());
        self.algorithm_period_returns.push(algorithm_period_return);
        self.benchmark_period_returns.push(benchmark_period_return);

        // 4. Drawdown, fed by the newest compounded log entry.
        if let Some(&latest_compound) = self.compounded_log_returns.last() {
            self.drawdown.advance(latest_compound);
        }

        // 5. Volatilities, recomputed over the full observed window.
        let periods_per_year = self.frequency.periods_per_year();
        let benchmark_volatility =
            ratios::annualized_volatility(self.returns.observed_benchmark(), periods_per_year);
        let algorithm_volatility =
            ratios::annualized_volatility(self.returns.observed_algorithm(), periods_per_year);
        self.benchmark_volatility.push(benchmark_volatility);
        self.algorithm_volatility.push(algorithm_volatility);

        // 6. Risk-free return via the per-day cache, then excess return.
        let treasury_period_return =
            self.treasury_cache
                .period_return(&self.treasury, self.start_date, t);
        self.treasury_period_returns.push(treasury_period_return);
        self.excess_returns
            .push(algorithm_period_return - treasury_period_return);

        // 7. Beta, then alpha (alpha consumes beta).
        let beta = ratios::beta(
            self.returns.observed_algorithm(),
            self.returns.observed_benchmark(),
        );
        let alpha = ratios::alpha(
            algorithm_period_return,
            treasury_period_return,
            benchmark_period_return,
            beta,
        );

        // 8. Sharpe into the timeline row, Sortino and Information into
        //    their series.
        let annualized_mean = self
            .returns
            .annualized_mean_returns()
            .last()
            .copied()
            .unwrap_or(f64::NAN);
        let sharpe =
            ratios::sharpe_ratio(algorithm_volatility, annualized_mean, treasury_period_return)
                .unwrap_or(f64::NAN);
        self.metrics.write(position, beta, alpha, sharpe);
        self.sortino.push(ratios::sortino_ratio(
            self.returns.observed_algorithm(),
            algorithm_period_return,
            treasury_period_return,
            periods_per_year,
        ));
        self.information.push(ratios::information_ratio(
            self.returns.observed_algorithm(),
            self.returns.observed_benchmark(),
        ));

        // 9. Advance the latest-timestamp pointer.
        self.latest_dt = t;
        self.latest_position = Some(position);

        debug!(
            %t,
            trading_days = self.returns.observed_count(),
            max_drawdown = self.drawdown.max_drawdown(),
            "updated cumulative risk metrics"
        );
        Ok(())
    }

    /// Append the newest cumulative log-compounded return.
    ///
    /// The increment is ln(1 + r) of the latest observed strategy return;
    /// a return at or below -100% takes a 0.0 increment instead of raising
    /// (deliberate placeholder for the undefined logarithm).
    fn update_compounded_log_returns(&mut self) {
        let Some(&latest) = self.returns.observed_algorithm().last() else {
            return;
        };

        let growth = 1.0 + latest;
        let compound = if growth > 0.0 { growth.ln() } else { 0.0 };

        let entry = self
            .compounded_log_returns
            .last()
            .map_or(compound, |previous| previous + compound);
        self.compounded_log_returns.push(entry);
    }

    /// Latest value of every tracked metric.
    ///
    /// Metrics that are not yet meaningful (no updates, or a NaN/infinite
    /// intermediate) come back as explicit absent values.
    #[must_use]
    pub fn snapshot(&self) -> RiskSnapshot {
        let latest = |series: &[f64]| series.last().copied().and_then(reportable);
        let timeline_latest =
            |column: &[f64]| self.latest_position.map(|p| column[p]).and_then(reportable);

        RiskSnapshot {
            trading_days: self.returns.observed_count(),
            benchmark_volatility: latest(&self.benchmark_volatility),
            algo_volatility: latest(&self.algorithm_volatility),
            treasury_period_return: latest(&self.treasury_period_returns),
            algorithm_period_return: latest(&self.algorithm_period_returns),
            benchmark_period_return: latest(&self.benchmark_period_returns),
            beta: timeline_latest(self.metrics.beta()),
            alpha: timeline_latest(self.metrics.alpha()),
            excess_return: latest(&self.excess_returns),
            max_drawdown: reportable(self.drawdown.max_drawdown()),
            period_label: self
                .last_return_date()
                .unwrap_or(self.latest_dt)
                .format("%Y-%m")
                .to_string(),
            sharpe: timeline_latest(self.metrics.sharpe()),
            sortino: latest(&self.sortino),
            information: latest(&self.information),
        }
    }

    /// Snapshot rendered as pretty JSON.
    #[must_use]
    pub fn snapshot_json(&self) -> String {
        serde_json::to_string_pretty(&self.snapshot()).unwrap_or_default()
    }

    /// One line per tracked metric: latest value, or the absent-value
    /// marker when a series is still empty.
    #[must_use]
    pub fn summary(&self) -> String {
        let latest = |series: &[f64]| series.last().copied();
        let timeline_latest = |column: &[f64]| self.latest_position.map(|p| column[p]);

        let mut out = String::new();
        let _ = writeln!(
            out,
            "algorithm_period_returns:{}",
            format_metric(latest(&self.algorithm_period_returns))
        );
        let _ = writeln!(
            out,
            "benchmark_period_returns:{}",
            format_metric(latest(&self.benchmark_period_returns))
        );
        let _ = writeln!(out, "excess_returns:{}", format_metric(latest(&self.excess_returns)));
        let _ = writeln!(out, "trading_days:{}", self.returns.observed_count());
        let _ = writeln!(
            out,
            "benchmark_volatility:{}",
            format_metric(latest(&self.benchmark_volatility))
        );
        let _ = writeln!(
            out,
            "algorithm_volatility:{}",
            format_metric(latest(&self.algorithm_volatility))
        );
        let _ = writeln!(out, "sharpe:{}", format_metric(timeline_latest(self.metrics.sharpe())));
        let _ = writeln!(out, "sortino:{}", format_metric(latest(&self.sortino)));
        let _ = writeln!(out, "information:{}", format_metric(latest(&self.information)));
        let _ = writeln!(out, "beta:{}", format_metric(timeline_latest(self.metrics.beta())));
        let _ = writeln!(out, "alpha:{}", format_metric(timeline_latest(self.metrics.alpha())));
        let _ = writeln!(out, "max_drawdown:{}", format_metric(Some(self.drawdown.max_drawdown())));
        let _ = writeln!(
            out,
            "algorithm_returns:{}",
            format_metric(latest(self.returns.observed_algorithm()))
        );
        let _ = writeln!(
            out,
            "benchmark_returns:{}",
            format_metric(latest(self.returns.observed_benchmark()))
        );
        out
    }

    /// Timestamp of the latest observed strategy return.
    #[must_use]
    pub fn last_return_date(&self) -> Option<DateTime<Utc>> {
        self.returns.last_observed_timestamp()
    }

    /// Latest update timestamp (grid start before any update).
    #[must_use]
    pub const fn latest_dt(&self) -> DateTime<Utc> {
        self.latest_dt
    }

    /// Number of observed trading periods.
    #[must_use]
    pub fn trading_days(&self) -> usize {
        self.returns.observed_count()
    }

    /// Worst peak-to-trough decline seen so far.
    #[must_use]
    pub const fn max_drawdown(&self) -> f64 {
        self.drawdown.max_drawdown()
    }

    /// Grid-indexed alpha/beta/Sharpe table.
    #[must_use]
    pub const fn timeline(&self) -> &MetricsTimeline {
        &self.metrics
    }

    /// Cumulative log-compounded strategy return, one entry per update.
    #[must_use]
    pub fn compounded_log_returns(&self) -> &[f64] {
        &self.compounded_log_returns
    }

    /// Annualized strategy volatility, one entry per update.
    #[must_use]
    pub fn algorithm_volatility(&self) -> &[f64] {
        &self.algorithm_volatility
    }

    /// Annualized benchmark volatility, one entry per update.
    #[must_use]
    pub fn benchmark_volatility(&self) -> &[f64] {
        &self.benchmark_volatility
    }

    /// Compounded strategy period return, one entry per update.
    #[must_use]
    pub fn algorithm_period_returns(&self) -> &[f64] {
        &self.algorithm_period_returns
    }

    /// Compounded benchmark period return, one entry per update.
    #[must_use]
    pub fn benchmark_period_returns(&self) -> &[f64] {
        &self.benchmark_period_returns
    }

    /// Resolved risk-free period return, one entry per update.
    #[must_use]
    pub fn treasury_period_returns(&self) -> &[f64] {
        &self.treasury_period_returns
    }

    /// Strategy period return in excess of the risk-free return.
    #[must_use]
    pub fn excess_returns(&self) -> &[f64] {
        &self.excess_returns
    }

    /// Sortino ratio, one entry per update.
    #[must_use]
    pub fn sortino(&self) -> &[f64] {
        &self.sortino
    }

    /// Information ratio, one entry per update.
    #[must_use]
    pub fn information(&self) -> &[f64] {
        &self.information
    }

    /// The underlying return buffer and time grid.
    #[must_use]
    pub const fn returns(&self) -> &ReturnBuffer {
        &self.returns
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use chrono::{Duration, NaiveDate, NaiveTime};

    use crate::treasury::{TreasuryCurveTable, TreasuryMaturity};

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dt(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        date(y, m, d).and_time(NaiveTime::MIN).and_utc()
    }

    fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
        (a - b).abs() < tolerance
    }

    /// January 2024 weekday engine with a flat treasury curve.
    fn daily_engine(rate: f64) -> CumulativeRiskMetrics<TreasuryCurveTable> {
        let calendar = TradingCalendar::weekdays(date(2024, 1, 1), date(2024, 1, 31));
        let params = SimParams::new(dt(2024, 1, 1), dt(2024, 1, 31), ReturnsFrequency::Daily);
        let treasury = TreasuryCurveTable::flat(date(2023, 12, 29), rate);
        CumulativeRiskMetrics::new(&params, &calendar, treasury).unwrap()
    }

    #[test]
    fn test_three_day_scenario() {
        let mut engine = daily_engine(0.0);
        let algorithm = [0.01, -0.02, 0.03];
        let benchmark = [0.005, -0.01, 0.02];

        let mut drawdowns = Vec::new();
        for (i, (a, b)) in algorithm.iter().zip(benchmark.iter()).enumerate() {
            engine.update(dt(2024, 1, 1 + i as u32), *a, *b).unwrap();
            drawdowns.push(engine.max_drawdown());
        }

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.trading_days, 3);
        let period = snapshot.algorithm_period_return.unwrap();
        assert!(approx_eq(period, 1.01 * 0.98 * 1.03 - 1.0, 1e-12));
        assert!(approx_eq(period, 0.017906, 1e-6));

        // Day 2's loss opens a drawdown; day 3's recovery never shrinks it.
        assert_eq!(drawdowns[0], 0.0);
        assert!(drawdowns[1] > 0.0);
        assert!(drawdowns[2] >= drawdowns[1]);
        assert!(approx_eq(drawdowns[1], 0.02, 1e-12));
    }

    #[test]
    fn test_first_update_sharpe_is_absent() {
        let mut engine = daily_engine(0.0);
        engine.update(dt(2024, 1, 1), 0.0, 0.0).unwrap();

        let snapshot = engine.snapshot();
        // A single observation has zero volatility, so Sharpe is not yet
        // meaningful; beta's placeholder is a real 0.0.
        assert_eq!(snapshot.sharpe, None);
        assert_eq!(snapshot.beta, Some(0.0));
        assert_eq!(snapshot.algo_volatility, Some(0.0));
        assert_eq!(snapshot.trading_days, 1);
    }

    #[test]
    fn test_identical_series_give_unit_beta_and_zero_alpha() {
        let mut engine = daily_engine(0.0);
        let returns = [0.01, -0.02, 0.03, 0.005, -0.01];
        for (i, r) in returns.iter().enumerate() {
            engine.update(dt(2024, 1, 1 + i as u32), *r, *r).unwrap();
        }

        let snapshot = engine.snapshot();
        assert!(approx_eq(snapshot.beta.unwrap(), 1.0, 1e-9));
        assert!(approx_eq(snapshot.alpha.unwrap(), 0.0, 1e-9));
        assert_eq!(snapshot.information, Some(0.0));
        assert_eq!(
            snapshot.algorithm_period_return.unwrap(),
            snapshot.benchmark_period_return.unwrap()
        );
    }

    #[test]
    fn test_total_loss_takes_log_fallback() {
        let mut engine = daily_engine(0.0);
        engine.update(dt(2024, 1, 1), -1.0, -0.5).unwrap();

        // ln(1 + -1.0) is undefined; the history takes the documented 0.0
        // placeholder instead of propagating a domain error.
        assert_eq!(engine.compounded_log_returns(), &[0.0]);
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.algorithm_period_return, Some(-1.0));
        assert_eq!(snapshot.max_drawdown, Some(0.0));
    }

    #[test]
    fn test_nan_benchmark_is_a_fatal_mismatch() {
        let mut engine = daily_engine(0.0);
        engine.update(dt(2024, 1, 1), 0.01, 0.005).unwrap();

        let result = engine.update(dt(2024, 1, 2), 0.02, f64::NAN);
        assert!(matches!(
            result,
            Err(RiskError::ReturnSeriesMismatch {
                algorithm_count: 2,
                benchmark_count: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_update_outside_grid_is_fatal() {
        let mut engine = daily_engine(0.0);
        let result = engine.update(dt(2024, 6, 3), 0.01, 0.005);
        assert!(matches!(result, Err(RiskError::TimestampOutsideGrid { .. })));
        assert_eq!(engine.trading_days(), 0);
    }

    #[test]
    fn test_timeline_rows_written_once_per_update() {
        let mut engine = daily_engine(0.0);
        engine.update(dt(2024, 1, 1), 0.01, 0.005).unwrap();
        engine.update(dt(2024, 1, 2), -0.02, -0.01).unwrap();

        let beta = engine.timeline().beta();
        assert!(!beta[0].is_nan());
        assert!(!beta[1].is_nan());
        // Untouched rows keep their missing marker.
        assert!(beta[2..].iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_drawdown_is_monotone_across_updates() {
        let mut engine = daily_engine(0.0);
        // Jan 1-5 2024 are all weekdays, so every timestamp is on-grid.
        let returns = [0.02, -0.05, 0.01, -0.03, 0.08];
        let mut previous = 0.0;
        for (i, r) in returns.iter().enumerate() {
            engine.update(dt(2024, 1, 1 + i as u32), *r, 0.0).unwrap();
            let dd = engine.max_drawdown();
            assert!(dd >= previous);
            previous = dd;
        }
        assert!(previous > 0.0);
    }

    #[test]
    fn test_compounded_history_depends_on_arrival_order() {
        let forward = [0.01, -0.02, 0.03];
        let reversed = [0.03, -0.02, 0.01];

        let mut first = daily_engine(0.0);
        let mut second = daily_engine(0.0);
        for i in 0..3 {
            first.update(dt(2024, 1, 1 + i as u32), forward[i], 0.0).unwrap();
            second.update(dt(2024, 1, 1 + i as u32), reversed[i], 0.0).unwrap();
        }

        // The compounded period return is order-independent...
        assert!(approx_eq(
            first.snapshot().algorithm_period_return.unwrap(),
            second.snapshot().algorithm_period_return.unwrap(),
            1e-12
        ));
        // ...but the running log history is not.
        assert!(!approx_eq(
            first.compounded_log_returns()[0],
            second.compounded_log_returns()[0],
            1e-12
        ));
    }

    #[test]
    fn test_excess_return_subtracts_treasury() {
        // 36.5% flat annual rate makes the daily de-annualized slice 0.001.
        let mut engine = daily_engine(0.365);
        engine.update(dt(2024, 1, 1), 0.01, 0.005).unwrap();
        engine.update(dt(2024, 1, 2), 0.02, 0.01).unwrap();

        let snapshot = engine.snapshot();
        let treasury = snapshot.treasury_period_return.unwrap();
        assert!(approx_eq(treasury, 0.365 / 365.0, 1e-12));
        assert!(approx_eq(
            snapshot.excess_return.unwrap(),
            snapshot.algorithm_period_return.unwrap() - treasury,
            1e-12
        ));
    }

    #[test]
    fn test_snapshot_period_label_is_year_month() {
        let mut engine = daily_engine(0.0);
        engine.update(dt(2024, 1, 3), 0.01, 0.005).unwrap();
        assert_eq!(engine.snapshot().period_label, "2024-01");
        assert_eq!(engine.last_return_date(), Some(dt(2024, 1, 3)));
    }

    #[test]
    fn test_summary_lists_every_metric() {
        let engine = daily_engine(0.0);
        let summary = engine.summary();

        for line in [
            "algorithm_period_returns:NaN",
            "benchmark_period_returns:NaN",
            "excess_returns:NaN",
            "trading_days:0",
            "sharpe:NaN",
            "sortino:NaN",
            "information:NaN",
            "beta:NaN",
            "alpha:NaN",
            "max_drawdown:0",
            "algorithm_returns:NaN",
            "benchmark_returns:NaN",
        ] {
            assert!(summary.contains(line), "missing line: {line}");
        }
    }

    /// Counts curve queries so the per-day memoization is observable.
    struct CountingSource {
        inner: TreasuryCurveTable,
        queries: Cell<usize>,
    }

    impl TreasuryCurveSource for CountingSource {
        fn rate(&self, maturity: TreasuryMaturity, day: NaiveDate) -> Option<f64> {
            self.queries.set(self.queries.get() + 1);
            self.inner.rate(maturity, day)
        }
    }

    #[test]
    fn test_minute_updates_query_treasury_once_per_day() {
        let calendar = TradingCalendar::weekdays(date(2024, 1, 2), date(2024, 1, 2));
        let params = SimParams::new(dt(2024, 1, 2), dt(2024, 1, 2), ReturnsFrequency::Minute);
        let source = CountingSource {
            inner: TreasuryCurveTable::flat(date(2023, 12, 29), 0.04),
            queries: Cell::new(0),
        };
        let mut engine =
            CumulativeRiskMetrics::new(&params, &calendar, source).unwrap();

        for minute in 0..30 {
            let t = params.first_open + Duration::minutes(minute);
            engine.update(t, 0.0001, 0.0001).unwrap();
        }

        assert_eq!(engine.trading_days(), 30);
        assert_eq!(engine.treasury.queries.get(), 1);
    }

    #[test]
    fn test_frequency_override_changes_grid() {
        let calendar = TradingCalendar::weekdays(date(2024, 1, 2), date(2024, 1, 3));
        let params = SimParams::new(dt(2024, 1, 2), dt(2024, 1, 3), ReturnsFrequency::Daily);
        let treasury = TreasuryCurveTable::flat(date(2023, 12, 29), 0.0);

        let engine = CumulativeRiskMetrics::with_frequency(
            &params,
            &calendar,
            ReturnsFrequency::Minute,
            treasury,
        )
        .unwrap();

        // Two sessions of minutes rather than two daily points.
        assert!(engine.returns().grid().len() > 2);
        assert_eq!(engine.returns().grid().first(), params.first_open);
        assert_eq!(engine.returns().grid().last(), params.last_close);
    }
}
