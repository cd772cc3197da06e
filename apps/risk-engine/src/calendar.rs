//! Simulation parameters, trading calendar, and time-grid construction.
//!
//! The risk engine is driven over a continuous time grid fixed at
//! construction: one point per trading day for daily emission, or one point
//! per minute between the first open and the last close for minute
//! emission. The grid is strictly increasing and always contains the
//! period's final timestamp, even when that timestamp is not a trading day.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::risk::RiskError;

/// NYSE session open relative to midnight UTC (09:30 ET).
const SESSION_OPEN_MINUTES: i64 = 14 * 60 + 30;

/// NYSE session close relative to midnight UTC (16:00 ET).
const SESSION_CLOSE_MINUTES: i64 = 21 * 60;

/// Granularity of the return stream fed into the risk engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReturnsFrequency {
    /// One observation per trading day.
    #[default]
    Daily,
    /// One observation per session minute.
    Minute,
}

impl ReturnsFrequency {
    /// Parse a frequency string.
    ///
    /// # Errors
    ///
    /// Returns [`RiskError::UnrecognizedFrequency`] for anything other than
    /// a daily or minute spelling.
    pub fn parse(value: &str) -> Result<Self, RiskError> {
        match value.to_uppercase().as_str() {
            "DAILY" => Ok(Self::Daily),
            "MINUTE" => Ok(Self::Minute),
            _ => Err(RiskError::UnrecognizedFrequency(value.to_string())),
        }
    }

    /// Number of periods in a trading year at this granularity.
    ///
    /// 252 trading days; minute granularity scales by the 390-minute
    /// session length.
    #[must_use]
    pub const fn periods_per_year(self) -> f64 {
        match self {
            Self::Daily => 252.0,
            Self::Minute => 252.0 * 390.0,
        }
    }
}

/// Ordered set of trading days supplied by the calendar provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradingCalendar {
    days: Vec<NaiveDate>,
}

impl TradingCalendar {
    /// Create a calendar from a set of trading days.
    ///
    /// Days are sorted and deduplicated; the input order does not matter.
    #[must_use]
    pub fn new(mut days: Vec<NaiveDate>) -> Self {
        days.sort_unstable();
        days.dedup();
        Self { days }
    }

    /// Build a weekday (Mon-Fri) calendar over an inclusive date range.
    ///
    /// A stand-in for an exchange calendar; holidays are not modelled.
    #[must_use]
    pub fn weekdays(start: NaiveDate, end: NaiveDate) -> Self {
        let days = start
            .iter_days()
            .take_while(|d| *d <= end)
            .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
            .collect();
        Self { days }
    }

    /// All trading days, in ascending order.
    #[must_use]
    pub fn days(&self) -> &[NaiveDate] {
        &self.days
    }

    /// Trading days within an inclusive date range.
    #[must_use]
    pub fn days_between(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        self.days
            .iter()
            .copied()
            .filter(|d| *d >= start && *d <= end)
            .collect()
    }

    /// Whether `day` is a trading day.
    #[must_use]
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.days.binary_search(&day).is_ok()
    }

    /// Number of trading days in the calendar.
    #[must_use]
    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// Whether the calendar holds no trading days.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

/// Simulation parameters handed to the risk engine at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimParams {
    /// Backtest period start, normalized to midnight UTC.
    pub period_start: DateTime<Utc>,
    /// Backtest period end, normalized to midnight UTC.
    pub period_end: DateTime<Utc>,
    /// First session open of the period (minute grids start here).
    pub first_open: DateTime<Utc>,
    /// Last session close of the period (minute grids end here).
    pub last_close: DateTime<Utc>,
    /// Emission rate of the enclosing backtest.
    pub emission_rate: ReturnsFrequency,
}

impl SimParams {
    /// Create simulation parameters over an inclusive date range.
    ///
    /// Period bounds are normalized to midnight; session open/close default
    /// to the NYSE session expressed in UTC.
    #[must_use]
    pub fn new(
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
        emission_rate: ReturnsFrequency,
    ) -> Self {
        let period_start = midnight(period_start);
        let period_end = midnight(period_end);
        Self {
            period_start,
            period_end,
            first_open: period_start + Duration::minutes(SESSION_OPEN_MINUTES),
            last_close: period_end + Duration::minutes(SESSION_CLOSE_MINUTES),
            emission_rate,
        }
    }

    /// Override the derived session bounds.
    #[must_use]
    pub const fn with_session(mut self, first_open: DateTime<Utc>, last_close: DateTime<Utc>) -> Self {
        self.first_open = first_open;
        self.last_close = last_close;
        self
    }
}

/// Truncate a timestamp to midnight UTC.
fn midnight(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// Strictly increasing timestamp index spanning the backtest period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeGrid {
    index: Vec<DateTime<Utc>>,
}

impl TimeGrid {
    /// Build the continuous grid for the configured period and granularity.
    ///
    /// Daily grids hold one midnight timestamp per trading day inside the
    /// period, with the period end appended when it is not itself a trading
    /// day. Minute grids hold every minute from first open through last
    /// close inclusive.
    ///
    /// # Errors
    ///
    /// Returns [`RiskError::EmptyTimeGrid`] when no timestamp falls inside
    /// the period.
    pub fn build(
        params: &SimParams,
        calendar: &TradingCalendar,
        frequency: ReturnsFrequency,
    ) -> Result<Self, RiskError> {
        let index = match frequency {
            ReturnsFrequency::Daily => {
                let mut index: Vec<DateTime<Utc>> = calendar
                    .days_between(params.period_start.date_naive(), params.period_end.date_naive())
                    .into_iter()
                    .map(|d| d.and_time(NaiveTime::MIN).and_utc())
                    .collect();
                if index.last() != Some(&params.period_end) {
                    index.push(params.period_end);
                }
                index
            }
            ReturnsFrequency::Minute => {
                let mut index = Vec::new();
                let mut t = params.first_open;
                while t <= params.last_close {
                    index.push(t);
                    t += Duration::minutes(1);
                }
                index
            }
        };

        if index.is_empty() {
            return Err(RiskError::EmptyTimeGrid {
                start: params.period_start,
                end: params.period_end,
            });
        }
        Ok(Self { index })
    }

    /// Grid position of `t`, if `t` is on the grid.
    #[must_use]
    pub fn position(&self, t: DateTime<Utc>) -> Option<usize> {
        self.index.binary_search(&t).ok()
    }

    /// Timestamp at a grid position.
    #[must_use]
    pub fn timestamp(&self, position: usize) -> Option<DateTime<Utc>> {
        self.index.get(position).copied()
    }

    /// First grid timestamp. The grid is never empty by construction.
    #[must_use]
    pub fn first(&self) -> DateTime<Utc> {
        self.index[0]
    }

    /// Last grid timestamp.
    #[must_use]
    pub fn last(&self) -> DateTime<Utc> {
        self.index[self.index.len() - 1]
    }

    /// Number of grid points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the grid holds no timestamps. Always false for built grids.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
