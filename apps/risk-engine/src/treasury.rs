//! Treasury yield-curve source and per-day risk-free rate cache.
//!
//! The risk engine consumes treasury data through the
//! [`TreasuryCurveSource`] port. Curve lookups are the dominant per-update
//! cost at minute granularity, so the engine memoizes the resolved period
//! return per calendar day in a [`DailyTreasuryCache`]; the cache lives for
//! the duration of the run and is never evicted (bounded by the trading-day
//! count).

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Days used to de-annualize treasury yields.
const DAYS_PER_YEAR: f64 = 365.0;

/// Constant-maturity tenors published on a treasury curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TreasuryMaturity {
    /// 3-month bill.
    ThreeMonth,
    /// 6-month bill.
    SixMonth,
    /// 1-year note.
    OneYear,
    /// 2-year note.
    TwoYear,
    /// 5-year note.
    FiveYear,
    /// 10-year note.
    TenYear,
    /// 30-year bond.
    ThirtyYear,
}

/// One published yield-curve row (annualized decimal rates).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YieldCurve {
    /// 3-month rate.
    pub three_month: f64,
    /// 6-month rate.
    pub six_month: f64,
    /// 1-year rate.
    pub one_year: f64,
    /// 2-year rate.
    pub two_year: f64,
    /// 5-year rate.
    pub five_year: f64,
    /// 10-year rate.
    pub ten_year: f64,
    /// 30-year rate.
    pub thirty_year: f64,
}

impl YieldCurve {
    /// A flat curve quoting the same rate at every tenor.
    #[must_use]
    pub const fn flat(rate: f64) -> Self {
        Self {
            three_month: rate,
            six_month: rate,
            one_year: rate,
            two_year: rate,
            five_year: rate,
            ten_year: rate,
            thirty_year: rate,
        }
    }

    /// Rate at a given tenor.
    #[must_use]
    pub const fn rate(&self, maturity: TreasuryMaturity) -> f64 {
        match maturity {
            TreasuryMaturity::ThreeMonth => self.three_month,
            TreasuryMaturity::SixMonth => self.six_month,
            TreasuryMaturity::OneYear => self.one_year,
            TreasuryMaturity::TwoYear => self.two_year,
            TreasuryMaturity::FiveYear => self.five_year,
            TreasuryMaturity::TenYear => self.ten_year,
            TreasuryMaturity::ThirtyYear => self.thirty_year,
        }
    }
}

/// Port for querying a treasury curve history.
///
/// Implementations resolve the curve in effect on a given day; the risk
/// engine never mutates the source.
pub trait TreasuryCurveSource {
    /// Annualized rate at `maturity` from the most recent curve published
    /// on or before `day`. `None` when no curve covers `day`.
    fn rate(&self, maturity: TreasuryMaturity, day: NaiveDate) -> Option<f64>;
}

/// In-memory treasury curve history keyed by publication date.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TreasuryCurveTable {
    curves: BTreeMap<NaiveDate, YieldCurve>,
}

impl TreasuryCurveTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A table holding a single flat curve effective from `from` onward.
    #[must_use]
    pub fn flat(from: NaiveDate, rate: f64) -> Self {
        let mut curves = BTreeMap::new();
        curves.insert(from, YieldCurve::flat(rate));
        Self { curves }
    }

    /// Insert (or replace) the curve published on `day`.
    pub fn insert(&mut self, day: NaiveDate, curve: YieldCurve) {
        self.curves.insert(day, curve);
    }

    /// Number of published curves.
    #[must_use]
    pub fn len(&self) -> usize {
        self.curves.len()
    }

    /// Whether the table holds no curves.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }
}

impl TreasuryCurveSource for TreasuryCurveTable {
    fn rate(&self, maturity: TreasuryMaturity, day: NaiveDate) -> Option<f64> {
        self.curves
            .range(..=day)
            .next_back()
            .map(|(_, curve)| curve.rate(maturity))
    }
}

/// Risk-free period return from `period_start` through `period_end`.
///
/// Fixed maturity-selection policy: the 10-year constant-maturity rate from
/// the most recent curve on or before `period_end`, de-annualized linearly
/// (non-compounded) over the period's calendar days.
pub fn choose_treasury<C: TreasuryCurveSource + ?Sized>(
    source: &C,
    period_start: DateTime<Utc>,
    period_end: DateTime<Utc>,
) -> Option<f64> {
    let rate = source.rate(TreasuryMaturity::TenYear, period_end.date_naive())?;
    let days = (period_end.date_naive() - period_start.date_naive()).num_days();
    if days < 0 {
        return None;
    }
    Some(rate * days as f64 / DAYS_PER_YEAR)
}

/// Lazy per-calendar-day memo of resolved treasury period returns.
///
/// Keys are timestamps coarsened to their calendar day, so minute-level
/// updates within one day cost at most one curve query.
#[derive(Debug, Clone, Default)]
pub struct DailyTreasuryCache {
    rates: HashMap<NaiveDate, f64>,
}

impl DailyTreasuryCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Period return for the day containing `t`, resolving through `source`
    /// on a cache miss.
    ///
    /// Unresolvable days (no curve data) yield NaN and stay uncached, so a
    /// later update can retry once data appears.
    pub fn period_return<C: TreasuryCurveSource + ?Sized>(
        &mut self,
        source: &C,
        period_start: DateTime<Utc>,
        t: DateTime<Utc>,
    ) -> f64 {
        let day = t.date_naive();
        if let Some(&cached) = self.rates.get(&day) {
            return cached;
        }
        match choose_treasury(source, period_start, t) {
            Some(rate) => {
                self.rates.insert(day, rate);
                rate
            }
            None => {
                warn!(%day, "no treasury curve covers day; reporting NaN period return");
                f64::NAN
            }
        }
    }

    /// Number of distinct calendar days resolved so far.
    #[must_use]
    pub fn resolved_days(&self) -> usize {
        self.rates.len()
    }
}
