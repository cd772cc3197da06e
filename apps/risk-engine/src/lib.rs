// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::too_many_lines,
        clippy::items_after_statements
    )
)]

//! Risk Engine - Rust Core Library
//!
//! Cumulative risk statistics for the Cream backtest pipeline.
//!
//! # Architecture
//!
//! The engine is a single stateful aggregator fed one simulated period at a
//! time by the enclosing backtest loop:
//!
//! - **`calendar`**: simulation parameters, trading-day calendar, and the
//!   continuous time grid (daily or minute granularity)
//! - **`treasury`**: treasury yield-curve port, in-memory curve table, and
//!   the per-calendar-day risk-free rate cache
//! - **`risk`**: the cumulative aggregator itself - return buffer,
//!   drawdown tracker, ratio calculators, metrics timeline, and snapshot
//!
//! The aggregator is synchronous and single-writer by contract: exactly one
//! caller advances simulated time strictly forward; reads are safe between
//! updates. Configuration and data-consistency failures abort the run;
//! numerical degeneracies (near-zero volatility, too few observations)
//! produce documented sentinel values instead of errors.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

/// Simulation parameters, trading calendar, and time-grid construction.
pub mod calendar;

/// Cumulative risk metrics, ratio calculators, and snapshots.
pub mod risk;

/// Treasury yield-curve source and per-day rate cache.
pub mod treasury;

pub use calendar::{ReturnsFrequency, SimParams, TimeGrid, TradingCalendar};
pub use risk::{
    CumulativeRiskMetrics, DrawdownTracker, MetricsTimeline, ReturnBuffer, RiskError, RiskSnapshot,
};
pub use treasury::{
    DailyTreasuryCache, TreasuryCurveSource, TreasuryCurveTable, TreasuryMaturity, YieldCurve,
};
