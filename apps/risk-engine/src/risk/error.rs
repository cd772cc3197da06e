//! Risk engine error types.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Fatal errors raised by the risk engine.
///
/// Numerical degeneracies (near-zero volatility, too few observations for
/// beta, log of a non-positive quantity) are never errors; they produce
/// documented fallback values instead.
#[derive(Debug, Error)]
pub enum RiskError {
    /// Returns frequency string not recognized at construction.
    #[error("unrecognized returns frequency: {0} (expected DAILY or MINUTE)")]
    UnrecognizedFrequency(String),

    /// No timestamps fall inside the configured period.
    #[error("empty time grid for period {start} : {end}")]
    EmptyTimeGrid {
        /// Configured period start.
        start: DateTime<Utc>,
        /// Configured period end.
        end: DateTime<Utc>,
    },

    /// Update timestamp does not exist on the configured time grid.
    #[error("update timestamp {dt} lies outside the configured grid {start} : {end}")]
    TimestampOutsideGrid {
        /// Offending update timestamp.
        dt: DateTime<Utc>,
        /// First grid timestamp.
        start: DateTime<Utc>,
        /// Last grid timestamp.
        end: DateTime<Utc>,
    },

    /// Strategy and benchmark observed-index sets diverged after a write.
    ///
    /// Signals a defect in the upstream return-generation pipeline; the
    /// risk timeline cannot be trusted once the two series are sampled at
    /// different timestamps, so the run must abort.
    #[error(
        "mismatch between benchmark_returns ({benchmark_count}) and \
         algorithm_returns ({algorithm_count}) in range {start} : {end} on {dt}"
    )]
    ReturnSeriesMismatch {
        /// Observed benchmark-return count.
        benchmark_count: usize,
        /// Observed algorithm-return count.
        algorithm_count: usize,
        /// Configured period start.
        start: DateTime<Utc>,
        /// Configured period end.
        end: DateTime<Utc>,
        /// Update timestamp at which the divergence was detected.
        dt: DateTime<Utc>,
    },
}
