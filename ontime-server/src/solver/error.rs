//! Solver error types.

use crate::domain::{ClockTime, TimeError};
use crate::oracle::OracleError;

/// Error from a departure solve.
///
/// None of these are retried: each one ends the solve.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SolveError {
    /// Destination time is not a valid "HH:MM" string
    #[error("invalid destination time: {0}")]
    Format(#[from] TimeError),

    /// Solver settings are out of range
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A move segment has a negative length
    #[error("segment {index}: negative travel minutes not allowed: {minutes}")]
    NegativeDuration { index: usize, minutes: i64 },

    /// The wait oracle broke its contract by returning a negative wait
    #[error("wait oracle returned negative minutes ({minutes}) for route {route} at {stop}, {at}")]
    InvalidWait {
        stop: String,
        route: String,
        at: ClockTime,
        minutes: i64,
    },

    /// No arrival within the search horizon makes the boarding in time
    #[error(
        "no feasible stop arrival found within {horizon} minutes for stop {stop:?}, route {route:?}"
    )]
    InfeasibleBoarding {
        stop: String,
        route: String,
        horizon: i64,
    },

    /// The wait oracle could not answer
    #[error("wait oracle failed for route {route} at {stop}: {source}")]
    Oracle {
        stop: String,
        route: String,
        #[source]
        source: OracleError,
    },
}

impl SolveError {
    /// Whether the error was caused by the caller's input rather than by
    /// configuration or wait data.
    pub fn is_input_error(&self) -> bool {
        matches!(self, SolveError::Format(_))
    }
}
