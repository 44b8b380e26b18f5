//! Solver configuration.

use super::error::SolveError;

/// Configuration parameters for a departure solve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverConfig {
    /// Slack subtracted after each boarding's latest stop arrival (minutes),
    /// covering the walk from the previous leg to the stop.
    pub transfer_buffer_mins: i64,

    /// How far before a boarding deadline to look for a workable stop
    /// arrival (minutes).
    pub search_horizon_mins: i64,
}

impl SolverConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(transfer_buffer_mins: i64, search_horizon_mins: i64) -> Self {
        Self {
            transfer_buffer_mins,
            search_horizon_mins,
        }
    }

    /// Check both values are non-negative.
    pub fn validate(&self) -> Result<(), SolveError> {
        if self.transfer_buffer_mins < 0 {
            return Err(SolveError::Configuration(format!(
                "transfer buffer must be >= 0, got {}",
                self.transfer_buffer_mins
            )));
        }
        if self.search_horizon_mins < 0 {
            return Err(SolveError::Configuration(format!(
                "search horizon must be >= 0, got {}",
                self.search_horizon_mins
            )));
        }
        Ok(())
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            transfer_buffer_mins: 3,
            search_horizon_mins: 180, // 3 hours
        }
    }
}
