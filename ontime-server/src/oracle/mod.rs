//! Wait oracles.
//!
//! A wait oracle answers one question: if a rider reaches `stop` at clock
//! time `at`, how many minutes until a `route` vehicle leaves? The solver
//! treats the answer as an arbitrary function of `at`. Implementations range
//! from constants to frozen snapshots of live arrival data.

mod snapshot;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::ClockTime;

pub use snapshot::{ARRIVALS_PER_TARGET, WaitEstimate, WaitSnapshot};

/// Error from a wait oracle that could not produce an answer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    /// The oracle's data source could not be consulted
    #[error("wait data unavailable: {0}")]
    Unavailable(String),
}

/// Source of wait-time estimates.
///
/// A correct oracle never returns a negative wait. The solver checks this
/// and fails the solve if an oracle does, rather than clamping.
///
/// Oracles are queried many times per boarding and are expected to be cheap
/// and to give stable answers for the duration of one solve.
pub trait WaitOracle {
    /// Minutes a rider arriving at `stop` at `at` waits for `route`.
    fn wait_minutes(&self, stop: &str, route: &str, at: ClockTime) -> Result<i64, OracleError>;
}

/// Plain functions and closures are oracles that cannot fail.
///
/// ```
/// use ontime_server::domain::ClockTime;
/// use ontime_server::oracle::WaitOracle;
///
/// let oracle = |_stop: &str, route: &str, _at: ClockTime| -> i64 {
///     if route == "51" { 4 } else { 9 }
/// };
/// assert_eq!(oracle.wait_minutes("x", "51", ClockTime::MIDNIGHT), Ok(4));
/// ```
impl<F> WaitOracle for F
where
    F: Fn(&str, &str, ClockTime) -> i64,
{
    fn wait_minutes(&self, stop: &str, route: &str, at: ClockTime) -> Result<i64, OracleError> {
        Ok(self(stop, route, at))
    }
}

/// The same wait everywhere, at all times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstantWait(pub i64);

impl WaitOracle for ConstantWait {
    fn wait_minutes(&self, _stop: &str, _route: &str, _at: ClockTime) -> Result<i64, OracleError> {
        Ok(self.0)
    }
}

/// Worst-case wait per route, e.g. the headway of each line.
///
/// Used directly as the fallback oracle when no arrival data is available,
/// and by [`WaitSnapshot`] for keys it knows nothing about. Routes missing
/// from the table wait 0 minutes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaxWaitByRoute(HashMap<String, i64>);

impl MaxWaitByRoute {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the worst-case wait for a route.
    pub fn insert(&mut self, route: impl Into<String>, minutes: i64) {
        self.0.insert(route.into().trim().to_string(), minutes);
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, route: impl Into<String>, minutes: i64) -> Self {
        self.insert(route, minutes);
        self
    }

    /// Worst-case wait for `route`, or 0 if the route is unknown.
    pub fn get(&self, route: &str) -> i64 {
        self.0.get(route.trim()).copied().unwrap_or(0)
    }

    /// Number of routes in the table.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, i64)> for MaxWaitByRoute {
    fn from_iter<I: IntoIterator<Item = (S, i64)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (route, minutes) in iter {
            table.insert(route, minutes);
        }
        table
    }
}

impl WaitOracle for MaxWaitByRoute {
    fn wait_minutes(&self, _stop: &str, route: &str, _at: ClockTime) -> Result<i64, OracleError> {
        Ok(self.get(route))
    }
}

/// Max waits for the default route.
pub fn default_max_waits() -> MaxWaitByRoute {
    [("51", 15), ("5100", 25), ("수인분당선", 10)]
        .into_iter()
        .collect()
}
