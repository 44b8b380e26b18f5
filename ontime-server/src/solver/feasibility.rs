//! Latest workable arrival at a boarding stop.
//!
//! The wait at a stop is an arbitrary function of arrival time: a rider who
//! turns up a minute later may wait much longer, or not at all. Nothing about
//! it is monotonic, so the search walks back from the deadline one minute at a
//! time and takes the first (latest) arrival that works.

use tracing::trace;

use crate::domain::ClockTime;
use crate::oracle::WaitOracle;

use super::error::SolveError;

/// The latest stop arrival that still makes a boarding deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardingWindow {
    /// Latest arrival at the stop, in unnormalized minutes.
    pub arrival: i64,

    /// Wait the oracle reported for that arrival.
    pub wait: i64,

    /// Oracle queries issued to find it.
    pub queries: usize,
}

/// Find the latest `arrival <= deadline` with `arrival + wait(arrival) <= deadline`.
///
/// Tries `deadline`, `deadline - 1`, ..., `deadline - horizon`, querying the
/// oracle at each candidate's clock time. `deadline` may lie outside one day;
/// only the query times are folded onto the clock.
///
/// # Errors
///
/// - [`SolveError::Configuration`] if `horizon` is negative (no queries made)
/// - [`SolveError::InvalidWait`] as soon as the oracle returns a negative wait
/// - [`SolveError::Oracle`] if the oracle fails
/// - [`SolveError::InfeasibleBoarding`] if no candidate in the horizon works
///
/// # Examples
///
/// ```
/// use ontime_server::oracle::ConstantWait;
/// use ontime_server::solver::latest_boardable_arrival;
///
/// // Deadline 09:30, every arrival waits 7 minutes: latest arrival is 09:23
/// let window = latest_boardable_arrival(&ConstantWait(7), "이마트앞", "51", 570, 180).unwrap();
/// assert_eq!(window.arrival, 563);
/// assert_eq!(window.queries, 8);
/// ```
pub fn latest_boardable_arrival<O: WaitOracle + ?Sized>(
    oracle: &O,
    stop: &str,
    route: &str,
    deadline: i64,
    horizon: i64,
) -> Result<BoardingWindow, SolveError> {
    if horizon < 0 {
        return Err(SolveError::Configuration(format!(
            "search horizon must be >= 0, got {horizon}"
        )));
    }

    for delta in 0..=horizon {
        // Nothing earlier is representable
        let Some(arrival) = deadline.checked_sub(delta) else {
            break;
        };
        let at = ClockTime::from_minutes(arrival);

        let wait = oracle
            .wait_minutes(stop, route, at)
            .map_err(|source| SolveError::Oracle {
                stop: stop.to_string(),
                route: route.to_string(),
                source,
            })?;

        if wait < 0 {
            return Err(SolveError::InvalidWait {
                stop: stop.to_string(),
                route: route.to_string(),
                at,
                minutes: wait,
            });
        }

        // arrival + wait <= deadline, without overflowing on absurd waits
        if wait <= delta {
            trace!(stop, route, %at, wait, "boarding feasible");
            return Ok(BoardingWindow {
                arrival,
                wait,
                queries: delta as usize + 1,
            });
        }
    }

    Err(SolveError::InfeasibleBoarding {
        stop: stop.to_string(),
        route: route.to_string(),
        horizon,
    })
}
