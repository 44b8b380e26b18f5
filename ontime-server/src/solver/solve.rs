//! Backward departure solve.
//!
//! Starts from the destination deadline and folds the route's segments in
//! reverse, each one turning "latest time I may finish this segment" into
//! "latest time I may start it". What is left at the front of the route is
//! the latest time to leave.

use tracing::{debug, trace};

use crate::domain::{ClockTime, MINUTES_PER_DAY, Route, Segment};
use crate::oracle::WaitOracle;

use super::config::SolverConfig;
use super::error::SolveError;
use super::feasibility::latest_boardable_arrival;

/// Details of a boarding step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boarding {
    /// Latest arrival at the stop that still makes the deadline.
    pub stop_arrival: ClockTime,

    /// Wait the oracle reported for that arrival.
    pub wait_minutes: i64,
}

/// One segment's slice of the timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Position of the segment in the route.
    pub index: usize,

    /// Latest time the segment may finish.
    pub latest_end: ClockTime,

    /// Latest time the segment may start.
    pub latest_start: ClockTime,

    /// Set for boarding segments.
    pub boarding: Option<Boarding>,
}

/// Result of a solve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    /// Latest time to set off.
    pub departure: ClockTime,

    /// One step per segment, in route order.
    pub steps: Vec<Step>,

    /// Total oracle queries issued.
    pub oracle_queries: usize,
}

/// Departure solver over a wait oracle.
///
/// Holds no state between calls; one solver can serve any number of solves.
///
/// # Examples
///
/// ```
/// use ontime_server::domain::{Route, Segment};
/// use ontime_server::oracle::ConstantWait;
/// use ontime_server::solver::{Solver, SolverConfig};
///
/// let route = Route::new(vec![
///     Segment::walk(5),
///     Segment::board("이마트앞", "51"),
///     Segment::walk(20),
///     Segment::walk(10),
/// ]);
///
/// let config = SolverConfig::default();
/// let solver = Solver::new(&ConstantWait(7), &config);
/// let departure = solver.solve("10:00", &route).unwrap();
///
/// assert_eq!(departure.departure.to_string(), "09:15");
/// ```
pub struct Solver<'a, O: WaitOracle + ?Sized> {
    oracle: &'a O,
    config: &'a SolverConfig,
}

impl<'a, O: WaitOracle + ?Sized> Solver<'a, O> {
    /// Create a solver.
    pub fn new(oracle: &'a O, config: &'a SolverConfig) -> Self {
        Self { oracle, config }
    }

    /// Latest departure reaching the end of `route` by `destination` ("HH:MM").
    ///
    /// Configuration is checked before the destination is parsed.
    pub fn solve(&self, destination: &str, route: &Route) -> Result<Departure, SolveError> {
        self.config.validate()?;
        let destination = ClockTime::parse_hhmm(destination)?;
        self.solve_at(destination, route)
    }

    /// Latest departure reaching the end of `route` by `destination`.
    pub fn solve_at(
        &self,
        destination: ClockTime,
        route: &Route,
    ) -> Result<Departure, SolveError> {
        self.config.validate()?;

        let mut t = i64::from(destination.minutes());
        let mut steps = Vec::with_capacity(route.len());
        let mut oracle_queries = 0;

        for (index, segment) in route.segments().iter().enumerate().rev() {
            let latest_end = t;

            let boarding = match segment {
                Segment::Move { minutes } => {
                    if *minutes < 0 {
                        return Err(SolveError::NegativeDuration {
                            index,
                            minutes: *minutes,
                        });
                    }
                    t = minutes_before(t, *minutes);
                    None
                }
                Segment::Board { stop, route } => {
                    let window = latest_boardable_arrival(
                        self.oracle,
                        stop,
                        route,
                        t,
                        self.config.search_horizon_mins,
                    )?;
                    oracle_queries += window.queries;
                    t = minutes_before(window.arrival, self.config.transfer_buffer_mins);

                    Some(Boarding {
                        stop_arrival: ClockTime::from_minutes(window.arrival),
                        wait_minutes: window.wait,
                    })
                }
            };

            trace!(index, latest_end, latest_start = t, "segment solved");
            steps.push(Step {
                index,
                latest_end: ClockTime::from_minutes(latest_end),
                latest_start: ClockTime::from_minutes(t),
                boarding,
            });
        }

        steps.reverse();
        let departure = ClockTime::from_minutes(t);
        debug!(
            %destination,
            %departure,
            segments = route.len(),
            oracle_queries,
            "solved departure"
        );

        Ok(Departure {
            departure,
            steps,
            oracle_queries,
        })
    }
}

/// `t - minutes` on the clock, kept in `0..1440`.
///
/// Only the time of day matters to the solve, so whole days are dropped
/// before subtracting; arbitrarily long moves and buffers cannot overflow.
fn minutes_before(t: i64, minutes: i64) -> i64 {
    (t.rem_euclid(MINUTES_PER_DAY) - minutes.rem_euclid(MINUTES_PER_DAY)).rem_euclid(MINUTES_PER_DAY)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::domain::MINUTES_PER_DAY;
    use crate::oracle::ConstantWait;
    use proptest::prelude::*;

    proptest! {
        /// A route of moves departs exactly their total before the deadline
        #[test]
        fn moves_subtract_exactly(
            dest in 0i64..1440,
            moves in prop::collection::vec(0i64..300, 0..10),
        ) {
            let route = Route::new(moves.iter().copied().map(Segment::walk).collect());
            let config = SolverConfig::default();
            let departure = Solver::new(&ConstantWait(0), &config)
                .solve_at(ClockTime::from_minutes(dest), &route)
                .unwrap();

            let expected = (dest - moves.iter().sum::<i64>()).rem_euclid(MINUTES_PER_DAY);
            prop_assert_eq!(i64::from(departure.departure.minutes()), expected);
        }

        /// With a constant wait, each boarding costs exactly wait + buffer
        #[test]
        fn constant_wait_costs_wait_plus_buffer(
            dest in 0i64..1440,
            wait in 0i64..60,
            buffer in 0i64..10,
            boardings in 1usize..5,
        ) {
            let route = Route::new(
                (0..boardings).map(|i| Segment::board(format!("s{i}"), "r")).collect(),
            );
            let config = SolverConfig::new(buffer, 180);
            let departure = Solver::new(&ConstantWait(wait), &config)
                .solve_at(ClockTime::from_minutes(dest), &route)
                .unwrap();

            let expected = (dest - boardings as i64 * (wait + buffer)).rem_euclid(MINUTES_PER_DAY);
            prop_assert_eq!(i64::from(departure.departure.minutes()), expected);
            prop_assert_eq!(departure.oracle_queries, boardings * (wait as usize + 1));
        }

        /// Every step starts no later than it ends, by the unfolded timeline
        #[test]
        fn steps_chain_together(
            dest in 0i64..1440,
            segments in prop::collection::vec(
                prop_oneof![
                    (0i64..60).prop_map(Segment::walk),
                    Just(Segment::board("s", "r")),
                ],
                0..8,
            ),
        ) {
            let route = Route::new(segments);
            let config = SolverConfig::default();
            let departure = Solver::new(&ConstantWait(4), &config)
                .solve_at(ClockTime::from_minutes(dest), &route)
                .unwrap();

            prop_assert_eq!(departure.steps.len(), route.len());
            for pair in departure.steps.windows(2) {
                prop_assert_eq!(pair[0].latest_end, pair[1].latest_start);
            }
            if let Some(first) = departure.steps.first() {
                prop_assert_eq!(first.latest_start, departure.departure);
            }
            if let Some(last) = departure.steps.last() {
                prop_assert_eq!(last.latest_end, ClockTime::from_minutes(dest));
            }
        }
    }
}
