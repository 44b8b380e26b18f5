//! Latest-departure solver.
//!
//! Answers: "I must be at the end of this route by HH:MM. When is the latest
//! I can set off?"
//!
//! The route is walked backwards from the destination deadline. Moves
//! subtract their fixed length. Each boarding asks a [`WaitOracle`] how long a
//! rider arriving at the stop would wait, and picks the latest arrival whose
//! wait still makes the deadline, then subtracts the transfer buffer.
//!
//! [`WaitOracle`]: crate::oracle::WaitOracle

mod config;
mod error;
mod feasibility;
mod solve;

pub use config::SolverConfig;
pub use error::SolveError;
pub use feasibility::{BoardingWindow, latest_boardable_arrival};
pub use solve::{Boarding, Departure, Solver, Step};
