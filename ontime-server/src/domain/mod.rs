//! Domain types for the departure recommender.
//!
//! Clock times, routes and stop keys. Types enforce their invariants at
//! construction, so code that receives them can trust their validity.

mod clock;
mod route;
mod stop;

pub use clock::{
    ClockTime, MINUTES_PER_DAY, TimeError, circular_distance, circular_forward_delta,
};
pub use route::{Route, Segment, default_route};
pub use stop::{StopKey, normalize_stop};
