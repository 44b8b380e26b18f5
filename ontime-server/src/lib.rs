//! Departure time recommender server.
//!
//! A web application that answers: "I need to be at school by 09:00. When
//! is the latest I can leave home?"
//!
//! A route is a fixed sequence of travel and boarding segments. The
//! [`solver`] walks it backwards from the deadline, asking a wait
//! [`oracle`] how long each boarding will take. The oracle is usually a
//! snapshot of upcoming arrivals captured from an [`eta`] provider.

pub mod cache;
pub mod config;
pub mod domain;
pub mod eta;
pub mod oracle;
pub mod solver;
pub mod web;
