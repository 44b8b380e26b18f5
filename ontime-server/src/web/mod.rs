//! Web layer for the departure recommender.
//!
//! Provides HTTP endpoints for computing departure times, plus a small HTML
//! frontend.

mod dto;
mod routes;
mod state;
pub mod templates;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
pub use templates::*;
