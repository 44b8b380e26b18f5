//! Askama templates for the web frontend.

use askama::Template;

use crate::domain::{Route, Segment};
use crate::solver::{Departure, Step};

use super::dto::OracleKind;

// ============================================================================
// Page Templates
// ============================================================================

/// Home page with the destination-time form.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub segments: Vec<SegmentView>,
    pub fixed_minutes: i64,
}

impl IndexTemplate {
    /// Create for the route being served.
    pub fn for_route(route: &Route) -> Self {
        Self {
            segments: route.segments().iter().map(SegmentView::from_segment).collect(),
            fixed_minutes: route.fixed_minutes(),
        }
    }
}

// ============================================================================
// Fragment Templates (fetch responses, no page chrome)
// ============================================================================

/// Computed departure fragment.
#[derive(Template)]
#[template(path = "departure_result.html")]
pub struct DepartureResultTemplate {
    pub departure: String,
    pub destination: String,
    pub oracle: &'static str,
    pub oracle_queries: usize,
    pub steps: Vec<StepView>,
}

impl DepartureResultTemplate {
    /// Create from a solved departure over `route`.
    pub fn from_departure(
        departure: &Departure,
        destination: &str,
        route: &Route,
        oracle: OracleKind,
    ) -> Self {
        Self {
            departure: departure.departure.to_string(),
            destination: destination.trim().to_string(),
            oracle: oracle.as_str(),
            oracle_queries: departure.oracle_queries,
            steps: departure
                .steps
                .iter()
                .filter_map(|step| {
                    route
                        .segments()
                        .get(step.index)
                        .map(|segment| StepView::from_step(step, segment))
                })
                .collect(),
        }
    }
}

/// Error fragment.
#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub message: String,
}

// ============================================================================
// View Models (for templates)
// ============================================================================

/// Route segment view model.
#[derive(Debug, Clone)]
pub struct SegmentView {
    pub description: String,
    pub is_board: bool,
}

impl SegmentView {
    pub fn from_segment(segment: &Segment) -> Self {
        Self {
            description: describe(segment),
            is_board: segment.is_board(),
        }
    }
}

/// Timeline row view model.
#[derive(Debug, Clone)]
pub struct StepView {
    pub description: String,
    pub latest_start: String,
    pub latest_end: String,
    /// e.g. "arrive 09:23, wait 7 min"
    pub boarding_note: Option<String>,
}

impl StepView {
    pub fn from_step(step: &Step, segment: &Segment) -> Self {
        Self {
            description: describe(segment),
            latest_start: step.latest_start.to_string(),
            latest_end: step.latest_end.to_string(),
            boarding_note: step.boarding.map(|b| {
                format!("arrive {}, wait {} min", b.stop_arrival, b.wait_minutes)
            }),
        }
    }
}

fn describe(segment: &Segment) -> String {
    match segment {
        Segment::Move { minutes } => format!("Travel {minutes} min"),
        Segment::Board { stop, route } => format!("Board {route} at {stop}"),
    }
}
