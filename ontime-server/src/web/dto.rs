//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::domain::{Route, Segment};
use crate::solver::{Departure, Step};

/// Request to compute a departure time.
#[derive(Debug, Deserialize)]
pub struct ComputeRequest {
    /// Time to be at the destination, "HH:MM"
    pub destination_time: String,
}

/// Which wait oracle answered a computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OracleKind {
    /// A snapshot of arrivals from the ETA provider
    Snapshot,

    /// The per-route maximum wait
    MaxWait,
}

impl OracleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OracleKind::Snapshot => "snapshot",
            OracleKind::MaxWait => "max_wait",
        }
    }
}

/// Computed departure.
#[derive(Debug, Serialize)]
pub struct ComputeResponse {
    /// Latest time to leave, "HH:MM"
    pub recommended_departure_time: String,

    pub oracle: OracleKind,

    /// Number of wait lookups the solve made
    pub oracle_queries: usize,

    /// Timeline, one entry per route segment
    pub steps: Vec<StepResult>,
}

/// One segment of the computed timeline.
#[derive(Debug, Serialize)]
pub struct StepResult {
    /// Position in the route
    pub index: usize,

    /// "move" or "board"
    pub kind: &'static str,

    /// Travel minutes (moves only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minutes: Option<i64>,

    /// Stop identifier (boardings only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<String>,

    /// Route identifier (boardings only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,

    /// Latest start, "HH:MM"
    pub latest_start: String,

    /// Latest end, "HH:MM"
    pub latest_end: String,

    /// Latest arrival at the stop (boardings only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_arrival: Option<String>,

    /// Expected wait at the stop (boardings only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_minutes: Option<i64>,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,

    /// Machine-readable error kind
    pub reason: &'static str,
}

// Conversion implementations

impl ComputeResponse {
    /// Create from a solved departure over `route`.
    pub fn from_departure(departure: &Departure, route: &Route, oracle: OracleKind) -> Self {
        Self {
            recommended_departure_time: departure.departure.to_string(),
            oracle,
            oracle_queries: departure.oracle_queries,
            steps: departure
                .steps
                .iter()
                .filter_map(|step| {
                    route
                        .segments()
                        .get(step.index)
                        .map(|segment| StepResult::from_step(step, segment))
                })
                .collect(),
        }
    }
}

impl StepResult {
    /// Create from a solver step and the segment it covers.
    pub fn from_step(step: &Step, segment: &Segment) -> Self {
        let (kind, minutes, stop, route) = match segment {
            Segment::Move { minutes } => ("move", Some(*minutes), None, None),
            Segment::Board { stop, route } => ("board", None, Some(stop.clone()), Some(route.clone())),
        };

        Self {
            index: step.index,
            kind,
            minutes,
            stop,
            route,
            latest_start: step.latest_start.to_string(),
            latest_end: step.latest_end.to_string(),
            stop_arrival: step.boarding.map(|b| b.stop_arrival.to_string()),
            wait_minutes: step.boarding.map(|b| b.wait_minutes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::ConstantWait;
    use crate::solver::{Solver, SolverConfig};

    #[test]
    fn response_serializes_timeline() {
        let route = Route::new(vec![
            Segment::walk(5),
            Segment::board("이마트앞", "51"),
            Segment::walk(30),
        ]);
        let config = SolverConfig::default();
        let departure = Solver::new(&ConstantWait(7), &config)
            .solve("10:00", &route)
            .unwrap();

        let response = ComputeResponse::from_departure(&departure, &route, OracleKind::MaxWait);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["recommended_departure_time"], "09:15");
        assert_eq!(json["oracle"], "max_wait");
        assert_eq!(json["oracle_queries"], 8);

        let steps = json["steps"].as_array().unwrap();
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[0]["kind"], "move");
        assert_eq!(steps[0]["minutes"], 5);
        assert!(steps[0].get("stop").is_none());
        assert_eq!(steps[1]["kind"], "board");
        assert_eq!(steps[1]["stop"], "이마트앞");
        assert_eq!(steps[1]["stop_arrival"], "09:23");
        assert_eq!(steps[1]["wait_minutes"], 7);
        assert_eq!(steps[2]["latest_end"], "10:00");
    }

    #[test]
    fn oracle_kind_names() {
        assert_eq!(OracleKind::Snapshot.as_str(), "snapshot");
        assert_eq!(
            serde_json::to_value(OracleKind::Snapshot).unwrap(),
            "snapshot"
        );
        assert_eq!(serde_json::to_value(OracleKind::MaxWait).unwrap(), "max_wait");
    }
}
