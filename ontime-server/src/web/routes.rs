//! HTTP route handlers.

use askama::Template;
use axum::body::Bytes;
use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use chrono::Local;
use tower_http::services::ServeDir;
use tracing::{error, info, warn};

use crate::domain::ClockTime;
use crate::solver::{Departure, SolveError, Solver};

use super::dto::*;
use super::state::AppState;
use super::templates::*;

/// Create the application router.
///
/// `static_dir` is the path to the static assets directory.
pub fn create_router(state: AppState, static_dir: &str) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/health", get(health))
        .route("/compute", post(compute))
        .nest_service("/static", ServeDir::new(static_dir))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Index page with the destination-time form.
async fn index_page(State(state): State<AppState>) -> impl IntoResponse {
    Html(
        IndexTemplate::for_route(&state.route)
            .render()
            .unwrap_or_else(|e| format!("Template error: {}", e)),
    )
}

/// Check if request accepts HTML.
fn accepts_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"))
}

/// Compute the latest departure for a destination time.
async fn compute(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let html = accepts_html(&headers);

    match compute_departure(&state, &body, html).await {
        Ok(response) => response,
        Err(e) if html => {
            let status = e.status();
            let message = e.message().to_string();
            e.log();
            let fragment = ErrorTemplate { message }
                .render()
                .unwrap_or_else(|e| format!("Template error: {}", e));
            (status, Html(fragment)).into_response()
        }
        Err(e) => e.into_response(),
    }
}

async fn compute_departure(
    state: &AppState,
    body: &[u8],
    html: bool,
) -> Result<Response, AppError> {
    // Parse JSON manually so we can log the body on failure
    let req: ComputeRequest = serde_json::from_slice(body).map_err(|e| {
        warn!(error = %e, body = %String::from_utf8_lossy(body), "invalid compute request");
        AppError::BadRequest {
            message: format!("Invalid JSON: {e}"),
        }
    })?;

    // Reject bad input before spending ETA queries on it
    state.solver.validate()?;
    let destination = ClockTime::parse_hhmm(&req.destination_time).map_err(SolveError::from)?;

    let (departure, oracle) = solve(state, destination).await?;
    info!(
        %destination,
        departure = %departure.departure,
        oracle = oracle.as_str(),
        "computed departure"
    );

    if html {
        let template = DepartureResultTemplate::from_departure(
            &departure,
            &req.destination_time,
            &state.route,
            oracle,
        );
        let html = template.render().map_err(|e| AppError::Internal {
            message: format!("Template error: {}", e),
        })?;

        Ok(Html(html).into_response())
    } else {
        let response = ComputeResponse::from_departure(&departure, &state.route, oracle);
        Ok(Json(response).into_response())
    }
}

/// Solve against a fresh (or cached) snapshot when an ETA source is
/// configured, otherwise against the per-route maximum waits.
async fn solve(
    state: &AppState,
    destination: ClockTime,
) -> Result<(Departure, OracleKind), SolveError> {
    match &state.eta {
        Some(provider) => {
            let now = Local::now().naive_local();
            let snapshot = state
                .snapshots
                .get_or_capture(now, provider, &state.route, &state.max_waits)
                .await;
            let departure =
                Solver::new(&*snapshot, &state.solver).solve_at(destination, &state.route)?;
            Ok((departure, OracleKind::Snapshot))
        }
        None => {
            let departure = Solver::new(&*state.max_waits, &state.solver)
                .solve_at(destination, &state.route)?;
            Ok((departure, OracleKind::MaxWait))
        }
    }
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    InvalidTime { message: String },
    Infeasible { message: String },
    Internal { message: String },
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::InvalidTime { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Infeasible { .. } => StatusCode::CONFLICT,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable reason.
    fn reason(&self) -> &'static str {
        match self {
            AppError::BadRequest { .. } => "bad_request",
            AppError::InvalidTime { .. } => "invalid_time_format",
            AppError::Infeasible { .. } => "infeasible_route",
            AppError::Internal { .. } => "internal",
        }
    }

    fn message(&self) -> &str {
        match self {
            AppError::BadRequest { message }
            | AppError::InvalidTime { message }
            | AppError::Infeasible { message }
            | AppError::Internal { message } => message,
        }
    }

    fn log(&self) {
        let status = self.status();
        if status.is_server_error() {
            error!(
                %status,
                reason = self.reason(),
                message = self.message(),
                "request failed"
            );
        } else {
            warn!(
                %status,
                reason = self.reason(),
                message = self.message(),
                "request rejected"
            );
        }
    }
}

impl From<SolveError> for AppError {
    fn from(e: SolveError) -> Self {
        let message = e.to_string();
        if e.is_input_error() {
            AppError::InvalidTime { message }
        } else if matches!(e, SolveError::InfeasibleBoarding { .. }) {
            AppError::Infeasible { message }
        } else {
            AppError::Internal { message }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        self.log();

        let status = self.status();
        let reason = self.reason();
        let body = Json(ErrorResponse {
            error: match self {
                AppError::BadRequest { message }
                | AppError::InvalidTime { message }
                | AppError::Infeasible { message }
                | AppError::Internal { message } => message,
            },
            reason,
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheConfig;
    use crate::config::RouteConfig;
    use crate::domain::{Route, Segment};
    use crate::eta::StaticEtaProvider;
    use crate::oracle::MaxWaitByRoute;
    use crate::solver::SolverConfig;
    use axum::http::HeaderValue;

    fn state_with(route: RouteConfig, solver: SolverConfig) -> AppState {
        AppState::new(route, solver, None, &CacheConfig::default())
    }

    fn default_state() -> AppState {
        state_with(RouteConfig::default(), SolverConfig::default())
    }

    fn json_headers() -> HeaderMap {
        HeaderMap::new()
    }

    fn html_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("text/html, */*;q=0.8"),
        );
        headers
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn post_compute(state: AppState, headers: HeaderMap, body: &str) -> Response {
        compute(State(state), headers, Bytes::from(body.to_string())).await
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let Json(response) = health().await;
        assert_eq!(response.status, "ok");
    }

    #[tokio::test]
    async fn compute_with_max_waits() {
        let response = post_compute(
            default_state(),
            json_headers(),
            r#"{"destination_time": "09:00"}"#,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["recommended_departure_time"], "06:41");
        assert_eq!(json["oracle"], "max_wait");
        assert_eq!(json["steps"].as_array().unwrap().len(), 10);
    }

    #[tokio::test]
    async fn compute_html_fragment() {
        let response = post_compute(
            default_state(),
            html_headers(),
            r#"{"destination_time": "09:00"}"#,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_text(response).await;
        assert!(html.contains("06:41"));
        assert!(html.contains("Board 51 at 206000043"));
    }

    #[tokio::test]
    async fn bad_time_is_unprocessable() {
        let response = post_compute(
            default_state(),
            json_headers(),
            r#"{"destination_time": "9am"}"#,
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let json = body_json(response).await;
        assert_eq!(json["reason"], "invalid_time_format");
    }

    #[tokio::test]
    async fn bad_time_as_html_fragment() {
        let response = post_compute(
            default_state(),
            html_headers(),
            r#"{"destination_time": "25:00"}"#,
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_text(response).await.contains("class=\"error\""));
    }

    #[tokio::test]
    async fn infeasible_route_is_conflict() {
        let route = RouteConfig {
            segments: vec![Segment::board("X", "51")],
            max_wait_by_route: MaxWaitByRoute::new().with("51", 9999),
        };
        let response = post_compute(
            state_with(route, SolverConfig::new(3, 5)),
            json_headers(),
            r#"{"destination_time": "10:00"}"#,
        )
        .await;
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let json = body_json(response).await;
        assert_eq!(json["reason"], "infeasible_route");
    }

    #[tokio::test]
    async fn negative_wait_is_internal() {
        let route = RouteConfig {
            segments: vec![Segment::board("X", "51")],
            max_wait_by_route: MaxWaitByRoute::new().with("51", -1),
        };
        let response = post_compute(
            state_with(route, SolverConfig::default()),
            json_headers(),
            r#"{"destination_time": "10:00"}"#,
        )
        .await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["reason"], "internal");
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() {
        let response = post_compute(default_state(), json_headers(), "{").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["reason"], "bad_request");
    }

    #[tokio::test]
    async fn compute_with_snapshot() {
        let provider = StaticEtaProvider::from_json(
            r#"{"arrivals": [{"stop": "s", "route": "r", "etas": [1, 2, 3]}]}"#,
        )
        .unwrap();
        let route = RouteConfig {
            segments: vec![Segment::walk(10)],
            max_wait_by_route: MaxWaitByRoute::new(),
        };
        let state = AppState::new(
            route,
            SolverConfig::default(),
            Some(provider),
            &CacheConfig::default(),
        );

        let response = post_compute(state, json_headers(), r#"{"destination_time": "10:00"}"#).await;
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["oracle"], "snapshot");
        assert_eq!(json["recommended_departure_time"], "09:50");
        assert_eq!(json["oracle_queries"], 0);
    }

    #[tokio::test]
    async fn index_shows_route() {
        let state = state_with(
            RouteConfig {
                segments: Route::new(vec![Segment::walk(4), Segment::board("정류장", "7")])
                    .segments()
                    .to_vec(),
                max_wait_by_route: MaxWaitByRoute::new(),
            },
            SolverConfig::default(),
        );
        let html = body_text(index_page(State(state)).await.into_response()).await;
        assert!(html.contains("Board 7 at 정류장"));
        assert!(html.contains("Travel 4 min"));
    }

    #[test]
    fn solve_errors_map_to_reasons() {
        let err: AppError = SolveError::from(
            crate::domain::ClockTime::parse_hhmm("7:30").unwrap_err(),
        )
        .into();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.reason(), "invalid_time_format");

        let err: AppError = SolveError::InfeasibleBoarding {
            stop: "X".into(),
            route: "51".into(),
            horizon: 5,
        }
        .into();
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.reason(), "infeasible_route");

        let err: AppError = SolveError::Configuration("x".into()).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let err: AppError = SolveError::NegativeDuration {
            index: 0,
            minutes: -1,
        }
        .into();
        assert_eq!(err.reason(), "internal");
    }
}
