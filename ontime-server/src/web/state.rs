//! Application state for the web layer.

use std::sync::Arc;

use crate::cache::{CacheConfig, SnapshotCache};
use crate::config::RouteConfig;
use crate::domain::Route;
use crate::eta::StaticEtaProvider;
use crate::oracle::MaxWaitByRoute;
use crate::solver::SolverConfig;

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// The route every computation runs over
    pub route: Arc<Route>,

    /// Worst-case waits, used directly when there is no ETA source and as
    /// the snapshot fallback when there is
    pub max_waits: Arc<MaxWaitByRoute>,

    /// Solver configuration
    pub solver: Arc<SolverConfig>,

    /// ETA source for snapshots, if configured
    pub eta: Option<StaticEtaProvider>,

    /// Recently captured snapshots
    pub snapshots: SnapshotCache,
}

impl AppState {
    /// Create a new app state.
    pub fn new(
        route: RouteConfig,
        solver: SolverConfig,
        eta: Option<StaticEtaProvider>,
        cache_config: &CacheConfig,
    ) -> Self {
        Self {
            route: Arc::new(route.route()),
            max_waits: Arc::new(route.max_wait_by_route),
            solver: Arc::new(solver),
            eta,
            snapshots: SnapshotCache::new(cache_config),
        }
    }
}
