//! Server configuration.
//!
//! Two layers: [`AppConfig`] comes from environment variables and says where
//! things live; [`RouteConfig`] is the route file it may point at.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use crate::domain::{Route, Segment, default_route};
use crate::oracle::{MaxWaitByRoute, default_max_waits};
use crate::solver::SolverConfig;

/// Error loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A file could not be read
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file was not valid
    #[error("failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    /// An environment variable had an unusable value
    #[error("invalid value for {var}: {value:?} ({message})")]
    InvalidVar {
        var: &'static str,
        value: String,
        message: String,
    },
}

/// A route together with the worst-case waits of its vehicles.
///
/// Loaded from JSON:
///
/// ```json
/// {
///   "segments": [
///     {"type": "move", "minutes": 8},
///     {"type": "board", "stop": "미금역", "route": "수인분당선"}
///   ],
///   "max_wait_by_route": {"수인분당선": 10}
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RouteConfig {
    pub segments: Vec<Segment>,

    #[serde(default)]
    pub max_wait_by_route: MaxWaitByRoute,
}

impl RouteConfig {
    /// Load a route file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Parse a route from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The route's segments as a [`Route`].
    pub fn route(&self) -> Route {
        Route::new(self.segments.clone())
    }
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            segments: default_route().segments().to_vec(),
            max_wait_by_route: default_max_waits(),
        }
    }
}

/// Environment variables read by [`AppConfig::from_env`].
pub mod vars {
    pub const ADDR: &str = "ONTIME_ADDR";
    pub const ROUTE_FILE: &str = "ONTIME_ROUTE_FILE";
    pub const ETA_FILE: &str = "ONTIME_ETA_FILE";
    pub const TRANSFER_BUFFER_MINS: &str = "ONTIME_TRANSFER_BUFFER_MINS";
    pub const SEARCH_HORIZON_MINS: &str = "ONTIME_SEARCH_HORIZON_MINS";
    pub const STATIC_DIR: &str = "ONTIME_STATIC_DIR";
}

/// Process-level configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Address to listen on.
    pub addr: SocketAddr,

    /// Route file; the built-in route is used if unset.
    pub route_file: Option<PathBuf>,

    /// Arrivals file for the static ETA provider. Without one, waits are
    /// always the per-route maximum.
    pub eta_file: Option<PathBuf>,

    pub solver: SolverConfig,

    /// Directory served under `/static`.
    pub static_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            route_file: None,
            eta_file: None,
            solver: SolverConfig::default(),
            static_dir: PathBuf::from("static"),
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to
    /// its value. Unset and empty variables take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let addr = match get(vars::ADDR) {
            Some(value) => parse_var(vars::ADDR, &value)?,
            None => defaults.addr,
        };
        let transfer_buffer_mins = match get(vars::TRANSFER_BUFFER_MINS) {
            Some(value) => parse_minutes(vars::TRANSFER_BUFFER_MINS, &value)?,
            None => defaults.solver.transfer_buffer_mins,
        };
        let search_horizon_mins = match get(vars::SEARCH_HORIZON_MINS) {
            Some(value) => parse_minutes(vars::SEARCH_HORIZON_MINS, &value)?,
            None => defaults.solver.search_horizon_mins,
        };
        let solver = SolverConfig::new(transfer_buffer_mins, search_horizon_mins);

        Ok(Self {
            addr,
            route_file: get(vars::ROUTE_FILE).map(PathBuf::from),
            eta_file: get(vars::ETA_FILE).map(PathBuf::from),
            solver,
            static_dir: get(vars::STATIC_DIR)
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
        })
    }

    /// Load the configured route file, or the built-in route.
    pub fn load_route(&self) -> Result<RouteConfig, ConfigError> {
        match &self.route_file {
            Some(path) => RouteConfig::load(path),
            None => Ok(RouteConfig::default()),
        }
    }
}

fn parse_var<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidVar {
        var,
        value: value.to_string(),
        message: e.to_string(),
    })
}

/// Parse a non-negative minute count.
fn parse_minutes(var: &'static str, value: &str) -> Result<i64, ConfigError> {
    let minutes: i64 = parse_var(var, value)?;
    if minutes < 0 {
        return Err(ConfigError::InvalidVar {
            var,
            value: value.to_string(),
            message: "must be >= 0".to_string(),
        });
    }
    Ok(minutes)
}
