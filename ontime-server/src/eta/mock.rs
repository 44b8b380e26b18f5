//! File-backed ETA provider for running without live feeds.
//!
//! Loads upcoming arrivals from a JSON file and serves them as if they were
//! live readings taken at the moment of the query.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::RwLock;

use crate::domain::StopKey;

use super::EtaProvider;
use super::error::EtaError;

/// On-disk layout.
#[derive(Debug, Deserialize)]
struct ArrivalsFile {
    arrivals: Vec<ArrivalsEntry>,
}

#[derive(Debug, Deserialize)]
struct ArrivalsEntry {
    stop: String,
    route: String,
    etas: Vec<u32>,
}

/// ETA provider that serves arrivals from a JSON file.
///
/// The file looks like:
///
/// ```json
/// {"arrivals": [{"stop": "미금역", "route": "수인분당선", "etas": [3, 9, 15]}]}
/// ```
///
/// Stops are normalized on load and on lookup, so "미금역" and "미금" find
/// the same entry.
#[derive(Clone)]
pub struct StaticEtaProvider {
    arrivals: Arc<RwLock<HashMap<StopKey, Vec<u32>>>>,
}

impl StaticEtaProvider {
    /// Load arrivals from a JSON file.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, EtaError> {
        let arrivals = load_file(path.as_ref())?;
        Ok(Self {
            arrivals: Arc::new(RwLock::new(arrivals)),
        })
    }

    /// Parse arrivals from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, EtaError> {
        let arrivals = parse_arrivals(json)?;
        Ok(Self {
            arrivals: Arc::new(RwLock::new(arrivals)),
        })
    }

    /// Number of (stop, route) pairs with data.
    pub async fn len(&self) -> usize {
        self.arrivals.read().await.len()
    }

    /// Returns true if no pairs have data.
    pub async fn is_empty(&self) -> bool {
        self.arrivals.read().await.is_empty()
    }

    /// Reload arrivals from disk.
    ///
    /// On failure the current data is kept and the error is returned.
    pub async fn reload(&self, path: impl AsRef<Path>) -> Result<usize, EtaError> {
        let fresh = load_file(path.as_ref())?;
        let count = fresh.len();
        *self.arrivals.write().await = fresh;
        Ok(count)
    }
}

impl EtaProvider for StaticEtaProvider {
    fn name(&self) -> &str {
        "static"
    }

    async fn eta_minutes(&self, stop: &str, route: &str) -> Result<Option<u32>, EtaError> {
        let arrivals = self.arrivals.read().await;
        Ok(arrivals
            .get(&StopKey::new(stop, route))
            .and_then(|etas| etas.first().copied()))
    }

    async fn next_arrivals(
        &self,
        stop: &str,
        route: &str,
        max_results: usize,
    ) -> Result<Vec<u32>, EtaError> {
        let arrivals = self.arrivals.read().await;
        Ok(arrivals
            .get(&StopKey::new(stop, route))
            .map(|etas| etas.iter().take(max_results).copied().collect())
            .unwrap_or_default())
    }
}

fn load_file(path: &Path) -> Result<HashMap<StopKey, Vec<u32>>, EtaError> {
    let json = std::fs::read_to_string(path)?;
    parse_arrivals(&json)
}

/// Parse the file and index it by normalized key, sorted and deduplicated.
fn parse_arrivals(json: &str) -> Result<HashMap<StopKey, Vec<u32>>, EtaError> {
    let file: ArrivalsFile = serde_json::from_str(json).map_err(|e| EtaError::Parse {
        message: e.to_string(),
    })?;

    let mut map: HashMap<StopKey, Vec<u32>> = HashMap::new();
    for entry in file.arrivals {
        map.entry(StopKey::new(&entry.stop, &entry.route))
            .or_default()
            .extend(entry.etas);
    }
    for etas in map.values_mut() {
        etas.sort_unstable();
        etas.dedup();
    }

    Ok(map)
}
