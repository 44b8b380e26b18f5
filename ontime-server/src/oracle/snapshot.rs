//! Point-in-time snapshot of upcoming arrivals.
//!
//! A snapshot is taken once, at `now`, by asking an ETA provider for the next
//! few arrivals at each boarding of a route. Afterwards it answers wait
//! queries for any candidate clock time by projecting those frozen arrivals
//! forward from `now`. It never goes back to the provider.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use futures::future::join_all;
use tracing::{debug, warn};

use crate::domain::{ClockTime, StopKey, circular_forward_delta};
use crate::eta::EtaProvider;

use super::{MaxWaitByRoute, OracleError, WaitOracle};

/// How many upcoming arrivals to capture per (stop, route).
pub const ARRIVALS_PER_TARGET: usize = 3;

/// What a snapshot knows about a wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitEstimate {
    /// A captured vehicle arrives this many minutes after the candidate time.
    Known(u32),

    /// Nothing was captured for the (stop, route): the provider had no data,
    /// failed, or the pair was never a capture target.
    NoData,

    /// Arrivals were captured, but every one of them comes before the
    /// candidate time. Service may have ended, or the next vehicle is simply
    /// beyond what the provider reports.
    BeyondHorizon,
}

/// Immutable arrivals snapshot, usable as a [`WaitOracle`].
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use ontime_server::domain::{ClockTime, StopKey};
/// use ontime_server::oracle::{MaxWaitByRoute, WaitSnapshot};
///
/// let now = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap().and_hms_opt(8, 0, 0).unwrap();
/// let snapshot = WaitSnapshot::new(
///     now,
///     [(StopKey::new("미금역", "수인분당선"), vec![5, 12])],
///     MaxWaitByRoute::new().with("수인분당선", 10),
/// );
///
/// // Reaching the platform at 08:03: the 08:05 train is 2 minutes away
/// let at = ClockTime::parse_hhmm("08:03").unwrap();
/// assert_eq!(snapshot.wait("미금", "수인분당선", at), 2);
///
/// // At 08:20 both captured trains are gone; assume the worst
/// let at = ClockTime::parse_hhmm("08:20").unwrap();
/// assert_eq!(snapshot.wait("미금", "수인분당선", at), 10);
/// ```
#[derive(Debug, Clone)]
pub struct WaitSnapshot {
    now: NaiveDateTime,
    /// Minutes after `now`, ascending and deduplicated.
    arrivals: HashMap<StopKey, Vec<u32>>,
    max_wait: MaxWaitByRoute,
}

impl WaitSnapshot {
    /// Build a snapshot from already-collected arrivals.
    ///
    /// Offsets are minutes after `now`; they are sorted and deduplicated
    /// here, and entries for the same key are merged.
    pub fn new(
        now: NaiveDateTime,
        arrivals: impl IntoIterator<Item = (StopKey, Vec<u32>)>,
        max_wait: MaxWaitByRoute,
    ) -> Self {
        let mut map: HashMap<StopKey, Vec<u32>> = HashMap::new();
        for (key, etas) in arrivals {
            map.entry(key).or_default().extend(etas);
        }
        for etas in map.values_mut() {
            etas.sort_unstable();
            etas.dedup();
        }

        Self {
            now,
            arrivals: map,
            max_wait,
        }
    }

    /// Capture a snapshot by querying `provider` for every target.
    ///
    /// Targets are queried concurrently. A target whose query fails or comes
    /// back empty is left out of the snapshot, so waits there fall back to
    /// the route's maximum.
    pub async fn capture<'t, P: EtaProvider>(
        now: NaiveDateTime,
        provider: &P,
        targets: impl IntoIterator<Item = (&'t str, &'t str)>,
        max_wait: MaxWaitByRoute,
    ) -> Self {
        let mut seen = std::collections::HashSet::new();
        let targets: Vec<(&str, &str)> = targets
            .into_iter()
            .filter(|(stop, route)| seen.insert(StopKey::new(stop, route)))
            .collect();

        let results = join_all(targets.iter().map(|&(stop, route)| async move {
            let result = provider
                .next_arrivals(stop, route, ARRIVALS_PER_TARGET)
                .await;
            (stop, route, result)
        }))
        .await;

        let mut arrivals = Vec::with_capacity(results.len());
        for (stop, route, result) in results {
            match result {
                Ok(etas) if etas.is_empty() => {
                    debug!(provider = provider.name(), stop, route, "no upcoming arrivals");
                }
                Ok(etas) => {
                    debug!(provider = provider.name(), stop, route, ?etas, "captured arrivals");
                    arrivals.push((StopKey::new(stop, route), etas));
                }
                Err(e) => {
                    warn!(
                        provider = provider.name(),
                        stop,
                        route,
                        error = %e,
                        "ETA query failed; falling back to max wait"
                    );
                }
            }
        }

        Self::new(now, arrivals, max_wait)
    }

    /// The instant the snapshot was taken.
    pub fn now(&self) -> NaiveDateTime {
        self.now
    }

    /// Captured offsets for a (stop, route), ascending. Empty if none.
    pub fn arrivals(&self, stop: &str, route: &str) -> &[u32] {
        self.arrivals
            .get(&StopKey::new(stop, route))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of (stop, route) pairs with captured arrivals.
    pub fn len(&self) -> usize {
        self.arrivals.len()
    }

    /// Returns true if nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.arrivals.is_empty()
    }

    /// What the snapshot knows about waiting at `stop` for `route` when
    /// arriving at `at`.
    ///
    /// `at` is projected forward from the snapshot instant, wrapping at
    /// midnight: a candidate one minute before `now` lies 1439 minutes ahead.
    pub fn estimate(&self, stop: &str, route: &str, at: ClockTime) -> WaitEstimate {
        let etas = self.arrivals(stop, route);
        if etas.is_empty() {
            return WaitEstimate::NoData;
        }

        let delta = u32::from(circular_forward_delta(ClockTime::of_day(&self.now), at));

        // Ascending, so the first vehicle not yet gone is the nearest
        match etas.iter().find(|&&eta| eta >= delta) {
            Some(&eta) => WaitEstimate::Known(eta - delta),
            None => WaitEstimate::BeyondHorizon,
        }
    }

    /// Minutes to wait, falling back to the route's maximum when the
    /// snapshot has no vehicle to offer.
    pub fn wait(&self, stop: &str, route: &str, at: ClockTime) -> i64 {
        match self.estimate(stop, route, at) {
            WaitEstimate::Known(minutes) => i64::from(minutes),
            fallback => {
                let minutes = self.max_wait.get(route);
                debug!(stop, route, %at, ?fallback, minutes, "using max wait");
                minutes
            }
        }
    }
}

impl WaitOracle for WaitSnapshot {
    fn wait_minutes(&self, stop: &str, route: &str, at: ClockTime) -> Result<i64, OracleError> {
        Ok(self.wait(stop, route, at))
    }
}
