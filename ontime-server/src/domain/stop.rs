//! Stop identifiers and their normalized lookup keys.

use std::fmt;

/// Suffix that station names carry in some sources but not others
/// ("미금역" and "미금" name the same station).
const STATION_SUFFIX: char = '역';

/// Normalize a stop identifier for lookup.
///
/// Numeric stop IDs are returned trimmed but otherwise untouched. Names have
/// a trailing station suffix removed and all whitespace dropped, so that
/// "청명역 정류장", "청명 정류장" and "청명정류장" meet on one key.
///
/// # Examples
///
/// ```
/// use ontime_server::domain::normalize_stop;
///
/// assert_eq!(normalize_stop(" 206000043 "), "206000043");
/// assert_eq!(normalize_stop("미금역"), "미금");
/// assert_eq!(normalize_stop("이마트 앞"), "이마트앞");
/// ```
pub fn normalize_stop(stop: &str) -> String {
    let s = stop.trim();
    if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) {
        return s.to_string();
    }
    let s = s.strip_suffix(STATION_SUFFIX).unwrap_or(s);
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// A normalized (stop, route) pair.
///
/// Both the snapshot and the ETA providers key their data by this type, so
/// a lookup written with a slightly different spelling of the stop still
/// lands on the same entry.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct StopKey {
    stop: String,
    route: String,
}

impl StopKey {
    /// Build a key, normalizing both parts.
    pub fn new(stop: &str, route: &str) -> Self {
        Self {
            stop: normalize_stop(stop),
            route: route.trim().to_string(),
        }
    }
}

impl fmt::Debug for StopKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StopKey({}, {})", self.stop, self.route)
    }
}

impl fmt::Display for StopKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.route, self.stop)
    }
}
