//! Route types.
//!
//! A `Route` is the fixed itinerary a traveler follows: walks and rides of
//! known length interleaved with boardings whose timing depends on when the
//! next vehicle turns up. Routes are authored origin-first.

use serde::{Deserialize, Serialize};

/// One leg of a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Segment {
    /// A leg of fixed duration (walking, or riding between stops).
    ///
    /// Stored signed so a bad configuration value survives loading and is
    /// rejected by the solver with a precise error.
    Move { minutes: i64 },

    /// Boarding `route` at `stop`.
    Board { stop: String, route: String },
}

impl Segment {
    /// Creates a move of the given length.
    pub fn walk(minutes: i64) -> Self {
        Segment::Move { minutes }
    }

    /// Creates a boarding.
    pub fn board(stop: impl Into<String>, route: impl Into<String>) -> Self {
        Segment::Board {
            stop: stop.into(),
            route: route.into(),
        }
    }

    /// Returns true if this is a boarding.
    pub fn is_board(&self) -> bool {
        matches!(self, Segment::Board { .. })
    }

    /// Returns the (stop, route) pair if this is a boarding.
    pub fn as_board(&self) -> Option<(&str, &str)> {
        match self {
            Segment::Move { .. } => None,
            Segment::Board { stop, route } => Some((stop, route)),
        }
    }
}

/// An ordered list of segments, origin first.
///
/// # Examples
///
/// ```
/// use ontime_server::domain::{Route, Segment};
///
/// let route = Route::new(vec![
///     Segment::walk(5),
///     Segment::board("이마트앞", "51"),
///     Segment::walk(20),
/// ]);
/// assert_eq!(route.len(), 3);
/// assert_eq!(route.boardings().collect::<Vec<_>>(), vec![("이마트앞", "51")]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Route {
    segments: Vec<Segment>,
}

impl Route {
    /// Creates a route from segments in travel order.
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// Segments in travel order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns true if the route has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The (stop, route) pair of every boarding, in travel order.
    pub fn boardings(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.segments.iter().filter_map(Segment::as_board)
    }

    /// Sum of all move durations, saturating at the `i64` bounds.
    pub fn fixed_minutes(&self) -> i64 {
        self.segments
            .iter()
            .map(|s| match s {
                Segment::Move { minutes } => *minutes,
                Segment::Board { .. } => 0,
            })
            .fold(0i64, i64::saturating_add)
    }
}

/// The home-to-school route the service ships with.
///
/// Subway from Migeum, then two buses.
pub fn default_route() -> Route {
    Route::new(vec![
        Segment::walk(8),
        Segment::board("미금역", "수인분당선"),
        Segment::walk(22),
        Segment::walk(10),
        Segment::board("203000075", "5100"),
        Segment::walk(15),
        Segment::walk(5),
        Segment::board("206000043", "51"),
        Segment::walk(15),
        Segment::walk(5),
    ])
}
