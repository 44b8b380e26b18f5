//! Clock-of-day arithmetic.
//!
//! Route deadlines are plain "HH:MM" strings with no date attached, so every
//! time in the solver lives on a 1440-minute circle. Intermediate values may
//! run negative or past midnight; they are folded back onto the circle before
//! being rendered or compared.

use std::fmt;

use chrono::Timelike;

/// Minutes in one day.
pub const MINUTES_PER_DAY: i64 = 24 * 60;

/// Error returned when parsing an invalid clock string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A time of day, stored as minutes since midnight in `0..1440`.
///
/// Any `ClockTime` is normalized by construction, so formatting and
/// comparison never see an out-of-range value.
///
/// # Examples
///
/// ```
/// use ontime_server::domain::ClockTime;
///
/// let t = ClockTime::parse_hhmm("09:05").unwrap();
/// assert_eq!(t.minutes(), 545);
/// assert_eq!(t.to_string(), "09:05");
///
/// // Negative offsets wrap to the previous day
/// assert_eq!(ClockTime::from_minutes(-10).to_string(), "23:50");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(u16);

impl ClockTime {
    /// Midnight.
    pub const MIDNIGHT: ClockTime = ClockTime(0);

    /// Fold an arbitrary minute count onto the clock.
    ///
    /// ```
    /// use ontime_server::domain::ClockTime;
    ///
    /// assert_eq!(ClockTime::from_minutes(600).to_string(), "10:00");
    /// assert_eq!(ClockTime::from_minutes(1440 + 30).to_string(), "00:30");
    /// assert_eq!(ClockTime::from_minutes(-1440 * 3 - 1).to_string(), "23:59");
    /// ```
    pub fn from_minutes(total: i64) -> Self {
        Self(total.rem_euclid(MINUTES_PER_DAY) as u16)
    }

    /// Parse a time from "HH:MM" format.
    ///
    /// Surrounding whitespace is ignored; inside it, both fields must be two
    /// digits, hours 00-23 and minutes 00-59.
    ///
    /// # Examples
    ///
    /// ```
    /// use ontime_server::domain::ClockTime;
    ///
    /// assert!(ClockTime::parse_hhmm("00:00").is_ok());
    /// assert!(ClockTime::parse_hhmm("23:59").is_ok());
    ///
    /// assert!(ClockTime::parse_hhmm("9:05").is_err());
    /// assert!(ClockTime::parse_hhmm("24:00").is_err());
    /// assert!(ClockTime::parse_hhmm("12:60").is_err());
    /// ```
    pub fn parse_hhmm(s: &str) -> Result<Self, TimeError> {
        let s = s.trim();

        // Must be exactly 5 characters: HH:MM
        if s.len() != 5 {
            return Err(TimeError::new("expected HH:MM format"));
        }

        let bytes = s.as_bytes();

        if bytes[2] != b':' {
            return Err(TimeError::new("expected colon at position 2"));
        }

        let hour =
            parse_two_digits(&bytes[0..2]).ok_or_else(|| TimeError::new("invalid hour digits"))?;
        if hour > 23 {
            return Err(TimeError::new("hour must be 0-23"));
        }

        let minute = parse_two_digits(&bytes[3..5])
            .ok_or_else(|| TimeError::new("invalid minute digits"))?;
        if minute > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }

        Ok(Self(hour * 60 + minute))
    }

    /// The minute-of-day of a chrono time or datetime.
    ///
    /// Seconds are truncated.
    pub fn of_day<T: Timelike>(t: &T) -> Self {
        Self((t.hour() * 60 + t.minute()) as u16)
    }

    /// Minutes since midnight, in `0..1440`.
    pub fn minutes(&self) -> u16 {
        self.0
    }

    /// Returns the hour (0-23).
    pub fn hour(&self) -> u16 {
        self.0 / 60
    }

    /// Returns the minute (0-59).
    pub fn minute(&self) -> u16 {
        self.0 % 60
    }
}

impl fmt::Debug for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClockTime({:02}:{:02})", self.hour(), self.minute())
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl std::str::FromStr for ClockTime {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_hhmm(s)
    }
}

/// Parse two ASCII digit bytes into a u16.
fn parse_two_digits(bytes: &[u8]) -> Option<u16> {
    if bytes.len() != 2 {
        return None;
    }
    let d1 = (bytes[0] as char).to_digit(10)?;
    let d2 = (bytes[1] as char).to_digit(10)?;
    Some((d1 * 10 + d2) as u16)
}

/// Length of the shorter arc between two times, in `0..=720`.
///
/// ```
/// use ontime_server::domain::{ClockTime, circular_distance};
///
/// let a = ClockTime::parse_hhmm("23:50").unwrap();
/// let b = ClockTime::parse_hhmm("00:10").unwrap();
/// assert_eq!(circular_distance(a, b), 20);
/// ```
pub fn circular_distance(a: ClockTime, b: ClockTime) -> u16 {
    let d = (i64::from(a.0) - i64::from(b.0)).rem_euclid(MINUTES_PER_DAY);
    d.min(MINUTES_PER_DAY - d) as u16
}

/// Minutes from `now` forward (wrapping past midnight) until `target`.
///
/// ```
/// use ontime_server::domain::{ClockTime, circular_forward_delta};
///
/// let now = ClockTime::parse_hhmm("23:58").unwrap();
/// let target = ClockTime::parse_hhmm("00:03").unwrap();
/// assert_eq!(circular_forward_delta(now, target), 5);
/// assert_eq!(circular_forward_delta(target, now), 1435);
/// ```
pub fn circular_forward_delta(now: ClockTime, target: ClockTime) -> u16 {
    (i64::from(target.0) - i64::from(now.0)).rem_euclid(MINUTES_PER_DAY) as u16
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    prop_compose! {
        fn valid_time()(hour in 0u32..24, minute in 0u32..60) -> String {
            format!("{:02}:{:02}", hour, minute)
        }
    }

    proptest! {
        /// Parse then display roundtrips
        #[test]
        fn parse_display_roundtrip(s in valid_time()) {
            let parsed = ClockTime::parse_hhmm(&s).unwrap();
            prop_assert_eq!(ClockTime::from_minutes(i64::from(parsed.minutes())).to_string(), s);
        }

        /// Any integer lands on its residue mod 1440
        #[test]
        fn from_minutes_is_residue(n in -1_000_000i64..1_000_000) {
            let rendered = ClockTime::from_minutes(n).to_string();
            let back = ClockTime::parse_hhmm(&rendered).unwrap();
            prop_assert_eq!(i64::from(back.minutes()), n.rem_euclid(MINUTES_PER_DAY));
        }

        /// Distance is symmetric and bounded by half a day
        #[test]
        fn distance_symmetric_and_bounded(a in 0i64..1440, b in 0i64..1440) {
            let (a, b) = (ClockTime::from_minutes(a), ClockTime::from_minutes(b));
            let d = circular_distance(a, b);
            prop_assert_eq!(d, circular_distance(b, a));
            prop_assert!(d <= 720);
        }

        /// Stepping forward by the delta reaches the target
        #[test]
        fn forward_delta_reaches_target(now in 0i64..1440, target in 0i64..1440) {
            let (now, target) = (ClockTime::from_minutes(now), ClockTime::from_minutes(target));
            let delta = circular_forward_delta(now, target);
            prop_assert!(delta < 1440);
            prop_assert_eq!(
                ClockTime::from_minutes(i64::from(now.minutes()) + i64::from(delta)),
                target
            );
        }

        /// Invalid hour is rejected
        #[test]
        fn invalid_hour_rejected(hour in 24u32..100, minute in 0u32..60) {
            let s = format!("{:02}:{:02}", hour, minute);
            prop_assert!(ClockTime::parse_hhmm(&s).is_err());
        }

        /// Invalid minute is rejected
        #[test]
        fn invalid_minute_rejected(hour in 0u32..24, minute in 60u32..100) {
            let s = format!("{:02}:{:02}", hour, minute);
            prop_assert!(ClockTime::parse_hhmm(&s).is_err());
        }
    }
}
