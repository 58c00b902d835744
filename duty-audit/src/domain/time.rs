//! Day-offset schedule times.
//!
//! Scheduling datasets give times as "D.HH:MM" strings, where `D` counts
//! service days from the start of the schedule. A duty that starts late in
//! the evening can therefore end at "1.00:45" without any date arithmetic.

use chrono::{Duration, NaiveTime, Timelike};
use serde::{Serialize, Serializer};
use std::fmt;

/// Error returned when parsing an invalid time string.
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

/// A time of day tagged with its service-day offset.
///
/// # Examples
///
/// ```
/// use duty_audit::domain::ScheduleTime;
///
/// let t = ScheduleTime::parse("1.02:34").unwrap();
/// assert_eq!(t.day(), 1);
/// assert_eq!(t.clock(), "02:34");
/// assert_eq!(t.to_string(), "1.02:34");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScheduleTime {
    day: u32,
    time: NaiveTime,
}

impl ScheduleTime {
    /// Create a new ScheduleTime from its components.
    pub fn new(day: u32, time: NaiveTime) -> Self {
        Self { day, time }
    }

    /// Parse a time from "D.HH:MM" or "D.HH:MM:SS" format.
    ///
    /// # Examples
    ///
    /// ```
    /// use duty_audit::domain::ScheduleTime;
    ///
    /// assert!(ScheduleTime::parse("0.00:00").is_ok());
    /// assert!(ScheduleTime::parse("12.23:59").is_ok());
    /// assert!(ScheduleTime::parse("0.08:30:15").is_ok());
    ///
    /// assert!(ScheduleTime::parse("08:30").is_err());
    /// assert!(ScheduleTime::parse("0.8:30").is_err());
    /// assert!(ScheduleTime::parse("0.24:00").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, TimeError> {
        let (day, clock) = s
            .split_once('.')
            .ok_or_else(|| TimeError::new("expected D.HH:MM format"))?;

        if day.is_empty() || !day.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TimeError::new("day offset must be digits"));
        }
        let day: u32 = day
            .parse()
            .map_err(|_| TimeError::new("day offset out of range"))?;

        let bytes = clock.as_bytes();
        if bytes.len() != 5 && bytes.len() != 8 {
            return Err(TimeError::new("expected HH:MM or HH:MM:SS after day offset"));
        }
        if bytes[2] != b':' || (bytes.len() == 8 && bytes[5] != b':') {
            return Err(TimeError::new("expected colon separators"));
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

        let second = if bytes.len() == 8 {
            parse_two_digits(&bytes[6..8])
                .ok_or_else(|| TimeError::new("invalid second digits"))?
        } else {
            0
        };
        if second > 59 {
            return Err(TimeError::new("second must be 0-59"));
        }

        let time = NaiveTime::from_hms_opt(hour, minute, second)
            .ok_or_else(|| TimeError::new("invalid time"))?;

        Ok(Self { day, time })
    }

    /// Returns the service-day offset.
    pub fn day(&self) -> u32 {
        self.day
    }

    /// Returns the time-of-day component.
    pub fn time(&self) -> NaiveTime {
        self.time
    }

    /// Returns the hour (0-23).
    pub fn hour(&self) -> u32 {
        self.time.hour()
    }

    /// Returns the minute (0-59).
    pub fn minute(&self) -> u32 {
        self.time.minute()
    }

    /// Returns the wall-clock part as "HH:MM", dropping the day offset.
    pub fn clock(&self) -> String {
        format!("{:02}:{:02}", self.hour(), self.minute())
    }

    /// Offset from the start of day 0.
    fn since_schedule_start(&self) -> Duration {
        Duration::days(i64::from(self.day))
            + Duration::seconds(i64::from(self.time.num_seconds_from_midnight()))
    }

    /// Returns the duration between two times.
    ///
    /// Returns a negative duration if `other` is after `self`.
    pub fn signed_duration_since(&self, other: Self) -> Duration {
        self.since_schedule_start() - other.since_schedule_start()
    }

    /// Whole minutes from `earlier` to `self`, rounded down.
    ///
    /// ```
    /// use duty_audit::domain::ScheduleTime;
    ///
    /// let a = ScheduleTime::parse("0.23:59").unwrap();
    /// let b = ScheduleTime::parse("1.00:00").unwrap();
    /// assert_eq!(b.minutes_since(a), 1);
    /// ```
    pub fn minutes_since(&self, earlier: Self) -> i64 {
        self.signed_duration_since(earlier)
            .num_seconds()
            .div_euclid(60)
    }
}

impl fmt::Debug for ScheduleTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScheduleTime({self})")
    }
}

impl fmt::Display for ScheduleTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}:{:02}", self.day, self.hour(), self.minute())?;
        if self.time.second() != 0 {
            write!(f, ":{:02}", self.time.second())?;
        }
        Ok(())
    }
}

impl Serialize for ScheduleTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Parse two ASCII digit bytes into a u32.
fn parse_two_digits(bytes: &[u8]) -> Option<u32> {
    if bytes.len() != 2 {
        return None;
    }
    let d1 = (bytes[0] as char).to_digit(10)?;
    let d2 = (bytes[1] as char).to_digit(10)?;
    Some(d1 * 10 + d2)
}
