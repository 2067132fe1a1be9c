//! Schedule primitives: time-of-day and the 1–7 weekday encoding.
//!
//! The persistence API sends times as `HH:MM` or `HH:MM:SS` strings and
//! weekdays as integers where 1 is Monday and 7 is Sunday. Both are parsed
//! into strict types here so that bad values are rejected at the edge.

use crate::{Error, Result};
use chrono::{Datelike, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Time of Day
// ============================================================================

/// A 24-hour wall-clock time with minute resolution.
///
/// Ordering is chronological, which matches lexicographic ordering of the
/// zero-padded `HH:MM` form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    pub fn new(hour: u8, minute: u8) -> Result<Self> {
        if hour > 23 || minute > 59 {
            return Err(Error::Validation(format!(
                "Time out of range: {:02}:{:02}",
                hour, minute
            )));
        }
        Ok(Self { hour, minute })
    }

    /// Truncate a wall-clock time to the minute
    pub fn from_naive(time: NaiveTime) -> Self {
        Self {
            hour: time.hour() as u8,
            minute: time.minute() as u8,
        }
    }
}

impl FromStr for TimeOfDay {
    type Err = Error;

    /// Accepts `HH:MM` and `HH:MM:SS`; seconds are discarded.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::Validation(format!("Invalid time of day: {:?}", s));

        let parts: Vec<&str> = s.trim().split(':').collect();
        if parts.len() < 2 || parts.len() > 3 {
            return Err(invalid());
        }
        if parts.iter().any(|p| p.is_empty() || p.len() > 2) {
            return Err(invalid());
        }

        let hour: u8 = parts[0].parse().map_err(|_| invalid())?;
        let minute: u8 = parts[1].parse().map_err(|_| invalid())?;
        if let Some(seconds) = parts.get(2) {
            let seconds: u8 = seconds.parse().map_err(|_| invalid())?;
            if seconds > 59 {
                return Err(invalid());
            }
        }

        Self::new(hour, minute)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

// ============================================================================
// Weekday Encoding
// ============================================================================

/// Day of week encoded 1 (Monday) through 7 (Sunday)
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Weekday(u8);

impl Weekday {
    pub const MONDAY: Weekday = Weekday(1);
    pub const WEDNESDAY: Weekday = Weekday(3);
    pub const SUNDAY: Weekday = Weekday(7);

    pub fn new(value: u8) -> Result<Self> {
        if (1..=7).contains(&value) {
            Ok(Self(value))
        } else {
            Err(Error::Validation(format!(
                "Weekday must be between 1 and 7, got {}",
                value
            )))
        }
    }

    pub fn number(&self) -> u8 {
        self.0
    }

    /// The following day, wrapping Sunday (7) to Monday (1)
    pub fn next(&self) -> Self {
        if self.0 == 7 {
            Self(1)
        } else {
            Self(self.0 + 1)
        }
    }

    /// Weekday of a local wall-clock instant
    pub fn of(now: &NaiveDateTime) -> Self {
        Self::from(now.weekday())
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        // Sunday is 7 here rather than 0
        Self(day.number_from_monday() as u8)
    }
}

impl TryFrom<u8> for Weekday {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Weekday> for u8 {
    fn from(value: Weekday) -> Self {
        value.0
    }
}

/// A set of active weekdays
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    /// No active days. Schedules with this set never match.
    pub fn empty() -> Self {
        Self(0)
    }

    /// Every day of the week
    pub fn all() -> Self {
        Self(0b0111_1111)
    }

    pub fn insert(&mut self, day: Weekday) {
        self.0 |= 1 << (day.0 - 1);
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & (1 << (day.0 - 1)) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Active days in ascending order
    pub fn days(self) -> impl Iterator<Item = Weekday> {
        (1..=7u8).map(Weekday).filter(move |d| self.contains(*d))
    }
}

impl FromIterator<Weekday> for WeekdaySet {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        let mut set = Self::empty();
        for day in iter {
            set.insert(day);
        }
        set
    }
}

impl TryFrom<Vec<u8>> for WeekdaySet {
    type Error = Error;

    fn try_from(values: Vec<u8>) -> Result<Self> {
        values
            .into_iter()
            .map(Weekday::new)
            .collect::<Result<Vec<_>>>()
            .map(|days| days.into_iter().collect())
    }
}

impl From<WeekdaySet> for Vec<u8> {
    fn from(value: WeekdaySet) -> Self {
        value.days().map(u8::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_parse_time_with_and_without_seconds() {
        let short: TimeOfDay = "08:30".parse().unwrap();
        let long: TimeOfDay = "08:30:45".parse().unwrap();
        assert_eq!(short, long);
        assert_eq!(long.to_string(), "08:30");
    }

    #[test]
    fn test_parse_time_rejects_garbage() {
        assert!("".parse::<TimeOfDay>().is_err());
        assert!("8".parse::<TimeOfDay>().is_err());
        assert!("24:00".parse::<TimeOfDay>().is_err());
        assert!("12:60".parse::<TimeOfDay>().is_err());
        assert!("ab:cd".parse::<TimeOfDay>().is_err());
        assert!("12:00:00:00".parse::<TimeOfDay>().is_err());
    }

    #[test]
    fn test_time_ordering_is_chronological() {
        let early: TimeOfDay = "09:05".parse().unwrap();
        let late: TimeOfDay = "10:00".parse().unwrap();
        assert!(early < late);
        // Same ordering as comparing the padded strings
        assert_eq!(
            early.cmp(&late),
            early.to_string().cmp(&late.to_string())
        );
    }

    #[test]
    fn test_sunday_is_seven() {
        // 2024-01-07 was a Sunday
        let sunday = NaiveDate::from_ymd_opt(2024, 1, 7)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert_eq!(Weekday::of(&sunday), Weekday::SUNDAY);
        assert_eq!(Weekday::SUNDAY.next(), Weekday::MONDAY);
    }

    #[test]
    fn test_weekday_out_of_range_rejected() {
        assert!(Weekday::new(0).is_err());
        assert!(Weekday::new(8).is_err());
        assert!(serde_json::from_str::<WeekdaySet>("[1, 2, 9]").is_err());
    }

    #[test]
    fn test_weekday_set_json_shape() {
        let set: WeekdaySet = serde_json::from_str("[7, 1, 1]").unwrap();
        assert!(set.contains(Weekday::MONDAY));
        assert!(set.contains(Weekday::SUNDAY));
        assert!(!set.contains(Weekday::WEDNESDAY));
        assert_eq!(serde_json::to_string(&set).unwrap(), "[1,7]");
        assert_eq!(
            serde_json::to_string(&WeekdaySet::all()).unwrap(),
            "[1,2,3,4,5,6,7]"
        );
    }
}
