//! Next-dose resolution.
//!
//! Picks the soonest upcoming dose for one medicine:
//! - Earliest active schedule for today that is strictly after now
//! - Otherwise the earliest active schedule for tomorrow
//! - Otherwise a sentinel distinguishing "no schedules" from "nothing upcoming"

use crate::schedule::{TimeOfDay, Weekday};
use crate::Schedule;
use chrono::NaiveDateTime;
use std::fmt;

/// Outcome of next-dose resolution
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NextDose {
    /// A dose later today
    Today(TimeOfDay),
    /// No dose left today; first dose tomorrow
    Tomorrow(TimeOfDay),
    /// Schedules exist but none falls on today or tomorrow
    NoUpcoming,
    /// The medicine has no schedules at all
    NoSchedule,
}

impl NextDose {
    /// The time of the dose, if one was found
    pub fn time(&self) -> Option<TimeOfDay> {
        match self {
            NextDose::Today(t) | NextDose::Tomorrow(t) => Some(*t),
            NextDose::NoUpcoming | NextDose::NoSchedule => None,
        }
    }

    pub fn is_today(&self) -> bool {
        matches!(self, NextDose::Today(_))
    }
}

impl fmt::Display for NextDose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NextDose::Today(t) => write!(f, "{}", t),
            NextDose::Tomorrow(t) => write!(f, "{} Tomorrow", t),
            NextDose::NoUpcoming => f.write_str("No upcoming dose"),
            NextDose::NoSchedule => f.write_str("No schedule"),
        }
    }
}

/// Resolve the next dose for a medicine's schedules at local time `now`.
///
/// Comparison happens at minute resolution: a schedule at exactly the
/// current minute is not upcoming. Schedule order does not matter; the
/// earliest qualifying time always wins.
pub fn resolve_next_dose(schedules: &[Schedule], now: NaiveDateTime) -> NextDose {
    if schedules.is_empty() {
        return NextDose::NoSchedule;
    }

    let today = Weekday::of(&now);
    let current = TimeOfDay::from_naive(now.time());

    let later_today = schedules
        .iter()
        .filter(|s| s.is_due_on(today))
        .map(|s| s.time_of_day)
        .filter(|t| *t > current)
        .min();

    if let Some(time) = later_today {
        tracing::debug!("Next dose today at {}", time);
        return NextDose::Today(time);
    }

    let tomorrow = today.next();
    let first_tomorrow = schedules
        .iter()
        .filter(|s| s.is_due_on(tomorrow))
        .map(|s| s.time_of_day)
        .min();

    match first_tomorrow {
        Some(time) => NextDose::Tomorrow(time),
        None => NextDose::NoUpcoming,
    }
}
