//! Core domain types for PillPal.
//!
//! This module defines the records exchanged with the persistence API:
//! - Medicines and their schedules
//! - Intake records
//! - Request payloads for creating them
//! - The derived per-medicine view held by the client

use crate::next_dose::NextDose;
use crate::schedule::{TimeOfDay, Weekday, WeekdaySet};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

// ============================================================================
// Identifiers
// ============================================================================

/// Opaque record identifier assigned by the persistence API.
///
/// The API may send ids as integers or strings; both normalize to a string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(i64),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Text(s) if s.is_empty() => Err(serde::de::Error::custom("empty record id")),
            Raw::Text(s) => Ok(Self(s)),
            Raw::Number(n) => Ok(Self(n.to_string())),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

// ============================================================================
// Medicine and Schedule Records
// ============================================================================

/// A recurring dose time belonging to one medicine
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Schedule {
    #[serde(default)]
    pub id: Option<RecordId>,
    #[serde(default, alias = "medicine_id")]
    pub medicine: Option<RecordId>,
    pub time_of_day: TimeOfDay,
    #[serde(default)]
    pub days_of_week: WeekdaySet,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl Schedule {
    /// Active schedule at `time` on every day of the week
    pub fn daily(time: TimeOfDay) -> Self {
        Self {
            id: None,
            medicine: None,
            time_of_day: time,
            days_of_week: WeekdaySet::all(),
            is_active: true,
        }
    }

    /// Whether this schedule produces a dose on `day`.
    ///
    /// Inactive schedules never do.
    pub fn is_due_on(&self, day: Weekday) -> bool {
        self.is_active && self.days_of_week.contains(day)
    }
}

fn default_active() -> bool {
    true
}

/// A medicine as stored by the persistence API
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Medicine {
    pub id: RecordId,
    pub name: String,
    pub dosage: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    pub remaining_count: u32,
    pub refill_threshold: u32,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub side_effects: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub schedules: Vec<Schedule>,
}

impl Medicine {
    /// Remaining units are at or below the refill threshold
    pub fn is_low_stock(&self) -> bool {
        self.remaining_count <= self.refill_threshold
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// Intake Records
// ============================================================================

/// Outcome of a scheduled dose
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IntakeStatus {
    Taken,
    Skipped,
}

impl fmt::Display for IntakeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntakeStatus::Taken => f.write_str("taken"),
            IntakeStatus::Skipped => f.write_str("skipped"),
        }
    }
}

/// A logged dose event
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct IntakeRecord {
    #[serde(default)]
    pub id: Option<RecordId>,
    #[serde(alias = "medicine_id")]
    pub medicine: RecordId,
    pub scheduled_time: DateTime<Utc>,
    #[serde(default)]
    pub actual_time: Option<DateTime<Utc>>,
    pub status: IntakeStatus,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl IntakeRecord {
    /// When the intake happened: the actual time if recorded, else the scheduled time
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.actual_time.unwrap_or(self.scheduled_time)
    }
}

// ============================================================================
// User Input and Request Payloads
// ============================================================================

/// A medicine as entered by the user, before validation
#[derive(Clone, Debug, Default)]
pub struct NewMedicine {
    pub name: String,
    pub dosage: String,
    pub kind: String,
    /// Dose times as `HH:MM` strings
    pub times: Vec<String>,
    pub remaining: u32,
    pub refill_threshold: Option<u32>,
    /// Active days for every created schedule; all days when absent
    pub days: Option<WeekdaySet>,
}

/// Body of `POST /medicines/`
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MedicinePayload {
    pub name: String,
    pub dosage: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub remaining_count: u32,
    pub refill_threshold: u32,
}

/// Body of `POST /schedules/`
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SchedulePayload {
    pub medicine: RecordId,
    pub time_of_day: TimeOfDay,
    pub days_of_week: WeekdaySet,
    pub is_active: bool,
}

/// Body of `POST /intakes/`
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct IntakePayload {
    pub medicine: RecordId,
    pub scheduled_time: DateTime<Utc>,
    pub actual_time: Option<DateTime<Utc>>,
    pub status: IntakeStatus,
}

// ============================================================================
// Derived View
// ============================================================================

/// A medicine together with fields derived on the client.
///
/// Never persisted; rebuilt on every refresh.
#[derive(Clone, Debug, PartialEq)]
pub struct MedicineView {
    pub medicine: Medicine,
    pub next_dose: NextDose,
    pub taken: bool,
}

impl MedicineView {
    pub fn is_low_stock(&self) -> bool {
        self.medicine.is_low_stock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn medicine_with_stock(remaining: u32, threshold: u32) -> Medicine {
        Medicine {
            id: "1".into(),
            name: "Aspirin".into(),
            dosage: "100mg".into(),
            kind: "tablet".into(),
            remaining_count: remaining,
            refill_threshold: threshold,
            instructions: None,
            side_effects: None,
            schedules: vec![],
        }
    }

    #[test]
    fn test_low_stock_boundary() {
        assert!(medicine_with_stock(4, 5).is_low_stock());
        assert!(medicine_with_stock(5, 5).is_low_stock());
        assert!(!medicine_with_stock(6, 5).is_low_stock());
        assert!(medicine_with_stock(0, 0).is_low_stock());
    }

    #[test]
    fn test_parse_api_medicine() {
        let json = r#"{
            "id": 12,
            "name": "Metformin",
            "dosage": "500mg",
            "type": "tablet",
            "remaining_count": 30,
            "refill_threshold": 5,
            "instructions": "With food",
            "side_effects": null,
            "unexpected_field": {"nested": true},
            "schedules": [
                {"id": 3, "time_of_day": "08:00:00", "days_of_week": [1,2,3,4,5], "is_active": true, "medicine": 12}
            ]
        }"#;

        let med: Medicine = serde_json::from_str(json).unwrap();
        assert_eq!(med.id.as_str(), "12");
        assert_eq!(med.kind, "tablet");
        assert_eq!(med.instructions.as_deref(), Some("With food"));
        assert_eq!(med.side_effects, None);
        assert_eq!(med.schedules.len(), 1);
        assert_eq!(med.schedules[0].time_of_day.to_string(), "08:00");
        assert_eq!(med.schedules[0].medicine, Some(RecordId::new("12")));
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let json = r#"{
            "id": "abc",
            "name": "Vitamin D",
            "dosage": "1000 IU",
            "remaining_count": 10,
            "refill_threshold": 2,
            "schedules": null
        }"#;

        let med: Medicine = serde_json::from_str(json).unwrap();
        assert!(med.schedules.is_empty());
        assert_eq!(med.kind, "");
        assert_eq!(med.instructions, None);

        let schedule: Schedule = serde_json::from_str(r#"{"time_of_day": "21:15"}"#).unwrap();
        assert!(schedule.is_active);
        assert!(schedule.days_of_week.is_empty());
    }

    #[test]
    fn test_negative_stock_rejected() {
        let json = r#"{
            "id": 1, "name": "X", "dosage": "1", "type": "t",
            "remaining_count": -3, "refill_threshold": 0
        }"#;
        assert!(serde_json::from_str::<Medicine>(json).is_err());
    }

    #[test]
    fn test_unknown_intake_status_rejected() {
        let ok = r#"{"medicine": 1, "scheduled_time": "2024-01-03T08:00:00Z", "status": "taken"}"#;
        let bad = r#"{"medicine": 1, "scheduled_time": "2024-01-03T08:00:00Z", "status": "maybe"}"#;
        let intake: IntakeRecord = serde_json::from_str(ok).unwrap();
        assert_eq!(intake.status, IntakeStatus::Taken);
        assert!(serde_json::from_str::<IntakeRecord>(bad).is_err());
    }

    #[test]
    fn test_intake_timestamp_prefers_actual_time() {
        let json = r#"{
            "medicine": "7",
            "scheduled_time": "2024-01-03T08:00:00Z",
            "actual_time": "2024-01-03T08:20:00+00:00",
            "status": "taken"
        }"#;
        let intake: IntakeRecord = serde_json::from_str(json).unwrap();
        assert_eq!(intake.timestamp().to_rfc3339(), "2024-01-03T08:20:00+00:00");
    }

    #[test]
    fn test_inactive_schedule_never_due() {
        let mut schedule = Schedule::daily("08:00".parse().unwrap());
        assert!(schedule.is_due_on(Weekday::WEDNESDAY));
        schedule.is_active = false;
        assert!(!schedule.is_due_on(Weekday::WEDNESDAY));
    }
}
