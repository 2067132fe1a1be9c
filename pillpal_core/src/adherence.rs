//! Adherence derivation.
//!
//! Turns raw medicines and intake records into the per-medicine view the
//! client shows, and summarizes the whole list for the dashboard numbers.
//! Everything here is pure; the caller supplies the current instant.

use crate::config::TakenPolicy;
use crate::next_dose::resolve_next_dose;
use crate::schedule::{TimeOfDay, Weekday};
use crate::{IntakeRecord, IntakeStatus, Medicine, MedicineView, RecordId};
use chrono::{DateTime, TimeZone};

/// The soonest dose still due today across all medicines
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpcomingDose {
    pub medicine_id: RecordId,
    pub name: String,
    pub time: TimeOfDay,
}

/// Fleet-wide adherence numbers for the current day
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AdherenceSummary {
    /// Active schedules falling on today, across all medicines
    pub doses_today: usize,
    /// Medicines marked taken today
    pub completed_today: usize,
    /// Medicines at or below their refill threshold
    pub refill_needed: usize,
    /// Earliest dose later today, if any
    pub upcoming: Option<UpcomingDose>,
}

/// Whether a `taken` intake exists for `medicine_id` on the local date of `now`
pub fn taken_today<Tz: TimeZone>(
    medicine_id: &RecordId,
    intakes: &[IntakeRecord],
    now: &DateTime<Tz>,
) -> bool {
    let today = now.date_naive();
    let tz = now.timezone();

    intakes.iter().any(|intake| {
        &intake.medicine == medicine_id
            && intake.status == IntakeStatus::Taken
            && intake.timestamp().with_timezone(&tz).date_naive() == today
    })
}

/// Build the derived view for every medicine.
///
/// Input order is preserved.
pub fn derive_views<Tz: TimeZone>(
    medicines: Vec<Medicine>,
    intakes: &[IntakeRecord],
    now: &DateTime<Tz>,
    policy: TakenPolicy,
) -> Vec<MedicineView> {
    let local = now.naive_local();

    medicines
        .into_iter()
        .map(|medicine| {
            let next_dose = resolve_next_dose(&medicine.schedules, local);
            let taken = match policy {
                TakenPolicy::IntakeHistory => taken_today(&medicine.id, intakes, now),
                TakenPolicy::Placeholder => false,
            };
            MedicineView {
                medicine,
                next_dose,
                taken,
            }
        })
        .collect()
}

/// Summarize derived views for the local date of `now`
pub fn summarize<Tz: TimeZone>(views: &[MedicineView], now: &DateTime<Tz>) -> AdherenceSummary {
    let today = Weekday::of(&now.naive_local());

    let doses_today = views
        .iter()
        .flat_map(|v| v.medicine.schedules.iter())
        .filter(|s| s.is_due_on(today))
        .count();

    let completed_today = views.iter().filter(|v| v.taken).count();
    let refill_needed = views.iter().filter(|v| v.is_low_stock()).count();

    let upcoming = views
        .iter()
        .filter(|v| !v.medicine.schedules.is_empty() && v.next_dose.is_today())
        .filter_map(|v| v.next_dose.time().map(|time| (time, v)))
        .min_by_key(|(time, _)| *time)
        .map(|(time, v)| UpcomingDose {
            medicine_id: v.medicine.id.clone(),
            name: v.medicine.name.clone(),
            time,
        });

    AdherenceSummary {
        doses_today,
        completed_today,
        refill_needed,
        upcoming,
    }
}
