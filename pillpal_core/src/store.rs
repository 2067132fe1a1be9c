//! Client-side medicine store.
//!
//! Holds the list the user sees and runs every user action against the
//! persistence API. The list is only ever replaced wholesale by a successful
//! refresh, so a failed action leaves what was already loaded untouched.

use crate::adherence::{derive_views, summarize, AdherenceSummary};
use crate::api::MedicineApi;
use crate::config::TakenPolicy;
use crate::notify::Notifier;
use crate::schedule::{TimeOfDay, WeekdaySet};
use crate::{
    Error, IntakePayload, IntakeStatus, Medicine, MedicinePayload, MedicineView, NewMedicine,
    RecordId, Result, SchedulePayload,
};
use chrono::{DateTime, FixedOffset, Local, Utc};

type Clock = Box<dyn Fn() -> DateTime<FixedOffset> + Send + Sync>;

/// In-memory medicine list plus the actions that change it
pub struct MedicineStore<A: MedicineApi> {
    api: A,
    notifier: Notifier,
    policy: TakenPolicy,
    clock: Clock,
    medicines: Vec<MedicineView>,
    /// Instant the current views were derived at
    loaded_at: DateTime<FixedOffset>,
}

/// A validated [`NewMedicine`], ready to send
struct AddPlan {
    payload: MedicinePayload,
    times: Vec<TimeOfDay>,
    days: WeekdaySet,
}

impl<A: MedicineApi> MedicineStore<A> {
    pub fn new(api: A, notifier: Notifier, policy: TakenPolicy) -> Self {
        let clock: Clock = Box::new(|| Local::now().fixed_offset());
        let loaded_at = clock();
        Self {
            api,
            notifier,
            policy,
            clock,
            medicines: Vec::new(),
            loaded_at,
        }
    }

    /// Replace the wall clock, mainly for tests
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> DateTime<FixedOffset> + Send + Sync + 'static,
    {
        self.loaded_at = clock();
        self.clock = Box::new(clock);
        self
    }

    pub fn medicines(&self) -> &[MedicineView] {
        &self.medicines
    }

    pub fn find(&self, id: &RecordId) -> Option<&MedicineView> {
        self.medicines.iter().find(|v| &v.medicine.id == id)
    }

    /// Adherence numbers for the currently loaded list, as of its last refresh
    pub fn summary(&self) -> AdherenceSummary {
        summarize(&self.medicines, &self.loaded_at)
    }

    /// Fetch medicines and intakes, then rebuild every derived field.
    ///
    /// On failure the previous list is kept and an error notification is sent.
    pub async fn refresh(&mut self) -> Result<()> {
        match self.load().await {
            Ok((views, now)) => {
                tracing::info!("Loaded {} medicines", views.len());
                self.medicines = views;
                self.loaded_at = now;
                Ok(())
            }
            Err(e) => {
                self.notifier.error("Error fetching medicines", e.to_string());
                Err(e)
            }
        }
    }

    async fn load(&self) -> Result<(Vec<MedicineView>, DateTime<FixedOffset>)> {
        let medicines = self.api.list_medicines().await?;
        let intakes = match self.policy {
            TakenPolicy::IntakeHistory => self.api.list_intakes().await?,
            TakenPolicy::Placeholder => Vec::new(),
        };
        let now = (self.clock)();
        Ok((derive_views(medicines, &intakes, &now, self.policy), now))
    }

    /// Create a medicine and one schedule per dose time, then refresh.
    ///
    /// Input is validated before any request is made. If any request fails the
    /// list is left as it was, and a medicine created before a failed schedule
    /// request is deleted again.
    pub async fn add(&mut self, new: NewMedicine) -> Result<Medicine> {
        let result = match validate(&new) {
            Ok(plan) => self.create(plan).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(medicine) => {
                self.notifier.info(
                    "Medicine added successfully",
                    format!("{} has been added to your medication list.", medicine.name),
                );
                self.refresh_after_change().await;
                Ok(medicine)
            }
            Err(e) => {
                self.notifier.error("Error adding medicine", e.to_string());
                Err(e)
            }
        }
    }

    async fn create(&self, plan: AddPlan) -> Result<Medicine> {
        let medicine = self.api.create_medicine(&plan.payload).await?;
        tracing::debug!("Created medicine {} ({})", medicine.name, medicine.id);

        for time in plan.times {
            let schedule = SchedulePayload {
                medicine: medicine.id.clone(),
                time_of_day: time,
                days_of_week: plan.days,
                is_active: true,
            };
            if let Err(e) = self.api.create_schedule(&schedule).await {
                self.roll_back(&medicine).await;
                return Err(e);
            }
        }

        Ok(medicine)
    }

    async fn roll_back(&self, medicine: &Medicine) {
        match self.api.delete_medicine(&medicine.id).await {
            Ok(()) => tracing::debug!("Rolled back medicine {}", medicine.id),
            Err(e) => tracing::warn!(
                "Failed to remove partially created medicine {}: {}",
                medicine.id,
                e
            ),
        }
    }

    /// Delete a medicine, then refresh
    pub async fn delete(&mut self, id: &RecordId) -> Result<()> {
        match self.api.delete_medicine(id).await {
            Ok(()) => {
                let name = self
                    .find(id)
                    .map(|v| v.medicine.name.clone())
                    .unwrap_or_else(|| id.to_string());
                self.notifier
                    .info("Medicine deleted", format!("{} has been removed.", name));
                self.refresh_after_change().await;
                Ok(())
            }
            Err(e) => {
                self.notifier.error("Error deleting medicine", e.to_string());
                Err(e)
            }
        }
    }

    /// Log a taken or skipped dose for a loaded medicine, then refresh
    pub async fn record_intake(&mut self, id: &RecordId, status: IntakeStatus) -> Result<()> {
        let name = match self.find(id) {
            Some(view) => view.medicine.name.clone(),
            None => {
                let e = Error::Validation(format!("Unknown medicine id: {}", id));
                self.notifier.error("Error recording intake", e.to_string());
                return Err(e);
            }
        };

        let now = (self.clock)().with_timezone(&Utc);
        let payload = IntakePayload {
            medicine: id.clone(),
            scheduled_time: now,
            actual_time: (status == IntakeStatus::Taken).then_some(now),
            status,
        };

        match self.api.create_intake(&payload).await {
            Ok(_) => {
                self.notifier
                    .info("Intake recorded", format!("{} marked as {}.", name, status));
                self.refresh_after_change().await;
                Ok(())
            }
            Err(e) => {
                self.notifier.error("Error recording intake", e.to_string());
                Err(e)
            }
        }
    }

    /// A failed refresh has already notified; the change itself succeeded.
    async fn refresh_after_change(&mut self) {
        if let Err(e) = self.refresh().await {
            tracing::warn!("Refresh after change failed: {}", e);
        }
    }
}

fn validate(new: &NewMedicine) -> Result<AddPlan> {
    let required = [
        ("name", &new.name),
        ("dosage", &new.dosage),
        ("type", &new.kind),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(Error::Validation(format!("Missing required field: {}", field)));
        }
    }

    let times = new
        .times
        .iter()
        .map(|t| t.parse::<TimeOfDay>())
        .collect::<Result<Vec<_>>>()?;

    let days = new.days.unwrap_or_else(WeekdaySet::all);
    if days.is_empty() && !times.is_empty() {
        return Err(Error::Validation(
            "At least one active day is required".into(),
        ));
    }

    Ok(AddPlan {
        payload: MedicinePayload {
            name: new.name.trim().to_string(),
            dosage: new.dosage.trim().to_string(),
            kind: new.kind.trim().to_string(),
            remaining_count: new.remaining,
            refill_threshold: new.refill_threshold.unwrap_or(0),
        },
        times,
        days,
    })
}
