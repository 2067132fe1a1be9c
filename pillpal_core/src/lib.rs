#![forbid(unsafe_code)]

//! Core domain model and client logic for PillPal.
//!
//! This crate provides:
//! - Domain types (medicines, schedules, intake records)
//! - Next-dose resolution and adherence summaries
//! - A typed client for the persistence API
//! - The client-side medicine store and its notification channel

pub mod types;
pub mod error;
pub mod schedule;
pub mod config;
pub mod logging;
pub mod next_dose;
pub mod adherence;
pub mod notify;
pub mod api;
pub mod store;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use schedule::{TimeOfDay, Weekday, WeekdaySet};
pub use config::{Config, TakenPolicy};
pub use next_dose::{resolve_next_dose, NextDose};
pub use adherence::{summarize, AdherenceSummary, UpcomingDose};
pub use notify::{Notification, Notifier, Severity};
pub use api::{HttpMedicineApi, MedicineApi};
pub use store::MedicineStore;
