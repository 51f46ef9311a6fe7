//! Read-side store seams for the recommendation engine.
//!
//! The engine only sees these traits; the Supabase adapters below are the
//! production implementations, and tests swap in in-memory fakes.

pub mod supabase;

use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use crate::models::{ChatMessageSnippet, Doctor, Patient};

/// Active doctors with availability windows and owning-account data attached.
#[async_trait]
pub trait DoctorDirectory: Send + Sync {
    async fn active_doctors(&self, auth_token: &str) -> Result<Vec<Doctor>>;
}

#[async_trait]
pub trait PatientStore: Send + Sync {
    async fn find_patient(&self, patient_id: Uuid, auth_token: &str) -> Result<Option<Patient>>;

    /// Every message the patient has authored, in no particular order.
    async fn message_history(
        &self,
        patient_id: Uuid,
        auth_token: &str,
    ) -> Result<Vec<ChatMessageSnippet>>;
}

/// Raw 1-5 rating values for one doctor. Averaged by the caller so the
/// aggregate always reflects live data.
#[async_trait]
pub trait RatingStore: Send + Sync {
    async fn ratings_for(&self, doctor_id: Uuid, auth_token: &str) -> Result<Vec<i32>>;
}

/// Doctors already booked (non-cancelled) at an exact date and time.
#[async_trait]
pub trait AppointmentCalendar: Send + Sync {
    async fn booked_doctor_ids(
        &self,
        date: NaiveDate,
        start_time: NaiveTime,
        auth_token: &str,
    ) -> Result<HashSet<Uuid>>;
}
