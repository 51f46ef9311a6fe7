use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use shared_database::supabase::SupabaseClient;

use crate::models::{ChatMessageSnippet, Doctor, Patient};
use crate::stores::{AppointmentCalendar, DoctorDirectory, PatientStore, RatingStore};

/// Embedded select for a doctor row: availability windows plus the owning
/// account via an inner join, so inactive accounts drop out server-side.
const DOCTOR_SELECT: &str = "doctor_id,language,religion,address,gender,specialization,\
consultation_fee,availability:doctors_availability(day_of_week,start_time,end_time),\
account:users!inner(user_id,first_name,last_name,gender,is_active)";

const PATIENT_SELECT: &str = "patient_id,language,religion,address,gender";

pub struct SupabaseDoctorDirectory {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseDoctorDirectory {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }
}

#[async_trait]
impl DoctorDirectory for SupabaseDoctorDirectory {
    async fn active_doctors(&self, auth_token: &str) -> Result<Vec<Doctor>> {
        let path = format!(
            "/rest/v1/doctors?select={}&account.is_active=eq.true",
            DOCTOR_SELECT
        );

        let doctors: Vec<Doctor> = self.supabase.get(&path, Some(auth_token)).await?;
        debug!("Loaded {} active doctors", doctors.len());
        Ok(doctors)
    }
}

pub struct SupabasePatientStore {
    supabase: Arc<SupabaseClient>,
}

impl SupabasePatientStore {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }
}

#[async_trait]
impl PatientStore for SupabasePatientStore {
    async fn find_patient(&self, patient_id: Uuid, auth_token: &str) -> Result<Option<Patient>> {
        let path = format!(
            "/rest/v1/patients?patient_id=eq.{}&select={}",
            patient_id, PATIENT_SELECT
        );

        let rows: Vec<Patient> = self.supabase.get(&path, Some(auth_token)).await?;
        Ok(rows.into_iter().next())
    }

    async fn message_history(
        &self,
        patient_id: Uuid,
        auth_token: &str,
    ) -> Result<Vec<ChatMessageSnippet>> {
        let path = format!(
            "/rest/v1/chat_messages?sender_id=eq.{}&select=message_text",
            patient_id
        );

        let messages: Vec<ChatMessageSnippet> = self.supabase.get(&path, Some(auth_token)).await?;
        debug!(
            "Loaded {} historical messages for patient {}",
            messages.len(),
            patient_id
        );
        Ok(messages)
    }
}

pub struct SupabaseRatingStore {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseRatingStore {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }
}

#[derive(Deserialize)]
struct RatingRow {
    rating: i32,
}

#[async_trait]
impl RatingStore for SupabaseRatingStore {
    async fn ratings_for(&self, doctor_id: Uuid, auth_token: &str) -> Result<Vec<i32>> {
        let path = format!("/rest/v1/ratings?doctor_id=eq.{}&select=rating", doctor_id);

        let rows: Vec<RatingRow> = self.supabase.get(&path, Some(auth_token)).await?;
        Ok(rows.into_iter().map(|row| row.rating).collect())
    }
}

pub struct SupabaseAppointmentCalendar {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseAppointmentCalendar {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }
}

#[derive(Deserialize)]
struct BookedRow {
    doctor_id: Uuid,
}

#[async_trait]
impl AppointmentCalendar for SupabaseAppointmentCalendar {
    async fn booked_doctor_ids(
        &self,
        date: NaiveDate,
        start_time: NaiveTime,
        auth_token: &str,
    ) -> Result<HashSet<Uuid>> {
        let path = format!(
            "/rest/v1/appointments?appointment_date=eq.{}&appointment_time=eq.{}&status=neq.Cancelled&select=doctor_id",
            date.format("%Y-%m-%d"),
            start_time.format("%H:%M:%S")
        );

        let rows: Vec<BookedRow> = self.supabase.get(&path, Some(auth_token)).await?;
        Ok(rows.into_iter().map(|row| row.doctor_id).collect())
    }
}
