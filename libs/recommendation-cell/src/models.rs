use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    M,
    F,
    Other,
}

/// Projection of the owning user account, attached eagerly when loading a
/// doctor. Doctors whose account is inactive never leave the directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub gender: Option<Gender>,
    pub is_active: bool,
}

impl UserAccount {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A single weekly consultation window. Start is assumed to precede end;
/// that invariant is enforced where the windows are created, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityWindow {
    pub day_of_week: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl AvailabilityWindow {
    pub fn is_on_day(&self, day: &str) -> bool {
        self.day_of_week.eq_ignore_ascii_case(day)
    }

    /// Whether this window fully contains the requested interval.
    pub fn covers(&self, start: NaiveTime, end: NaiveTime) -> bool {
        self.start_time <= start && self.end_time >= end
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub doctor_id: Uuid,
    pub language: Option<String>,
    pub religion: Option<String>,
    pub address: Option<String>,
    pub gender: Gender,
    pub specialization: String,
    pub consultation_fee: f64,
    #[serde(default)]
    pub availability: Vec<AvailabilityWindow>,
    #[serde(default)]
    pub account: Option<UserAccount>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub patient_id: Uuid,
    pub language: Option<String>,
    pub religion: Option<String>,
    pub address: Option<String>,
    pub gender: Gender,
}

/// Historical free-text message authored by a patient. Only the text matters
/// to scoring; ordering and timestamps are irrelevant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessageSnippet {
    pub message_text: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AvailabilityFilter {
    pub day: Option<String>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
}

/// Caller-supplied structured filters. Absent fields bind nothing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecommendationFilter {
    pub language: Option<String>,
    pub region: Option<String>,
    pub gender: Option<Gender>,
    pub specialization: Option<String>,
    pub max_consultation_fee: Option<f64>,
    pub availability: Option<AvailabilityFilter>,
}

/// Criteria for the standalone criteria-ranked recommendation variant.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CriteriaQuery {
    pub specialization: Option<String>,
    pub language: Option<String>,
    pub gender: Option<Gender>,
    pub preferred_day: Option<String>,
    pub preferred_time: Option<NaiveTime>,
    pub max_consultation_fee: Option<f64>,
}

/// Doctor paired with a computed score. Lives only for the duration of one
/// recommendation call.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub doctor: Doctor,
    pub score: f64,
    pub avg_rating: Option<f64>,
}

/// `start`/`end` rendered as "HH:MM" for the public payload.
#[derive(Debug, Clone, Serialize)]
pub struct AvailabilitySlotView {
    pub day: String,
    pub start_time: String,
    pub end_time: String,
}

impl From<&AvailabilityWindow> for AvailabilitySlotView {
    fn from(window: &AvailabilityWindow) -> Self {
        Self {
            day: window.day_of_week.clone(),
            start_time: window.start_time.format("%H:%M").to_string(),
            end_time: window.end_time.format("%H:%M").to_string(),
        }
    }
}

/// One entry of the engine's ranked output. Missing account link and absent
/// ratings stay `None` here; the HTTP layer decides how to render them.
#[derive(Debug, Clone, Serialize)]
pub struct RecommendedDoctor {
    pub doctor_id: Uuid,
    pub name: Option<String>,
    pub gender: Option<Gender>,
    pub specialization: String,
    pub language: Option<String>,
    pub address: Option<String>,
    pub average_rating: Option<f64>,
    pub consultation_fee: f64,
    pub availability: Vec<AvailabilitySlotView>,
    pub score: f64,
}

impl RecommendedDoctor {
    pub fn from_candidate(candidate: ScoredCandidate) -> Self {
        let ScoredCandidate {
            doctor,
            score,
            avg_rating,
        } = candidate;

        Self {
            doctor_id: doctor.doctor_id,
            name: doctor.account.as_ref().map(UserAccount::full_name),
            gender: doctor.account.as_ref().and_then(|account| account.gender),
            specialization: doctor.specialization,
            language: doctor.language,
            address: doctor.address,
            average_rating: avg_rating.map(|avg| (avg * 100.0).round() / 100.0),
            consultation_fee: doctor.consultation_fee,
            availability: doctor.availability.iter().map(Into::into).collect(),
            score,
        }
    }
}

#[derive(Debug, Error)]
pub enum RecommendationError {
    #[error("Patient not found")]
    PatientNotFound,

    #[error("data access failed: {0}")]
    Store(#[from] anyhow::Error),
}
