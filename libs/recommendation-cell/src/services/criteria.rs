//! Criteria-ranked recommendation variant.
//!
//! Unlike the profile-based engine this one never looks at chat history or
//! ratings: it pre-filters the active pool on the caller's criteria and
//! scores each survivor on a clamped 0-100 scale. No backfill, no
//! truncation; the caller gets every match, best first.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{CriteriaQuery, Doctor, RecommendationError, ScoredCandidate};
use crate::stores::supabase::{SupabaseDoctorDirectory, SupabasePatientStore};
use crate::stores::{DoctorDirectory, PatientStore};

pub const BASE_SCORE: f64 = 50.0;
pub const SPECIALIZATION_POINTS: f64 = 25.0;
pub const LANGUAGE_POINTS: f64 = 10.0;
pub const GENDER_POINTS: f64 = 5.0;
pub const DAY_POINTS: f64 = 5.0;
pub const TIME_POINTS: f64 = 5.0;
pub const FEE_HEADROOM_POINTS: f64 = 10.0;

pub struct CriteriaRecommendationService {
    doctors: Arc<dyn DoctorDirectory>,
    patients: Arc<dyn PatientStore>,
}

impl CriteriaRecommendationService {
    pub fn new(config: &AppConfig) -> Self {
        let supabase = Arc::new(SupabaseClient::new(config));
        Self {
            doctors: Arc::new(SupabaseDoctorDirectory::new(supabase.clone())),
            patients: Arc::new(SupabasePatientStore::new(supabase)),
        }
    }

    pub fn with_stores(doctors: Arc<dyn DoctorDirectory>, patients: Arc<dyn PatientStore>) -> Self {
        Self { doctors, patients }
    }

    pub async fn recommend(
        &self,
        patient_id: Uuid,
        query: &CriteriaQuery,
        auth_token: &str,
    ) -> Result<Vec<ScoredCandidate>, RecommendationError> {
        debug!("Criteria recommendation for patient: {}", patient_id);

        self.patients
            .find_patient(patient_id, auth_token)
            .await?
            .ok_or(RecommendationError::PatientNotFound)?;

        let pool = self.doctors.active_doctors(auth_token).await?;

        let mut matches: Vec<ScoredCandidate> = pool
            .into_iter()
            .filter(|doctor| matches_criteria(doctor, query))
            .map(|doctor| ScoredCandidate {
                score: criteria_score(&doctor, query),
                avg_rating: None,
                doctor,
            })
            .collect();

        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        debug!("{} doctors matched the criteria", matches.len());
        Ok(matches)
    }
}

fn matches_criteria(doctor: &Doctor, query: &CriteriaQuery) -> bool {
    if let Some(specialization) = &query.specialization {
        if !doctor
            .specialization
            .to_lowercase()
            .contains(&specialization.to_lowercase())
        {
            return false;
        }
    }

    if let Some(language) = &query.language {
        let matches_language = doctor
            .language
            .as_deref()
            .is_some_and(|l| l.eq_ignore_ascii_case(language));
        if !matches_language {
            return false;
        }
    }

    if let Some(gender) = query.gender {
        if doctor.gender != gender {
            return false;
        }
    }

    if let Some(max_fee) = query.max_consultation_fee {
        if doctor.consultation_fee > max_fee {
            return false;
        }
    }

    true
}

/// Clamped 0-100 score: base 50 plus criterion bonuses. The day and time
/// bonuses are decided by the first window on the preferred day, and the
/// fee bonus rewards headroom under the ceiling.
pub fn criteria_score(doctor: &Doctor, query: &CriteriaQuery) -> f64 {
    let mut score = BASE_SCORE;

    if let Some(specialization) = &query.specialization {
        if doctor
            .specialization
            .to_lowercase()
            .contains(&specialization.to_lowercase())
        {
            score += SPECIALIZATION_POINTS;
        }
    }

    if let (Some(language), Some(doctor_language)) = (&query.language, &doctor.language) {
        if doctor_language.eq_ignore_ascii_case(language) {
            score += LANGUAGE_POINTS;
        }
    }

    if let Some(gender) = query.gender {
        if doctor.gender == gender {
            score += GENDER_POINTS;
        }
    }

    if let Some(day) = &query.preferred_day {
        if let Some(window) = doctor.availability.iter().find(|w| w.is_on_day(day)) {
            score += DAY_POINTS;

            if let Some(time) = query.preferred_time {
                if window.start_time <= time && time <= window.end_time {
                    score += TIME_POINTS;
                }
            }
        }
    }

    if let Some(max_fee) = query.max_consultation_fee {
        if max_fee > 0.0 && doctor.consultation_fee <= max_fee {
            let fee_ratio = 1.0 - doctor.consultation_fee / max_fee;
            score += fee_ratio * FEE_HEADROOM_POINTS;
        }
    }

    score.clamp(0.0, 100.0)
}
