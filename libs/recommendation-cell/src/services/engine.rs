use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{
    ChatMessageSnippet, Doctor, Patient, RecommendationError, RecommendationFilter,
    RecommendedDoctor, ScoredCandidate,
};
use crate::services::filters::apply_filters;
use crate::services::scoring::{average_rating, score_doctor};
use crate::stores::supabase::{
    SupabaseAppointmentCalendar, SupabaseDoctorDirectory, SupabasePatientStore,
    SupabaseRatingStore,
};
use crate::stores::{AppointmentCalendar, DoctorDirectory, PatientStore, RatingStore};

/// Minimum candidate count the backfill pass guarantees, and the cap the
/// final ranking truncates to.
pub const RECOMMENDATION_TARGET: usize = 5;

/// Stateless orchestrator for one recommendation call. Constructed per
/// request; every call re-reads the stores, nothing is cached across calls.
pub struct RecommendationService {
    doctors: Arc<dyn DoctorDirectory>,
    patients: Arc<dyn PatientStore>,
    ratings: Arc<dyn RatingStore>,
    calendar: Arc<dyn AppointmentCalendar>,
}

impl RecommendationService {
    pub fn new(config: &AppConfig) -> Self {
        let supabase = Arc::new(SupabaseClient::new(config));
        Self {
            doctors: Arc::new(SupabaseDoctorDirectory::new(supabase.clone())),
            patients: Arc::new(SupabasePatientStore::new(supabase.clone())),
            ratings: Arc::new(SupabaseRatingStore::new(supabase.clone())),
            calendar: Arc::new(SupabaseAppointmentCalendar::new(supabase)),
        }
    }

    /// Injection seam for tests and alternative backends.
    pub fn with_stores(
        doctors: Arc<dyn DoctorDirectory>,
        patients: Arc<dyn PatientStore>,
        ratings: Arc<dyn RatingStore>,
        calendar: Arc<dyn AppointmentCalendar>,
    ) -> Self {
        Self {
            doctors,
            patients,
            ratings,
            calendar,
        }
    }

    /// Rank doctors for a patient: filter, score, backfill to the target
    /// count, dedupe, sort, truncate, package.
    pub async fn recommend(
        &self,
        patient_id: Uuid,
        filter: Option<RecommendationFilter>,
        auth_token: &str,
    ) -> Result<Vec<RecommendedDoctor>, RecommendationError> {
        debug!("Building recommendations for patient: {}", patient_id);

        let patient = self
            .patients
            .find_patient(patient_id, auth_token)
            .await?
            .ok_or(RecommendationError::PatientNotFound)?;

        let history = self.patients.message_history(patient_id, auth_token).await?;
        let pool = self.doctors.active_doctors(auth_token).await?;

        let busy = self.busy_doctor_ids(filter.as_ref(), auth_token).await?;
        let filtered = apply_filters(&pool, filter.as_ref(), &busy);
        debug!(
            "{} of {} active doctors passed the filters",
            filtered.len(),
            pool.len()
        );

        let mut candidates = Vec::with_capacity(filtered.len());
        for doctor in filtered {
            candidates.push(self.score_candidate(doctor, &patient, &history, auth_token).await?);
        }

        if candidates.len() < RECOMMENDATION_TARGET {
            self.backfill(&mut candidates, &pool, &patient, &history, auth_token)
                .await?;
        }

        let recommendations = package(candidates);
        info!(
            "Returning {} recommendations for patient {}",
            recommendations.len(),
            patient_id
        );
        Ok(recommendations)
    }

    /// Top up the candidate list from the unfiltered remainder of the pool.
    /// Filtered candidates keep their position ahead of backfilled ones; the
    /// remainder is sorted by score and only the gap is appended.
    async fn backfill(
        &self,
        candidates: &mut Vec<ScoredCandidate>,
        pool: &[Doctor],
        patient: &Patient,
        history: &[ChatMessageSnippet],
        auth_token: &str,
    ) -> Result<(), RecommendationError> {
        let chosen: HashSet<Uuid> = candidates
            .iter()
            .map(|candidate| candidate.doctor.doctor_id)
            .collect();

        let mut remainder = Vec::new();
        for doctor in pool.iter().filter(|d| !chosen.contains(&d.doctor_id)) {
            remainder.push(
                self.score_candidate(doctor.clone(), patient, history, auth_token)
                    .await?,
            );
        }
        remainder.sort_by(|a, b| b.score.total_cmp(&a.score));

        let needed = RECOMMENDATION_TARGET - candidates.len();
        debug!("Backfilling {} of {} remaining doctors", needed.min(remainder.len()), remainder.len());
        candidates.extend(remainder.into_iter().take(needed));
        Ok(())
    }

    async fn score_candidate(
        &self,
        doctor: Doctor,
        patient: &Patient,
        history: &[ChatMessageSnippet],
        auth_token: &str,
    ) -> Result<ScoredCandidate, RecommendationError> {
        let ratings = self.ratings.ratings_for(doctor.doctor_id, auth_token).await?;
        let score = score_doctor(&doctor, patient, history, &ratings);
        Ok(ScoredCandidate {
            score,
            avg_rating: average_rating(&ratings),
            doctor,
        })
    }

    /// The busy-doctor lookup only runs when the caller pinned both an exact
    /// date and a start time.
    async fn busy_doctor_ids(
        &self,
        filter: Option<&RecommendationFilter>,
        auth_token: &str,
    ) -> Result<HashSet<Uuid>, RecommendationError> {
        if let Some(availability) = filter.and_then(|f| f.availability.as_ref()) {
            if let (Some(date), Some(start_time)) = (availability.date, availability.start_time) {
                let busy = self
                    .calendar
                    .booked_doctor_ids(date, start_time, auth_token)
                    .await?;
                debug!("{} doctors already booked at {} {}", busy.len(), date, start_time);
                return Ok(busy);
            }
        }
        Ok(HashSet::new())
    }
}

/// Dedupe by doctor identity (first occurrence wins, so filter matches are
/// never displaced by a backfilled duplicate), sort by score descending with
/// a stable sort (filtered entries stay ahead on ties), truncate, project.
fn package(candidates: Vec<ScoredCandidate>) -> Vec<RecommendedDoctor> {
    let mut seen = HashSet::new();
    let mut unique: Vec<ScoredCandidate> = candidates
        .into_iter()
        .filter(|candidate| seen.insert(candidate.doctor.doctor_id))
        .collect();

    unique.sort_by(|a, b| b.score.total_cmp(&a.score));
    unique.truncate(RECOMMENDATION_TARGET);

    unique
        .into_iter()
        .map(RecommendedDoctor::from_candidate)
        .collect()
}
