use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    Json,
};
use axum_extra::TypedHeader;
use chrono::NaiveTime;
use headers::{authorization::Bearer, Authorization};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{
    AvailabilitySlotView, CriteriaQuery, Gender, RecommendationError, RecommendationFilter,
    RecommendedDoctor, ScoredCandidate,
};
use crate::services::criteria::CriteriaRecommendationService;
use crate::services::engine::RecommendationService;

#[derive(Debug, Deserialize)]
pub struct DoctorRecommendationRequest {
    pub patient_id: Uuid,
    pub filters: Option<RecommendationFilter>,
}

#[derive(Debug, Deserialize)]
pub struct CriteriaRecommendationRequest {
    pub patient_id: Uuid,
    pub specialization: Option<String>,
    pub language: Option<String>,
    pub gender: Option<Gender>,
    pub preferred_day: Option<String>,
    pub preferred_time: Option<NaiveTime>,
    pub max_consultation_fee: Option<f64>,
}

impl CriteriaRecommendationRequest {
    fn into_query(self) -> (Uuid, CriteriaQuery) {
        let query = CriteriaQuery {
            specialization: self.specialization,
            language: self.language,
            gender: self.gender,
            preferred_day: self.preferred_day,
            preferred_time: self.preferred_time,
            max_consultation_fee: self.max_consultation_fee,
        };
        (self.patient_id, query)
    }
}

#[axum::debug_handler]
pub async fn recommend_doctors(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<DoctorRecommendationRequest>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    debug!(
        "Doctor recommendations requested by user {} for patient {}",
        user.id, request.patient_id
    );

    let service = RecommendationService::new(&state);

    let recommendations = service
        .recommend(request.patient_id, request.filters, token)
        .await
        .map_err(map_engine_error)?;

    Ok(Json(Value::Array(
        recommendations.iter().map(recommendation_json).collect(),
    )))
}

#[axum::debug_handler]
pub async fn recommend_doctors_by_criteria(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CriteriaRecommendationRequest>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    let (patient_id, query) = request.into_query();
    debug!(
        "Criteria recommendations requested by user {} for patient {}",
        user.id, patient_id
    );

    let service = CriteriaRecommendationService::new(&state);

    let matches = service
        .recommend(patient_id, &query, token)
        .await
        .map_err(map_engine_error)?;

    Ok(Json(json!({
        "doctors": matches.iter().map(criteria_match_json).collect::<Vec<Value>>(),
        "total": matches.len()
    })))
}

fn map_engine_error(error: RecommendationError) -> AppError {
    match error {
        RecommendationError::PatientNotFound => AppError::NotFound("Patient not found".to_string()),
        RecommendationError::Store(err) => AppError::Internal(err.to_string()),
    }
}

/// Public payload for one engine recommendation. Missing name, gender and
/// rating render as the "N/A" sentinel; absent language/address stay null.
fn recommendation_json(rec: &RecommendedDoctor) -> Value {
    json!({
        "doctor_id": rec.doctor_id,
        "name": sentinel(&rec.name),
        "gender": sentinel(&rec.gender),
        "specialization": rec.specialization,
        "language": rec.language,
        "address": rec.address,
        "average_rating": sentinel(&rec.average_rating),
        "consultation_fee": rec.consultation_fee,
        "availability": rec.availability,
        "score": rec.score,
    })
}

fn criteria_match_json(candidate: &ScoredCandidate) -> Value {
    let doctor = &candidate.doctor;
    let views: Vec<AvailabilitySlotView> = doctor.availability.iter().map(Into::into).collect();

    json!({
        "doctor_id": doctor.doctor_id,
        "name": sentinel(&doctor.account.as_ref().map(|account| account.full_name())),
        "gender": doctor.gender,
        "specialization": doctor.specialization,
        "language": doctor.language,
        "address": doctor.address,
        "consultation_fee": doctor.consultation_fee,
        "availability": views,
        "score": candidate.score,
    })
}

fn sentinel<T: serde::Serialize>(value: &Option<T>) -> Value {
    match value {
        Some(inner) => json!(inner),
        None => json!("N/A"),
    }
}
