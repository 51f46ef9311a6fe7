use std::sync::Arc;

use assert_matches::assert_matches;
use axum::extract::{Extension, State};
use axum::Json;
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use recommendation_cell::handlers::{
    self, CriteriaRecommendationRequest, DoctorRecommendationRequest,
};
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::test_utils::{JwtTestUtils, MockSupabaseRows, TestConfig, TestUser};

fn create_auth_header(token: &str) -> TypedHeader<Authorization<Bearer>> {
    TypedHeader(Authorization::bearer(token).unwrap())
}

fn create_user_extension(user: &TestUser) -> Extension<User> {
    Extension(user.to_user())
}

async fn mock_patient_lookup(server: &MockServer, rows: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rows))
        .mount(server)
        .await;
}

async fn mock_empty_message_history(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/chat_messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn recommend_doctors_returns_scored_payload() {
    let mock_server = MockServer::start().await;
    let test_config = TestConfig::with_supabase_url(&mock_server.uri());
    let requesting_user = TestUser::patient("patient@example.com");
    let token = JwtTestUtils::create_test_token(&requesting_user, &test_config.jwt_secret, None);

    let patient_id = Uuid::new_v4();
    mock_patient_lookup(&mock_server, json!([MockSupabaseRows::patient_row(&patient_id.to_string())])).await;
    mock_empty_message_history(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseRows::doctor_row(&Uuid::new_v4().to_string(), "Nora", "Quinn", "General practice"),
            MockSupabaseRows::doctor_row(&Uuid::new_v4().to_string(), "Liam", "Walsh", "Stress counselling"),
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/ratings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockSupabaseRows::rating_rows(&[4, 5, 3])))
        .mount(&mock_server)
        .await;

    let result = handlers::recommend_doctors(
        State(test_config.to_arc()),
        create_auth_header(&token),
        create_user_extension(&requesting_user),
        Json(DoctorRecommendationRequest {
            patient_id,
            filters: None,
        }),
    )
    .await;

    let Json(body) = result.expect("handler should succeed");
    let entries = body.as_array().expect("payload should be an array");
    assert_eq!(entries.len(), 2);

    for entry in entries {
        // language +5, religion +2, address +4, rating mean +4.0
        assert_eq!(entry["score"].as_f64(), Some(15.0));
        assert_eq!(entry["average_rating"].as_f64(), Some(4.0));
        assert_eq!(entry["availability"][0]["start_time"], "09:00");
    }
    assert_eq!(entries[0]["name"], "Nora Quinn");
}

#[tokio::test]
async fn recommend_doctors_maps_missing_patient_to_not_found() {
    let mock_server = MockServer::start().await;
    let test_config = TestConfig::with_supabase_url(&mock_server.uri());
    let requesting_user = TestUser::patient("patient@example.com");
    let token = JwtTestUtils::create_test_token(&requesting_user, &test_config.jwt_secret, None);

    mock_patient_lookup(&mock_server, json!([])).await;

    let result = handlers::recommend_doctors(
        State(test_config.to_arc()),
        create_auth_header(&token),
        create_user_extension(&requesting_user),
        Json(DoctorRecommendationRequest {
            patient_id: Uuid::new_v4(),
            filters: None,
        }),
    )
    .await;

    assert_matches!(result, Err(AppError::NotFound(_)));
}

#[tokio::test]
async fn recommend_doctors_maps_store_failure_to_internal_error() {
    let mock_server = MockServer::start().await;
    let test_config = TestConfig::with_supabase_url(&mock_server.uri());
    let requesting_user = TestUser::patient("patient@example.com");
    let token = JwtTestUtils::create_test_token(&requesting_user, &test_config.jwt_secret, None);

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database unavailable"))
        .mount(&mock_server)
        .await;

    let result = handlers::recommend_doctors(
        State(test_config.to_arc()),
        create_auth_header(&token),
        create_user_extension(&requesting_user),
        Json(DoctorRecommendationRequest {
            patient_id: Uuid::new_v4(),
            filters: None,
        }),
    )
    .await;

    assert_matches!(result, Err(AppError::Internal(_)));
}

#[tokio::test]
async fn criteria_endpoint_returns_ranked_matches() {
    let mock_server = MockServer::start().await;
    let test_config = TestConfig::with_supabase_url(&mock_server.uri());
    let requesting_user = TestUser::patient("patient@example.com");
    let token = JwtTestUtils::create_test_token(&requesting_user, &test_config.jwt_secret, None);

    let patient_id = Uuid::new_v4();
    mock_patient_lookup(&mock_server, json!([MockSupabaseRows::patient_row(&patient_id.to_string())])).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseRows::doctor_row(&Uuid::new_v4().to_string(), "Nora", "Quinn", "General practice"),
        ])))
        .mount(&mock_server)
        .await;

    let result = handlers::recommend_doctors_by_criteria(
        State(test_config.to_arc()),
        create_auth_header(&token),
        create_user_extension(&requesting_user),
        Json(CriteriaRecommendationRequest {
            patient_id,
            specialization: Some("general".to_string()),
            language: Some("english".to_string()),
            gender: None,
            preferred_day: None,
            preferred_time: None,
            max_consultation_fee: None,
        }),
    )
    .await;

    let Json(body) = result.expect("handler should succeed");
    assert_eq!(body["total"].as_u64(), Some(1));
    // base 50 + specialization 25 + language 10
    assert_eq!(body["doctors"][0]["score"].as_f64(), Some(85.0));
    assert_eq!(body["doctors"][0]["name"], "Nora Quinn");
}
