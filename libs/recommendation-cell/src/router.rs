use std::sync::Arc;

use axum::{middleware, routing::post, Router};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn recommendation_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/doctors", post(handlers::recommend_doctors))
        .route("/doctors/criteria", post(handlers::recommend_doctors_by_criteria))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
