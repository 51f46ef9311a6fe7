use std::sync::Arc;

use axum::{routing::get, Router};

use recommendation_cell::router::recommendation_routes;
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "CareLink API is running!" }))
        .nest("/recommendations", recommendation_routes(state))
}
