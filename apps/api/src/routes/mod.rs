pub mod applications;
pub mod health;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/applications",
            post(applications::handle_submit).get(applications::handle_list),
        )
        .route(
            "/api/v1/applications/stats",
            get(applications::handle_stats),
        )
        .route(
            "/api/v1/applications/export",
            post(applications::handle_export),
        )
        .route(
            "/api/v1/applications/:id/status",
            patch(applications::handle_update_status),
        )
        .route(
            "/api/v1/applications/:id",
            delete(applications::handle_delete),
        )
        .with_state(state)
}
