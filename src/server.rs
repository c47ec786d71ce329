use axum::routing::{get, post};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::routes::{
    auth, conversations, dashboard, drafts, form, health, results, simulations, submissions,
};
use crate::state::SharedState;

pub fn build_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health
        .route("/health", get(health::health))
        // Sessions
        .route("/auth/sign-up", post(auth::sign_up))
        .route("/auth/sign-in", post(auth::sign_in))
        .route("/auth/sign-out", post(auth::sign_out))
        .route("/auth/me", get(auth::me))
        // Create-test form
        .route("/form/defaults", get(form::defaults))
        .route("/form/options", get(form::options))
        .route("/form/validate", post(form::validate_draft))
        .route("/form/apply", post(form::apply))
        .route("/drafts", get(drafts::get_draft).put(drafts::put_draft))
        // Submission
        .route("/tests", post(submissions::create_test))
        .route("/configurations", get(submissions::list_configurations))
        // Simulations
        .route("/simulations/{id}", get(simulations::get_simulation))
        .route("/simulations/{id}/status", post(simulations::update_status))
        // Results
        .route("/results", get(results::get_results))
        .route("/results/conversations", get(results::list_conversations))
        .route(
            "/results/conversations/{id}",
            get(results::get_conversation),
        )
        .route("/dashboard", get(dashboard::dashboard))
        // Ingest from the execution backend
        .route(
            "/simulations/{id}/conversations",
            post(conversations::create_conversation),
        )
        .route(
            "/conversations/{id}/quality-metrics",
            post(conversations::create_quality_metrics),
        )
        .route(
            "/conversations/{id}/technical-metrics",
            post(conversations::create_technical_metrics),
        )
        .route(
            "/conversations/{id}/analysis",
            post(conversations::create_analysis),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
        .layer(cors)
        .with_state(state)
}
