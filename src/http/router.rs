//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration - permissive for development, should be restricted in production
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the API router with versioned endpoints
    let api_v1 = Router::new()
        // Provider directory
        .route("/providers", post(handlers::upsert_provider))
        .route("/providers/match", post(handlers::match_providers))
        .route(
            "/providers/{provider_id}/reservations",
            get(handlers::list_provider_reservations),
        )
        // Reservation lifecycle
        .route("/reservations", post(handlers::create_reservation))
        .route(
            "/reservations/{reservation_id}/confirm",
            post(handlers::confirm_reservation),
        )
        .route(
            "/reservations/{reservation_id}/cancel",
            post(handlers::cancel_reservation),
        )
        .route(
            "/requesters/{requester_id}/reservations",
            get(handlers::list_requester_reservations),
        )
        // Notifications
        .route(
            "/notifications/{role}/{recipient_id}",
            get(handlers::list_notifications),
        )
        .route(
            "/notifications/{notification_id}/read",
            post(handlers::mark_notification_read),
        );

    // Combine all routes
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
