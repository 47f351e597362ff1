//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the ledger
//! or the provider directory for business logic.

use std::str::FromStr;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use super::dto::{
    AckResponse, CancelReservationRequest, ConfirmReservationRequest, CreateReservationRequest,
    HealthResponse, MatchProvidersRequest, MatchProvidersResponse, NotificationListResponse,
    PageQuery, ReservationListResponse,
};
use super::error::AppError;
use super::state::AppState;
use crate::api::{
    ActorRole, NotificationId, Provider, ProviderId, Reservation, ReservationId, RequesterId,
};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint to verify the service is running and storage is
/// accessible.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match state.repository.health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        database: db_status,
    }))
}

// =============================================================================
// Provider Directory
// =============================================================================

/// POST /v1/providers/match
///
/// Match providers in the directory against a booking query. An empty body
/// (no constraints) returns every provider.
pub async fn match_providers(
    State(state): State<AppState>,
    Json(request): Json<MatchProvidersRequest>,
) -> HandlerResult<MatchProvidersResponse> {
    let query = request.into_query().map_err(AppError::BadRequest)?;
    let providers = state.ledger.match_providers(&query).await?;
    let total = providers.len();
    Ok(Json(MatchProvidersResponse { providers, total }))
}

/// POST /v1/providers
///
/// Register or replace a provider in the directory.
pub async fn upsert_provider(
    State(state): State<AppState>,
    Json(provider): Json<Provider>,
) -> Result<(StatusCode, Json<AckResponse>), AppError> {
    state.repository.upsert_provider(&provider).await?;
    Ok((StatusCode::CREATED, Json(AckResponse::ok())))
}

// =============================================================================
// Reservation Lifecycle
// =============================================================================

/// POST /v1/reservations
///
/// Create a reservation in pending state. Fails with 409 when the window
/// overlaps an existing active reservation of the provider.
pub async fn create_reservation(
    State(state): State<AppState>,
    Json(request): Json<CreateReservationRequest>,
) -> Result<(StatusCode, Json<Reservation>), AppError> {
    let new_reservation = request.into_new_reservation().map_err(AppError::BadRequest)?;
    let reservation = state.ledger.create(new_reservation).await?;
    Ok((StatusCode::CREATED, Json(reservation)))
}

/// POST /v1/reservations/{reservation_id}/confirm
///
/// Confirm a pending reservation on behalf of its provider.
pub async fn confirm_reservation(
    State(state): State<AppState>,
    Path(reservation_id): Path<Uuid>,
    Json(request): Json<ConfirmReservationRequest>,
) -> HandlerResult<Reservation> {
    let reservation = state
        .ledger
        .confirm(
            ProviderId::new(request.provider_id),
            ReservationId(reservation_id),
        )
        .await?;
    Ok(Json(reservation))
}

/// POST /v1/reservations/{reservation_id}/cancel
///
/// Cancel a reservation on behalf of either party.
pub async fn cancel_reservation(
    State(state): State<AppState>,
    Path(reservation_id): Path<Uuid>,
    Json(request): Json<CancelReservationRequest>,
) -> HandlerResult<Reservation> {
    let reservation = state
        .ledger
        .cancel(
            request.actor_id,
            request.actor_role,
            ReservationId(reservation_id),
            request.reason,
        )
        .await?;
    Ok(Json(reservation))
}

/// GET /v1/requesters/{requester_id}/reservations
///
/// List a requester's reservations, ordered by window start ascending.
pub async fn list_requester_reservations(
    State(state): State<AppState>,
    Path(requester_id): Path<i64>,
    Query(page): Query<PageQuery>,
) -> HandlerResult<ReservationListResponse> {
    let reservations = state
        .ledger
        .find_for_requester(RequesterId::new(requester_id), page.into_page_request())
        .await?;
    let total = reservations.len();
    Ok(Json(ReservationListResponse {
        reservations,
        total,
    }))
}

/// GET /v1/providers/{provider_id}/reservations
///
/// List a provider's reservations, ordered by window start ascending.
pub async fn list_provider_reservations(
    State(state): State<AppState>,
    Path(provider_id): Path<i64>,
    Query(page): Query<PageQuery>,
) -> HandlerResult<ReservationListResponse> {
    let reservations = state
        .ledger
        .find_for_provider(ProviderId::new(provider_id), page.into_page_request())
        .await?;
    let total = reservations.len();
    Ok(Json(ReservationListResponse {
        reservations,
        total,
    }))
}

// =============================================================================
// Notifications
// =============================================================================

/// GET /v1/notifications/{role}/{recipient_id}
///
/// List notifications for one recipient, newest first.
pub async fn list_notifications(
    State(state): State<AppState>,
    Path((role, recipient_id)): Path<(String, i64)>,
) -> HandlerResult<NotificationListResponse> {
    let role = ActorRole::from_str(&role).map_err(AppError::BadRequest)?;
    let notifications = state.ledger.notifications_for(recipient_id, role).await?;
    let total = notifications.len();
    Ok(Json(NotificationListResponse {
        notifications,
        total,
    }))
}

/// POST /v1/notifications/{notification_id}/read
///
/// Mark one notification as read.
pub async fn mark_notification_read(
    State(state): State<AppState>,
    Path(notification_id): Path<Uuid>,
) -> HandlerResult<AckResponse> {
    state
        .ledger
        .mark_notification_read(NotificationId(notification_id))
        .await?;
    Ok(Json(AckResponse::ok()))
}
