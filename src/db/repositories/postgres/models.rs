//! Row types and conversions for the Postgres backend.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{notifications, providers, reservations};
use crate::api::{
    ActorRole, Notification, NotificationEvent, NotificationId, PetId, Provider, ProviderCategory,
    ProviderId, Reservation, ReservationId, ReservationState, RequesterId, ServiceId, TimeRange,
};
use crate::db::repository::{RepositoryError, RepositoryResult};

pub(super) fn state_to_str(state: ReservationState) -> &'static str {
    match state {
        ReservationState::Pending => "pending",
        ReservationState::Confirmed => "confirmed",
        ReservationState::Cancelled => "cancelled",
        ReservationState::Completed => "completed",
    }
}

pub(super) fn state_from_str(s: &str) -> RepositoryResult<ReservationState> {
    match s {
        "pending" => Ok(ReservationState::Pending),
        "confirmed" => Ok(ReservationState::Confirmed),
        "cancelled" => Ok(ReservationState::Cancelled),
        "completed" => Ok(ReservationState::Completed),
        other => Err(RepositoryError::validation(format!(
            "Unknown reservation state in storage: {}",
            other
        ))),
    }
}

pub(super) fn role_to_str(role: ActorRole) -> &'static str {
    match role {
        ActorRole::Requester => "requester",
        ActorRole::Provider => "provider",
    }
}

pub(super) fn role_from_str(s: &str) -> RepositoryResult<ActorRole> {
    s.parse()
        .map_err(|e: String| RepositoryError::validation(e))
}

pub(super) fn event_from_str(s: &str) -> RepositoryResult<NotificationEvent> {
    match s {
        "reservation_requested" => Ok(NotificationEvent::ReservationRequested),
        "reservation_confirmed" => Ok(NotificationEvent::ReservationConfirmed),
        "reservation_cancelled" => Ok(NotificationEvent::ReservationCancelled),
        "reservation_completed" => Ok(NotificationEvent::ReservationCompleted),
        other => Err(RepositoryError::validation(format!(
            "Unknown notification event in storage: {}",
            other
        ))),
    }
}

#[derive(Debug, Queryable, Insertable, AsChangeset)]
#[diesel(table_name = providers)]
pub(super) struct ProviderRow {
    pub category: String,
    pub id: i64,
    pub name: String,
    pub locality: String,
    pub city: String,
    pub payload: serde_json::Value,
}

impl ProviderRow {
    pub fn from_provider(provider: &Provider) -> RepositoryResult<Self> {
        Ok(Self {
            category: provider.category().to_string(),
            id: provider.id.value(),
            name: provider.name.clone(),
            locality: provider.location.locality.clone(),
            city: provider.location.city.clone(),
            payload: serde_json::to_value(provider).map_err(|e| {
                RepositoryError::validation(format!("Failed to serialize provider: {}", e))
            })?,
        })
    }

    pub fn into_provider(self) -> RepositoryResult<Provider> {
        serde_json::from_value(self.payload).map_err(|e| {
            RepositoryError::validation(format!("Corrupt provider payload: {}", e))
        })
    }
}

#[derive(Debug, Queryable, Insertable, AsChangeset)]
#[diesel(table_name = reservations)]
pub(super) struct ReservationRow {
    pub id: Uuid,
    pub provider_id: i64,
    pub provider_category: String,
    pub requester_id: i64,
    pub pet_id: i64,
    pub service_id: i64,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub state: String,
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReservationRow {
    pub fn from_reservation(reservation: &Reservation) -> Self {
        Self {
            id: reservation.id.0,
            provider_id: reservation.provider_id.value(),
            provider_category: reservation.provider_category.to_string(),
            requester_id: reservation.requester_id.value(),
            pet_id: reservation.pet_id.value(),
            service_id: reservation.service_id.value(),
            window_start: reservation.window.start(),
            window_end: reservation.window.end(),
            state: state_to_str(reservation.state).to_string(),
            cancellation_reason: reservation.cancellation_reason.clone(),
            created_at: reservation.created_at,
            updated_at: reservation.updated_at,
        }
    }

    pub fn into_reservation(self) -> RepositoryResult<Reservation> {
        let window = TimeRange::new(self.window_start, self.window_end).ok_or_else(|| {
            RepositoryError::validation("Stored reservation window is inverted")
        })?;
        Ok(Reservation {
            id: ReservationId(self.id),
            provider_id: ProviderId::new(self.provider_id),
            provider_category: self
                .provider_category
                .parse::<ProviderCategory>()
                .map_err(RepositoryError::validation)?,
            requester_id: RequesterId::new(self.requester_id),
            pet_id: PetId::new(self.pet_id),
            service_id: ServiceId::new(self.service_id),
            window,
            state: state_from_str(&self.state)?,
            cancellation_reason: self.cancellation_reason,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Queryable, Insertable)]
#[diesel(table_name = notifications)]
pub(super) struct NotificationRow {
    pub id: Uuid,
    pub recipient_id: i64,
    pub recipient_role: String,
    pub event: String,
    pub reservation_id: Uuid,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl NotificationRow {
    pub fn from_notification(notification: &Notification) -> Self {
        Self {
            id: notification.id.0,
            recipient_id: notification.recipient_id,
            recipient_role: role_to_str(notification.recipient_role).to_string(),
            event: notification.event.as_str().to_string(),
            reservation_id: notification.reservation_id.0,
            read: notification.read,
            created_at: notification.created_at,
        }
    }

    pub fn into_notification(self) -> RepositoryResult<Notification> {
        Ok(Notification {
            id: NotificationId(self.id),
            recipient_id: self.recipient_id,
            recipient_role: role_from_str(&self.recipient_role)?,
            event: event_from_str(&self.event)?,
            reservation_id: ReservationId(self.reservation_id),
            read: self.read,
            created_at: self.created_at,
        })
    }
}
