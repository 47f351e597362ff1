//! Data Transfer Objects for the HTTP API.
//!
//! Request bodies carry reservation windows as separate `window_start` /
//! `window_end` instants; conversion into [`TimeRange`] is where inverted
//! or empty windows are rejected. Response bodies reuse the core types,
//! which already derive Serialize.

use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

// Re-export core types that appear in responses as-is.
pub use crate::api::{
    ActorRole, Notification, PetId, PetSpecies, Provider, ProviderCategory, ProviderId,
    Reservation, RequesterId, ServiceId, TimeRange,
};
pub use crate::matching::ProviderQuery;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the API
    pub version: String,
    /// Database connectivity status
    pub database: String,
}

/// Request body for matching providers against a booking query.
///
/// Every field is optional; an unset field places no constraint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchProvidersRequest {
    #[serde(default)]
    pub locality: Option<String>,
    #[serde(default)]
    pub species: Option<PetSpecies>,
    #[serde(default)]
    pub category: Option<ProviderCategory>,
    #[serde(default)]
    pub day: Option<Weekday>,
    #[serde(default)]
    pub window_start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub window_end: Option<DateTime<Utc>>,
}

impl MatchProvidersRequest {
    /// Convert into a domain query, validating the optional window.
    pub fn into_query(self) -> Result<ProviderQuery, String> {
        let window = match (self.window_start, self.window_end) {
            (None, None) => None,
            (Some(start), Some(end)) => Some(
                TimeRange::new(start, end)
                    .ok_or_else(|| "window_start must be before window_end".to_string())?,
            ),
            _ => {
                return Err(
                    "window_start and window_end must be given together".to_string(),
                )
            }
        };
        Ok(ProviderQuery {
            locality: self.locality,
            species: self.species,
            category: self.category,
            day: self.day,
            window,
        })
    }
}

/// Response for a provider match query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchProvidersResponse {
    pub providers: Vec<Provider>,
    pub total: usize,
}

/// Request body for creating a reservation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReservationRequest {
    pub provider_id: i64,
    pub provider_category: ProviderCategory,
    pub requester_id: i64,
    pub pet_id: i64,
    pub service_id: i64,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
}

impl CreateReservationRequest {
    /// Convert into the ledger's input type, validating the window.
    pub fn into_new_reservation(self) -> Result<crate::api::NewReservation, String> {
        let window = TimeRange::new(self.window_start, self.window_end)
            .ok_or_else(|| "window_start must be before window_end".to_string())?;
        Ok(crate::api::NewReservation {
            provider_id: ProviderId::new(self.provider_id),
            provider_category: self.provider_category,
            requester_id: RequesterId::new(self.requester_id),
            pet_id: PetId::new(self.pet_id),
            service_id: ServiceId::new(self.service_id),
            window,
        })
    }
}

/// Request body for confirming a pending reservation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmReservationRequest {
    /// Provider the confirmation is acting for
    pub provider_id: i64,
}

/// Request body for cancelling a reservation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelReservationRequest {
    /// Acting party's identifier
    pub actor_id: i64,
    /// Which side of the reservation the actor is on
    pub actor_role: ActorRole,
    /// Optional free-text reason, stored on the reservation
    #[serde(default)]
    pub reason: Option<String>,
}

/// Paged list of reservations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationListResponse {
    pub reservations: Vec<Reservation>,
    pub total: usize,
}

/// Notifications for one recipient, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationListResponse {
    pub notifications: Vec<Notification>,
    pub total: usize,
}

/// Query parameters for paged reservation listings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PageQuery {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
}

impl PageQuery {
    pub fn into_page_request(self) -> crate::db::models::PageRequest {
        let defaults = crate::db::models::PageRequest::default();
        crate::db::models::PageRequest::new(
            self.page.unwrap_or(defaults.page),
            self.limit.unwrap_or(defaults.limit),
        )
    }
}

/// Generic acknowledgement body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckResponse {
    pub status: String,
}

impl AckResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_match_request_requires_paired_window() {
        let req = MatchProvidersRequest {
            window_start: Some(Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap()),
            ..Default::default()
        };
        assert!(req.into_query().is_err());
    }

    #[test]
    fn test_match_request_rejects_inverted_window() {
        let req = MatchProvidersRequest {
            window_start: Some(Utc.with_ymd_and_hms(2025, 6, 2, 12, 0, 0).unwrap()),
            window_end: Some(Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap()),
            ..Default::default()
        };
        assert!(req.into_query().is_err());
    }

    #[test]
    fn test_empty_match_request_is_unconstrained() {
        let query = MatchProvidersRequest::default().into_query().unwrap();
        assert!(query.is_unconstrained());
    }

    #[test]
    fn test_create_request_conversion() {
        let req = CreateReservationRequest {
            provider_id: 1,
            provider_category: ProviderCategory::Walker,
            requester_id: 100,
            pet_id: 7,
            service_id: 10,
            window_start: Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap(),
            window_end: Utc.with_ymd_and_hms(2025, 6, 2, 10, 0, 0).unwrap(),
        };
        let new = req.into_new_reservation().unwrap();
        assert_eq!(new.provider_id.value(), 1);
        assert_eq!(new.window.duration(), chrono::Duration::minutes(60));
    }

    #[test]
    fn test_page_query_defaults() {
        let page = PageQuery::default().into_page_request();
        assert_eq!(page.page, 0);
        assert_eq!(page.limit, 20);
    }
}
