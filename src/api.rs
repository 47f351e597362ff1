//! Public API surface for the marketplace core.
//!
//! This file consolidates the domain types shared by the matching engine,
//! the reservation ledger, the repository layer and the HTTP API. All types
//! derive Serialize/Deserialize for JSON serialization.

use std::collections::HashSet;

use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use crate::models::{TimeRange, WeeklySlot};

crate::define_id_type!(i64, ProviderId);
crate::define_id_type!(i64, RequesterId);
crate::define_id_type!(i64, PetId);
crate::define_id_type!(i64, ServiceId);

/// Reservation identifier (server-assigned UUID).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ReservationId(pub Uuid);

impl ReservationId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for ReservationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Notification identifier (server-assigned UUID).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NotificationId(pub Uuid);

impl NotificationId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for NotificationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Service category a provider belongs to.
///
/// Matching dispatches on this discriminant; there is no runtime type
/// inspection anywhere in the core.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderCategory {
    Veterinary,
    Walker,
    Caregiver,
}

impl std::fmt::Display for ProviderCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Veterinary => "veterinary",
            Self::Walker => "walker",
            Self::Caregiver => "caregiver",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for ProviderCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "veterinary" | "vet" => Ok(Self::Veterinary),
            "walker" => Ok(Self::Walker),
            "caregiver" => Ok(Self::Caregiver),
            _ => Err(format!("Unknown provider category: {}", s)),
        }
    }
}

/// Pet species accepted by a provider.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PetSpecies {
    Dog,
    Cat,
    Bird,
    Rabbit,
    Other,
}

/// Locality plus city, the granularity the matching engine filters on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub locality: String,
    pub city: String,
}

impl Location {
    pub fn new(locality: impl Into<String>, city: impl Into<String>) -> Self {
        Self {
            locality: locality.into(),
            city: city.into(),
        }
    }
}

/// One entry on a provider's service menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceOffering {
    pub id: ServiceId,
    pub category: ProviderCategory,
    /// Price in cents to avoid float money arithmetic.
    pub price_cents: i64,
    /// Expected duration of one booking, in minutes.
    pub duration_min: u32,
}

/// Category-specific provider fields.
///
/// The matching engine and the ledger only ever touch the common capability
/// set on [`Provider`]; these payloads exist for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProviderDetails {
    Veterinary {
        clinic_name: String,
        emergency_service: bool,
    },
    Walker {
        max_dogs_per_walk: u32,
    },
    Caregiver {
        hosts_at_home: bool,
    },
}

impl ProviderDetails {
    pub fn category(&self) -> ProviderCategory {
        match self {
            Self::Veterinary { .. } => ProviderCategory::Veterinary,
            Self::Walker { .. } => ProviderCategory::Walker,
            Self::Caregiver { .. } => ProviderCategory::Caregiver,
        }
    }
}

/// A service provider with the common capability set used for matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub id: ProviderId,
    pub name: String,
    pub location: Location,
    /// Species this provider accepts. Empty means the provider declared
    /// nothing yet and matches no species-constrained query.
    pub accepted_species: HashSet<PetSpecies>,
    /// Weekdays the provider declared as working days.
    pub available_days: HashSet<Weekday>,
    /// Declared recurring availability, ordered as provided.
    pub slots: Vec<WeeklySlot>,
    /// Service menu.
    pub services: Vec<ServiceOffering>,
    /// Category-specific payload; also carries the category discriminant.
    pub details: ProviderDetails,
}

impl Provider {
    pub fn category(&self) -> ProviderCategory {
        self.details.category()
    }

    /// Look up a service on this provider's menu.
    pub fn offering(&self, service_id: ServiceId) -> Option<&ServiceOffering> {
        self.services.iter().find(|s| s.id == service_id)
    }

    /// True when the provider declares the given weekday as available.
    pub fn declares_day(&self, day: Weekday) -> bool {
        self.available_days.contains(&day)
    }

    /// First declared slot that fully covers the window, if any.
    pub fn slot_covering(&self, window: &TimeRange) -> Option<&WeeklySlot> {
        self.slots.iter().find(|s| s.covers_window(window))
    }
}

/// Reservation lifecycle state.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationState {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl ReservationState {
    /// Terminal states permit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Completed)
    }
}

impl std::fmt::Display for ReservationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        };
        write!(f, "{}", s)
    }
}

/// A booked (or requested) reservation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,
    pub provider_id: ProviderId,
    pub provider_category: ProviderCategory,
    pub requester_id: RequesterId,
    pub pet_id: PetId,
    pub service_id: ServiceId,
    pub window: TimeRange,
    pub state: ReservationState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    /// True when the reservation still holds its provider's time slot.
    pub fn is_active(&self) -> bool {
        !self.state.is_terminal()
    }
}

/// Input for creating a reservation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReservation {
    pub provider_id: ProviderId,
    pub provider_category: ProviderCategory,
    pub requester_id: RequesterId,
    pub pet_id: PetId,
    pub service_id: ServiceId,
    pub window: TimeRange,
}

/// Which side of a reservation an actor is on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Requester,
    Provider,
}

impl ActorRole {
    pub fn counterpart(&self) -> Self {
        match self {
            Self::Requester => Self::Provider,
            Self::Provider => Self::Requester,
        }
    }
}

impl std::str::FromStr for ActorRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "requester" | "guest" => Ok(Self::Requester),
            "provider" => Ok(Self::Provider),
            _ => Err(format!("Unknown actor role: {}", s)),
        }
    }
}

/// Events the ledger emits on reservation state transitions.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationEvent {
    ReservationRequested,
    ReservationConfirmed,
    ReservationCancelled,
    ReservationCompleted,
}

impl NotificationEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReservationRequested => "reservation_requested",
            Self::ReservationConfirmed => "reservation_confirmed",
            Self::ReservationCancelled => "reservation_cancelled",
            Self::ReservationCompleted => "reservation_completed",
        }
    }
}

/// A notification produced by the ledger for one party of a reservation.
///
/// The core creates these on every state transition and only ever mutates
/// the `read` flag afterwards; retention is an external concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub recipient_id: i64,
    pub recipient_role: ActorRole,
    pub event: NotificationEvent,
    pub reservation_id: ReservationId,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
#[path = "api_tests.rs"]
mod api_tests;
