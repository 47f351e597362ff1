//! Repository traits for the marketplace core.
//!
//! The core is agnostic to the storage backend; everything it needs from
//! persistence is expressed through the traits below. Implementations must
//! be `Send + Sync` to work with async Rust.

pub mod error;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

use crate::api::{
    ActorRole, Notification, NotificationId, Provider, ProviderCategory, ProviderId, Reservation,
    ReservationId, ReservationState, RequesterId,
};
use crate::db::models::PageRequest;

/// Repository trait for reservation records.
///
/// The reservation ledger is the only writer of these records; the
/// no-overlap invariant is enforced above this trait, so implementations
/// only provide storage and the queries the ledger needs.
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Insert a new reservation record.
    async fn insert_reservation(&self, reservation: &Reservation) -> RepositoryResult<()>;

    /// Persist a reservation state transition as a compare-and-swap: the
    /// write takes effect only while the stored record is still in
    /// `expected` state. Returns `false` when a concurrent transition got
    /// there first, so terminal records are never overwritten.
    async fn update_reservation(
        &self,
        reservation: &Reservation,
        expected: ReservationState,
    ) -> RepositoryResult<bool>;

    /// Fetch a single reservation by id.
    async fn fetch_reservation(&self, id: ReservationId) -> RepositoryResult<Reservation>;

    /// Fetch all non-terminal (`pending`/`confirmed`) reservations for a
    /// provider. This is the working set for the overlap check.
    async fn fetch_active_for_provider(
        &self,
        provider_id: ProviderId,
    ) -> RepositoryResult<Vec<Reservation>>;

    /// Fetch a page of a requester's reservations, ordered by window start
    /// ascending.
    async fn fetch_page_for_requester(
        &self,
        requester_id: RequesterId,
        page: PageRequest,
    ) -> RepositoryResult<Vec<Reservation>>;

    /// Fetch a page of a provider's reservations, ordered by window start
    /// ascending.
    async fn fetch_page_for_provider(
        &self,
        provider_id: ProviderId,
        page: PageRequest,
    ) -> RepositoryResult<Vec<Reservation>>;

    /// Fetch confirmed reservations whose window ended before `now`.
    /// Feeds the completion sweep.
    async fn fetch_confirmed_ended_before(
        &self,
        now: DateTime<Utc>,
    ) -> RepositoryResult<Vec<Reservation>>;
}

/// Read-only access to provider records, per category.
///
/// The core never mutates provider data; `upsert_provider` exists for
/// seeding and tests only.
#[async_trait]
pub trait ProviderDirectory: Send + Sync {
    /// Fetch one provider. The category narrows the lookup so a walker id
    /// can never resolve to a clinic.
    async fn fetch_provider(
        &self,
        category: ProviderCategory,
        id: ProviderId,
    ) -> RepositoryResult<Provider>;

    /// List all providers of a category.
    async fn list_providers(&self, category: ProviderCategory)
        -> RepositoryResult<Vec<Provider>>;

    /// Insert or replace a provider record (seeding/administration).
    async fn upsert_provider(&self, provider: &Provider) -> RepositoryResult<()>;
}

/// Storage for notifications emitted by the ledger.
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Append a notification. Fire-and-forget from the ledger's point of
    /// view; delivery is the dispatcher's concern.
    async fn insert_notification(&self, notification: &Notification) -> RepositoryResult<()>;

    /// Fetch notifications for a recipient, newest first.
    async fn fetch_notifications_for(
        &self,
        recipient_id: i64,
        role: ActorRole,
    ) -> RepositoryResult<Vec<Notification>>;

    /// Mark a notification as read.
    async fn mark_notification_read(&self, id: NotificationId) -> RepositoryResult<()>;
}

/// Combined repository trait for components that need the full surface.
#[async_trait]
pub trait FullRepository:
    ReservationRepository + ProviderDirectory + NotificationRepository + std::fmt::Debug
{
    /// Verify the backend is reachable.
    async fn health_check(&self) -> RepositoryResult<bool>;
}
