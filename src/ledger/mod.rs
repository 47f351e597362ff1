//! Reservation ledger: lifecycle state machine and conflict detection.
//!
//! The ledger is the only writer of reservation records. It owns the two
//! invariants of the system:
//!
//! - for any provider, the windows of reservations in `pending` or
//!   `confirmed` state are pairwise non-overlapping;
//! - state transitions follow `pending -> confirmed -> completed`, with
//!   cancellation allowed from `pending` or `confirmed`, and terminal
//!   states immutable.
//!
//! The overlap check plus insert in [`ReservationLedger::create`] is
//! serialized per provider through a keyed async mutex: concurrent creates
//! against the same provider queue up, creates against different providers
//! proceed independently. Lock acquisition is bounded; expiry surfaces as
//! [`LedgerError::Busy`] instead of blocking indefinitely.
//!
//! All other transitions are compare-and-swap writes: the repository only
//! applies an update while the stored record is still in the state the
//! transition read. A racing transition loses the swap and surfaces as
//! [`LedgerError::InvalidStateTransition`], so a record can never leave a
//! terminal state even when two parties act at once.
//!
//! Collaborators (storage, provider directory, notification store) are
//! injected at construction; the ledger never reaches into ambient state.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, warn};

use crate::api::{
    ActorRole, NewReservation, Notification, NotificationEvent, NotificationId, Provider,
    Reservation, ReservationId, ReservationState, RequesterId,
};
use crate::api::ProviderId;
use crate::db::models::PageRequest;
use crate::db::repository::{FullRepository, RepositoryError};
use crate::matching::{self, ProviderQuery};

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Domain errors returned by the ledger.
///
/// Every variant is a tagged, caller-recoverable condition; the HTTP layer
/// maps them to status codes. Only [`LedgerError::Repository`] wraps an
/// unexpected infrastructure failure.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Malformed input (missing field, inverted window, bad identifier).
    ///
    /// Window validity is enforced at construction ([`TimeRange::new`] in
    /// the request DTOs), so current call paths never produce this variant;
    /// it is kept for ledger-level input checks.
    ///
    /// [`TimeRange::new`]: crate::models::TimeRange::new
    #[error("Validation error: {0}")]
    Validation(String),

    /// Referenced provider, reservation or service does not exist (or does
    /// not belong to the acting party).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Requested window falls outside every declared provider slot.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The window overlaps an existing non-terminal reservation.
    #[error("Slot conflict with reservation {conflicting}")]
    SlotConflict { conflicting: ReservationId },

    /// Transition attempted from a state that does not permit it.
    #[error("Invalid state transition: cannot {action} a {state} reservation")]
    InvalidStateTransition {
        state: ReservationState,
        action: &'static str,
    },

    /// Per-provider booking lock contention exceeded its wait bound.
    #[error("Provider is busy handling another booking; retry later")]
    Busy,

    /// Underlying storage failure.
    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for LedgerError {
    fn from(err: RepositoryError) -> Self {
        if err.is_not_found() {
            LedgerError::NotFound(err.to_string())
        } else {
            LedgerError::Repository(err)
        }
    }
}

/// Default bound on waiting for a provider's booking lock.
const DEFAULT_LOCK_WAIT: Duration = Duration::from_secs(5);

/// Reservation lifecycle engine.
pub struct ReservationLedger {
    repository: Arc<dyn FullRepository>,
    /// One async mutex per provider, created lazily. The outer map lock is
    /// a short synchronous critical section and is never held across await.
    provider_locks: parking_lot::Mutex<HashMap<ProviderId, Arc<AsyncMutex<()>>>>,
    lock_wait: Duration,
}

impl ReservationLedger {
    /// Create a ledger with the default lock wait bound.
    pub fn new(repository: Arc<dyn FullRepository>) -> Self {
        Self::with_lock_wait(repository, DEFAULT_LOCK_WAIT)
    }

    /// Create a ledger with an explicit lock wait bound (tests use short
    /// bounds to exercise [`LedgerError::Busy`]).
    pub fn with_lock_wait(repository: Arc<dyn FullRepository>, lock_wait: Duration) -> Self {
        Self {
            repository,
            provider_locks: parking_lot::Mutex::new(HashMap::new()),
            lock_wait,
        }
    }

    fn booking_lock(&self, provider_id: ProviderId) -> Arc<AsyncMutex<()>> {
        let mut locks = self.provider_locks.lock();
        // Drop entries no booking holds any more, so the map stays bounded
        // by the number of in-flight creates rather than growing with every
        // provider ever booked.
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        Arc::clone(locks.entry(provider_id).or_default())
    }

    #[cfg(test)]
    fn tracked_locks(&self) -> usize {
        self.provider_locks.lock().len()
    }

    /// Match providers of the directory against a booking query.
    ///
    /// Candidates come from the directory per category; when the query does
    /// not constrain the category, all categories are considered. The
    /// filter itself is pure and order-preserving (see [`crate::matching`]).
    pub async fn match_providers(&self, query: &ProviderQuery) -> LedgerResult<Vec<Provider>> {
        let categories = match query.category {
            Some(category) => vec![category],
            None => vec![
                crate::api::ProviderCategory::Veterinary,
                crate::api::ProviderCategory::Walker,
                crate::api::ProviderCategory::Caregiver,
            ],
        };

        let mut candidates = Vec::new();
        for category in categories {
            candidates.extend(self.repository.list_providers(category).await?);
        }
        Ok(matching::match_providers(&candidates, query))
    }

    /// Create a reservation in `pending` state.
    ///
    /// Validates the window against the provider's declared slots, then
    /// performs the overlap check and insert as one per-provider critical
    /// section, and finally notifies the provider.
    pub async fn create(&self, request: NewReservation) -> LedgerResult<Reservation> {
        let provider = self
            .repository
            .fetch_provider(request.provider_category, request.provider_id)
            .await?;

        if provider.offering(request.service_id).is_none() {
            return Err(LedgerError::NotFound(format!(
                "Provider {} does not offer service {}",
                provider.id, request.service_id
            )));
        }

        if provider.slot_covering(&request.window).is_none() {
            return Err(LedgerError::ServiceUnavailable(format!(
                "Requested window is outside provider {}'s declared availability",
                provider.id
            )));
        }

        // Check-and-insert must be atomic per provider: acquire this
        // provider's booking lock with a bounded wait.
        let lock = self.booking_lock(provider.id);
        let _guard = tokio::time::timeout(self.lock_wait, lock.lock_owned())
            .await
            .map_err(|_| LedgerError::Busy)?;

        let active = self
            .repository
            .fetch_active_for_provider(provider.id)
            .await?;
        if let Some(existing) = active.iter().find(|r| r.window.overlaps(&request.window)) {
            debug!(
                provider = %provider.id,
                conflicting = %existing.id,
                "rejected overlapping reservation window"
            );
            return Err(LedgerError::SlotConflict {
                conflicting: existing.id,
            });
        }

        let now = Utc::now();
        let reservation = Reservation {
            id: ReservationId::generate(),
            provider_id: request.provider_id,
            provider_category: request.provider_category,
            requester_id: request.requester_id,
            pet_id: request.pet_id,
            service_id: request.service_id,
            window: request.window,
            state: ReservationState::Pending,
            cancellation_reason: None,
            created_at: now,
            updated_at: now,
        };
        self.repository.insert_reservation(&reservation).await?;
        drop(_guard);

        info!(
            reservation = %reservation.id,
            provider = %reservation.provider_id,
            requester = %reservation.requester_id,
            "reservation created"
        );
        self.notify(
            reservation.provider_id.value(),
            ActorRole::Provider,
            NotificationEvent::ReservationRequested,
            reservation.id,
        )
        .await;

        Ok(reservation)
    }

    /// Confirm a pending reservation on behalf of its provider.
    pub async fn confirm(
        &self,
        provider_id: ProviderId,
        reservation_id: ReservationId,
    ) -> LedgerResult<Reservation> {
        let mut reservation = self.repository.fetch_reservation(reservation_id).await?;
        if reservation.provider_id != provider_id {
            return Err(LedgerError::NotFound(format!(
                "Reservation {} does not belong to provider {}",
                reservation_id, provider_id
            )));
        }
        if reservation.state != ReservationState::Pending {
            return Err(LedgerError::InvalidStateTransition {
                state: reservation.state,
                action: "confirm",
            });
        }

        reservation.state = ReservationState::Confirmed;
        reservation.updated_at = Utc::now();
        if !self
            .repository
            .update_reservation(&reservation, ReservationState::Pending)
            .await?
        {
            // Another transition won the swap; report the state it left.
            let current = self.repository.fetch_reservation(reservation_id).await?;
            return Err(LedgerError::InvalidStateTransition {
                state: current.state,
                action: "confirm",
            });
        }

        info!(reservation = %reservation.id, "reservation confirmed");
        self.notify(
            reservation.requester_id.value(),
            ActorRole::Requester,
            NotificationEvent::ReservationConfirmed,
            reservation.id,
        )
        .await;

        Ok(reservation)
    }

    /// Cancel a reservation on behalf of either party.
    ///
    /// Legal from `pending` or `confirmed`; the counterpart of the acting
    /// party is notified. Cancelling an already-terminal reservation fails
    /// with [`LedgerError::InvalidStateTransition`].
    pub async fn cancel(
        &self,
        actor_id: i64,
        actor_role: ActorRole,
        reservation_id: ReservationId,
        reason: Option<String>,
    ) -> LedgerResult<Reservation> {
        let mut reservation = self.repository.fetch_reservation(reservation_id).await?;

        let is_party = match actor_role {
            ActorRole::Requester => reservation.requester_id.value() == actor_id,
            ActorRole::Provider => reservation.provider_id.value() == actor_id,
        };
        if !is_party {
            return Err(LedgerError::NotFound(format!(
                "Reservation {} does not involve {} {}",
                reservation_id,
                match actor_role {
                    ActorRole::Requester => "requester",
                    ActorRole::Provider => "provider",
                },
                actor_id
            )));
        }

        if reservation.state.is_terminal() {
            return Err(LedgerError::InvalidStateTransition {
                state: reservation.state,
                action: "cancel",
            });
        }

        let prior = reservation.state;
        reservation.state = ReservationState::Cancelled;
        reservation.cancellation_reason = reason;
        reservation.updated_at = Utc::now();
        if !self.repository.update_reservation(&reservation, prior).await? {
            let current = self.repository.fetch_reservation(reservation_id).await?;
            return Err(LedgerError::InvalidStateTransition {
                state: current.state,
                action: "cancel",
            });
        }

        info!(reservation = %reservation.id, role = ?actor_role, "reservation cancelled");
        let counterpart = actor_role.counterpart();
        let recipient_id = match counterpart {
            ActorRole::Requester => reservation.requester_id.value(),
            ActorRole::Provider => reservation.provider_id.value(),
        };
        self.notify(
            recipient_id,
            counterpart,
            NotificationEvent::ReservationCancelled,
            reservation.id,
        )
        .await;

        Ok(reservation)
    }

    /// Sweep confirmed reservations whose window has fully elapsed into
    /// `completed`. Driven by a periodic tick; a reservation cancelled
    /// between the query and the write loses nothing, the swap just skips
    /// it.
    ///
    /// Returns the number of reservations completed.
    pub async fn complete_elapsed(&self, now: DateTime<Utc>) -> LedgerResult<usize> {
        let elapsed = self.repository.fetch_confirmed_ended_before(now).await?;
        let mut completed = 0;
        for mut reservation in elapsed {
            reservation.state = ReservationState::Completed;
            reservation.updated_at = now;
            if !self
                .repository
                .update_reservation(&reservation, ReservationState::Confirmed)
                .await?
            {
                continue;
            }
            completed += 1;

            self.notify(
                reservation.requester_id.value(),
                ActorRole::Requester,
                NotificationEvent::ReservationCompleted,
                reservation.id,
            )
            .await;
        }
        if completed > 0 {
            info!(count = completed, "completed elapsed reservations");
        }
        Ok(completed)
    }

    /// A requester's reservations, ordered by window start ascending.
    pub async fn find_for_requester(
        &self,
        requester_id: RequesterId,
        page: PageRequest,
    ) -> LedgerResult<Vec<Reservation>> {
        Ok(self
            .repository
            .fetch_page_for_requester(requester_id, page)
            .await?)
    }

    /// A provider's reservations, ordered by window start ascending.
    pub async fn find_for_provider(
        &self,
        provider_id: ProviderId,
        page: PageRequest,
    ) -> LedgerResult<Vec<Reservation>> {
        Ok(self
            .repository
            .fetch_page_for_provider(provider_id, page)
            .await?)
    }

    /// Notifications for a recipient, newest first.
    pub async fn notifications_for(
        &self,
        recipient_id: i64,
        role: ActorRole,
    ) -> LedgerResult<Vec<Notification>> {
        Ok(self
            .repository
            .fetch_notifications_for(recipient_id, role)
            .await?)
    }

    /// Mark one notification as read.
    pub async fn mark_notification_read(&self, id: NotificationId) -> LedgerResult<()> {
        Ok(self.repository.mark_notification_read(id).await?)
    }

    /// Record a notification for one party.
    ///
    /// Fire-and-forget: a failure to record is logged but never fails the
    /// transition that produced it.
    async fn notify(
        &self,
        recipient_id: i64,
        recipient_role: ActorRole,
        event: NotificationEvent,
        reservation_id: ReservationId,
    ) {
        let notification = Notification {
            id: NotificationId::generate(),
            recipient_id,
            recipient_role,
            event,
            reservation_id,
            read: false,
            created_at: Utc::now(),
        };
        if let Err(err) = self.repository.insert_notification(&notification).await {
            warn!(
                reservation = %reservation_id,
                event = event.as_str(),
                error = %err,
                "failed to record notification"
            );
        }
    }
}
