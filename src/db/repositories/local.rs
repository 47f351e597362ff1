//! In-memory repository implementation.
//!
//! Backs the default `local-repo` feature: unit tests, local development
//! and the integration test suite all run against this implementation.
//! All state lives in `parking_lot` locks; guards are never held across an
//! await point.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::api::{
    ActorRole, Notification, NotificationId, Provider, ProviderCategory, ProviderId, Reservation,
    ReservationId, ReservationState, RequesterId,
};
use crate::db::models::PageRequest;
use crate::db::repository::{
    ErrorContext, FullRepository, NotificationRepository, ProviderDirectory, RepositoryError,
    RepositoryResult, ReservationRepository,
};

/// In-memory repository for local development and tests.
#[derive(Debug, Default)]
pub struct LocalRepository {
    reservations: RwLock<HashMap<ReservationId, Reservation>>,
    providers: RwLock<HashMap<(ProviderCategory, ProviderId), Provider>>,
    notifications: RwLock<Vec<Notification>>,
}

impl LocalRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted_by_window_start(mut reservations: Vec<Reservation>, page: PageRequest) -> Vec<Reservation> {
        reservations.sort_by_key(|r| r.window.start());
        reservations
            .into_iter()
            .skip(page.offset())
            .take(page.limit as usize)
            .collect()
    }
}

#[async_trait]
impl ReservationRepository for LocalRepository {
    async fn insert_reservation(&self, reservation: &Reservation) -> RepositoryResult<()> {
        let mut reservations = self.reservations.write();
        if reservations.contains_key(&reservation.id) {
            return Err(RepositoryError::query_with_context(
                "Duplicate reservation id",
                ErrorContext::new("insert_reservation")
                    .with_entity("reservation")
                    .with_entity_id(reservation.id),
            ));
        }
        reservations.insert(reservation.id, reservation.clone());
        Ok(())
    }

    async fn update_reservation(
        &self,
        reservation: &Reservation,
        expected: ReservationState,
    ) -> RepositoryResult<bool> {
        let mut reservations = self.reservations.write();
        match reservations.get_mut(&reservation.id) {
            Some(existing) if existing.state == expected => {
                *existing = reservation.clone();
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Err(RepositoryError::not_found_with_context(
                "Reservation does not exist",
                ErrorContext::new("update_reservation")
                    .with_entity("reservation")
                    .with_entity_id(reservation.id),
            )),
        }
    }

    async fn fetch_reservation(&self, id: ReservationId) -> RepositoryResult<Reservation> {
        self.reservations.read().get(&id).cloned().ok_or_else(|| {
            RepositoryError::not_found_with_context(
                "Reservation does not exist",
                ErrorContext::new("fetch_reservation")
                    .with_entity("reservation")
                    .with_entity_id(id),
            )
        })
    }

    async fn fetch_active_for_provider(
        &self,
        provider_id: ProviderId,
    ) -> RepositoryResult<Vec<Reservation>> {
        Ok(self
            .reservations
            .read()
            .values()
            .filter(|r| r.provider_id == provider_id && r.is_active())
            .cloned()
            .collect())
    }

    async fn fetch_page_for_requester(
        &self,
        requester_id: RequesterId,
        page: PageRequest,
    ) -> RepositoryResult<Vec<Reservation>> {
        let matching: Vec<Reservation> = self
            .reservations
            .read()
            .values()
            .filter(|r| r.requester_id == requester_id)
            .cloned()
            .collect();
        Ok(Self::sorted_by_window_start(matching, page))
    }

    async fn fetch_page_for_provider(
        &self,
        provider_id: ProviderId,
        page: PageRequest,
    ) -> RepositoryResult<Vec<Reservation>> {
        let matching: Vec<Reservation> = self
            .reservations
            .read()
            .values()
            .filter(|r| r.provider_id == provider_id)
            .cloned()
            .collect();
        Ok(Self::sorted_by_window_start(matching, page))
    }

    async fn fetch_confirmed_ended_before(
        &self,
        now: DateTime<Utc>,
    ) -> RepositoryResult<Vec<Reservation>> {
        Ok(self
            .reservations
            .read()
            .values()
            .filter(|r| r.state == ReservationState::Confirmed && r.window.end() < now)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ProviderDirectory for LocalRepository {
    async fn fetch_provider(
        &self,
        category: ProviderCategory,
        id: ProviderId,
    ) -> RepositoryResult<Provider> {
        self.providers
            .read()
            .get(&(category, id))
            .cloned()
            .ok_or_else(|| {
                RepositoryError::not_found_with_context(
                    format!("No {} provider with that id", category),
                    ErrorContext::new("fetch_provider")
                        .with_entity("provider")
                        .with_entity_id(id),
                )
            })
    }

    async fn list_providers(
        &self,
        category: ProviderCategory,
    ) -> RepositoryResult<Vec<Provider>> {
        let mut providers: Vec<Provider> = self
            .providers
            .read()
            .iter()
            .filter(|((cat, _), _)| *cat == category)
            .map(|(_, p)| p.clone())
            .collect();
        // HashMap iteration order is arbitrary; present a stable listing.
        providers.sort_by_key(|p| p.id);
        Ok(providers)
    }

    async fn upsert_provider(&self, provider: &Provider) -> RepositoryResult<()> {
        self.providers
            .write()
            .insert((provider.category(), provider.id), provider.clone());
        Ok(())
    }
}

#[async_trait]
impl NotificationRepository for LocalRepository {
    async fn insert_notification(&self, notification: &Notification) -> RepositoryResult<()> {
        self.notifications.write().push(notification.clone());
        Ok(())
    }

    async fn fetch_notifications_for(
        &self,
        recipient_id: i64,
        role: ActorRole,
    ) -> RepositoryResult<Vec<Notification>> {
        let mut matching: Vec<Notification> = self
            .notifications
            .read()
            .iter()
            .filter(|n| n.recipient_id == recipient_id && n.recipient_role == role)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching)
    }

    async fn mark_notification_read(&self, id: NotificationId) -> RepositoryResult<()> {
        let mut notifications = self.notifications.write();
        match notifications.iter_mut().find(|n| n.id == id) {
            Some(notification) => {
                notification.read = true;
                Ok(())
            }
            None => Err(RepositoryError::not_found_with_context(
                "Notification does not exist",
                ErrorContext::new("mark_notification_read")
                    .with_entity("notification")
                    .with_entity_id(id),
            )),
        }
    }
}

#[async_trait]
impl FullRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(true)
    }
}
