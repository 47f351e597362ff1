//! Postgres repository implementation using Diesel.
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Automatic retry for transient failures
//! - Automatic migration execution
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)
//! - `PG_MAX_RETRIES`: Maximum retry attempts for transient failures (default: 3)
//! - `PG_RETRY_DELAY_MS`: Initial retry delay in milliseconds (default: 100)

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tokio::task;

use crate::api::{
    ActorRole, Notification, NotificationId, Provider, ProviderCategory, ProviderId, Reservation,
    ReservationId, ReservationState, RequesterId,
};
use crate::db::models::PageRequest;
use crate::db::repository::{
    ErrorContext, FullRepository, NotificationRepository, ProviderDirectory, RepositoryError,
    RepositoryResult, ReservationRepository,
};

mod models;
mod schema;

use models::{NotificationRow, ProviderRow, ReservationRow};

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
    /// Maximum number of retry attempts for transient failures
    pub max_retries: u32,
    /// Initial retry delay in milliseconds (doubles with each retry)
    pub retry_delay_ms: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
            max_retries: 3,
            retry_delay_ms: 100,
        }
    }
}

impl PostgresConfig {
    /// Create configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;

        let parse_var = |name: &str, default: u64| {
            std::env::var(name)
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(default)
        };

        Ok(Self {
            database_url,
            max_pool_size: parse_var("PG_POOL_MAX", 10) as u32,
            min_pool_size: parse_var("PG_POOL_MIN", 1) as u32,
            connection_timeout_sec: parse_var("PG_CONN_TIMEOUT_SEC", 30),
            idle_timeout_sec: parse_var("PG_IDLE_TIMEOUT_SEC", 600),
            max_retries: parse_var("PG_MAX_RETRIES", 3) as u32,
            retry_delay_ms: parse_var("PG_RETRY_DELAY_MS", 100),
        })
    }

    /// Create a new configuration with a database URL.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

/// Diesel-backed repository for Postgres.
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
    config: PostgresConfig,
}

impl PostgresRepository {
    /// Create a new repository and run pending migrations.
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);
        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .build(manager)?;

        let mut conn = pool.get()?;
        conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            RepositoryError::configuration(format!("Failed to run migrations: {}", e))
        })?;

        Ok(Self { pool, config })
    }

    /// Run a blocking Diesel operation on the blocking thread pool,
    /// retrying transient failures with exponential backoff.
    async fn run<T, F>(&self, operation: &'static str, f: F) -> RepositoryResult<T>
    where
        F: Fn(&mut PgConnection) -> RepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        let max_retries = self.config.max_retries;
        let base_delay_ms = self.config.retry_delay_ms;

        task::spawn_blocking(move || {
            let mut attempt: u32 = 0;
            loop {
                let result = pool
                    .get()
                    .map_err(RepositoryError::from)
                    .and_then(|mut conn| f(&mut conn));
                match result {
                    Err(err) if err.is_retryable() && attempt < max_retries => {
                        attempt += 1;
                        let delay = base_delay_ms.saturating_mul(1 << (attempt - 1));
                        tracing::debug!(attempt, delay_ms = delay, "retrying repository operation");
                        std::thread::sleep(Duration::from_millis(delay));
                    }
                    other => return other,
                }
            }
        })
        .await
        .map_err(|e| RepositoryError::internal(format!("Blocking task join error: {}", e)))?
        .map_err(|e| e.with_operation(operation))
    }
}

#[async_trait]
impl ReservationRepository for PostgresRepository {
    async fn insert_reservation(&self, reservation: &Reservation) -> RepositoryResult<()> {
        let row = ReservationRow::from_reservation(reservation);
        self.run("insert_reservation", move |conn| {
            diesel::insert_into(schema::reservations::table)
                .values(&row)
                .execute(conn)?;
            Ok(())
        })
        .await
    }

    async fn update_reservation(
        &self,
        reservation: &Reservation,
        expected: ReservationState,
    ) -> RepositoryResult<bool> {
        let row = ReservationRow::from_reservation(reservation);
        let expected = models::state_to_str(expected);
        self.run("update_reservation", move |conn| {
            // Compare-and-swap: the state predicate makes the write a no-op
            // when a concurrent transition got there first.
            let updated = diesel::update(
                schema::reservations::table
                    .find(row.id)
                    .filter(schema::reservations::state.eq(expected)),
            )
            .set(&row)
            .execute(conn)?;
            if updated == 1 {
                return Ok(true);
            }

            let present: i64 = schema::reservations::table
                .find(row.id)
                .count()
                .get_result(conn)?;
            if present == 0 {
                return Err(RepositoryError::not_found_with_context(
                    "Reservation does not exist",
                    ErrorContext::default()
                        .with_entity("reservation")
                        .with_entity_id(row.id),
                ));
            }
            Ok(false)
        })
        .await
    }

    async fn fetch_reservation(&self, id: ReservationId) -> RepositoryResult<Reservation> {
        self.run("fetch_reservation", move |conn| {
            let row: ReservationRow = schema::reservations::table
                .find(id.0)
                .first(conn)
                .optional()?
                .ok_or_else(|| {
                    RepositoryError::not_found_with_context(
                        "Reservation does not exist",
                        ErrorContext::default()
                            .with_entity("reservation")
                            .with_entity_id(id),
                    )
                })?;
            row.into_reservation()
        })
        .await
    }

    async fn fetch_active_for_provider(
        &self,
        provider_id: ProviderId,
    ) -> RepositoryResult<Vec<Reservation>> {
        self.run("fetch_active_for_provider", move |conn| {
            let rows: Vec<ReservationRow> = schema::reservations::table
                .filter(schema::reservations::provider_id.eq(provider_id.value()))
                .filter(schema::reservations::state.eq_any(vec!["pending", "confirmed"]))
                .load(conn)?;
            rows.into_iter().map(ReservationRow::into_reservation).collect()
        })
        .await
    }

    async fn fetch_page_for_requester(
        &self,
        requester_id: RequesterId,
        page: PageRequest,
    ) -> RepositoryResult<Vec<Reservation>> {
        self.run("fetch_page_for_requester", move |conn| {
            let rows: Vec<ReservationRow> = schema::reservations::table
                .filter(schema::reservations::requester_id.eq(requester_id.value()))
                .order(schema::reservations::window_start.asc())
                .offset(page.offset() as i64)
                .limit(i64::from(page.limit))
                .load(conn)?;
            rows.into_iter().map(ReservationRow::into_reservation).collect()
        })
        .await
    }

    async fn fetch_page_for_provider(
        &self,
        provider_id: ProviderId,
        page: PageRequest,
    ) -> RepositoryResult<Vec<Reservation>> {
        self.run("fetch_page_for_provider", move |conn| {
            let rows: Vec<ReservationRow> = schema::reservations::table
                .filter(schema::reservations::provider_id.eq(provider_id.value()))
                .order(schema::reservations::window_start.asc())
                .offset(page.offset() as i64)
                .limit(i64::from(page.limit))
                .load(conn)?;
            rows.into_iter().map(ReservationRow::into_reservation).collect()
        })
        .await
    }

    async fn fetch_confirmed_ended_before(
        &self,
        now: DateTime<Utc>,
    ) -> RepositoryResult<Vec<Reservation>> {
        self.run("fetch_confirmed_ended_before", move |conn| {
            let rows: Vec<ReservationRow> = schema::reservations::table
                .filter(schema::reservations::state.eq("confirmed"))
                .filter(schema::reservations::window_end.lt(now))
                .load(conn)?;
            rows.into_iter().map(ReservationRow::into_reservation).collect()
        })
        .await
    }
}

#[async_trait]
impl ProviderDirectory for PostgresRepository {
    async fn fetch_provider(
        &self,
        category: ProviderCategory,
        id: ProviderId,
    ) -> RepositoryResult<Provider> {
        self.run("fetch_provider", move |conn| {
            let row: ProviderRow = schema::providers::table
                .find((category.to_string(), id.value()))
                .first(conn)
                .optional()?
                .ok_or_else(|| {
                    RepositoryError::not_found_with_context(
                        format!("No {} provider with that id", category),
                        ErrorContext::default()
                            .with_entity("provider")
                            .with_entity_id(id),
                    )
                })?;
            row.into_provider()
        })
        .await
    }

    async fn list_providers(
        &self,
        category: ProviderCategory,
    ) -> RepositoryResult<Vec<Provider>> {
        self.run("list_providers", move |conn| {
            let rows: Vec<ProviderRow> = schema::providers::table
                .filter(schema::providers::category.eq(category.to_string()))
                .order(schema::providers::id.asc())
                .load(conn)?;
            rows.into_iter().map(ProviderRow::into_provider).collect()
        })
        .await
    }

    async fn upsert_provider(&self, provider: &Provider) -> RepositoryResult<()> {
        let row = ProviderRow::from_provider(provider)?;
        self.run("upsert_provider", move |conn| {
            diesel::insert_into(schema::providers::table)
                .values(&row)
                .on_conflict((schema::providers::category, schema::providers::id))
                .do_update()
                .set(&row)
                .execute(conn)?;
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl NotificationRepository for PostgresRepository {
    async fn insert_notification(&self, notification: &Notification) -> RepositoryResult<()> {
        let row = NotificationRow::from_notification(notification);
        self.run("insert_notification", move |conn| {
            diesel::insert_into(schema::notifications::table)
                .values(&row)
                .execute(conn)?;
            Ok(())
        })
        .await
    }

    async fn fetch_notifications_for(
        &self,
        recipient_id: i64,
        role: ActorRole,
    ) -> RepositoryResult<Vec<Notification>> {
        self.run("fetch_notifications_for", move |conn| {
            let rows: Vec<NotificationRow> = schema::notifications::table
                .filter(schema::notifications::recipient_id.eq(recipient_id))
                .filter(schema::notifications::recipient_role.eq(models::role_to_str(role)))
                .order(schema::notifications::created_at.desc())
                .load(conn)?;
            rows.into_iter().map(NotificationRow::into_notification).collect()
        })
        .await
    }

    async fn mark_notification_read(&self, id: NotificationId) -> RepositoryResult<()> {
        self.run("mark_notification_read", move |conn| {
            let updated = diesel::update(schema::notifications::table.find(id.0))
                .set(schema::notifications::read.eq(true))
                .execute(conn)?;
            if updated == 0 {
                return Err(RepositoryError::not_found_with_context(
                    "Notification does not exist",
                    ErrorContext::default()
                        .with_entity("notification")
                        .with_entity_id(id),
                ));
            }
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl FullRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.run("health_check", |conn| {
            diesel::sql_query("SELECT 1").execute(conn)?;
            Ok(true)
        })
        .await
    }
}
