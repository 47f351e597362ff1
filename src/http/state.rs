//! Application state for the HTTP server.

use std::sync::Arc;

use crate::db::repository::FullRepository;
use crate::ledger::ReservationLedger;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Reservation lifecycle engine
    pub ledger: Arc<ReservationLedger>,
    /// Repository instance for directory and health operations
    pub repository: Arc<dyn FullRepository>,
}

impl AppState {
    /// Create a new application state on top of the given repository.
    pub fn new(repository: Arc<dyn FullRepository>) -> Self {
        Self {
            ledger: Arc::new(ReservationLedger::new(repository.clone())),
            repository,
        }
    }
}
