//! Shared data models re-exported for database layer consumers.

pub use crate::api::{
    Notification, NotificationEvent, Provider, ProviderCategory, Reservation, ReservationState,
};
pub use crate::models::TimeRange;

/// Page request for paginated reservation queries.
///
/// The core only guarantees the ordering contract (window start ascending);
/// page and limit bounds are validated by the caller.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct PageRequest {
    /// Zero-based page index.
    pub page: u32,
    /// Maximum records per page.
    pub limit: u32,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Self {
        Self { page, limit }
    }

    /// Number of records to skip.
    pub fn offset(&self) -> usize {
        self.page as usize * self.limit as usize
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 0, limit: 20 }
    }
}

#[cfg(test)]
mod tests {
    use super::PageRequest;

    #[test]
    fn test_offset() {
        assert_eq!(PageRequest::new(0, 20).offset(), 0);
        assert_eq!(PageRequest::new(2, 10).offset(), 20);
    }

    #[test]
    fn test_default_page() {
        let page = PageRequest::default();
        assert_eq!(page.page, 0);
        assert_eq!(page.limit, 20);
    }
}
