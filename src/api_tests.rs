use std::collections::HashSet;

use chrono::{TimeZone, Utc, Weekday};

use super::*;

fn sample_provider() -> Provider {
    Provider {
        id: ProviderId::new(7),
        name: "Paseos Marta".to_string(),
        location: Location::new("Chamberi", "Madrid"),
        accepted_species: [PetSpecies::Dog, PetSpecies::Cat].into_iter().collect(),
        available_days: [Weekday::Mon, Weekday::Wed].into_iter().collect(),
        slots: vec![WeeklySlot::new(Weekday::Mon, 9 * 60, 12 * 60).unwrap()],
        services: vec![ServiceOffering {
            id: ServiceId::new(1),
            category: ProviderCategory::Walker,
            price_cents: 1500,
            duration_min: 60,
        }],
        details: ProviderDetails::Walker {
            max_dogs_per_walk: 3,
        },
    }
}

#[test]
fn test_id_newtypes_roundtrip() {
    let id = ProviderId::new(42);
    assert_eq!(id.value(), 42);
    assert_eq!(i64::from(id), 42);
    assert_eq!(ProviderId::from(42), id);
    assert_eq!(id.to_string(), "42");
}

#[test]
fn test_reservation_id_is_unique() {
    assert_ne!(ReservationId::generate(), ReservationId::generate());
}

#[test]
fn test_category_from_str() {
    assert_eq!(
        "veterinary".parse::<ProviderCategory>().unwrap(),
        ProviderCategory::Veterinary
    );
    assert_eq!(
        "Walker".parse::<ProviderCategory>().unwrap(),
        ProviderCategory::Walker
    );
    assert!("groomer".parse::<ProviderCategory>().is_err());
}

#[test]
fn test_details_carry_category() {
    let provider = sample_provider();
    assert_eq!(provider.category(), ProviderCategory::Walker);

    let vet = ProviderDetails::Veterinary {
        clinic_name: "Clinica Norte".to_string(),
        emergency_service: true,
    };
    assert_eq!(vet.category(), ProviderCategory::Veterinary);
}

#[test]
fn test_provider_offering_lookup() {
    let provider = sample_provider();
    assert!(provider.offering(ServiceId::new(1)).is_some());
    assert!(provider.offering(ServiceId::new(99)).is_none());
}

#[test]
fn test_provider_declares_day() {
    let provider = sample_provider();
    assert!(provider.declares_day(Weekday::Mon));
    assert!(!provider.declares_day(Weekday::Sun));
}

#[test]
fn test_slot_covering_window() {
    let provider = sample_provider();
    // 2025-06-02 is a Monday.
    let inside = TimeRange::new(
        Utc.with_ymd_and_hms(2025, 6, 2, 10, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2025, 6, 2, 11, 0, 0).unwrap(),
    )
    .unwrap();
    let outside = TimeRange::new(
        Utc.with_ymd_and_hms(2025, 6, 2, 13, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2025, 6, 2, 14, 0, 0).unwrap(),
    )
    .unwrap();
    assert!(provider.slot_covering(&inside).is_some());
    assert!(provider.slot_covering(&outside).is_none());
}

#[test]
fn test_terminal_states() {
    assert!(!ReservationState::Pending.is_terminal());
    assert!(!ReservationState::Confirmed.is_terminal());
    assert!(ReservationState::Cancelled.is_terminal());
    assert!(ReservationState::Completed.is_terminal());
}

#[test]
fn test_actor_role_counterpart() {
    assert_eq!(ActorRole::Requester.counterpart(), ActorRole::Provider);
    assert_eq!(ActorRole::Provider.counterpart(), ActorRole::Requester);
}

#[test]
fn test_notification_event_wire_names() {
    assert_eq!(
        NotificationEvent::ReservationRequested.as_str(),
        "reservation_requested"
    );
    assert_eq!(
        NotificationEvent::ReservationConfirmed.as_str(),
        "reservation_confirmed"
    );
    assert_eq!(
        NotificationEvent::ReservationCancelled.as_str(),
        "reservation_cancelled"
    );
    assert_eq!(
        NotificationEvent::ReservationCompleted.as_str(),
        "reservation_completed"
    );
}

#[test]
fn test_provider_serde_roundtrip() {
    let provider = sample_provider();
    let json = serde_json::to_string(&provider).unwrap();
    let back: Provider = serde_json::from_str(&json).unwrap();
    assert_eq!(provider, back);
}

#[test]
fn test_empty_species_set_serializes() {
    let mut provider = sample_provider();
    provider.accepted_species = HashSet::new();
    let json = serde_json::to_string(&provider).unwrap();
    let back: Provider = serde_json::from_str(&json).unwrap();
    assert!(back.accepted_species.is_empty());
}
