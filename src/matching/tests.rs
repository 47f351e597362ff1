use chrono::{TimeZone, Utc, Weekday};

use super::*;
use crate::api::{Location, ProviderDetails, ProviderId, ServiceId, ServiceOffering, WeeklySlot};

fn walker(id: i64, locality: &str, species: &[PetSpecies]) -> Provider {
    Provider {
        id: ProviderId::new(id),
        name: format!("walker-{}", id),
        location: Location::new(locality, "Madrid"),
        accepted_species: species.iter().copied().collect(),
        available_days: [Weekday::Mon, Weekday::Tue].into_iter().collect(),
        slots: vec![WeeklySlot::new(Weekday::Mon, 9 * 60, 12 * 60).unwrap()],
        services: vec![ServiceOffering {
            id: ServiceId::new(10),
            category: ProviderCategory::Walker,
            price_cents: 1200,
            duration_min: 60,
        }],
        details: ProviderDetails::Walker {
            max_dogs_per_walk: 4,
        },
    }
}

fn vet(id: i64, locality: &str) -> Provider {
    Provider {
        id: ProviderId::new(id),
        name: format!("vet-{}", id),
        location: Location::new(locality, "Madrid"),
        accepted_species: [PetSpecies::Dog, PetSpecies::Cat, PetSpecies::Bird]
            .into_iter()
            .collect(),
        available_days: [Weekday::Mon, Weekday::Wed, Weekday::Fri]
            .into_iter()
            .collect(),
        slots: vec![WeeklySlot::new(Weekday::Wed, 15 * 60, 19 * 60).unwrap()],
        services: vec![ServiceOffering {
            id: ServiceId::new(20),
            category: ProviderCategory::Veterinary,
            price_cents: 4500,
            duration_min: 30,
        }],
        details: ProviderDetails::Veterinary {
            clinic_name: format!("Clinica {}", id),
            emergency_service: false,
        },
    }
}

fn monday_window(h1: u32, h2: u32) -> TimeRange {
    // 2025-06-02 is a Monday.
    TimeRange::new(
        Utc.with_ymd_and_hms(2025, 6, 2, h1, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2025, 6, 2, h2, 0, 0).unwrap(),
    )
    .unwrap()
}

#[test]
fn test_unconstrained_query_returns_input_unchanged() {
    let providers = vec![
        walker(1, "Chamberi", &[PetSpecies::Dog]),
        vet(2, "Retiro"),
        walker(3, "Lavapies", &[PetSpecies::Dog, PetSpecies::Cat]),
    ];
    let result = match_providers(&providers, &ProviderQuery::default());
    assert_eq!(result, providers);
}

#[test]
fn test_empty_input_yields_empty_result() {
    let result = match_providers(&[], &ProviderQuery::for_category(ProviderCategory::Walker));
    assert!(result.is_empty());
}

#[test]
fn test_category_dispatch_excludes_other_variants() {
    let providers = vec![walker(1, "Chamberi", &[PetSpecies::Dog]), vet(2, "Chamberi")];
    let result = match_providers(&providers, &ProviderQuery::for_category(ProviderCategory::Veterinary));
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].id, ProviderId::new(2));
}

#[test]
fn test_species_membership() {
    let providers = vec![
        walker(1, "Chamberi", &[PetSpecies::Dog]),
        vet(2, "Chamberi"), // accepts birds
    ];
    let query = ProviderQuery {
        species: Some(PetSpecies::Bird),
        ..Default::default()
    };
    let result = match_providers(&providers, &query);
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].id, ProviderId::new(2));
}

#[test]
fn test_empty_accepted_species_rejects_constrained_query() {
    let providers = vec![walker(1, "Chamberi", &[])];
    let query = ProviderQuery {
        species: Some(PetSpecies::Dog),
        ..Default::default()
    };
    assert!(match_providers(&providers, &query).is_empty());

    // But an unset species field does not exclude the same provider.
    assert_eq!(match_providers(&providers, &ProviderQuery::default()).len(), 1);
}

#[test]
fn test_locality_is_case_insensitive() {
    let providers = vec![walker(1, "Chamberi", &[PetSpecies::Dog])];
    let query = ProviderQuery {
        locality: Some("chamberi".to_string()),
        ..Default::default()
    };
    assert_eq!(match_providers(&providers, &query).len(), 1);

    let query = ProviderQuery {
        locality: Some("Retiro".to_string()),
        ..Default::default()
    };
    assert!(match_providers(&providers, &query).is_empty());
}

#[test]
fn test_day_predicate_requires_declared_day() {
    let providers = vec![walker(1, "Chamberi", &[PetSpecies::Dog])];
    let query = ProviderQuery {
        day: Some(Weekday::Sun),
        ..Default::default()
    };
    assert!(match_providers(&providers, &query).is_empty());

    let query = ProviderQuery {
        day: Some(Weekday::Mon),
        ..Default::default()
    };
    assert_eq!(match_providers(&providers, &query).len(), 1);
}

#[test]
fn test_window_predicate_requires_overlapping_slot() {
    let providers = vec![walker(1, "Chamberi", &[PetSpecies::Dog])];

    // Walker slot is Monday 09:00-12:00; 10:00-11:00 overlaps.
    let query = ProviderQuery {
        window: Some(monday_window(10, 11)),
        ..Default::default()
    };
    assert_eq!(match_providers(&providers, &query).len(), 1);

    // 13:00-14:00 does not.
    let query = ProviderQuery {
        window: Some(monday_window(13, 14)),
        ..Default::default()
    };
    assert!(match_providers(&providers, &query).is_empty());
}

#[test]
fn test_predicates_are_anded() {
    let providers = vec![
        walker(1, "Chamberi", &[PetSpecies::Dog]),
        walker(2, "Retiro", &[PetSpecies::Dog]),
    ];
    let query = ProviderQuery {
        locality: Some("Chamberi".to_string()),
        species: Some(PetSpecies::Dog),
        category: Some(ProviderCategory::Walker),
        day: Some(Weekday::Mon),
        window: Some(monday_window(10, 11)),
    };
    let result = match_providers(&providers, &query);
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].id, ProviderId::new(1));
}

#[test]
fn test_filter_is_stable() {
    let providers = vec![
        walker(3, "Chamberi", &[PetSpecies::Dog]),
        walker(1, "Chamberi", &[PetSpecies::Dog]),
        walker(2, "Chamberi", &[PetSpecies::Dog]),
    ];
    let result = match_providers(&providers, &ProviderQuery::for_category(ProviderCategory::Walker));
    let ids: Vec<i64> = result.iter().map(|p| p.id.value()).collect();
    assert_eq!(ids, vec![3, 1, 2]);
}

#[test]
fn test_is_unconstrained() {
    assert!(ProviderQuery::default().is_unconstrained());
    assert!(!ProviderQuery::for_category(ProviderCategory::Walker).is_unconstrained());
}
