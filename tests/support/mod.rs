#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use chrono::{DateTime, TimeZone, Utc, Weekday};
use patitas_rust::api::{
    Location, PetSpecies, Provider, ProviderCategory, ProviderDetails, ProviderId, ServiceId,
    ServiceOffering, TimeRange, WeeklySlot,
};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// This is panic-safe (restores variables on unwind) and also serializes access to
/// process-global env vars to avoid flaky tests when Rust runs tests in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK poisoned");
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

/// 2025-06-02 is a Monday; all fixture windows live on that day.
pub fn monday(h1: u32, m1: u32, h2: u32, m2: u32) -> TimeRange {
    TimeRange::new(monday_at(h1, m1), monday_at(h2, m2)).expect("fixture window")
}

pub fn monday_at(h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, h, m, 0).unwrap()
}

/// Dog walker available Monday 09:00-12:00, offering service 10.
pub fn walker(id: i64) -> Provider {
    Provider {
        id: ProviderId::new(id),
        name: format!("Walker {}", id),
        location: Location::new("Gracia", "Barcelona"),
        accepted_species: HashSet::from([PetSpecies::Dog]),
        available_days: HashSet::from([Weekday::Mon]),
        slots: vec![WeeklySlot::new(Weekday::Mon, 9 * 60, 12 * 60).unwrap()],
        services: vec![ServiceOffering {
            id: ServiceId::new(10),
            category: ProviderCategory::Walker,
            price_cents: 1500,
            duration_min: 60,
        }],
        details: ProviderDetails::Walker {
            max_dogs_per_walk: 4,
        },
    }
}

/// Veterinarian available Monday and Tuesday mornings, offering service 20.
pub fn vet(id: i64) -> Provider {
    Provider {
        id: ProviderId::new(id),
        name: format!("Vet {}", id),
        location: Location::new("Eixample", "Barcelona"),
        accepted_species: HashSet::from([PetSpecies::Dog, PetSpecies::Cat]),
        available_days: HashSet::from([Weekday::Mon, Weekday::Tue]),
        slots: vec![
            WeeklySlot::new(Weekday::Mon, 8 * 60, 14 * 60).unwrap(),
            WeeklySlot::new(Weekday::Tue, 8 * 60, 14 * 60).unwrap(),
        ],
        services: vec![ServiceOffering {
            id: ServiceId::new(20),
            category: ProviderCategory::Veterinary,
            price_cents: 4500,
            duration_min: 30,
        }],
        details: ProviderDetails::Veterinary {
            clinic_name: format!("Clinic {}", id),
            emergency_service: false,
        },
    }
}
