//! Provider availability matching.
//!
//! [`match_providers`] narrows a set of candidate providers down to those
//! that structurally qualify for a booking query. It is a pure, stable
//! filter: input ordering is preserved and no ranking is applied here
//! (ranking is a presentation concern layered outside the core).

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::api::{PetSpecies, Provider, ProviderCategory, TimeRange};

/// Booking query evaluated against each candidate provider.
///
/// Every field is optional; an unset field places no constraint on
/// candidates. In particular a query with all fields unset returns the
/// input unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderQuery {
    /// Locality the service should take place in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locality: Option<String>,
    /// Species of the pet the service is for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub species: Option<PetSpecies>,
    /// Requested service category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<ProviderCategory>,
    /// Weekday the service should happen on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<Weekday>,
    /// Concrete time window the service should fit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window: Option<TimeRange>,
}

impl ProviderQuery {
    /// Query constrained to a single category, everything else open.
    pub fn for_category(category: ProviderCategory) -> Self {
        Self {
            category: Some(category),
            ..Self::default()
        }
    }

    /// True when no field constrains the candidate set.
    pub fn is_unconstrained(&self) -> bool {
        self.locality.is_none()
            && self.species.is_none()
            && self.category.is_none()
            && self.day.is_none()
            && self.window.is_none()
    }
}

/// Filter candidates down to those satisfying every set query field.
///
/// Predicates are evaluated independently and ANDed. An empty candidate
/// list yields an empty result.
pub fn match_providers(providers: &[Provider], query: &ProviderQuery) -> Vec<Provider> {
    providers
        .iter()
        .filter(|p| qualifies(p, query))
        .cloned()
        .collect()
}

/// Evaluate all predicates for a single provider.
pub fn qualifies(provider: &Provider, query: &ProviderQuery) -> bool {
    matches_locality(provider, query.locality.as_deref())
        && matches_species(provider, query.species)
        && matches_category(provider, query.category)
        && matches_turn(provider, query.day, query.window.as_ref())
}

fn matches_locality(provider: &Provider, locality: Option<&str>) -> bool {
    match locality {
        None => true,
        Some(wanted) => provider.location.locality.eq_ignore_ascii_case(wanted),
    }
}

fn matches_species(provider: &Provider, species: Option<PetSpecies>) -> bool {
    match species {
        None => true,
        // An empty accepted set rejects every species-constrained query.
        Some(wanted) => provider.accepted_species.contains(&wanted),
    }
}

fn matches_category(provider: &Provider, category: Option<ProviderCategory>) -> bool {
    match category {
        None => true,
        Some(wanted) => provider.category() == wanted,
    }
}

/// Day/slot predicate: the provider must declare the requested weekday and,
/// when a window is given, at least one declared slot overlapping it.
fn matches_turn(provider: &Provider, day: Option<Weekday>, window: Option<&TimeRange>) -> bool {
    if let Some(day) = day {
        if !provider.declares_day(day) {
            return false;
        }
    }
    match window {
        None => true,
        Some(window) => provider.slots.iter().any(|s| s.overlaps_window(window)),
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
