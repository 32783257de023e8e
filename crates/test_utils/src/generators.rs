//! Property-based Test Generators
//!
//! Proptest strategies for claims that pass validation against the
//! default fixture policy.

use proptest::prelude::*;

use core_kernel::Money;
use domain_fraud::{ClaimSubmission, IncidentType, VehicleDescriptor};

use crate::builders::ClaimSubmissionBuilder;
use crate::fixtures::MoneyFixtures;

/// Claim amounts from 1 to 100,000 USD
pub fn amount_strategy() -> impl Strategy<Value = Money> {
    (1i64..=100_000).prop_map(MoneyFixtures::usd)
}

/// Pair of amounts where the first never exceeds the second
pub fn ordered_amounts_strategy() -> impl Strategy<Value = (Money, Money)> {
    (1i64..=100_000, 0i64..=50_000)
        .prop_map(|(low, delta)| (MoneyFixtures::usd(low), MoneyFixtures::usd(low + delta)))
}

pub fn incident_type_strategy() -> impl Strategy<Value = IncidentType> {
    prop_oneof![
        Just(IncidentType::Collision),
        Just(IncidentType::Theft),
        Just(IncidentType::Vandalism),
        Just(IncidentType::Fire),
        Just(IncidentType::Weather),
        Just(IncidentType::Glass),
        Just(IncidentType::Other),
    ]
}

/// Descriptions ranging from specific to vague and marker-heavy
pub fn description_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Rear-ended at a stop light by another driver; police report filed at the scene".to_string()),
        Just("Minor scratch".to_string()),
        Just("Just a small dent on the door".to_string()),
        Just("I cant remember exactly, the other car slammed on the brakes".to_string()),
        Just("THEY HIT ME AND DROVE OFF FAST".to_string()),
        Just(String::new()),
    ]
}

pub fn vehicle_strategy() -> impl Strategy<Value = Option<VehicleDescriptor>> {
    prop_oneof![
        Just(None),
        (
            prop_oneof![Just("Toyota"), Just("Honda"), Just("Ford"), Just("Tesla")],
            prop_oneof![Just("Camry"), Just("Civic"), Just("F-150"), Just("Model 3")],
            2010i32..=2024,
        )
            .prop_map(|(make, model, year)| Some(VehicleDescriptor::new(make, model, year))),
    ]
}

/// Days from policy start to the incident, inside the calendar-2024 term
pub fn days_into_term_strategy() -> impl Strategy<Value = u64> {
    0u64..=360
}

/// A submission against the fixture policy with varied content
pub fn submission_strategy() -> impl Strategy<Value = ClaimSubmission> {
    (
        amount_strategy(),
        incident_type_strategy(),
        description_strategy(),
        vehicle_strategy(),
        days_into_term_strategy(),
    )
        .prop_map(|(amount, incident_type, description, vehicle, days)| {
            let builder = ClaimSubmissionBuilder::new()
                .with_amount(amount)
                .with_incident_type(incident_type)
                .with_description(description)
                .filed_days_after_inception(days);
            match vehicle {
                Some(v) => builder.with_vehicle(v).build(),
                None => builder.without_vehicle().build(),
            }
        })
}
