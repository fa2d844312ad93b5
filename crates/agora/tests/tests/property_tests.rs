#[path = "property/coercion_round_trip.rs"]
mod coercion_round_trip;

#[path = "property/default_completeness.rs"]
mod default_completeness;
