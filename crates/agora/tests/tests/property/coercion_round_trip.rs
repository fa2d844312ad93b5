//! Property tests: values survive storage and reload unchanged.
//!
//! For every key, `to_typed(key, to_storage(key, v)) == v` when `v` has the
//! semantic type inferred from the key.

use agora_fields::{infer_type, to_storage, to_typed};
use agora_types::{FieldValue, SemanticType};
use proptest::prelude::*;
use serde_json::Value;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn arb_integer_key() -> impl Strategy<Value = String> {
    ("[a-z]{1,8}", prop_oneof![Just("id"), Just("count"), Just("number")])
        .prop_map(|(stem, suffix)| format!("{}_{}", stem, suffix))
}

fn arb_boolean_key() -> impl Strategy<Value = String> {
    (prop_oneof![Just("is"), Just("has"), Just("can")], "[a-z]{1,8}")
        .prop_map(|(prefix, stem)| format!("{}_{}_enabled", prefix, stem))
}

fn arb_json_key() -> impl Strategy<Value = String> {
    "[a-z]{1,8}".prop_map(|stem| format!("{}_map", stem))
}

/// Finite floats of any magnitude, subnormals and signed zero included.
fn arb_finite_f64() -> impl Strategy<Value = f64> {
    prop::num::f64::POSITIVE
        | prop::num::f64::NEGATIVE
        | prop::num::f64::NORMAL
        | prop::num::f64::SUBNORMAL
        | prop::num::f64::ZERO
}

/// Arbitrary JSON documents, floats included.
fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        any::<u64>().prop_map(Value::from),
        arb_finite_f64().prop_map(Value::from),
        "[a-z ,]{0,12}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..4)
                .prop_map(|entries| Value::Object(entries.into_iter().collect())),
        ]
    })
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn integers_round_trip(key in arb_integer_key(), value in any::<i64>()) {
        prop_assert_eq!(infer_type(&key), SemanticType::Integer);
        let typed = FieldValue::Integer(value);
        prop_assert_eq!(to_typed(&key, &to_storage(&key, &typed)), typed);
    }

    #[test]
    fn booleans_round_trip(key in arb_boolean_key(), value in any::<bool>()) {
        prop_assert_eq!(infer_type(&key), SemanticType::Boolean);
        let typed = FieldValue::Boolean(value);
        prop_assert_eq!(to_typed(&key, &to_storage(&key, &typed)), typed);
    }

    #[test]
    fn json_round_trips(key in arb_json_key(), value in arb_json()) {
        prop_assert_eq!(infer_type(&key), SemanticType::Json);
        let typed = FieldValue::Json(value);
        prop_assert_eq!(to_typed(&key, &to_storage(&key, &typed)), typed);
    }

    #[test]
    fn float_leaves_round_trip_exactly(key in arb_json_key(), value in arb_finite_f64()) {
        let typed = FieldValue::Json(Value::from(vec![value]));
        prop_assert_eq!(to_typed(&key, &to_storage(&key, &typed)), typed);
    }

    #[test]
    fn strings_are_stored_verbatim(stem in "[a-z]{1,8}", value in ".*") {
        let key = format!("{}_text", stem);
        let typed = FieldValue::String(value.clone());
        prop_assert_eq!(to_storage(&key, &typed), value);
        prop_assert_eq!(to_typed(&key, &to_storage(&key, &typed)), typed);
    }

    /// Whatever a store hands back, decoding never panics and yields the key's type.
    #[test]
    fn any_stored_string_decodes(key in arb_integer_key(), raw in ".*") {
        prop_assert!(matches!(to_typed(&key, &raw), FieldValue::Integer(_)));
    }
}
