//! Property-based tests for schema export.
//!
//! Any definition built from the string, list or object forms must survive
//! export and re-parse: the re-parsed schema accepts and rejects exactly the
//! same values, in both diff and full export modes. Object nodes merged over
//! an object base round-trip through their diff export over that base.

use proptest::prelude::*;
use serde_json::{json, Value};
use weft_core::PropType;

// =============================================================================
// HELPER STRATEGIES
// =============================================================================

fn type_name_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(json!("boolean")),
        Just(json!("integer")),
        Just(json!("number")),
        Just(json!("string")),
        Just(json!("object")),
        Just(json!("array.integer")),
        Just(json!("array.string")),
        Just(json!("array.boolean")),
    ]
}

fn int_enum_strategy() -> impl Strategy<Value = Value> {
    prop::collection::vec(-10i64..10, 1..4).prop_map(|v| json!(v))
}

fn string_enum_strategy() -> impl Strategy<Value = Value> {
    prop::collection::vec("[a-c]{1,3}", 1..4).prop_map(|v| json!(v))
}

fn int_range_strategy() -> impl Strategy<Value = Value> {
    (-10i64..0, 0i64..10).prop_map(|(min, max)| json!({"minimum": min, "maximum": max}))
}

fn number_range_strategy() -> impl Strategy<Value = Value> {
    (-10i64..0, 0i64..10).prop_map(|(min, max)| {
        json!({"type": "number", "minimum": min as f64 + 0.5, "maximum": max as f64 + 0.5})
    })
}

fn length_strategy() -> impl Strategy<Value = Value> {
    (0u64..3, 3u64..6).prop_map(|(min, max)| json!({"minLength": min, "maxLength": max}))
}

fn definition_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        type_name_strategy(),
        int_enum_strategy(),
        string_enum_strategy(),
        int_range_strategy(),
        number_range_strategy(),
        length_strategy(),
    ]
}

/// Values probing every type and a spread of magnitudes and lengths
fn probe_values() -> Vec<Value> {
    vec![
        json!(null),
        json!(true),
        json!(-11),
        json!(-3),
        json!(0),
        json!(2),
        json!(9),
        json!(10),
        json!(-2.5),
        json!(9.25),
        json!(""),
        json!("a"),
        json!("ab"),
        json!("abc"),
        json!("cccccc"),
        json!([]),
        json!([1, 2]),
        json!(["a"]),
        json!([true]),
        json!({}),
        json!({"k": 1}),
    ]
}

fn verdicts(prop: &PropType) -> Vec<bool> {
    probe_values()
        .iter()
        .map(|v| prop.validate_value(v).is_ok())
        .collect()
}

fn object_base_strategy() -> impl Strategy<Value = Value> {
    any::<bool>().prop_map(|extra| {
        json!({
            "type": "object",
            "properties": {"a": {"minimum": 0}, "b": "string"},
            "additionalProperties": extra
        })
    })
}

fn object_override_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(json!({})),
        any::<bool>().prop_map(|extra| json!({"additionalProperties": extra})),
        Just(json!({"required": ["a"]})),
        Just(json!({"properties": {"a": {"maximum": 5}}})),
        any::<bool>().prop_map(|extra| {
            json!({"properties": {"a": {}}, "additionalProperties": extra, "required": ["a"]})
        }),
    ]
}

fn object_verdicts(prop: &PropType) -> Vec<bool> {
    [
        json!({}),
        json!({"a": 1}),
        json!({"a": 6}),
        json!({"a": -1}),
        json!({"b": "x"}),
        json!({"a": 1, "z": 2}),
        json!({"a": 1, "b": "x"}),
    ]
    .iter()
    .map(|v| prop.validate_value(v).is_ok())
    .collect()
}

// =============================================================================
// ROUND-TRIP PROPERTIES
// =============================================================================

proptest! {
    /// Diff export re-parses to a schema with identical validation verdicts
    #[test]
    fn diff_export_round_trips(definition in definition_strategy()) {
        let original = PropType::from_json(&definition, None).unwrap();
        let reparsed = PropType::from_json(&original.to_json(false), None).unwrap();

        prop_assert_eq!(verdicts(&original), verdicts(&reparsed));
        prop_assert_eq!(original.to_json(true), reparsed.to_json(true));
    }

    /// Full export re-parses to the same fully resolved schema
    #[test]
    fn full_export_round_trips(definition in definition_strategy()) {
        let original = PropType::from_json(&definition, None).unwrap();
        let reparsed = PropType::from_json(&original.to_json(true), None).unwrap();

        prop_assert_eq!(verdicts(&original), verdicts(&reparsed));
        prop_assert_eq!(original.to_json(true), reparsed.to_json(true));
    }

    /// An object node merged over an object base re-parses from its diff
    /// over the same base to a node with the same verdicts
    #[test]
    fn object_override_diff_round_trips(
        base_def in object_base_strategy(),
        override_def in object_override_strategy(),
    ) {
        let base = PropType::from_json(&base_def, None).unwrap();
        let merged = PropType::from_json(&override_def, Some(&base)).unwrap();
        let reparsed = PropType::from_json(&merged.to_json(false), Some(&base)).unwrap();

        prop_assert_eq!(object_verdicts(&merged), object_verdicts(&reparsed));
        prop_assert_eq!(merged.to_json(true), reparsed.to_json(true));
    }
}
