#![allow(clippy::unwrap_used, clippy::expect_used)]

use serde_json::json;
use weft_core::errors::WeftErrorKind;
use weft_core::{PropType, ValueType};

fn parse(value: serde_json::Value) -> PropType {
    PropType::from_json(&value, None).unwrap()
}

// ---- Input forms ----

#[test]
fn test_string_shorthand() {
    let prop = parse(json!("integer"));
    assert_eq!(prop.value_type(), ValueType::Int);
    assert_eq!(prop.to_json(false), json!("integer"));
    assert_eq!(prop.to_json(true), json!({"type": "integer"}));
}

#[test]
fn test_number_is_double() {
    assert_eq!(parse(json!("number")).value_type(), ValueType::Double);
}

#[test]
fn test_array_shorthand_has_item_type() {
    let prop = parse(json!("array.string"));
    assert_eq!(prop.value_type(), ValueType::Array);
    assert_eq!(prop.item_type().unwrap().value_type(), ValueType::String);
    assert_eq!(
        prop.to_json(true),
        json!({"type": "array", "items": {"type": "string"}})
    );
}

#[test]
fn test_unknown_type_names() {
    for name in ["blob", "array.array", "string.integer"] {
        let err = PropType::from_json(&json!(name), None).unwrap_err();
        assert_eq!(err.kind(), WeftErrorKind::UnknownType, "{}", name);
    }
    let err = PropType::from_json(&json!({"type": "blob"}), None).unwrap_err();
    assert_eq!(err.code(), "unknown_type");
}

#[test]
fn test_scalar_json_is_not_a_definition() {
    let err = PropType::from_json(&json!(5), None).unwrap_err();
    assert_eq!(err.kind(), WeftErrorKind::UnknownType);
    assert!(err.message().contains("Integer"));
}

#[test]
fn test_array_without_item_type() {
    let err = PropType::from_json(&json!("array"), None).unwrap_err();
    assert_eq!(err.kind(), WeftErrorKind::NoTypeInfo);
}

#[test]
fn test_list_shorthand_is_enum() {
    let prop = parse(json!(["_withAirFlip", "_withSpin", "_withKick"]));
    assert_eq!(prop.value_type(), ValueType::String);
    assert_eq!(prop.one_of().unwrap().len(), 3);
    assert_eq!(prop.to_json(false), json!(["_withAirFlip", "_withSpin", "_withKick"]));
    assert_eq!(
        prop.to_json(true),
        json!({"type": "string", "enum": ["_withAirFlip", "_withSpin", "_withKick"]})
    );
}

#[test]
fn test_enum_with_other_constraints_exports_object() {
    let prop = parse(json!({"type": "integer", "enum": [1, 2], "maximum": 5}));
    assert_eq!(
        prop.to_json(false),
        json!({"type": "integer", "enum": [1, 2], "maximum": 5})
    );
}

#[test]
fn test_enum_of_doubles_with_int_first_keeps_object_form() {
    let prop = parse(json!({"type": "number", "enum": [1, 2.5]}));
    assert_eq!(
        prop.to_json(false),
        json!({"type": "number", "enum": [1, 2.5]})
    );
}

#[test]
fn test_object_form_with_constraints() {
    let prop = parse(json!({"type": "string", "minLength": 2, "maxLength": 4, "default": "abc"}));
    assert_eq!(prop.min_length(), Some(2));
    assert_eq!(prop.max_length(), Some(4));
    assert_eq!(prop.default_value(), Some(&json!("abc")));
}

#[test]
fn test_plain_object_is_free_form() {
    let prop = parse(json!("object"));
    assert!(prop.object_schema().unwrap().extra_properties_allowed());
    assert_eq!(prop.to_json(false), json!("object"));
    prop.validate_value(&json!({"anything": [1, 2]})).unwrap();
}

#[test]
fn test_object_with_properties_is_closed() {
    let prop = parse(json!({"properties": {"a": "integer"}}));
    let schema = prop.object_schema().unwrap();
    assert!(!schema.extra_properties_allowed());
    let err = prop.validate_value(&json!({"b": 1})).unwrap_err();
    assert_eq!(err.kind(), WeftErrorKind::UnexpectedProperty);
}

#[test]
fn test_additional_properties_and_required() {
    let prop = parse(json!({
        "type": "object",
        "properties": {"a": "integer", "b": "string"},
        "additionalProperties": true,
        "required": ["a"]
    }));
    prop.validate_value(&json!({"a": 1, "zzz": true})).unwrap();
    let err = prop.validate_value(&json!({"b": "x"})).unwrap_err();
    assert_eq!(err.kind(), WeftErrorKind::PropertyMissing);
    assert_eq!(
        prop.to_json(false),
        json!({
            "type": "object",
            "properties": {"a": "integer", "b": "string"},
            "additionalProperties": true,
            "required": ["a"]
        })
    );
}

#[test]
fn test_required_unknown_property() {
    let err = PropType::from_json(
        &json!({"properties": {"a": "integer"}, "required": ["b"]}),
        None,
    )
    .unwrap_err();
    assert_eq!(err.kind(), WeftErrorKind::UnknownProperty);
}

#[test]
fn test_nested_property_error_chain() {
    let err = PropType::from_json(&json!({"properties": {"x": "blob"}}), None).unwrap_err();
    assert_eq!(err.kind(), WeftErrorKind::InvalidObjectSchema);
    assert_eq!(err.inner().unwrap().kind(), WeftErrorKind::InvalidPropDef);
    assert_eq!(err.inner().unwrap().property(), Some("x"));
    assert_eq!(err.first_error().kind(), WeftErrorKind::UnknownType);
}

// ---- Defaults and enum entries ----

#[test]
fn test_default_must_satisfy_constraints() {
    let err = PropType::from_json(&json!({"maximum": 3, "default": 5}), None).unwrap_err();
    assert_eq!(err.kind(), WeftErrorKind::InvalidPropValue);
    assert_eq!(err.first_error().kind(), WeftErrorKind::OutOfRange);
}

#[test]
fn test_enum_entries_checked_against_type_only() {
    let prop = parse(json!({"type": "integer", "minimum": 5, "enum": [1, 6]}));
    prop.validate_value(&json!(6)).unwrap();
    let err = prop.validate_value(&json!(1)).unwrap_err();
    assert_eq!(err.kind(), WeftErrorKind::OutOfRange);

    let err = PropType::from_json(&json!({"type": "integer", "enum": [1, "a"]}), None).unwrap_err();
    assert_eq!(err.kind(), WeftErrorKind::InvalidPropValue);
    assert_eq!(err.first_error().kind(), WeftErrorKind::TypeMismatch);
}

#[test]
fn test_float_bound_on_integer_is_type_mismatch() {
    let err = PropType::from_json(&json!({"type": "integer", "minimum": 1.5}), None).unwrap_err();
    assert_eq!(err.kind(), WeftErrorKind::TypeMismatch);
}

// ---- Validation ----

#[test]
fn test_validate_kinds() {
    let int = parse(json!("integer"));
    int.validate_value(&json!(3)).unwrap();
    assert_eq!(int.validate_value(&json!(1.5)).unwrap_err().kind(), WeftErrorKind::TypeMismatch);
    assert_eq!(int.validate_value(&json!("3")).unwrap_err().kind(), WeftErrorKind::TypeMismatch);

    let double = parse(json!("number"));
    double.validate_value(&json!(3)).unwrap();
    double.validate_value(&json!(3.25)).unwrap();

    let boolean = parse(json!("boolean"));
    assert_eq!(boolean.validate_value(&json!(0)).unwrap_err().kind(), WeftErrorKind::TypeMismatch);
}

#[test]
fn test_validate_numeric_bounds() {
    let prop = parse(json!({"minimum": 0, "maximum": 10}));
    prop.validate_value(&json!(0)).unwrap();
    prop.validate_value(&json!(10)).unwrap();
    assert_eq!(prop.validate_value(&json!(-1)).unwrap_err().code(), "out_of_range");
    assert_eq!(prop.validate_value(&json!(11)).unwrap_err().code(), "out_of_range");
}

#[test]
fn test_validate_string_length_counts_chars() {
    let prop = parse(json!({"minLength": 2, "maxLength": 3}));
    prop.validate_value(&json!("héé")).unwrap();
    assert_eq!(prop.validate_value(&json!("a")).unwrap_err().kind(), WeftErrorKind::OutOfRange);
    assert_eq!(prop.validate_value(&json!("abcd")).unwrap_err().kind(), WeftErrorKind::OutOfRange);
}

#[test]
fn test_validate_enum_membership() {
    let prop = parse(json!(["on", "off"]));
    prop.validate_value(&json!("on")).unwrap();
    assert_eq!(prop.validate_value(&json!("dim")).unwrap_err().kind(), WeftErrorKind::OutOfRange);
}

#[test]
fn test_validate_nested_object_wraps_cause() {
    let prop = parse(json!({"properties": {"x": {"type": "integer", "maximum": 3}}}));
    let err = prop.validate_value(&json!({"x": 5})).unwrap_err();
    assert_eq!(err.kind(), WeftErrorKind::InvalidPropValue);
    assert_eq!(err.property(), Some("x"));
    assert_eq!(err.first_error().kind(), WeftErrorKind::OutOfRange);
}

#[test]
fn test_validate_array_elements() {
    let prop = parse(json!("array.integer"));
    prop.validate_value(&json!([1, 2, 3])).unwrap();
    let err = prop.validate_value(&json!([1, "a"])).unwrap_err();
    assert_eq!(err.kind(), WeftErrorKind::InvalidPropValue);
    assert_eq!(err.first_error().kind(), WeftErrorKind::TypeMismatch);
}

// ---- Merging with a base ----

#[test]
fn test_override_inherits_base_constraints() {
    let base = parse(json!({"type": "integer", "minimum": 0, "maximum": 10}));
    let prop = PropType::from_json(&json!({"maximum": 5}), Some(&base)).unwrap();

    assert!(prop.is_based_on_schema());
    assert_eq!(prop.minimum(), Some(&json!(0)));
    assert_eq!(prop.maximum(), Some(&json!(5)));
    assert_eq!(prop.to_json(false), json!({"maximum": 5}));
    assert_eq!(
        prop.to_json(true),
        json!({"type": "integer", "minimum": 0, "maximum": 5})
    );
    assert_eq!(prop.validate_value(&json!(7)).unwrap_err().kind(), WeftErrorKind::OutOfRange);
}

#[test]
fn test_empty_override_exports_empty_object() {
    let base = parse(json!({"type": "string", "maxLength": 8}));
    let prop = PropType::from_json(&json!({}), Some(&base)).unwrap();
    assert_eq!(prop.value_type(), ValueType::String);
    assert!(!prop.has_overridden_attributes());
    assert_eq!(prop.to_json(false), json!({}));
    assert_eq!(prop.to_json(true), json!({"type": "string", "maxLength": 8}));
}

#[test]
fn test_type_change_against_base() {
    let base = parse(json!("integer"));
    let err = PropType::from_json(&json!("string"), Some(&base)).unwrap_err();
    assert_eq!(err.kind(), WeftErrorKind::ParamTypeChanged);
    assert!(err.message().contains("integer"));
    assert!(err.message().contains("string"));
}

#[test]
fn test_enum_override_on_base() {
    let base = parse(json!("string"));
    let prop = PropType::from_json(&json!(["a", "b"]), Some(&base)).unwrap();
    assert_eq!(prop.to_json(false), json!(["a", "b"]));
    assert_eq!(prop.to_json(true), json!({"type": "string", "enum": ["a", "b"]}));
}

#[test]
fn test_array_override_inherits_item_type() {
    let base = parse(json!({"type": "array", "items": {"type": "integer", "maximum": 9}}));
    let prop = PropType::from_json(&json!({"default": [1, 2]}), Some(&base)).unwrap();
    assert_eq!(prop.item_type().unwrap().maximum(), Some(&json!(9)));
    assert_eq!(prop.to_json(false), json!({"default": [1, 2]}));

    let err = PropType::from_json(&json!({"default": [10]}), Some(&base)).unwrap_err();
    assert_eq!(err.kind(), WeftErrorKind::InvalidPropValue);
}

#[test]
fn test_object_override_closes_extra_properties() {
    let base = parse(json!({
        "type": "object",
        "properties": {"a": "integer"},
        "additionalProperties": true
    }));
    let merged = PropType::from_json(&json!({"additionalProperties": false}), Some(&base)).unwrap();

    // The inherited property set stays out of the diff
    let diff = merged.to_json(false);
    assert_eq!(diff, json!({"additionalProperties": false}));

    let reparsed = PropType::from_json(&diff, Some(&base)).unwrap();
    for prop in [&merged, &reparsed] {
        prop.validate_value(&json!({"a": 1})).unwrap();
        let err = prop.validate_value(&json!({"a": 1, "z": 2})).unwrap_err();
        assert_eq!(err.kind(), WeftErrorKind::UnexpectedProperty);
    }
    assert_eq!(merged.to_json(true), reparsed.to_json(true));
}

#[test]
fn test_nested_properties_replace_base_properties() {
    let base = parse(json!({"properties": {"a": "integer", "b": "string"}}));
    let merged = PropType::from_json(
        &json!({"properties": {"a": {"maximum": 3}}}),
        Some(&base),
    )
    .unwrap();

    let schema = merged.object_schema().unwrap();
    assert_eq!(schema.len(), 1);
    assert!(schema.get_prop("b").is_none());
    assert_eq!(merged.to_json(false), json!({"properties": {"a": {"maximum": 3}}}));

    // Leaving `properties` out reuses the base set unchanged
    let reused = PropType::from_json(&json!({}), Some(&base)).unwrap();
    assert_eq!(reused.object_schema().unwrap().len(), 2);
    assert_eq!(reused.to_json(false), json!({}));
}

#[test]
fn test_clone_is_independent() {
    let prop = parse(json!({"properties": {"a": "integer"}}));
    let mut copy = prop.clone();
    assert_eq!(copy, prop);
    copy = PropType::from_json(&json!({"properties": {"a": "string"}}), None).unwrap();
    assert_ne!(copy, prop);
    assert_eq!(
        prop.object_schema().unwrap().get_prop("a").unwrap().value_type(),
        ValueType::Int
    );
}
