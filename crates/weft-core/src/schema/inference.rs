//! Type inference for JSON definitions that omit `"type"`
//!
//! A definition such as `{"minimum": 0, "maximum": 10}` or `["on", "off"]`
//! carries enough information to pick a type. The rules below are applied in
//! priority order; the caller falls back to the base schema's type (or fails
//! with `no_type_info`) when nothing matches.

use serde_json::{Map, Value};

use super::keys;
use super::prop_type::PropType;
use super::value_type::{TypeSpec, ValueType};

/// Detect the type of a list from its first element.
///
/// With a base schema the base type wins. `allow_arrays` permits exactly one
/// level of array nesting: a list whose first element is itself a list
/// yields `array.<item>`, but a list of lists of lists yields nothing.
pub(crate) fn detect_array_type(
    list: &[Value],
    base: Option<&PropType>,
    allow_arrays: bool,
) -> Option<TypeSpec> {
    if let Some(base) = base {
        return Some(TypeSpec::of(base.value_type()));
    }
    let first = list.first()?;
    match first {
        Value::Array(inner) if allow_arrays => {
            let child = detect_array_type(inner, None, false)?;
            Some(TypeSpec::array_of(child.value_type))
        }
        Value::Array(_) | Value::Null => None,
        other => ValueType::of_json(other).map(TypeSpec::of),
    }
}

/// Detect the type of an object-form definition from its constraint keys.
pub(crate) fn detect_object_type(dict: &Map<String, Value>, base: Option<&PropType>) -> Option<TypeSpec> {
    detect_from_keys(dict, base).map(|spec| reconcile_with_base(spec, base))
}

fn detect_from_keys(dict: &Map<String, Value>, base: Option<&PropType>) -> Option<TypeSpec> {
    let minimum = dict.get(keys::MINIMUM);
    let maximum = dict.get(keys::MAXIMUM);
    let has_min_max = minimum.is_some() || maximum.is_some();

    // "minimum: 0" on top of a number base stays a number
    if has_min_max && base.map(PropType::value_type) == Some(ValueType::Double) {
        return Some(TypeSpec::of(ValueType::Double));
    }

    let is_double = |v: Option<&Value>| matches!(v, Some(Value::Number(n)) if n.is_f64());
    if is_double(minimum) || is_double(maximum) {
        return Some(TypeSpec::of(ValueType::Double));
    }

    if has_min_max {
        return Some(TypeSpec::of(ValueType::Int));
    }

    if dict.contains_key(keys::MIN_LENGTH) || dict.contains_key(keys::MAX_LENGTH) {
        return Some(TypeSpec::of(ValueType::String));
    }

    if dict.contains_key(keys::PROPERTIES) {
        return Some(TypeSpec::of(ValueType::Object));
    }

    if dict.contains_key(keys::ITEMS) {
        return Some(TypeSpec::of(ValueType::Array));
    }

    if let Some(Value::Array(list)) = dict.get(keys::ENUM) {
        return detect_array_type(list, base, true);
    }

    match dict.get(keys::DEFAULT)? {
        Value::Array(list) => {
            let child = detect_array_type(list, None, false)?;
            Some(TypeSpec::array_of(child.value_type))
        }
        other => ValueType::of_json(other).map(TypeSpec::of),
    }
}

/// An inferred type that agrees with the base keeps the base's shape.
///
/// An inferred array defers its item type to the base so the item is merged
/// rather than redeclared. Any other disagreement is left for the merge to
/// reject.
fn reconcile_with_base(spec: TypeSpec, base: Option<&PropType>) -> TypeSpec {
    let Some(base) = base else {
        return spec;
    };
    if spec.value_type == base.value_type() {
        TypeSpec::of(base.value_type())
    } else {
        spec
    }
}
