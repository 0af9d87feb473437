use proptest::prelude::*;
use serde_json::json;
use std::collections::BTreeMap;
use thingcheck_core::{coerce, CoerceError, ParamValue};
use thingcheck_schema::{DataType, Define, Model, Pattern, SchemaModel};

fn location() -> Define {
    Define::structure([
        ("lat", Define::float_range(-90.0, 90.0)),
        ("lon", Define::float_range(-180.0, 180.0)),
        ("tags", Define::array(Define::string(Some(8)))),
    ])
}

#[test]
fn null_is_not_found_for_every_type() {
    for define in [
        Define::int(),
        Define::float(),
        Define::bool(),
        Define::string(None),
        Define::enumeration([(0, "off")]),
        Define::array(Define::int()),
        location(),
    ] {
        assert_eq!(coerce(&json!(null), &define).unwrap(), None);
    }
}

#[test]
fn numeric_string_coerces_to_int() {
    assert_eq!(
        coerce(&json!("30"), &Define::int_range(5, 30)).unwrap(),
        Some(ParamValue::Int(30))
    );
    assert!(matches!(
        coerce(&json!("thirty"), &Define::int()).unwrap_err(),
        CoerceError::NotANumber(_)
    ));
    assert!(matches!(
        coerce(&json!("30.5"), &Define::int()).unwrap_err(),
        CoerceError::NotAnInteger(_)
    ));
}

#[test]
fn int_range_is_inclusive() {
    let define = Define::int_range(5, 30);
    assert!(coerce(&json!(5), &define).is_ok());
    assert!(coerce(&json!(30), &define).is_ok());
    let err = coerce(&json!(31), &define).unwrap_err();
    assert_eq!(err.to_string(), "31 is outside [5, 30]");
}

#[test]
fn float_accepts_numbers_and_numeric_strings() {
    let define = Define::float_range(-40.0, 120.0);
    assert_eq!(coerce(&json!(21), &define).unwrap(), Some(ParamValue::Float(21.0)));
    assert_eq!(coerce(&json!("21.5"), &define).unwrap(), Some(ParamValue::Float(21.5)));
    assert!(matches!(
        coerce(&json!(121.0), &define).unwrap_err(),
        CoerceError::OutOfRange { .. }
    ));
    assert!(matches!(
        coerce(&json!("NaN"), &define).unwrap_err(),
        CoerceError::NotANumber(_)
    ));
    assert!(matches!(
        coerce(&json!(true), &define).unwrap_err(),
        CoerceError::WrongType { expected: DataType::Float, found: "bool" }
    ));
}

#[test]
fn bool_accepts_json_bools_and_zero_or_one() {
    let define = Define::bool();
    assert_eq!(coerce(&json!(true), &define).unwrap(), Some(ParamValue::Bool(true)));
    assert_eq!(coerce(&json!(0), &define).unwrap(), Some(ParamValue::Bool(false)));
    assert_eq!(coerce(&json!(1), &define).unwrap(), Some(ParamValue::Bool(true)));
    assert!(matches!(
        coerce(&json!(2), &define).unwrap_err(),
        CoerceError::NotABoolean(_)
    ));
    assert!(matches!(
        coerce(&json!("true"), &define).unwrap_err(),
        CoerceError::WrongType { .. }
    ));
}

#[test]
fn string_checks_length_in_chars_and_whole_pattern() {
    let define = Define::string(Some(4));
    assert!(coerce(&json!("héllo"), &define).is_err());
    assert!(coerce(&json!("héll"), &define).is_ok());
    assert!(matches!(
        coerce(&json!(42), &define).unwrap_err(),
        CoerceError::WrongType { expected: DataType::String, found: "number" }
    ));

    let define = Define::string_matching(None, Pattern::new("[a-z]+").unwrap());
    assert!(coerce(&json!("north"), &define).is_ok());
    assert!(matches!(
        coerce(&json!("north1"), &define).unwrap_err(),
        CoerceError::PatternMismatch { .. }
    ));
}

#[test]
fn loaded_pattern_matches_many_values() {
    let doc = json!({
        "properties": [
            { "identifier": "serial", "dataType": { "type": "string", "pattern": "[A-Z]{2}-[0-9]{4}" } }
        ]
    });
    let model = Model::from_json(&doc.to_string()).unwrap();
    let define = &model.resolve_property("serial").unwrap().define;

    for n in 0..2_000 {
        let serial = format!("AB-{:04}", n);
        assert_eq!(
            coerce(&json!(serial), define).unwrap(),
            Some(ParamValue::String(serial.clone()))
        );
    }
    assert!(matches!(
        coerce(&json!("AB-1234-x"), define).unwrap_err(),
        CoerceError::PatternMismatch { .. }
    ));
}

#[test]
fn enum_requires_mapping_key() {
    let define = Define::enumeration([(0, "auto"), (1, "low"), (2, "high")]);
    assert_eq!(coerce(&json!(2), &define).unwrap(), Some(ParamValue::Enum(2)));
    assert_eq!(coerce(&json!("1"), &define).unwrap(), Some(ParamValue::Enum(1)));
    assert!(matches!(
        coerce(&json!(3), &define).unwrap_err(),
        CoerceError::UnknownEnumValue(3)
    ));
}

#[test]
fn array_checks_count_and_elements() {
    let define = Define::Array {
        array_info: Box::new(Define::int_range(0, 10)),
        max: Some(3),
    };
    assert_eq!(
        coerce(&json!([1, "2", 3]), &define).unwrap(),
        Some(ParamValue::Array(vec![
            ParamValue::Int(1),
            ParamValue::Int(2),
            ParamValue::Int(3)
        ]))
    );
    assert!(matches!(
        coerce(&json!([1, 2, 3, 4]), &define).unwrap_err(),
        CoerceError::TooManyElements { len: 4, max: 3 }
    ));

    let err = coerce(&json!([1, null]), &define).unwrap_err();
    assert_eq!(err.path(), "[1]");
    assert!(matches!(err.leaf(), CoerceError::NullElement));

    let err = coerce(&json!([1, 2, 11]), &define).unwrap_err();
    assert_eq!(err.path(), "[2]");
}

#[test]
fn struct_drops_unknown_members_and_skips_null() {
    let value = coerce(
        &json!({ "lat": 52.5, "lon": null, "altitude": 34, "tags": ["roof"] }),
        &location(),
    )
    .unwrap()
    .unwrap();

    let mut expected = BTreeMap::new();
    expected.insert("lat".to_string(), ParamValue::Float(52.5));
    expected.insert(
        "tags".to_string(),
        ParamValue::Array(vec![ParamValue::String("roof".to_string())]),
    );
    assert_eq!(value, ParamValue::Struct(expected));
}

#[test]
fn struct_member_failure_names_the_path() {
    let err = coerce(&json!({ "lat": 91.0 }), &location()).unwrap_err();
    assert_eq!(err.path(), ".lat");

    let err = coerce(&json!({ "tags": ["ok", "much too long"] }), &location()).unwrap_err();
    assert_eq!(err.path(), ".tags[1]");
    assert!(matches!(err.leaf(), CoerceError::TooLong { .. }));

    assert!(matches!(
        coerce(&json!([52.5, 13.4]), &location()).unwrap_err(),
        CoerceError::WrongType { expected: DataType::Struct, found: "array" }
    ));
}

proptest! {
    #[test]
    fn int_coercion_is_idempotent(n in any::<i64>()) {
        let define = Define::int();
        let once = coerce(&json!(n.to_string()), &define).unwrap().unwrap();
        prop_assert_eq!(&once, &ParamValue::Int(n));
        let twice = coerce(&once.to_json(), &define).unwrap().unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn float_coercion_is_idempotent(f in -1.0e12f64..1.0e12) {
        let define = Define::float();
        let once = coerce(&json!(f), &define).unwrap().unwrap();
        let twice = coerce(&once.to_json(), &define).unwrap().unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn struct_coercion_is_idempotent(
        lat in -90.0f64..90.0,
        lon in -180.0f64..180.0,
        tags in proptest::collection::vec("[a-z]{1,8}", 0..4),
    ) {
        let define = location();
        let raw = json!({ "lat": lat, "lon": lon, "tags": tags, "extra": 1 });
        let once = coerce(&raw, &define).unwrap().unwrap();
        let twice = coerce(&once.to_json(), &define).unwrap().unwrap();
        prop_assert_eq!(once, twice);
    }
}
