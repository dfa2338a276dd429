use schemajson_convert::{json_to_schema, schema_to_json, ConvertError, ConverterConfig, SchemaConverter};
use schemajson_registry::EmptyRegistry;
use schemajson_types::{
    DataType, DateUnit, Field, IntervalUnit, Metadata, Schema, TimeUnit,
};
use serde_json::{json, Value};

fn nulls() -> Schema {
    Schema::new(vec![
        Field::new("f0", DataType::Null, true),
        Field::new("f1", DataType::Null, false),
    ])
}

fn primitives() -> Schema {
    Schema::new(vec![
        Field::new("f0", DataType::Boolean, true),
        Field::new("f1", DataType::int8(), true),
        Field::new("f2", DataType::int16(), true),
        Field::new("f3", DataType::int32(), true),
        Field::new("f4", DataType::int64(), true),
        Field::new("f5", DataType::uint8(), true),
        Field::new("f6", DataType::uint16(), true),
        Field::new("f7", DataType::uint32(), true),
        Field::new("f8", DataType::uint64(), true),
        Field::new("f9", DataType::float16(), true),
        Field::new("f10", DataType::float32(), true),
        Field::new("f11", DataType::float64(), true),
        Field::new("f12", DataType::FixedSizeBinary(3), true),
        Field::new("f13", DataType::Decimal { precision: 19, scale: 4 }, true),
    ])
}

fn strings() -> Schema {
    Schema::new(vec![
        Field::new("f0", DataType::Utf8, true),
        Field::new("f1", DataType::Binary, false),
    ])
}

fn datetimes() -> Schema {
    Schema::new(vec![
        Field::new("f0", DataType::Date(DateUnit::Day), true),
        Field::new("f1", DataType::Date(DateUnit::Millisecond), true),
        Field::new("f2", DataType::Time32(TimeUnit::Second), true),
        Field::new("f3", DataType::Time32(TimeUnit::Millisecond), true),
        Field::new("f4", DataType::Time64(TimeUnit::Microsecond), true),
        Field::new("f5", DataType::Time64(TimeUnit::Nanosecond), true),
        Field::new("f6", DataType::timestamp(TimeUnit::Second, ""), true),
        Field::new("f7", DataType::timestamp(TimeUnit::Millisecond, "UTC"), true),
        Field::new("f8", DataType::timestamp(TimeUnit::Microsecond, "America/New_York"), true),
        Field::new("f9", DataType::timestamp(TimeUnit::Nanosecond, "+07:30"), true),
    ])
}

fn intervals_and_durations() -> Schema {
    Schema::new(vec![
        Field::new("f0", DataType::Interval(IntervalUnit::YearMonth), true),
        Field::new("f1", DataType::Interval(IntervalUnit::DayTime), true),
        Field::new("f2", DataType::Interval(IntervalUnit::MonthDayNano), true),
        Field::new("f3", DataType::Duration(TimeUnit::Second), true),
        Field::new("f4", DataType::Duration(TimeUnit::Millisecond), true),
        Field::new("f5", DataType::Duration(TimeUnit::Microsecond), true),
        Field::new("f6", DataType::Duration(TimeUnit::Nanosecond), true),
    ])
}

fn lists() -> Schema {
    let inner = DataType::list(Field::new("item", DataType::int16(), true));
    Schema::new(vec![
        Field::new("f0", DataType::list(Field::new("item", DataType::int32(), false)), true),
        Field::new("f1", DataType::list(Field::new("item", inner, true)), true),
        Field::new(
            "f2",
            DataType::fixed_size_list(Field::new("item", DataType::float32(), true), 4),
            false,
        ),
        Field::new("f3", DataType::fixed_size_list(Field::new("item", DataType::Utf8, true), 0), true),
    ])
}

fn structs() -> Schema {
    let inner = DataType::struct_(vec![
        Field::new("a", DataType::int32(), true),
        Field::new("b", DataType::Utf8, false),
    ]);
    Schema::new(vec![
        Field::new("f0", DataType::struct_(vec![]), true),
        Field::new(
            "f1",
            DataType::struct_(vec![
                Field::new("x", inner, true),
                Field::new("y", DataType::list(Field::new("item", DataType::Boolean, true)), true),
            ]),
            false,
        ),
    ])
}

fn maps() -> Schema {
    let nested_item = DataType::list(Field::new("item", DataType::float64(), true));
    Schema::new(vec![
        Field::new(
            "f0",
            DataType::map(
                Field::new("key", DataType::Utf8, false),
                Field::new("value", DataType::int32(), true),
                false,
            ),
            true,
        ),
        Field::new(
            "f1",
            DataType::map(
                Field::new("key", DataType::int64(), false),
                Field::new("value", nested_item, true),
                true,
            ),
            false,
        ),
    ])
}

fn with_metadata() -> Schema {
    let field_metadata: Metadata = [("k", "1"), ("other", "x"), ("k", "2")].into_iter().collect();
    Schema::new(vec![
        Field::new("plain", DataType::Utf8, true),
        Field::new("annotated", DataType::int32(), false).with_metadata(field_metadata),
        Field::new(
            "nested",
            DataType::struct_(vec![Field::new("inner", DataType::Boolean, true)
                .with_metadata([("", ""), ("unicode", "✓")].into_iter().collect())]),
            true,
        ),
    ])
    .with_metadata([("b", "2"), ("a", "1"), ("b", "3")].into_iter().collect())
}

fn all_schemas() -> Vec<(&'static str, Schema)> {
    vec![
        ("nulls", nulls()),
        ("primitives", primitives()),
        ("strings", strings()),
        ("datetimes", datetimes()),
        ("intervals_and_durations", intervals_and_durations()),
        ("lists", lists()),
        ("structs", structs()),
        ("maps", maps()),
        ("with_metadata", with_metadata()),
    ]
}

#[test]
fn test_round_trip_preserves_schema() {
    for (name, schema) in all_schemas() {
        let json = schema_to_json(&schema).unwrap();
        let back = json_to_schema(&json).unwrap();
        assert_eq!(back, schema, "schema {}", name);
    }
}

#[test]
fn test_json_is_idempotent() {
    for (name, schema) in all_schemas() {
        let first = schema_to_json(&schema).unwrap();
        let second = schema_to_json(&json_to_schema(&first).unwrap()).unwrap();
        assert_eq!(first, second, "schema {}", name);
    }
}

#[test]
fn test_survives_text_serialization() {
    for (name, schema) in all_schemas() {
        let text = serde_json::to_string_pretty(&schema_to_json(&schema).unwrap()).unwrap();
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json_to_schema(&parsed).unwrap(), schema, "schema {}", name);
    }
}

#[test]
fn test_metadata_order_and_duplicates_kept() {
    let json = schema_to_json(&with_metadata()).unwrap();
    assert_eq!(
        json["schema"]["metadata"],
        json!([
            {"key": "b", "value": "2"},
            {"key": "a", "value": "1"},
            {"key": "b", "value": "3"},
        ])
    );
    assert_eq!(
        json["schema"]["fields"][1]["metadata"],
        json!([
            {"key": "k", "value": "1"},
            {"key": "other", "value": "x"},
            {"key": "k", "value": "2"},
        ])
    );
}

#[test]
fn test_handwritten_document() {
    let document = json!({
        "schema": {
            "fields": [
                {
                    "name": "MapField",
                    "nullable": true,
                    "type": {"name": "map", "keySorted": true},
                    "children": [{
                        "key": {"name": "key", "nullable": false, "type": {"name": "int", "isSigned": true, "bitWidth": 32}},
                        "item": {"name": "value", "nullable": true, "type": {"name": "utf8"}},
                    }],
                },
                {
                    "name": "when",
                    "nullable": false,
                    "type": {"name": "time", "isSigned": false, "bitWidth": 32, "unit": "MILLISECOND"},
                },
            ],
        }
    });
    let schema = json_to_schema(&document).unwrap();
    assert_eq!(
        schema,
        Schema::new(vec![
            Field::new(
                "MapField",
                DataType::map(
                    Field::new("key", DataType::int32(), false),
                    Field::new("value", DataType::Utf8, true),
                    true,
                ),
                true,
            ),
            Field::new("when", DataType::Time32(TimeUnit::Millisecond), false),
        ])
    );
    assert_eq!(schema_to_json(&schema).unwrap(), document);
}

#[test]
fn test_first_bad_field_aborts() {
    let document = json!({
        "schema": {
            "fields": [
                {"name": "a", "nullable": true, "type": {"name": "utf8"}},
                {"name": "b", "nullable": true, "type": {"name": "struct"}},
                {"name": "c", "nullable": true, "type": {"name": "largeutf8"}},
            ],
        }
    });
    let err = json_to_schema(&document).unwrap_err();
    assert!(matches!(err, ConvertError::MalformedInput { ref path, .. } if path == "b"), "{}", err);
}

fn deep_list(levels: usize) -> DataType {
    let mut data_type = DataType::int32();
    for i in 0..levels {
        data_type = DataType::list(Field::new(format!("l{}", i), data_type, true));
    }
    data_type
}

#[test]
fn test_depth_limit_applies_both_ways() {
    let schema = Schema::new(vec![Field::new("root", deep_list(8), true)]);
    let json = schema_to_json(&schema).unwrap();

    let tight = SchemaConverter::with_config(&EmptyRegistry, ConverterConfig::default().with_max_depth(4));
    assert!(matches!(
        tight.schema_to_json(&schema).unwrap_err(),
        ConvertError::NestingTooDeep { limit: 4, .. }
    ));
    assert!(matches!(
        tight.json_to_schema(&json).unwrap_err(),
        ConvertError::NestingTooDeep { limit: 4, .. }
    ));

    // root plus eight list levels
    let exact = SchemaConverter::with_config(&EmptyRegistry, ConverterConfig::default().with_max_depth(9));
    assert_eq!(exact.json_to_schema(&json).unwrap(), schema);
}

#[test]
fn test_sizes_refused_by_both_directions_alike() {
    let cases = vec![
        (DataType::FixedSizeBinary(-1), json!({"name": "fixedsizebinary", "byteWidth": -1}), None),
        (
            DataType::fixed_size_list(Field::new("item", DataType::float64(), true), -3),
            json!({"name": "fixedsizelist", "listSize": -3}),
            Some(json!([{"name": "item", "nullable": true, "type": {"name": "floatingpoint", "precision": "DOUBLE"}}])),
        ),
    ];
    for (data_type, type_json, children) in cases {
        let encoded = schema_to_json(&Schema::new(vec![Field::new("f", data_type, true)])).unwrap_err();

        let mut field = json!({"name": "f", "nullable": true, "type": type_json});
        if let Some(children) = children {
            field["children"] = children;
        }
        let decoded = json_to_schema(&json!({"schema": {"fields": [field]}})).unwrap_err();

        assert!(matches!(encoded, ConvertError::InvalidValue { ref path, .. } if path == "f"), "{}", encoded);
        assert_eq!(encoded.to_string(), decoded.to_string());
    }
}
