use flageval::{EvalError, Evaluation, Value, ValueMap};

fn map(json: serde_json::Value) -> ValueMap {
    json.as_object().cloned().unwrap_or_default()
}

#[test]
fn defaults_guard_missing_values() {
    assert_eq!(Evaluation::default().int(42), 42);
    assert_eq!(Evaluation::from(Value::from("7")).int(0), 7);
    assert_eq!(Evaluation::from(Value::from("abc")).int(5), 5);
    assert_eq!(Evaluation::from(Value::Bool(true)).string("x"), "true");
}

#[test]
fn errors_behave_like_missing_values() {
    let failed = Evaluation {
        identifier: "flag".to_owned(),
        value: Some(Value::Bool(true)),
        error: Some(EvalError::NoRulesSpecified("flag".to_owned())),
        ..Evaluation::default()
    };
    assert!(failed.is_none());
    assert!(!failed.bool(false));
    assert_eq!(failed.string("d"), "d");
    assert_eq!(failed.int(-1), -1);
    assert_eq!(failed.number(0.5), 0.5);
    assert_eq!(failed.map(map(serde_json::json!({"d": 1}))), map(serde_json::json!({"d": 1})));
}

#[test]
fn coercion_table() {
    let tests: Vec<(Value, bool, &str, i64, f64, serde_json::Value)> = vec![
        (Value::Bool(true), true, "true", 1, 1.0, serde_json::json!({"value": true})),
        (Value::Bool(false), false, "false", 0, 0.0, serde_json::json!({"value": false})),
        (Value::from("12"), true, "12", 12, 12.0, serde_json::json!({"d": 0})),
        (Value::from("0"), false, "0", 0, 0.0, serde_json::json!({"d": 0})),
        (Value::from("1.5"), true, "1.5", -1, 1.5, serde_json::json!({"d": 0})),
        (Value::from(r#"{"k": "v"}"#), true, r#"{"k": "v"}"#, -1, -1.0, serde_json::json!({"k": "v"})),
        (Value::Int(-3), false, "-3", -3, -3.0, serde_json::json!({"value": -3})),
        (Value::Float(7.9), true, "7.9", 7, 7.9, serde_json::json!({"value": "7.9"})),
        (Value::Float(1e21), true, "1e+21", i64::MAX, 1e21, serde_json::json!({"value": "1000000000000000000000"})),
        (Value::from(0.5f32), true, "0.5", 0, 0.5, serde_json::json!({"value": "0.5"})),
    ];

    for (value, b, s, i, n, m) in tests {
        let evaluation = Evaluation::from(value.clone());
        assert_eq!(evaluation.bool(!b), b, "{value}");
        assert_eq!(evaluation.string("?"), s, "{value}");
        assert_eq!(evaluation.int(-1), i, "{value}");
        assert_eq!(evaluation.number(-1.0), n, "{value}");
        assert_eq!(
            serde_json::Value::Object(evaluation.map(map(serde_json::json!({"d": 0})))),
            m,
            "{value}"
        );
    }
}

#[test]
fn structured_values() {
    let value = Value::Map(map(serde_json::json!({"limits": {"max": 3}})));
    let evaluation = Evaluation::from(value.clone());
    assert_eq!(evaluation.map(ValueMap::new()), map(serde_json::json!({"limits": {"max": 3}})));
    assert_eq!(evaluation.string("d"), "d");
    assert_eq!(evaluation.int(4), 4);
    assert!(evaluation.bool(true));
    assert!(!evaluation.is_none());
}
