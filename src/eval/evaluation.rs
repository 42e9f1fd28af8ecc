use crate::errors::EvalError;
use crate::model::config::{RolloutVariation, Rule};
use crate::value::{format_float, Value, ValueMap};
use serde::Serialize;
use std::sync::Arc;

const MAP_VALUE_KEY: &str = "value";

/// The result of a flag evaluation.
///
/// The typed accessors never fail: when the evaluation carries an error, has no value, or the
/// value can't be converted, they return the given default.
///
/// # Examples
///
/// ```rust
/// use flageval::{Evaluation, Value};
///
/// let evaluation = Evaluation::from(Value::from("7"));
/// assert_eq!(evaluation.int(0), 7);
/// assert_eq!(evaluation.string("x"), "7");
/// assert!(evaluation.bool(false));
///
/// let missing = Evaluation::default();
/// assert!(missing.is_none());
/// assert_eq!(missing.int(42), 42);
/// ```
#[derive(Debug, Clone, Default, Serialize)]
pub struct Evaluation {
    /// The project of the evaluated flag.
    pub project: String,
    /// The environment of the evaluated flag.
    pub environment: String,
    /// The key of the evaluated flag.
    pub identifier: String,
    /// The decided value, [`None`] when the evaluation failed or produced no value.
    pub value: Option<Value>,
    /// The revision of the evaluated flag.
    #[serde(skip)]
    pub version: u64,
    /// The targeting rule (if any) that produced the value.
    #[serde(skip)]
    pub matched_rule: Option<Arc<Rule>>,
    /// The distribution variation (if any) that produced the value.
    #[serde(skip)]
    pub matched_variation: Option<Arc<RolloutVariation>>,
    /// Error in case evaluation failed.
    #[serde(skip)]
    pub error: Option<EvalError>,
}

impl Evaluation {
    pub(crate) fn from_err(identifier: &str, err: EvalError) -> Self {
        Self {
            identifier: identifier.to_owned(),
            error: Some(err),
            ..Evaluation::default()
        }
    }

    /// Returns the error that aborted the evaluation.
    pub fn error(&self) -> Option<&EvalError> {
        self.error.as_ref()
    }

    /// Returns `true` when there's no usable value, either because the evaluation failed or
    /// because it resolved to nothing.
    pub fn is_none(&self) -> bool {
        self.raw().is_none()
    }

    fn raw(&self) -> Option<&Value> {
        if self.error.is_some() {
            return None;
        }
        self.value.as_ref()
    }

    /// Reads the value as `bool`.
    ///
    /// Strings are `true` unless they are `"0"`, numbers are `true` when positive.
    pub fn bool(&self, default: bool) -> bool {
        match self.raw() {
            Some(Value::Bool(val)) => *val,
            Some(Value::String(val)) => val.eq_ignore_ascii_case("true") || val != "0",
            Some(Value::Int(val)) => *val > 0,
            Some(Value::Float(val)) => *val > 0.0,
            _ => default,
        }
    }

    /// Reads the value as `String`. Floats are formatted with 15 significant digits.
    pub fn string(&self, default: &str) -> String {
        match self.raw() {
            Some(Value::Bool(val)) => val.to_string(),
            Some(Value::String(val)) => val.clone(),
            Some(Value::Int(val)) => val.to_string(),
            Some(Value::Float(val)) => format_float(*val),
            _ => default.to_owned(),
        }
    }

    /// Reads the value as `i64`. Strings are parsed, floats are truncated toward zero.
    pub fn int(&self, default: i64) -> i64 {
        match self.raw() {
            Some(Value::Bool(val)) => i64::from(*val),
            Some(Value::String(val)) => val.parse().unwrap_or(default),
            Some(Value::Int(val)) => *val,
            Some(Value::Float(val)) => val.trunc() as i64,
            _ => default,
        }
    }

    /// Reads the value as `f64`. Strings are parsed.
    pub fn number(&self, default: f64) -> f64 {
        match self.raw() {
            Some(Value::Bool(val)) => f64::from(u8::from(*val)),
            Some(Value::String(val)) => val.parse().unwrap_or(default),
            Some(Value::Int(val)) => *val as f64,
            Some(Value::Float(val)) => *val,
            _ => default,
        }
    }

    /// Reads the value as a map.
    ///
    /// Strings are parsed as JSON objects, other scalars are wrapped as `{"value": <scalar>}`.
    pub fn map(&self, default: ValueMap) -> ValueMap {
        let wrap = |val: serde_json::Value| {
            let mut map = ValueMap::new();
            map.insert(MAP_VALUE_KEY.to_owned(), val);
            map
        };
        match self.raw() {
            Some(Value::Bool(val)) => wrap(serde_json::Value::Bool(*val)),
            Some(Value::String(val)) => serde_json::from_str(val).unwrap_or(default),
            Some(Value::Int(val)) => wrap(serde_json::Value::from(*val)),
            Some(Value::Float(val)) => wrap(serde_json::Value::String(val.to_string())),
            Some(Value::Map(val)) => val.clone(),
            None => default,
        }
    }
}

impl From<Value> for Evaluation {
    fn from(value: Value) -> Self {
        Self {
            value: Some(value),
            ..Evaluation::default()
        }
    }
}

#[cfg(test)]
mod evaluation_tests {
    use super::*;
    use serde_json::json;

    fn eval(value: impl Into<Value>) -> Evaluation {
        Evaluation::from(value.into())
    }

    #[test]
    fn defaults() {
        let none = Evaluation::default();
        assert!(none.is_none());
        assert_eq!(none.int(42), 42);
        assert!(none.bool(true));
        assert_eq!(none.string("x"), "x");
        assert_eq!(none.number(1.5), 1.5);
        assert!(none.map(ValueMap::new()).is_empty());
    }

    #[test]
    fn error_hides_value() {
        let evaluation = Evaluation {
            value: Some(Value::Int(3)),
            error: Some(EvalError::ConfigurationNotFound("f".to_owned())),
            ..Evaluation::default()
        };
        assert!(evaluation.is_none());
        assert_eq!(evaluation.int(42), 42);
        assert!(evaluation.error().is_some());
    }

    #[test]
    fn bool_coercion() {
        assert!(eval(true).bool(false));
        assert!(eval("TRUE").bool(false));
        assert!(eval("false").bool(false));
        assert!(!eval("0").bool(true));
        assert!(eval(2).bool(false));
        assert!(!eval(0).bool(true));
        assert!(!eval(-1.5).bool(true));
        assert!(eval(0.5).bool(false));
    }

    #[test]
    fn string_coercion() {
        assert_eq!(eval(true).string("x"), "true");
        assert_eq!(eval(false).string("x"), "false");
        assert_eq!(eval("abc").string("x"), "abc");
        assert_eq!(eval(-12).string("x"), "-12");
        assert_eq!(eval(2.5).string("x"), "2.5");
        assert_eq!(eval(1.0 / 3.0).string("x"), "0.333333333333333");
        let map = Value::Map(json!({"a": 1}).as_object().unwrap().clone());
        assert_eq!(eval(map).string("x"), "x");
    }

    #[test]
    fn int_coercion() {
        assert_eq!(eval(true).int(5), 1);
        assert_eq!(eval(false).int(5), 0);
        assert_eq!(eval("7").int(0), 7);
        assert_eq!(eval("abc").int(5), 5);
        assert_eq!(eval("7.5").int(5), 5);
        assert_eq!(eval(9).int(0), 9);
        assert_eq!(eval(2.9).int(0), 2);
        assert_eq!(eval(-2.9).int(0), -2);
    }

    #[test]
    fn number_coercion() {
        assert_eq!(eval(true).number(5.0), 1.0);
        assert_eq!(eval("7.25").number(0.0), 7.25);
        assert_eq!(eval("abc").number(5.0), 5.0);
        assert_eq!(eval(9).number(0.0), 9.0);
        assert_eq!(eval(1.5f32).number(0.0), 1.5);
    }

    #[test]
    fn map_coercion() {
        assert_eq!(serde_json::Value::Object(eval(true).map(ValueMap::new())), json!({"value": true}));
        assert_eq!(serde_json::Value::Object(eval(4).map(ValueMap::new())), json!({"value": 4}));
        assert_eq!(
            serde_json::Value::Object(eval(0.1).map(ValueMap::new())),
            json!({"value": "0.1"})
        );
        assert_eq!(
            serde_json::Value::Object(eval(r#"{"b": [1]}"#).map(ValueMap::new())),
            json!({"b": [1]})
        );
        let mut default = ValueMap::new();
        default.insert("d".to_owned(), json!(1));
        assert_eq!(eval("not json").map(default.clone()), default);
        assert_eq!(eval("[1, 2]").map(default.clone()), default);
    }

    #[test]
    fn serializes_public_fields() {
        let evaluation = Evaluation {
            project: "shop".to_owned(),
            environment: "prod".to_owned(),
            identifier: "checkout".to_owned(),
            value: Some(Value::from("new")),
            version: 2,
            ..Evaluation::default()
        };
        assert_eq!(
            serde_json::to_value(&evaluation).unwrap(),
            json!({"project": "shop", "environment": "prod", "identifier": "checkout", "value": "new"})
        );
    }
}
