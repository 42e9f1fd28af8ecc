use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};

/// Structured flag value, a JSON object.
pub type ValueMap = serde_json::Map<String, serde_json::Value>;

/// Represents the decided value of a feature flag.
///
/// # Examples
///
/// ```rust
/// use flageval::Value;
///
/// let bool_val = Value::Bool(true);
/// let int_val = Value::Int(42);
/// let str_val: Value = "variant-a".into();
/// ```
#[derive(PartialEq, Debug, Clone)]
pub enum Value {
    /// An on/off value.
    Bool(bool),
    /// A whole number value.
    Int(i64),
    /// A decimal number value.
    Float(f64),
    /// A text value.
    String(String),
    /// A structured value.
    Map(ValueMap),
}

impl Value {
    /// Reads the value as `bool`. Returns [`None`] if it's not a [`Value::Bool`].
    pub fn as_bool(&self) -> Option<bool> {
        if let Value::Bool(val) = self {
            return Some(*val);
        }
        None
    }

    /// Reads the value as `i64`. Returns [`None`] if it's not a [`Value::Int`].
    pub fn as_int(&self) -> Option<i64> {
        if let Value::Int(val) = self {
            return Some(*val);
        }
        None
    }

    /// Reads the value as `f64`. Returns [`None`] if it's not a [`Value::Float`].
    pub fn as_float(&self) -> Option<f64> {
        if let Value::Float(val) = self {
            return Some(*val);
        }
        None
    }

    /// Reads the value as `&str`. Returns [`None`] if it's not a [`Value::String`].
    pub fn as_str(&self) -> Option<&str> {
        if let Value::String(val) = self {
            return Some(val.as_str());
        }
        None
    }

    /// Reads the value as a map. Returns [`None`] if it's not a [`Value::Map`].
    pub fn as_map(&self) -> Option<&ValueMap> {
        if let Value::Map(val) = self {
            return Some(val);
        }
        None
    }

    /// Creates a [`Value`] from a [`serde_json::Value`]. Returns [`None`] for `null` and arrays.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use flageval::Value;
    ///
    /// let json_str = serde_json::Value::String("foo".to_owned());
    /// assert_eq!(Value::String("foo".to_owned()), Value::from_json_val(&json_str).unwrap())
    /// ```
    pub fn from_json_val(json_val: &serde_json::Value) -> Option<Value> {
        match json_val {
            serde_json::Value::Bool(val) => Some(Value::Bool(*val)),
            serde_json::Value::String(val) => Some(Value::String(val.clone())),
            serde_json::Value::Number(val) => {
                if let Some(int_val) = val.as_i64() {
                    return Some(Value::Int(int_val));
                }
                if let Some(float_val) = val.as_f64() {
                    return Some(Value::Float(float_val));
                }
                None
            }
            serde_json::Value::Object(val) => Some(Value::Map(val.clone())),
            _ => None,
        }
    }

    /// Converts the value into its [`serde_json::Value`] form.
    pub fn to_json_val(&self) -> serde_json::Value {
        match self {
            Value::Bool(val) => serde_json::Value::Bool(*val),
            Value::Int(val) => serde_json::Value::from(*val),
            Value::Float(val) => serde_json::Number::from_f64(*val)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(val) => serde_json::Value::String(val.clone()),
            Value::Map(val) => serde_json::Value::Object(val.clone()),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Bool(val) => write!(f, "{val}"),
            Value::Int(val) => write!(f, "{val}"),
            Value::Float(val) => write!(f, "{val}"),
            Value::String(val) => f.write_str(val),
            Value::Map(val) => match serde_json::to_string(val) {
                Ok(json) => f.write_str(json.as_str()),
                Err(_) => f.write_str("<invalid map>"),
            },
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Bool(val) => serializer.serialize_bool(*val),
            Value::Int(val) => serializer.serialize_i64(*val),
            Value::Float(val) => serializer.serialize_f64(*val),
            Value::String(val) => serializer.serialize_str(val),
            Value::Map(val) => val.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let json = serde_json::Value::deserialize(deserializer)?;
        Value::from_json_val(&json).ok_or_else(|| {
            D::Error::custom(format!(
                "unsupported flag value '{json}', expected a bool, number, string or object"
            ))
        })
    }
}

pub trait OptionalValueDisplay {
    fn to_str(&self) -> String;
}

impl OptionalValueDisplay for Option<Value> {
    fn to_str(&self) -> String {
        match self {
            None => "none".to_owned(),
            Some(value) => format!("{value}"),
        }
    }
}

const SIGNIFICANT_DIGITS: usize = 15;

/// Formats a float with 15 significant digits, dropping trailing zeros and switching to
/// exponent notation when the decimal exponent is below -4 or at least 15.
pub(crate) fn format_float(val: f64) -> String {
    if val.is_nan() {
        return "NaN".to_owned();
    }
    if val.is_infinite() {
        return if val.is_sign_positive() {
            "+Inf".to_owned()
        } else {
            "-Inf".to_owned()
        };
    }
    if val == 0.0 {
        return "0".to_owned();
    }
    // `{:.14e}` rounds to exactly 15 significant digits, e.g. "1.50000000000000e2".
    let sci = format!("{:.*e}", SIGNIFICANT_DIGITS - 1, val);
    let (mantissa, exp) = match sci.split_once('e') {
        Some(parts) => parts,
        None => return sci,
    };
    let exp: i32 = exp.parse().unwrap_or(0);
    let negative = mantissa.starts_with('-');
    let digits: String = mantissa.chars().filter(|c| c.is_ascii_digit()).collect();
    let digits = digits.trim_end_matches('0');
    let digits = if digits.is_empty() { "0" } else { digits };

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    if exp < -4 || exp >= SIGNIFICANT_DIGITS as i32 {
        out.push_str(&digits[..1]);
        if digits.len() > 1 {
            out.push('.');
            out.push_str(&digits[1..]);
        }
        let sign = if exp < 0 { '-' } else { '+' };
        out.push_str(format!("e{sign}{:02}", exp.abs()).as_str());
    } else if exp < 0 {
        out.push_str("0.");
        out.push_str("0".repeat((-exp - 1) as usize).as_str());
        out.push_str(digits);
    } else {
        let int_len = exp as usize + 1;
        if digits.len() <= int_len {
            out.push_str(digits);
            out.push_str("0".repeat(int_len - digits.len()).as_str());
        } else {
            out.push_str(&digits[..int_len]);
            out.push('.');
            out.push_str(&digits[int_len..]);
        }
    }
    out
}

from_val_to_enum!(Value String String);
from_val_to_enum!(Value Float f64);
from_val_to_enum!(Value Int i64);
from_val_to_enum!(Value Bool bool);
from_val_to_enum!(Value Map ValueMap);
from_val_to_enum_into!(Value Float f32);
from_val_to_enum_into!(Value Int i8 i16 i32 u8 u16 u32);
from_val_to_enum_into!(Value String &str);
