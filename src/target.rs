use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt::{Display, Formatter};

/// Name that binds the whole [`Target`] inside rule expressions.
pub const TARGET: &str = "target";

/// Describes the entity a flag is evaluated for (a user, a device, a tenant, ...).
///
/// Attributes are referenced from rule expressions as `target.<attribute>` and may be used as
/// the bucketing key of a distribution. Attributes are kept sorted, so the JSON form of a
/// target is stable and can be hashed for whole-target bucketing.
///
/// # Examples:
///
/// ```rust
/// use flageval::Target;
///
/// let target = Target::new()
///     .attr("id", "user-42")
///     .attr("country", "HU")
///     .attr("age", 31)
///     .attr("beta", true);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct Target {
    attributes: BTreeMap<String, serde_json::Value>,
}

impl Target {
    /// Initializes an empty [`Target`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an attribute of the target, replacing any previous value.
    pub fn attr<T: Into<serde_json::Value>>(mut self, key: &str, value: T) -> Self {
        self.attributes.insert(key.to_owned(), value.into());
        self
    }

    /// Returns the attribute stored under `key`.
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.attributes.get(key)
    }

    /// Returns `true` when the target has no attributes.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub(crate) fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.attributes
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }

    /// The text form of an attribute used as bucketing key. Missing, `null` and empty attributes
    /// yield [`None`].
    pub(crate) fn bucketing_key(&self, attr: &str) -> Option<String> {
        let key = match self.attributes.get(attr)? {
            serde_json::Value::Null => return None,
            serde_json::Value::String(val) => val.clone(),
            other => other.to_string(),
        };
        if key.is_empty() {
            return None;
        }
        Some(key)
    }
}

impl Display for Target {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match serde_json::to_string(self) {
            Ok(str) => write!(f, "{str}"),
            Err(_) => f.write_str("<invalid target>"),
        }
    }
}

impl<K: Into<String>, V: Into<serde_json::Value>> FromIterator<(K, V)> for Target {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            attributes: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl From<HashMap<String, serde_json::Value>> for Target {
    fn from(value: HashMap<String, serde_json::Value>) -> Self {
        value.into_iter().collect()
    }
}

impl From<BTreeMap<String, serde_json::Value>> for Target {
    fn from(value: BTreeMap<String, serde_json::Value>) -> Self {
        Self { attributes: value }
    }
}
