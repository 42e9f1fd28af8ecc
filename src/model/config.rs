use crate::model::enums::BucketingStrategy;
use crate::value::Value;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{Display, Formatter};
use std::sync::Arc;

const INVALID_VALUE_TXT: &str = "<invalid value>";

/// Describes a named value that rule expressions can reference.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Variable {
    /// The name the variable is referenced by.
    pub identifier: String,
    /// The current value of the variable.
    #[serde(default)]
    pub value: serde_json::Value,
}

/// Describes a targeting rule.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Rule {
    /// The condition of the rule. An empty expression matches every target.
    #[serde(default)]
    pub expression: String,
    /// The value served when the condition is true. A matching rule without a value is
    /// treated as if no rule matched.
    #[serde(default)]
    pub value: Option<Value>,
}

impl Display for Rule {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.expression.trim().is_empty() {
            write!(f, "ALWAYS THEN '{}'", display_opt(&self.value))
        } else {
            write!(f, "IF {} THEN '{}'", self.expression, display_opt(&self.value))
        }
    }
}

/// Describes a dependency on the evaluated value of another flag.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Prerequisite {
    /// The key of the prerequisite flag.
    pub identifier: String,
    /// The value the prerequisite flag has to evaluate to.
    pub value: Value,
}

impl Display for Prerequisite {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}' EQUALS '{}'", self.identifier, self.value)
    }
}

/// Describes a weighted variation of a [`Distribution`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RolloutVariation {
    /// The served value of the variation.
    #[serde(alias = "__value__")]
    pub variation: Value,
    /// A number between 0 and 100 that represents the share of targets receiving the variation.
    #[serde(alias = "__weight__")]
    pub weight: i64,
}

impl Display for RolloutVariation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%: '{}'", self.weight, self.variation)
    }
}

/// Describes a percentage based rollout.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Distribution {
    /// The target attribute used as bucketing key. The whole target is hashed when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket_by: Option<String>,
    /// The variations in evaluation order.
    #[serde(default)]
    pub variations: Vec<Arc<RolloutVariation>>,
}

impl Distribution {
    /// Returns the [`BucketingStrategy`] of the distribution.
    pub fn strategy(&self) -> BucketingStrategy<'_> {
        match self.bucket_by.as_deref() {
            Some(attr) if !attr.is_empty() => BucketingStrategy::Attribute(attr),
            _ => BucketingStrategy::WholeTarget,
        }
    }
}

/// Describes a feature flag.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Configuration {
    /// The project the flag belongs to.
    #[serde(default)]
    pub project: String,
    /// The environment the flag belongs to.
    #[serde(default)]
    pub environment: String,
    /// The key of the flag.
    pub identifier: String,
    /// Whether the flag is scheduled for removal.
    #[serde(default)]
    pub deprecated: bool,
    /// When `false`, `off_value` is served without consulting rules or the distribution.
    #[serde(default)]
    pub on: bool,
    /// The value describing the flag's on state.
    #[serde(default)]
    pub on_value: Option<Value>,
    /// The value served when the flag is off or nothing else matched.
    #[serde(default)]
    pub off_value: Option<Value>,
    /// The targeting rules, evaluated in order; the first match wins.
    #[serde(default, deserialize_with = "nullable_vec")]
    pub rules: Vec<Arc<Rule>>,
    /// The flags that have to evaluate to given values before this flag is evaluated.
    #[serde(default, deserialize_with = "nullable_vec")]
    pub prerequisites: Vec<Prerequisite>,
    /// The percentage based rollout.
    #[serde(default)]
    pub distribution: Option<Distribution>,
    /// Revision of the flag.
    #[serde(default)]
    pub version: u64,
}

impl Display for Configuration {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}'", self.identifier)?;
        if !self.project.is_empty() || !self.environment.is_empty() {
            write!(f, " ({}/{})", self.project, self.environment)?;
        }
        write!(f, " v{}", self.version)
    }
}

pub(crate) fn display_opt(value: &Option<Value>) -> String {
    match value {
        Some(val) => format!("{val}"),
        None => INVALID_VALUE_TXT.to_owned(),
    }
}

fn nullable_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
