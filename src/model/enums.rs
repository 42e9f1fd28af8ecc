use std::fmt::{Display, Formatter};

/// Selects what a distribution hashes to place a target into a percentage bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketingStrategy<'a> {
    /// Hashes the serialized whole target. Any change of any attribute may move the target
    /// into another bucket.
    WholeTarget,
    /// Hashes a single target attribute. Targets without the attribute are never placed into a
    /// weighted bucket.
    Attribute(&'a str),
}

impl Display for BucketingStrategy<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BucketingStrategy::WholeTarget => f.write_str("whole target"),
            BucketingStrategy::Attribute(attr) => write!(f, "target.{attr}"),
        }
    }
}

/// Controls how a failed lookup of a prerequisite flag is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrerequisitePolicy {
    /// The prerequisite is skipped as if it was satisfied. A warning is logged.
    #[default]
    FailOpen,
    /// The lookup error aborts the evaluation.
    FailClosed,
}

impl Display for PrerequisitePolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PrerequisitePolicy::FailOpen => f.write_str("fail open"),
            PrerequisitePolicy::FailClosed => f.write_str("fail closed"),
        }
    }
}
