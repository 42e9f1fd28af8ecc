//! Feature flag evaluation engine.
//!
//! Decides the value of a flag for a [`Target`] from the flag's [`Configuration`]: its on/off
//! switch, ordered targeting rules, prerequisite flags and a weighted [`Distribution`] that
//! buckets targets by a stable hash.

#![warn(missing_docs)]

#[macro_use]
mod macros;
mod builder;
mod errors;
mod eval;
mod evaluator;
mod expr;
mod hash;
mod logger;
mod model;
mod provider;
mod target;
mod value;

pub use builder::EvaluatorBuilder;
pub use errors::{ErrorKind, EvalError};
pub use eval::bucketing::{Bucketed, BucketingEngine};
pub use eval::evaluation::Evaluation;
pub use evaluator::Evaluator;

pub use expr::{variables, Bindings, EvalexprEngine, ExpressionEngine};
pub use hash::{Hasher32, Murmur3Hasher};
pub use logger::{DefaultLogger, Logger, LOG_TARGET};

pub use model::config::{
    Configuration, Distribution, Prerequisite, RolloutVariation, Rule, Variable,
};
pub use model::enums::{BucketingStrategy, PrerequisitePolicy};

pub use provider::{
    file::FileDataProvider, file::FlagData, file::SimplifiedConfig, map::MapDataProvider,
    DataProvider,
};

pub use target::{Target, TARGET};
pub use value::{Value, ValueMap};
