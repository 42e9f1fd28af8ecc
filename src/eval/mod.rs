pub mod bucketing;
pub mod evaluation;
pub mod log_builder;
pub mod prerequisite;
pub mod resolver;
pub mod rules;
