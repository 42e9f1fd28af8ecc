use crate::builder::{EvaluatorBuilder, Options};
use crate::errors::EvalError;
use crate::eval::bucketing::BucketingEngine;
use crate::eval::evaluation::Evaluation;
use crate::eval::log_builder::EvalLogBuilder;
use crate::eval::prerequisite::PrerequisiteChecker;
use crate::eval::resolver::{Resolved, ValueResolver};
use crate::eval::rules::RuleEngine;
use crate::logger::{DEPRECATED_FLAG_EVENT_ID, EVAL_LOG_EVENT_ID};
use crate::model::config::Configuration;
use crate::provider::DataProvider;
use crate::target::Target;
use crate::value::OptionalValueDisplay;
use log::Level;
use std::sync::Arc;

/// Evaluates feature flags.
///
/// The evaluator keeps no state between calls; every evaluation reads the flag configuration
/// and the referenced variables from the [`DataProvider`] again. It can be shared between
/// threads, concurrent evaluations don't block each other.
///
/// # Examples
///
/// ```rust
/// use flageval::{Configuration, Evaluator, MapDataProvider, Rule, Target, Value};
/// use std::sync::Arc;
///
/// let provider = MapDataProvider::from([Configuration {
///     identifier: "greeting".to_owned(),
///     on: true,
///     off_value: Some(Value::from("hello")),
///     rules: vec![Arc::new(Rule {
///         expression: "target.country == \"HU\"".to_owned(),
///         value: Some(Value::from("szia")),
///     })],
///     ..Configuration::default()
/// }]);
///
/// let evaluator = Evaluator::new(provider);
/// let target = Target::new().attr("country", "HU");
/// assert_eq!(evaluator.evaluate("greeting", &target).string(""), "szia");
/// ```
pub struct Evaluator {
    options: Arc<Options>,
}

impl Evaluator {
    /// Creates a new [`Evaluator`] reading from `provider` with default options.
    pub fn new(provider: impl DataProvider + 'static) -> Self {
        Self::with_options(Options::new(Box::new(provider)))
    }

    /// Creates a new [`EvaluatorBuilder`] used to build an [`Evaluator`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use flageval::{Evaluator, MapDataProvider, Murmur3Hasher};
    ///
    /// let evaluator = Evaluator::builder()
    ///     .provider(Box::new(MapDataProvider::default()))
    ///     .hasher(Box::new(Murmur3Hasher))
    ///     .build()
    ///     .unwrap();
    /// ```
    pub fn builder() -> EvaluatorBuilder {
        EvaluatorBuilder::new()
    }

    pub(crate) fn with_options(options: Options) -> Self {
        Self {
            options: Arc::new(options),
        }
    }

    pub(crate) fn options(&self) -> &Options {
        &self.options
    }

    /// Evaluates the flag identified by `key` for the given `target`.
    ///
    /// Failures never panic and are never returned directly; they're carried by
    /// [`Evaluation::error`] and make the typed accessors fall back to their defaults.
    pub fn evaluate(&self, key: &str, target: &Target) -> Evaluation {
        let config = match self.options().provider().get_configuration(key) {
            Ok(config) => config,
            Err(err) => {
                self.log_error(key, &err);
                return Evaluation::from_err(key, err);
            }
        };
        self.eval_config(&config, target)
    }

    /// Evaluates every flag the [`DataProvider`] lists for the given `target`, in the order of
    /// [`DataProvider::configuration_keys`].
    pub fn evaluate_all(&self, target: &Target) -> Vec<Evaluation> {
        self.options()
            .provider()
            .configuration_keys()
            .iter()
            .map(|key| self.evaluate(key, target))
            .collect()
    }

    fn eval_config(&self, config: &Configuration, target: &Target) -> Evaluation {
        let logger = self.options().logger();
        if config.deprecated && logger.enabled(Level::Warn) {
            logger.log(
                Level::Warn,
                DEPRECATED_FLAG_EVENT_ID,
                format!(
                    "Flag '{}' is deprecated and will be removed in a future release.",
                    config.identifier
                )
                .as_str(),
            );
        }

        let mut log = EvalLogBuilder::new(logger.enabled(Level::Info));
        if log.enabled() {
            log.append(format!("Evaluating {config} for target {target}").as_str())
                .inc_indent();
        }

        let result = self.resolve(config, target, &mut log);
        let mut evaluation = Evaluation {
            project: config.project.clone(),
            environment: config.environment.clone(),
            identifier: config.identifier.clone(),
            version: config.version,
            ..Evaluation::default()
        };
        match result {
            Ok(resolved) => {
                if log.enabled() {
                    log.dec_indent().new_ln(Some(
                        format!("Returning '{}'.", resolved.value.to_str()).as_str(),
                    ));
                    logger.log(Level::Info, EVAL_LOG_EVENT_ID, log.content());
                }
                evaluation.value = resolved.value;
                evaluation.matched_rule = resolved.rule;
                evaluation.matched_variation = resolved.variation;
            }
            Err(err) => {
                if log.enabled() {
                    log.dec_indent().new_ln(Some(format!("Failed: {err}").as_str()));
                    logger.log(Level::Info, EVAL_LOG_EVENT_ID, log.content());
                }
                self.log_error(config.identifier.as_str(), &err);
                evaluation.error = Some(err);
            }
        }
        evaluation
    }

    fn resolve(
        &self,
        config: &Configuration,
        target: &Target,
        log: &mut EvalLogBuilder,
    ) -> Result<Resolved, EvalError> {
        let options = self.options();
        let resolver = ValueResolver::new(
            RuleEngine::new(options.provider(), options.engine()),
            BucketingEngine::new(options.hasher()),
        );
        PrerequisiteChecker::new(
            options.provider(),
            &resolver,
            options.logger(),
            options.prerequisite_policy(),
        )
        .check(config, target, log)?;
        resolver.resolve(config, target, log)
    }

    fn log_error(&self, key: &str, err: &EvalError) {
        let logger = self.options().logger();
        if logger.enabled(Level::Error) {
            logger.log(
                Level::Error,
                err.kind().code(),
                format!("Failed to evaluate flag '{key}' ({err}).").as_str(),
            );
        }
    }
}
