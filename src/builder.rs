use crate::errors::EvalError;
use crate::expr::{EvalexprEngine, ExpressionEngine};
use crate::hash::{Hasher32, Murmur3Hasher};
use crate::logger::{DefaultLogger, Logger};
use crate::model::enums::PrerequisitePolicy;
use crate::provider::DataProvider;
use crate::Evaluator;
use log::Level;
use std::borrow::Borrow;

pub struct Options {
    provider: Box<dyn DataProvider>,
    engine: Box<dyn ExpressionEngine>,
    hasher: Box<dyn Hasher32>,
    logger: Box<dyn Logger>,
    prerequisite_policy: PrerequisitePolicy,
}

impl Options {
    pub(crate) fn new(provider: Box<dyn DataProvider>) -> Self {
        Self {
            provider,
            engine: Box::new(EvalexprEngine),
            hasher: Box::new(Murmur3Hasher),
            logger: Box::new(DefaultLogger),
            prerequisite_policy: PrerequisitePolicy::default(),
        }
    }

    pub(crate) fn provider(&self) -> &dyn DataProvider {
        self.provider.borrow()
    }

    pub(crate) fn engine(&self) -> &dyn ExpressionEngine {
        self.engine.borrow()
    }

    pub(crate) fn hasher(&self) -> &dyn Hasher32 {
        self.hasher.borrow()
    }

    pub(crate) fn logger(&self) -> &dyn Logger {
        self.logger.borrow()
    }

    pub(crate) fn prerequisite_policy(&self) -> PrerequisitePolicy {
        self.prerequisite_policy
    }
}

/// Builder to create an [`Evaluator`].
///
/// # Examples
///
/// ```rust
/// use flageval::{Evaluator, MapDataProvider, PrerequisitePolicy};
///
/// let evaluator = Evaluator::builder()
///     .provider(Box::new(MapDataProvider::default()))
///     .prerequisite_policy(PrerequisitePolicy::FailClosed)
///     .build()
///     .unwrap();
/// ```
#[derive(Default)]
pub struct EvaluatorBuilder {
    provider: Option<Box<dyn DataProvider>>,
    engine: Option<Box<dyn ExpressionEngine>>,
    hasher: Option<Box<dyn Hasher32>>,
    logger: Option<Box<dyn Logger>>,
    prerequisite_policy: Option<PrerequisitePolicy>,
}

impl EvaluatorBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Sets the [`DataProvider`] the flag configurations and variables are read from.
    /// It's mandatory.
    pub fn provider(mut self, provider: Box<dyn DataProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Sets the [`ExpressionEngine`] used to evaluate rule conditions.
    /// Default value is [`EvalexprEngine`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use flageval::{Bindings, EvalError, Evaluator, ExpressionEngine, MapDataProvider};
    ///
    /// struct AlwaysTrue;
    ///
    /// impl ExpressionEngine for AlwaysTrue {
    ///     fn variables(&self, _expression: &str) -> Result<Vec<String>, EvalError> {
    ///         Ok(vec![])
    ///     }
    ///
    ///     fn evaluate(&self, _expression: &str, _bindings: &Bindings) -> Result<serde_json::Value, EvalError> {
    ///         Ok(serde_json::Value::Bool(true))
    ///     }
    /// }
    ///
    /// let builder = Evaluator::builder()
    ///     .provider(Box::new(MapDataProvider::default()))
    ///     .engine(Box::new(AlwaysTrue));
    /// ```
    pub fn engine(mut self, engine: Box<dyn ExpressionEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Sets the [`Hasher32`] used for percentage bucketing.
    /// Default value is [`Murmur3Hasher`].
    pub fn hasher(mut self, hasher: Box<dyn Hasher32>) -> Self {
        self.hasher = Some(hasher);
        self
    }

    /// Sets the [`Logger`] the evaluator reports to.
    /// Default value is [`DefaultLogger`], which forwards to the `log` crate.
    pub fn logger(mut self, logger: Box<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Sets how failed prerequisite flag lookups are treated.
    /// Default value is [`PrerequisitePolicy::FailOpen`].
    pub fn prerequisite_policy(mut self, policy: PrerequisitePolicy) -> Self {
        self.prerequisite_policy = Some(policy);
        self
    }

    /// Creates an [`Evaluator`] from the configuration made on the builder.
    ///
    /// # Errors
    ///
    /// This method fails with [`EvalError::ProviderMissing`] if no data provider was set.
    pub fn build(self) -> Result<Evaluator, EvalError> {
        let Some(provider) = self.provider else {
            let err = EvalError::ProviderMissing;
            let logger = self.logger.unwrap_or_else(|| Box::new(DefaultLogger));
            if logger.enabled(Level::Error) {
                logger.log(Level::Error, err.kind().code(), err.to_string().as_str());
            }
            return Err(err);
        };
        let defaults = Options::new(provider);
        let options = Options {
            engine: self.engine.unwrap_or(defaults.engine),
            hasher: self.hasher.unwrap_or(defaults.hasher),
            logger: self.logger.unwrap_or(defaults.logger),
            prerequisite_policy: self
                .prerequisite_policy
                .unwrap_or(defaults.prerequisite_policy),
            provider: defaults.provider,
        };
        Ok(Evaluator::with_options(options))
    }
}
