use thiserror::Error;

/// Error kind that represents failures reported by the [`crate::Evaluator`].
///
/// The numeric codes are stable and are used as the `event_id` of the related log messages.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The evaluator was built without a data provider.
    ProviderMissing = 1000,
    /// The evaluated (or a referenced) configuration was not found by the data provider.
    ConfigurationNotFound = 1001,
    /// A variable referenced by a rule expression was not found by the data provider.
    VariableNotFound = 1002,
    /// The data provider failed for a reason other than a missing key.
    ProviderFailure = 1003,
    /// A rule expression is syntactically invalid.
    ExpressionParse = 2000,
    /// A rule expression failed at runtime.
    ExpressionEvaluation = 2001,
    /// A rule expression did not evaluate to a boolean.
    TypeAssertion = 2002,
    /// The flag is on but has neither rules nor a distribution.
    NoRulesSpecified = 2100,
    /// A prerequisite flag did not evaluate to its required value.
    PrerequisiteNotSatisfied = 2200,
    /// The prerequisite chain of a flag refers back to itself.
    PrerequisiteCycle = 2201,
    /// Flag data could not be loaded or decoded.
    InvalidData = 3000,
}

impl ErrorKind {
    pub(crate) fn code(&self) -> u16 {
        *self as u16
    }
}

/// Errors produced while evaluating a flag.
///
/// Evaluation never returns these directly; they are carried inside [`crate::Evaluation`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    /// No data provider was configured.
    #[error("data provider is missing in evaluator")]
    ProviderMissing,
    /// Configuration lookup miss.
    #[error("configuration '{0}' not found")]
    ConfigurationNotFound(String),
    /// Variable lookup miss.
    #[error("variable '{0}' not found")]
    VariableNotFound(String),
    /// Any other data provider failure.
    #[error("data provider failure ({0})")]
    Provider(String),
    /// Malformed condition.
    #[error("error parsing expression '{expression}' ({message})")]
    ExpressionParse {
        /// The offending expression.
        expression: String,
        /// Parser diagnostic.
        message: String,
    },
    /// Runtime failure inside the expression engine.
    #[error("error evaluating expression '{expression}' ({message})")]
    ExpressionEvaluation {
        /// The offending expression.
        expression: String,
        /// Engine diagnostic.
        message: String,
    },
    /// Condition did not evaluate to a boolean.
    #[error("type assertion error: expression '{expression}' evaluated to {actual}, expected a boolean")]
    TypeAssertion {
        /// The offending expression.
        expression: String,
        /// Text form of the non-boolean result.
        actual: String,
    },
    /// Flag is on with an empty rule list and no distribution.
    #[error("no rules specified for flag '{0}'")]
    NoRulesSpecified(String),
    /// A prerequisite flag evaluated to something other than the required value.
    #[error("prerequisite '{prerequisite}' of flag '{flag}' not satisfied (expected '{expected}', got '{actual}')")]
    PrerequisiteNotSatisfied {
        /// The flag declaring the prerequisite.
        flag: String,
        /// The prerequisite flag.
        prerequisite: String,
        /// The required value.
        expected: String,
        /// The value the prerequisite evaluated to.
        actual: String,
    },
    /// Circular prerequisite chain, rendered as `'a' -> 'b' -> 'a'`.
    #[error("circular prerequisite dependency detected: {0}")]
    PrerequisiteCycle(String),
    /// Flag data could not be loaded.
    #[error("invalid flag data ({0})")]
    InvalidData(String),
}

impl EvalError {
    /// Returns the [`ErrorKind`] of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EvalError::ProviderMissing => ErrorKind::ProviderMissing,
            EvalError::ConfigurationNotFound(_) => ErrorKind::ConfigurationNotFound,
            EvalError::VariableNotFound(_) => ErrorKind::VariableNotFound,
            EvalError::Provider(_) => ErrorKind::ProviderFailure,
            EvalError::ExpressionParse { .. } => ErrorKind::ExpressionParse,
            EvalError::ExpressionEvaluation { .. } => ErrorKind::ExpressionEvaluation,
            EvalError::TypeAssertion { .. } => ErrorKind::TypeAssertion,
            EvalError::NoRulesSpecified(_) => ErrorKind::NoRulesSpecified,
            EvalError::PrerequisiteNotSatisfied { .. } => ErrorKind::PrerequisiteNotSatisfied,
            EvalError::PrerequisiteCycle(_) => ErrorKind::PrerequisiteCycle,
            EvalError::InvalidData(_) => ErrorKind::InvalidData,
        }
    }

    pub(crate) fn is_not_found(&self) -> bool {
        matches!(
            self,
            EvalError::ConfigurationNotFound(_) | EvalError::VariableNotFound(_)
        )
    }
}
