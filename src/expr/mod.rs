//! Condition expressions.
//!
//! Rule conditions are boolean expressions over named variables and the evaluated target, for
//! example `target.country == "HU" && target.age >= min_age`. Parsing and evaluation are done by
//! an [`ExpressionEngine`]; the default one is [`EvalexprEngine`].

mod evalexpr_engine;

pub use evalexpr_engine::EvalexprEngine;

use crate::errors::EvalError;
use crate::target::TARGET;
use std::collections::HashMap;

/// Values bound to the identifiers of an expression.
///
/// Always holds every variable the expression references plus the whole target under
/// [`TARGET`].
pub type Bindings = HashMap<String, serde_json::Value>;

/// Parses and evaluates condition expressions.
pub trait ExpressionEngine: Sync + Send {
    /// Returns the distinct names of the variables referenced by `expression` in order of first
    /// occurrence, excluding the target binding. A field access such as `limits.max` reports
    /// the variable `limits`.
    ///
    /// # Errors
    ///
    /// Fails with [`EvalError::ExpressionParse`] when the expression is malformed.
    fn variables(&self, expression: &str) -> Result<Vec<String>, EvalError>;

    /// Evaluates `expression` with the given bindings.
    ///
    /// # Errors
    ///
    /// Fails with [`EvalError::ExpressionParse`] or [`EvalError::ExpressionEvaluation`].
    fn evaluate(
        &self,
        expression: &str,
        bindings: &Bindings,
    ) -> Result<serde_json::Value, EvalError>;
}

/// Returns the variables referenced by `expression` using the default [`EvalexprEngine`].
///
/// # Errors
///
/// Fails with [`EvalError::ExpressionParse`] when the expression is malformed.
///
/// # Examples
///
/// ```rust
/// let vars = flageval::variables("target.age >= min_age && region == target.region").unwrap();
/// assert_eq!(vars, vec!["min_age", "region"]);
/// ```
pub fn variables(expression: &str) -> Result<Vec<String>, EvalError> {
    EvalexprEngine.variables(expression)
}

pub(crate) fn is_target_identifier(identifier: &str) -> bool {
    match identifier.strip_prefix(TARGET) {
        Some(rest) => rest.is_empty() || rest.starts_with('.'),
        None => false,
    }
}

#[cfg(test)]
mod expr_tests {
    use super::*;

    #[test]
    fn target_identifiers() {
        assert!(is_target_identifier("target"));
        assert!(is_target_identifier("target.country"));
        assert!(is_target_identifier("target.address.city"));
        assert!(!is_target_identifier("targets"));
        assert!(!is_target_identifier("targeting.country"));
        assert!(!is_target_identifier("country"));
    }

    #[test]
    fn extract_variables() {
        assert_eq!(
            variables("a > 1 && target.x == b && a < 10").unwrap(),
            vec!["a".to_owned(), "b".to_owned()]
        );
        assert!(variables("target.country == \"HU\"").unwrap().is_empty());
        assert!(variables("").unwrap().is_empty());
        assert_eq!(
            variables("target.a == 1 && foo.bar > 2").unwrap(),
            vec!["foo".to_owned()]
        );
    }

    #[test]
    fn extract_variables_invalid() {
        match variables("a == (b") {
            Err(EvalError::ExpressionParse { expression, .. }) => assert_eq!(expression, "a == (b"),
            other => panic!("unexpected result {other:?}"),
        }
    }
}
