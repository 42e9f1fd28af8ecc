use crate::errors::EvalError;
use crate::eval::log_builder::EvalLogBuilder;
use crate::expr::{Bindings, ExpressionEngine};
use crate::model::config::Rule;
use crate::provider::DataProvider;
use crate::target::{Target, TARGET};
use std::sync::Arc;

/// Evaluates rule conditions against a target.
///
/// Variables referenced by a condition are fetched from the [`DataProvider`] every time the
/// condition is evaluated.
pub(crate) struct RuleEngine<'a> {
    provider: &'a dyn DataProvider,
    engine: &'a dyn ExpressionEngine,
}

impl<'a> RuleEngine<'a> {
    pub fn new(provider: &'a dyn DataProvider, engine: &'a dyn ExpressionEngine) -> Self {
        Self { provider, engine }
    }

    /// Evaluates a single condition. An empty expression always matches.
    pub fn eval_condition(&self, expression: &str, target: &Target) -> Result<bool, EvalError> {
        if expression.trim().is_empty() {
            return Ok(true);
        }
        let mut bindings = Bindings::new();
        for name in self.engine.variables(expression)? {
            let variable = self.provider.get_variable(name.as_str())?;
            bindings.insert(name, variable.value.clone());
        }
        bindings.insert(TARGET.to_owned(), target.to_json());

        match self.engine.evaluate(expression, &bindings)? {
            serde_json::Value::Bool(result) => Ok(result),
            other => Err(EvalError::TypeAssertion {
                expression: expression.to_owned(),
                actual: other.to_string(),
            }),
        }
    }

    /// Returns the first rule whose condition holds, or [`None`] when no rule matches.
    pub fn eval_rules(
        &self,
        key: &str,
        rules: &[Arc<Rule>],
        target: &Target,
        log: &mut EvalLogBuilder,
    ) -> Result<Option<Arc<Rule>>, EvalError> {
        if rules.is_empty() {
            return Err(EvalError::NoRulesSpecified(key.to_owned()));
        }
        if log.enabled() {
            log.new_ln(Some("Evaluating targeting rules:")).inc_indent();
        }
        let mut matched = Ok(None);
        for rule in rules.iter() {
            let result = self.eval_condition(rule.expression.as_str(), target);
            if log.enabled() {
                let outcome = match &result {
                    Ok(true) => "MATCH, applying rule".to_owned(),
                    Ok(false) => "no match".to_owned(),
                    Err(err) => format!("failed ({err})"),
                };
                log.new_ln(Some(format!("- {rule} => {outcome}").as_str()));
            }
            match result {
                Ok(false) => continue,
                Ok(true) => matched = Ok(Some(Arc::clone(rule))),
                Err(err) => matched = Err(err),
            }
            break;
        }
        log.dec_indent();
        matched
    }
}
