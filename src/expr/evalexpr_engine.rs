use crate::errors::EvalError;
use crate::expr::{is_target_identifier, Bindings, ExpressionEngine};
use evalexpr::{
    build_operator_tree, Context, ContextWithMutableVariables, EvalexprError, HashMapContext,
    Node, Value as ExprValue,
};

/// [`ExpressionEngine`] backed by the `evalexpr` crate.
///
/// Objects are flattened into dotted identifiers, so the target attribute `country` is read as
/// `target.country`. Target attributes that the target doesn't have evaluate to the empty value:
/// equality checks against it are false, ordering comparisons fail.
#[derive(Debug, Default, Clone, Copy)]
pub struct EvalexprEngine;

impl EvalexprEngine {
    fn parse(expression: &str) -> Result<Node, EvalError> {
        build_operator_tree(expression).map_err(|err| EvalError::ExpressionParse {
            expression: expression.to_owned(),
            message: err.to_string(),
        })
    }
}

impl ExpressionEngine for EvalexprEngine {
    fn variables(&self, expression: &str) -> Result<Vec<String>, EvalError> {
        let tree = Self::parse(expression)?;
        let mut variables: Vec<String> = Vec::new();
        for identifier in tree.iter_variable_identifiers() {
            if is_target_identifier(identifier) {
                continue;
            }
            // `limits.max` reads the field of the structured variable `limits`.
            let root = identifier
                .split_once('.')
                .map_or(identifier, |(root, _)| root);
            if !variables.iter().any(|v| v == root) {
                variables.push(root.to_owned());
            }
        }
        Ok(variables)
    }

    fn evaluate(
        &self,
        expression: &str,
        bindings: &Bindings,
    ) -> Result<serde_json::Value, EvalError> {
        let tree = Self::parse(expression)?;
        let eval_err = |err: EvalexprError| EvalError::ExpressionEvaluation {
            expression: expression.to_owned(),
            message: err.to_string(),
        };

        let mut context = HashMapContext::new();
        for (name, value) in bindings.iter() {
            bind(&mut context, name, value).map_err(eval_err)?;
        }
        for identifier in tree.iter_variable_identifiers() {
            if is_target_identifier(identifier) && context.get_value(identifier).is_none() {
                context
                    .set_value(identifier.to_owned(), ExprValue::Empty)
                    .map_err(eval_err)?;
            }
        }

        let result = tree.eval_with_context(&context).map_err(eval_err)?;
        Ok(to_json_val(result))
    }
}

fn bind(
    context: &mut HashMapContext,
    name: &str,
    value: &serde_json::Value,
) -> Result<(), EvalexprError> {
    match value {
        serde_json::Value::Object(map) => {
            for (key, nested) in map.iter() {
                bind(context, format!("{name}.{key}").as_str(), nested)?;
            }
            Ok(())
        }
        other => context.set_value(name.to_owned(), to_expr_val(other)),
    }
}

fn to_expr_val(value: &serde_json::Value) -> ExprValue {
    match value {
        serde_json::Value::Null => ExprValue::Empty,
        serde_json::Value::Bool(val) => ExprValue::Boolean(*val),
        serde_json::Value::Number(val) => match val.as_i64() {
            Some(int_val) => ExprValue::Int(int_val),
            None => ExprValue::Float(val.as_f64().unwrap_or(f64::NAN)),
        },
        serde_json::Value::String(val) => ExprValue::String(val.clone()),
        serde_json::Value::Array(items) => ExprValue::Tuple(items.iter().map(to_expr_val).collect()),
        serde_json::Value::Object(_) => ExprValue::String(value.to_string()),
    }
}

fn to_json_val(value: ExprValue) -> serde_json::Value {
    match value {
        ExprValue::String(val) => serde_json::Value::String(val),
        ExprValue::Float(val) => serde_json::Number::from_f64(val)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ExprValue::Int(val) => serde_json::Value::from(val),
        ExprValue::Boolean(val) => serde_json::Value::Bool(val),
        ExprValue::Tuple(items) => {
            serde_json::Value::Array(items.into_iter().map(to_json_val).collect())
        }
        ExprValue::Empty => serde_json::Value::Null,
    }
}
