use crate::errors::EvalError;
use crate::model::config::{Configuration, Variable};
use std::sync::Arc;

pub mod file;
pub mod map;

/// Source of flag configurations and the variables their rules reference.
///
/// Implementations are read concurrently by every evaluation running on the same
/// [`crate::Evaluator`].
pub trait DataProvider: Sync + Send {
    /// Gets the variable identified by `key`.
    ///
    /// # Errors
    ///
    /// Fails with [`EvalError::VariableNotFound`] when there's no such variable.
    fn get_variable(&self, key: &str) -> Result<Arc<Variable>, EvalError>;

    /// Gets the flag configuration identified by `key`.
    ///
    /// # Errors
    ///
    /// Fails with [`EvalError::ConfigurationNotFound`] when there's no such flag.
    fn get_configuration(&self, key: &str) -> Result<Arc<Configuration>, EvalError>;

    /// Lists the keys of every flag configuration the provider knows about.
    fn configuration_keys(&self) -> Vec<String> {
        vec![]
    }
}

impl<T: DataProvider + ?Sized> DataProvider for Arc<T> {
    fn get_variable(&self, key: &str) -> Result<Arc<Variable>, EvalError> {
        (**self).get_variable(key)
    }

    fn get_configuration(&self, key: &str) -> Result<Arc<Configuration>, EvalError> {
        (**self).get_configuration(key)
    }

    fn configuration_keys(&self) -> Vec<String> {
        (**self).configuration_keys()
    }
}
