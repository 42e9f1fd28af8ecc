use crate::errors::EvalError;
use crate::model::config::{Configuration, Variable};
use crate::provider::DataProvider;
use arc_swap::ArcSwap;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Default, Clone)]
struct Snapshot {
    configurations: HashMap<String, Arc<Configuration>>,
    variables: HashMap<String, Arc<Variable>>,
}

impl Snapshot {
    fn new<C, V>(configurations: C, variables: V) -> Self
    where
        C: IntoIterator<Item = Configuration>,
        V: IntoIterator<Item = Variable>,
    {
        Self {
            configurations: configurations
                .into_iter()
                .map(|c| (c.identifier.clone(), Arc::new(c)))
                .collect(),
            variables: variables
                .into_iter()
                .map(|v| (v.identifier.clone(), Arc::new(v)))
                .collect(),
        }
    }
}

/// In-memory [`DataProvider`].
///
/// Readers work on an immutable snapshot; [`MapDataProvider::replace`] and the upsert methods
/// publish a new snapshot atomically, so an evaluation running concurrently with an update sees
/// either the old or the new data, never a mix.
///
/// # Examples
///
/// ```rust
/// use flageval::{Configuration, MapDataProvider, Value, Variable};
///
/// let provider = MapDataProvider::new(
///     [Configuration {
///         identifier: "dark-mode".to_owned(),
///         off_value: Some(Value::Bool(false)),
///         ..Configuration::default()
///     }],
///     [Variable {
///         identifier: "min_age".to_owned(),
///         value: 18.into(),
///     }],
/// );
/// ```
#[derive(Default)]
pub struct MapDataProvider {
    snapshot: ArcSwap<Snapshot>,
}

impl MapDataProvider {
    /// Creates a new [`MapDataProvider`] holding the given configurations and variables.
    pub fn new<C, V>(configurations: C, variables: V) -> Self
    where
        C: IntoIterator<Item = Configuration>,
        V: IntoIterator<Item = Variable>,
    {
        Self {
            snapshot: ArcSwap::from_pointee(Snapshot::new(configurations, variables)),
        }
    }

    /// Replaces every configuration and variable at once.
    pub fn replace<C, V>(&self, configurations: C, variables: V)
    where
        C: IntoIterator<Item = Configuration>,
        V: IntoIterator<Item = Variable>,
    {
        self.snapshot
            .store(Arc::new(Snapshot::new(configurations, variables)));
    }

    /// Inserts or replaces a single configuration.
    pub fn upsert_configuration(&self, configuration: Configuration) {
        let configuration = Arc::new(configuration);
        self.snapshot.rcu(|current| {
            let mut next = Snapshot::clone(current);
            next.configurations
                .insert(configuration.identifier.clone(), Arc::clone(&configuration));
            next
        });
    }

    /// Inserts or replaces a single variable.
    pub fn upsert_variable(&self, variable: Variable) {
        let variable = Arc::new(variable);
        self.snapshot.rcu(|current| {
            let mut next = Snapshot::clone(current);
            next.variables
                .insert(variable.identifier.clone(), Arc::clone(&variable));
            next
        });
    }
}

impl DataProvider for MapDataProvider {
    fn get_variable(&self, key: &str) -> Result<Arc<Variable>, EvalError> {
        match self.snapshot.load().variables.get(key) {
            Some(variable) => Ok(Arc::clone(variable)),
            None => Err(EvalError::VariableNotFound(key.to_owned())),
        }
    }

    fn get_configuration(&self, key: &str) -> Result<Arc<Configuration>, EvalError> {
        match self.snapshot.load().configurations.get(key) {
            Some(configuration) => Ok(Arc::clone(configuration)),
            None => Err(EvalError::ConfigurationNotFound(key.to_owned())),
        }
    }

    fn configuration_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .snapshot
            .load()
            .configurations
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }
}

impl<const N: usize> From<[Configuration; N]> for MapDataProvider {
    /// Creates a [`MapDataProvider`] without variables.
    fn from(arr: [Configuration; N]) -> Self {
        Self::new(arr, [])
    }
}

impl From<Vec<Configuration>> for MapDataProvider {
    fn from(configurations: Vec<Configuration>) -> Self {
        Self::new(configurations, [])
    }
}
