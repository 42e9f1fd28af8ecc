use crate::errors::EvalError;
use crate::model::config::{Configuration, Variable};
use crate::provider::map::MapDataProvider;
use crate::provider::DataProvider;
use crate::value::Value;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Flag data in its complete JSON form.
///
/// ```json
/// {
///   "configurations": [{"identifier": "checkout", "on": true, "rules": [...]}],
///   "variables": [{"identifier": "min_age", "value": 18}]
/// }
/// ```
#[derive(Deserialize, Debug, Default)]
pub struct FlagData {
    /// The flag configurations.
    #[serde(default)]
    pub configurations: Vec<Configuration>,
    /// The variables referenced by rule expressions.
    #[serde(default)]
    pub variables: Vec<Variable>,
}

/// Represents flag values in a simple JSON map format.
///
/// Every entry becomes a switched off flag serving the given value.
///
/// ```json
/// {
///   "flags": {
///     "bool_flag": true,
///     "string_setting": "example",
///     "number_setting": 3.14
///   }
/// }
/// ```
#[derive(Deserialize, Debug)]
pub struct SimplifiedConfig {
    /// The flag JSON map.
    pub flags: HashMap<String, serde_json::Value>,
}

impl SimplifiedConfig {
    fn into_flag_data(self) -> Result<FlagData, EvalError> {
        let mut configurations = Vec::with_capacity(self.flags.len());
        for (k, v) in self.flags.iter() {
            let value = match Value::from_json_val(v) {
                Some(value) => value,
                None => return Err(EvalError::InvalidData(format!("Value of flag '{k}' is invalid."))),
            };
            configurations.push(Configuration {
                identifier: k.clone(),
                off_value: Some(value),
                ..Configuration::default()
            });
        }
        Ok(FlagData {
            configurations,
            variables: vec![],
        })
    }
}

/// [`DataProvider`] that loads configurations and variables from a JSON file.
///
/// Both the [`FlagData`] and the [`SimplifiedConfig`] formats are accepted.
pub struct FileDataProvider {
    inner: MapDataProvider,
}

impl FileDataProvider {
    /// Creates a new [`FileDataProvider`].
    ///
    /// # Errors
    ///
    /// This method fails with [`EvalError::InvalidData`] in the following cases:
    /// - The given file doesn't exist or can't be read.
    /// - The given file's content is not deserializable to [`SimplifiedConfig`] or [`FlagData`].
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use flageval::FileDataProvider;
    ///
    /// let provider = FileDataProvider::new("path/to/flags.json").unwrap();
    /// ```
    pub fn new(file_path: impl AsRef<Path>) -> Result<Self, EvalError> {
        let path = file_path.as_ref();
        let content = fs::read_to_string(path).map_err(|err| {
            EvalError::InvalidData(format!("failed to read '{}': {err}", path.display()))
        })?;
        let data = Self::parse(content.as_str())?;
        Ok(Self {
            inner: MapDataProvider::new(data.configurations, data.variables),
        })
    }

    /// Parses flag data from a JSON string.
    ///
    /// # Errors
    ///
    /// Fails with [`EvalError::InvalidData`] when the content matches neither format.
    pub fn parse(content: &str) -> Result<FlagData, EvalError> {
        match serde_json::from_str::<SimplifiedConfig>(content) {
            Ok(simple_config) => simple_config.into_flag_data(),
            Err(_) => serde_json::from_str::<FlagData>(content)
                .map_err(|err| EvalError::InvalidData(err.to_string())),
        }
    }
}

impl DataProvider for FileDataProvider {
    fn get_variable(&self, key: &str) -> Result<Arc<Variable>, EvalError> {
        self.inner.get_variable(key)
    }

    fn get_configuration(&self, key: &str) -> Result<Arc<Configuration>, EvalError> {
        self.inner.get_configuration(key)
    }

    fn configuration_keys(&self) -> Vec<String> {
        self.inner.configuration_keys()
    }
}
