use serde::Deserialize;
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Error raised when a required parameter is not present.
    #[error("Parameter '{0}' is mandatory.")]
    Required(String),

    /// Error raised when a parameter cannot be converted to the expected type.
    #[error("Parameter '{name}' has an invalid value '{value}'.")]
    Conversion {
        /// Name of the parameter
        name: String,
        /// The rejected value
        value: String,
    },
}

/// Source of parameters merged on top of the configuration file and the environment.
pub trait ConfigSource {
    /// Collect the parameters set by this source
    fn collect(&self) -> Result<HashMap<String, String>, ConfigError>;
}

/// Configuration parameters holder
#[derive(Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConfigParameters {
    parameters: HashMap<String, String>,
}

impl ConfigParameters {
    /// Constructor
    pub fn new(parameters: HashMap<String, String>) -> Self {
        Self { parameters }
    }

    /// Useful constructor for testing
    #[cfg(test)]
    pub fn build(parameters: &[(&str, &str)]) -> Self {
        let parameters = parameters
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        Self::new(parameters)
    }

    /// Add or replace a parameter in the holder
    #[cfg(test)]
    pub fn add_parameter(&mut self, name: &str, value: &str) -> &mut Self {
        let _ = self.parameters.insert(name.to_string(), value.to_string());

        self
    }

    /// Fill the holder with the parameters of a source, they replace the existing ones.
    pub fn add_source(mut self, source: &impl ConfigSource) -> Result<Self, ConfigError> {
        self.parameters.extend(source.collect()?);

        Ok(self)
    }

    /// Fetch a parameter from the holder.
    pub fn get(&self, name: &str) -> Option<String> {
        self.parameters.get(name).cloned()
    }

    /// Fetch a parameter from the holder. If the parameter is not set, the
    /// given default value is returned instead.
    pub fn get_or(&self, name: &str, default: &str) -> String {
        self.get(name).unwrap_or(default.to_string())
    }

    /// Fetch a parameter from the holder. If the parameter is not set, an error
    /// is raised.
    pub fn require(&self, name: &str) -> Result<String, ConfigError> {
        self.get(name)
            .ok_or_else(|| ConfigError::Required(name.to_string()))
    }

    /// Fetch a parameter and convert it. If the parameter is not set, the given
    /// default value is returned instead.
    pub fn parse_or<T: FromStr>(&self, name: &str, default: T) -> Result<T, ConfigError> {
        match self.get(name) {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::Conversion {
                name: name.to_string(),
                value,
            }),
            None => Ok(default),
        }
    }
}
