//! Options that control generation.
//!
//! The generator never hard codes system signals or naming conventions.
//! Every field has a default so that a partial JSON document is enough to
//! override just the values a plant uses differently.
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::LoadError;
use crate::mnemonic::DEFAULT_LITERAL_PREFIX;

/// Naming convention used to build a sensor lookup key from a cylinder number.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorNaming {
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub suffix: String,
}

impl SensorNaming {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }

    pub fn key(&self, number: &str) -> String {
        format!("{}{}{}", self.prefix, number, self.suffix)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationOptions {
    /// Signal negated by the manual run-mode precondition.
    pub manual_pause_signal: String,
    /// Signal required by the auto run-mode precondition.
    pub auto_pause_signal: String,
    /// Signal that is always on.
    pub always_on_signal: String,
    /// Shared device that records the number of the interlock that tripped.
    pub error_device: String,
    pub literal_prefix: String,
    pub alarm_sensor: SensorNaming,
    pub memory_sensor: SensorNaming,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            manual_pause_signal: "M7000".to_string(),
            auto_pause_signal: "M7001".to_string(),
            always_on_signal: "SM400".to_string(),
            error_device: "D9000".to_string(),
            literal_prefix: DEFAULT_LITERAL_PREFIX.to_string(),
            alarm_sensor: SensorNaming::new("", "ALM"),
            memory_sensor: SensorNaming::new("MB", ""),
        }
    }
}

impl GenerationOptions {
    /// Formats a literal operand token for the value.
    pub fn literal(&self, value: u32) -> String {
        format!("{}{}", self.literal_prefix, value)
    }

    pub fn from_json(text: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }
}
