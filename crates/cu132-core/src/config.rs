//! Simulator configuration
//!
//! Settings are stored as JSON. Every field has a default matching the real
//! control unit link (19200 baud, 8N1), so a config file only needs to name
//! what differs.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

use crate::protocol::{DEFAULT_BAUD_RATE, DEFAULT_IDLE_POLL_MS, DEFAULT_TIMEOUT_MS};

/// Errors loading or validating a configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid setting: {0}")]
    Invalid(String),
}

/// Serial parity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    /// No parity bit
    #[default]
    None,
    /// Odd parity
    Odd,
    /// Even parity
    Even,
}

impl Parity {
    /// Conventional one-letter form (as in "8N1")
    pub fn letter(&self) -> char {
        match self {
            Parity::None => 'N',
            Parity::Odd => 'O',
            Parity::Even => 'E',
        }
    }
}

/// Serial link settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortSettings {
    /// Serial port name
    pub name: String,

    /// Baud rate
    pub baud_rate: u32,

    /// Data bits per character (5-8)
    pub data_bits: u8,

    /// Parity
    pub parity: Parity,

    /// Stop bits (1 or 2)
    pub stop_bits: u8,

    /// Read timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for PortSettings {
    fn default() -> Self {
        Self {
            name: String::new(),
            baud_rate: DEFAULT_BAUD_RATE,
            data_bits: 8,
            parity: Parity::None,
            stop_bits: 1,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

/// Simulator configuration stored in a JSON file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Serial link settings
    pub port: PortSettings,

    /// Sleep between empty reads in milliseconds
    pub idle_poll_ms: u64,

    /// Seed for poll reply selection; random when absent
    pub seed: Option<u64>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            port: PortSettings::default(),
            idle_poll_ms: DEFAULT_IDLE_POLL_MS,
            seed: None,
        }
    }
}

impl SimulatorConfig {
    /// Load a configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SimulatorConfig = serde_json::from_str(&content)?;
        tracing::debug!("Loaded config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Save the configuration as pretty-printed JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Check settings that serde cannot
    ///
    /// The port name is not checked here; the stdio transport has none.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port.baud_rate == 0 {
            return Err(ConfigError::Invalid("baud_rate must be non-zero".into()));
        }
        if !(5..=8).contains(&self.port.data_bits) {
            return Err(ConfigError::Invalid(format!(
                "data_bits must be 5-8, got {}",
                self.port.data_bits
            )));
        }
        if !matches!(self.port.stop_bits, 1 | 2) {
            return Err(ConfigError::Invalid(format!(
                "stop_bits must be 1 or 2, got {}",
                self.port.stop_bits
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_unit_link() {
        let config = SimulatorConfig::default();
        assert_eq!(config.port.baud_rate, 19200);
        assert_eq!(config.port.data_bits, 8);
        assert_eq!(config.port.parity, Parity::None);
        assert_eq!(config.port.stop_bits, 1);
        assert_eq!(config.port.timeout_ms, 1000);
        assert_eq!(config.seed, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SimulatorConfig =
            serde_json::from_str(r#"{ "port": { "name": "COM4" }, "seed": 3 }"#).unwrap();
        assert_eq!(config.port.name, "COM4");
        assert_eq!(config.port.baud_rate, 19200);
        assert_eq!(config.seed, Some(3));
        assert_eq!(config.idle_poll_ms, 5);
    }

    #[test]
    fn test_parity_lowercase() {
        let config: SimulatorConfig =
            serde_json::from_str(r#"{ "port": { "parity": "even" } }"#).unwrap();
        assert_eq!(config.port.parity, Parity::Even);
        assert_eq!(config.port.parity.letter(), 'E');
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = SimulatorConfig::default();
        config.port.baud_rate = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = SimulatorConfig::default();
        config.port.data_bits = 9;
        assert!(config.validate().is_err());

        let mut config = SimulatorConfig::default();
        config.port.stop_bits = 3;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_json() {
        let result: Result<SimulatorConfig, _> = serde_json::from_str("{ port: }");
        assert!(result.is_err());
    }
}
