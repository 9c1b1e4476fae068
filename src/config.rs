//! Configuration for the instantiation engine
//!
//! # Example Configuration File (ivylock.toml)
//!
//! ```toml
//! [network]
//! network = "regtest"
//!
//! [spend]
//! receiver_ttl_secs = 3600
//! ```

use crate::contract::Contract;
use crate::error::SpendError;
use crate::spend::{SpendBuilder, DEFAULT_RECEIVER_TTL_SECS};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Network whose address format control-program addresses use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Regtest,
    Testnet,
    #[serde(rename = "liquidv1")]
    Liquid,
}

impl Network {
    /// Get the address params for this network
    #[must_use]
    pub const fn address_params(self) -> &'static elements::AddressParams {
        match self {
            Self::Regtest => &elements::AddressParams::ELEMENTS,
            Self::Testnet => &elements::AddressParams::LIQUID_TESTNET,
            Self::Liquid => &elements::AddressParams::LIQUID,
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Regtest => write!(f, "regtest"),
            Self::Testnet => write!(f, "testnet"),
            Self::Liquid => write!(f, "liquidv1"),
        }
    }
}

/// Spend derivation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpendConfig {
    /// Seconds a receiver stays valid after the spend is built
    #[serde(default = "default_receiver_ttl")]
    pub receiver_ttl_secs: u64,
}

const fn default_receiver_ttl() -> u64 {
    DEFAULT_RECEIVER_TTL_SECS
}

impl Default for SpendConfig {
    fn default() -> Self {
        Self {
            receiver_ttl_secs: default_receiver_ttl(),
        }
    }
}

/// Network configuration wrapper (for TOML structure)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct NetworkWrapper {
    network: Network,
}

/// Complete engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Network selection
    #[serde(default, rename = "network")]
    network_wrapper: NetworkWrapper,
    /// Spend settings
    #[serde(default)]
    pub spend: SpendConfig,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse configuration from TOML string
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(ConfigError::Parse)
    }

    /// Serialize configuration to TOML string
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Save configuration to a file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let toml_str = self.to_toml()?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    /// Get the network type
    #[must_use]
    pub const fn network(&self) -> Network {
        self.network_wrapper.network
    }

    /// Set the network type
    pub fn set_network(&mut self, network: Network) {
        self.network_wrapper.network = network;
    }

    /// Get address params for the configured network
    #[must_use]
    pub const fn address_params(&self) -> &'static elements::AddressParams {
        self.network().address_params()
    }

    /// A spend builder for `contract` using the configured receiver lifetime
    ///
    /// # Errors
    ///
    /// Returns an error if the configured lifetime is out of range.
    pub fn spend_builder<'a>(&self, contract: &'a Contract) -> Result<SpendBuilder<'a>, SpendError> {
        SpendBuilder::new(contract).receiver_ttl_secs(self.spend.receiver_ttl_secs)
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}
