//! Declarative priority block configuration.
//!
//! Lets an application declare its priority blocks in TOML instead of
//! registering them one by one at startup. Order matters: blocks are
//! allocated in the order they are listed.
//!
//! # Example TOML
//!
//! ```toml
//! blocks = ["UI", "NETWORK", "STORAGE"]
//! ```
//!
//! ```
//! use nodula_types::{PriorityScheme, SchemeConfig};
//!
//! let cfg = SchemeConfig::from_toml(r#"blocks = ["UI", "NETWORK"]"#).unwrap();
//! let scheme = PriorityScheme::from_config(&cfg).unwrap();
//! assert_eq!(scheme.resolve("NETWORK", "VERY_HIGH").unwrap().value(), 11);
//! ```

use crate::priority::EVENT_BLOCK;
use crate::{PriorityError, PriorityScheme};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Priority blocks to register, in allocation order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SchemeConfig {
    /// Block names.
    pub blocks: Vec<String>,
}

impl SchemeConfig {
    /// Parses a config from TOML.
    ///
    /// # Errors
    ///
    /// Returns the TOML deserialization error on malformed input.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Serializes this config to pretty TOML.
    ///
    /// # Errors
    ///
    /// Returns the TOML serialization error.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Appends blocks from `other` that are not already listed.
    ///
    /// Used to layer configs (defaults, then project, then user).
    pub fn merge(&mut self, other: &Self) {
        for name in &other.blocks {
            if !self.blocks.contains(name) {
                self.blocks.push(name.clone());
            }
        }
    }

    /// Checks the block list without touching any scheme.
    ///
    /// Returns every problem found, not only the first.
    pub fn validate_all(&self) -> Vec<PriorityError> {
        let mut seen = HashSet::new();
        let mut errors = Vec::new();
        for name in &self.blocks {
            if name.is_empty() {
                errors.push(PriorityError::InvalidBlockName(name.clone()));
            } else if name == EVENT_BLOCK || !seen.insert(name.as_str()) {
                errors.push(PriorityError::NameConflict(name.clone()));
            }
        }
        errors
    }
}

impl PriorityScheme {
    /// Builds a fresh scheme with the configured blocks registered.
    ///
    /// # Errors
    ///
    /// Fails on the first invalid or conflicting block name.
    pub fn from_config(config: &SchemeConfig) -> Result<Self, PriorityError> {
        let scheme = Self::new();
        scheme.apply_config(config)?;
        Ok(scheme)
    }

    /// Registers the configured blocks on this scheme, in order.
    ///
    /// Blocks registered before a failure stay registered.
    ///
    /// # Errors
    ///
    /// Fails on the first invalid or conflicting block name.
    pub fn apply_config(&self, config: &SchemeConfig) -> Result<(), PriorityError> {
        for name in &config.blocks {
            self.register_block(name)?;
        }
        Ok(())
    }
}
