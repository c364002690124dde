//! # Configuration
//!
//! Sizing knobs for the entity manager, loaded once at startup.
//!
//! ```toml
//! max_component_types = 32
//! initial_entity_capacity = 4096
//! initial_pool_capacity = 1024
//! ```

use crate::error::{EcsError, EcsResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default upper bound on registered component types.
pub const DEFAULT_MAX_COMPONENT_TYPES: usize = 64;

/// Configuration for an [`EntityManager`](crate::ecs::EntityManager).
///
/// Every field has a default, so a config file only needs the values it
/// changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EcsConfig {
    /// Maximum number of component types that can be registered.
    pub max_component_types: usize,
    /// Entity slots reserved up front.
    pub initial_entity_capacity: usize,
    /// Record slots reserved up front in every component store.
    pub initial_pool_capacity: usize,
}

impl Default for EcsConfig {
    fn default() -> Self {
        Self {
            max_component_types: DEFAULT_MAX_COMPONENT_TYPES,
            initial_entity_capacity: 0,
            initial_pool_capacity: 0,
        }
    }
}

impl EcsConfig {
    /// Parses and validates a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] if the text is not valid TOML for
    /// this structure or fails validation.
    pub fn from_toml_str(text: &str) -> EcsResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| EcsError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::ConfigIo`] if the file cannot be read, and
    /// [`EcsError::InvalidConfig`] if its content is rejected.
    pub fn load<P: AsRef<Path>>(path: P) -> EcsResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| EcsError::ConfigIo {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks the configuration for values the manager cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] if `max_component_types` is zero
    /// or does not fit a component id.
    pub fn validate(&self) -> EcsResult<()> {
        if self.max_component_types == 0 {
            return Err(EcsError::InvalidConfig(
                "max_component_types must be greater than zero".to_string(),
            ));
        }
        if u32::try_from(self.max_component_types).is_err() {
            return Err(EcsError::InvalidConfig(format!(
                "max_component_types {} exceeds u32::MAX",
                self.max_component_types
            )));
        }
        Ok(())
    }
}
