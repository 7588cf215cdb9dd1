// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Generator configuration: which classes to compile and which of their
//! properties survive ownership handover.
//!
//! ```yaml
//! classes:
//!   - class: Pawn
//!     migratable:
//!       - Health
//!       - Stats.Stamina
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::migration::PropertyChain;
use crate::reflection::TypeId;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GeneratorConfig {
    #[serde(default)]
    pub classes: Vec<ClassConfig>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ClassConfig {
    pub class: TypeId,
    /// Dotted chains from the class down to each migratable property.
    /// Their order defines the migration handles.
    #[serde(default)]
    pub migratable: Vec<PropertyChain>,
}

impl ClassConfig {
    pub fn new(class: impl Into<TypeId>) -> Self {
        ClassConfig {
            class: class.into(),
            migratable: Vec::new(),
        }
    }

    pub fn with_migratable(mut self, chain: PropertyChain) -> Self {
        self.migratable.push(chain);
        self
    }
}

impl GeneratorConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: GeneratorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    #[cfg(feature = "yaml")]
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: GeneratorConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects classes listed more than once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = BTreeSet::new();
        for class in &self.classes {
            if !seen.insert(&class.class) {
                return Err(ConfigError::DuplicateClass(class.class.clone()));
            }
        }
        Ok(())
    }

    pub fn class(&self, class: &TypeId) -> Option<&ClassConfig> {
        self.classes.iter().find(|config| config.class == *class)
    }
}
