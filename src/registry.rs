// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![allow(clippy::pattern_type_mismatch)]
use crate::Rc;
use dashmap::DashMap;

type Name = Rc<str>;

/// Errors that can occur when interacting with a Registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("{registry} registration failed: The name '{name}' is invalid (empty or whitespace-only names are not allowed).")]
    InvalidName { name: Name, registry: Name },
}

/// Validates that a name is not empty or whitespace-only.
fn validate_name(name: &str, registry_name: &str) -> Result<(), RegistryError> {
    if name.trim().is_empty() {
        Err(RegistryError::InvalidName {
            name: Name::from(name),
            registry: Name::from(registry_name),
        })
    } else {
        Ok(())
    }
}

/// Thread-safe named storage for shared items.
///
/// Readers get their own `Rc` handle, so replacing an entry never
/// invalidates an item somebody is still using.
pub struct Registry<T> {
    inner: DashMap<Name, Rc<T>>,
    name: Name,
}

impl<T> Registry<T> {
    /// Create a new, empty registry with a given name.
    pub fn new(registry_name: impl Into<Name>) -> Self {
        Self {
            inner: DashMap::new(),
            name: registry_name.into(),
        }
    }

    /// Store `item` under `name`, returning the item it replaced.
    pub fn insert(&self, name: impl Into<Name>, item: Rc<T>) -> Result<Option<Rc<T>>, RegistryError> {
        let name = name.into();
        validate_name(&name, &self.name)?;
        Ok(self.inner.insert(name, item))
    }

    /// Retrieve an item by name, if it exists.
    pub fn get(&self, name: &str) -> Option<Rc<T>> {
        self.inner.get(name).map(|entry| Rc::clone(entry.value()))
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<Name> {
        let mut names: Vec<Name> = self.inner.iter().map(|entry| entry.key().clone()).collect();
        names.sort();
        names
    }
}
