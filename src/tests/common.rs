// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Shared helpers for unit tests.

#![allow(clippy::unwrap_used)]

use crate::builder::TypeGraphBuilder;
use crate::error::BuildError;
use crate::graph::{PropertyRef, TypeGraph};
use crate::migration::PropertyChain;
use crate::reflection::memory::TypeDatabase;
use crate::reflection::TypeId;

/// Loads a database from YAML, panicking on malformed input.
pub fn database(yaml: &str) -> TypeDatabase {
    TypeDatabase::from_yaml_str(yaml).unwrap()
}

/// Builds `root` from the types in `yaml` with the given dotted chains.
pub fn build(yaml: &str, root: &str, chains: &[&str]) -> Result<TypeGraph, BuildError> {
    let database = database(yaml);
    let chains = chains
        .iter()
        .map(|chain| chain.parse::<PropertyChain>().unwrap())
        .collect::<Vec<_>>();
    TypeGraphBuilder::new(&database, &database, &database).build(&TypeId::from(root), &chains)
}

/// Resolves a dotted path of field names from the root, for assertions.
pub fn lookup(graph: &TypeGraph, path: &str) -> PropertyRef {
    let mut ty = graph.root();
    let mut found = None;
    for name in path.split('.') {
        if let Some(r) = found {
            ty = graph.property(r).nested_type.unwrap();
        }
        found = Some(graph.child_by_name(ty, name).unwrap());
    }
    found.unwrap()
}
