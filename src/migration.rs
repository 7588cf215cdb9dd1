// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Attaches migration handles to the properties named by dotted chains.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::classify::classify;
use crate::error::{BuildError, ConfigError};
use crate::graph::{MigrationInfo, PropertyRef, TypeGraph, TypeRef};
use crate::reflection::ReflectionProvider;
use crate::Rc;

/// Field names leading from a root type down to one property.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PropertyChain(Vec<Rc<str>>);

impl PropertyChain {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Rc<str>>,
    {
        PropertyChain(segments.into_iter().map(Into::into).collect())
    }

    pub fn segments(&self) -> &[Rc<str>] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PropertyChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, segment) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str(".")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl FromStr for PropertyChain {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments: Vec<&str> = s.split('.').map(str::trim).collect();
        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(ConfigError::InvalidChain(s.to_string()));
        }
        Ok(PropertyChain::new(segments))
    }
}

impl Serialize for PropertyChain {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PropertyChain {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let dotted = String::deserialize(deserializer)?;
        dotted.parse().map_err(serde::de::Error::custom)
    }
}

/// Resolves each chain against `root` and numbers the leaves from 1 in
/// input order.
pub(crate) fn reconcile(
    graph: &mut TypeGraph,
    root: TypeRef,
    reflection: &dyn ReflectionProvider,
    chains: &[PropertyChain],
) -> Result<(), BuildError> {
    let root_type = graph.ty(root).source_type.clone();

    for (idx, chain) in chains.iter().enumerate() {
        let handle = u16::try_from(idx + 1).map_err(|_| BuildError::MigrationHandleOverflow {
            type_id: root_type.clone(),
        })?;

        let (last, intermediate) = match chain.segments().split_last() {
            Some(split) => split,
            None => {
                return Err(BuildError::EmptyChain {
                    type_id: root_type.clone(),
                })
            }
        };

        let mut cursor = root;
        for name in intermediate {
            let property = resolve(graph, cursor, reflection, name, chain)?;
            cursor = graph.property(property).nested_type.ok_or_else(|| {
                BuildError::ChainThroughLeaf {
                    field: graph.property(property).field.id.clone(),
                    chain: chain.to_string(),
                }
            })?;
        }

        let leaf = resolve(graph, cursor, reflection, last, chain)?;
        let node = graph.property_mut(leaf);
        if node.migration.is_some() {
            return Err(BuildError::DuplicateMigration {
                type_id: root_type,
                field: node.field.id.clone(),
            });
        }
        node.migration = Some(MigrationInfo {
            handle,
            layout_kind: classify(&node.field.ty),
        });
    }

    Ok(())
}

fn resolve(
    graph: &TypeGraph,
    container: TypeRef,
    reflection: &dyn ReflectionProvider,
    name: &str,
    chain: &PropertyChain,
) -> Result<PropertyRef, BuildError> {
    let container_type = &graph.ty(container).source_type;
    let field = reflection
        .find_field(container_type, name)?
        .ok_or_else(|| BuildError::UnknownChainField {
            container: container_type.clone(),
            name: name.to_string(),
            chain: chain.to_string(),
        })?;

    graph
        .child(container, &field.id)
        .ok_or_else(|| BuildError::ChainFieldNotInGraph {
            container: container_type.clone(),
            field: field.id,
            chain: chain.to_string(),
        })
}
