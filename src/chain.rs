// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::graph::{PropertyRef, TypeGraph};

impl TypeGraph {
    /// Properties from the root down to `property`, the root-level one first.
    ///
    /// The chain climbs `container_type` then `parent_property` until it
    /// reaches a type without a parent. RPC parameters have no container,
    /// so their chain is the parameter alone.
    pub fn property_chain(&self, property: PropertyRef) -> Vec<PropertyRef> {
        let mut chain = vec![property];
        let mut cursor = property;
        while let Some(parent) = self
            .property(cursor)
            .container_type
            .and_then(|container| self.ty(container).parent_property)
        {
            chain.push(parent);
            cursor = parent;
        }
        chain.reverse();
        chain
    }

    /// Field names of [`TypeGraph::property_chain`] joined with dots.
    pub fn dotted_path(&self, property: PropertyRef) -> String {
        self.property_chain(property)
            .into_iter()
            .map(|r| self.property(r).name())
            .collect::<Vec<_>>()
            .join(".")
    }
}
