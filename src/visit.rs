// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Depth-first traversal over a [`TypeGraph`].
//!
//! All walks share one primitive: properties are visited in declaration
//! order, and a property's nested type is entered when the visitor asks for
//! it and the [`RecursionPolicy`] allows it.

use crate::graph::{PropertyNode, PropertyRef, RpcRef, TypeGraph, TypeNode, TypeRef};

/// Which nested types a walk may enter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecursionPolicy {
    /// Enter nested structs only.
    StructsOnly,
    /// Enter nested structs and strongly owned subobjects.
    StructsAndOwnedObjects,
}

impl RecursionPolicy {
    fn allows(self, property: &PropertyNode) -> bool {
        match self {
            RecursionPolicy::StructsOnly => property.field.ty.is_struct(),
            RecursionPolicy::StructsAndOwnedObjects => true,
        }
    }
}

/// Visitor verdict for the node just visited.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visit {
    Descend,
    SkipChildren,
}

impl TypeGraph {
    /// Visits every property below `ty`.
    pub fn visit_properties<F>(&self, ty: TypeRef, policy: RecursionPolicy, mut visitor: F)
    where
        F: FnMut(PropertyRef, &PropertyNode) -> Visit,
    {
        self.walk_properties(self.ty(ty).properties.values().copied(), policy, &mut visitor);
    }

    /// Visits the parameters of `rpc` and, where allowed, their nested fields.
    pub fn visit_rpc_parameters<F>(&self, rpc: RpcRef, policy: RecursionPolicy, mut visitor: F)
    where
        F: FnMut(PropertyRef, &PropertyNode) -> Visit,
    {
        self.walk_properties(self.rpc(rpc).parameters.values().copied(), policy, &mut visitor);
    }

    /// Visits `ty` and every nested type reachable under `policy`.
    pub fn visit_types<F>(&self, ty: TypeRef, policy: RecursionPolicy, mut visitor: F)
    where
        F: FnMut(TypeRef, &TypeNode) -> Visit,
    {
        self.walk_types(ty, policy, &mut visitor);
    }

    fn walk_properties<I, F>(&self, properties: I, policy: RecursionPolicy, visitor: &mut F)
    where
        I: Iterator<Item = PropertyRef>,
        F: FnMut(PropertyRef, &PropertyNode) -> Visit,
    {
        for r in properties {
            let property = self.property(r);
            if visitor(r, property) == Visit::SkipChildren {
                continue;
            }
            if let Some(nested) = property.nested_type {
                if policy.allows(property) {
                    self.walk_properties(
                        self.ty(nested).properties.values().copied(),
                        policy,
                        visitor,
                    );
                }
            }
        }
    }

    fn walk_types<F>(&self, ty: TypeRef, policy: RecursionPolicy, visitor: &mut F)
    where
        F: FnMut(TypeRef, &TypeNode) -> Visit,
    {
        let node = self.ty(ty);
        if visitor(ty, node) == Visit::SkipChildren {
            return;
        }
        for r in node.properties.values() {
            let property = self.property(*r);
            if let Some(nested) = property.nested_type {
                if policy.allows(property) {
                    self.walk_types(nested, policy, visitor);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests;
