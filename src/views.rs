// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Read-only projections of an annotated [`TypeGraph`] for code generation.
//!
//! Every view is rebuilt from a full walk and is ordered deterministically,
//! either by handle or by declaration order.

use core::fmt;
use std::collections::BTreeMap;

use tracing::trace;

use crate::classify::{classify, RepLayoutKind};
use crate::graph::{PropertyRef, RpcRef, TypeGraph, TypeRef};
use crate::layout::LifetimeCondition;
use crate::reflection::{RpcDirection, TypeId};
use crate::visit::{RecursionPolicy, Visit};

/// Recipient set of a replicated property.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReplicatedGroup {
    SingleClient,
    MultiClient,
}

impl ReplicatedGroup {
    pub const ALL: [ReplicatedGroup; 2] = [ReplicatedGroup::SingleClient, ReplicatedGroup::MultiClient];

    pub fn of(condition: LifetimeCondition) -> Self {
        if condition.is_single_recipient() {
            ReplicatedGroup::SingleClient
        } else {
            ReplicatedGroup::MultiClient
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ReplicatedGroup::SingleClient => "SingleClient",
            ReplicatedGroup::MultiClient => "MultiClient",
        }
    }
}

impl fmt::Display for ReplicatedGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Replicated properties split by recipient group, each ordered by handle.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReplicatedGroups {
    single_client: BTreeMap<u16, PropertyRef>,
    multi_client: BTreeMap<u16, PropertyRef>,
}

impl ReplicatedGroups {
    pub fn get(&self, group: ReplicatedGroup) -> &BTreeMap<u16, PropertyRef> {
        match group {
            ReplicatedGroup::SingleClient => &self.single_client,
            ReplicatedGroup::MultiClient => &self.multi_client,
        }
    }

    fn get_mut(&mut self, group: ReplicatedGroup) -> &mut BTreeMap<u16, PropertyRef> {
        match group {
            ReplicatedGroup::SingleClient => &mut self.single_client,
            ReplicatedGroup::MultiClient => &mut self.multi_client,
        }
    }

    pub fn len(&self) -> usize {
        self.single_client.len() + self.multi_client.len()
    }

    pub fn is_empty(&self) -> bool {
        self.single_client.is_empty() && self.multi_client.is_empty()
    }
}

/// RPCs split by direction, each in discovery order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RpcsByDirection {
    client: Vec<RpcRef>,
    server: Vec<RpcRef>,
}

impl RpcsByDirection {
    pub fn get(&self, direction: RpcDirection) -> &[RpcRef] {
        match direction {
            RpcDirection::Client => &self.client,
            RpcDirection::Server => &self.server,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.client.is_empty() && self.server.is_empty()
    }
}

impl TypeGraph {
    /// Replicated properties of `ty` and its nested structs.
    pub fn replicated_properties(&self, ty: TypeRef) -> ReplicatedGroups {
        let mut groups = ReplicatedGroups::default();
        self.visit_properties(ty, RecursionPolicy::StructsOnly, |r, property| {
            if let Some(replication) = &property.replication {
                groups
                    .get_mut(ReplicatedGroup::of(replication.condition))
                    .insert(replication.handle, r);
            }
            Visit::Descend
        });
        groups
    }

    /// Migratable properties anywhere below `ty`, owned subobjects included.
    pub fn migratable_properties(&self, ty: TypeRef) -> BTreeMap<u16, PropertyRef> {
        let mut migratable = BTreeMap::new();
        self.visit_properties(ty, RecursionPolicy::StructsAndOwnedObjects, |r, property| {
            if let Some(migration) = &property.migration {
                migratable.insert(migration.handle, r);
            }
            Visit::Descend
        });
        migratable
    }

    /// Parameters of `rpc` with generic structs expanded into their fields.
    /// Specialized structs stay as single opaque entries.
    pub fn flat_rpc_parameters(&self, rpc: RpcRef) -> Vec<PropertyRef> {
        let mut parameters = Vec::new();
        self.visit_rpc_parameters(rpc, RecursionPolicy::StructsOnly, |r, property| {
            if classify(&property.field.ty) == RepLayoutKind::GenericStruct {
                return Visit::Descend;
            }
            parameters.push(r);
            Visit::SkipChildren
        });
        parameters
    }

    /// Distinct classes declaring at least one RPC anywhere below `ty`, in
    /// discovery order.
    pub fn rpc_type_owners(&self, ty: TypeRef) -> Vec<TypeId> {
        let mut owners: Vec<TypeId> = Vec::new();
        self.visit_types(ty, RecursionPolicy::StructsAndOwnedObjects, |_, node| {
            for (function, _) in &node.rpcs {
                trace!(owner = %function.owner, function = %function.name, "RPC type owner found");
                if !owners.contains(&function.owner) {
                    owners.push(function.owner.clone());
                }
            }
            Visit::Descend
        });
        owners
    }

    /// Every RPC below `ty`, owned subobjects included, split by direction.
    pub fn rpcs_by_direction(&self, ty: TypeRef) -> RpcsByDirection {
        let mut rpcs = RpcsByDirection::default();
        self.visit_types(ty, RecursionPolicy::StructsAndOwnedObjects, |_, node| {
            for r in node.rpcs.values() {
                match self.rpc(*r).direction {
                    RpcDirection::Client => rpcs.client.push(*r),
                    RpcDirection::Server => rpcs.server.push(*r),
                }
            }
            Visit::Descend
        });
        rpcs
    }
}
