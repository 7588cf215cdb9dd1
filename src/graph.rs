// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Arena-backed type graph.
//!
//! Every node lives in one of three vectors owned by [`TypeGraph`] and is
//! addressed by a typed index. Ownership runs strictly downwards
//! (type -> properties, property -> nested type, type -> RPCs,
//! RPC -> parameters). The two upward edges, `container_type` and
//! `parent_property`, are plain indices and never own anything.

use core::fmt;

use indexmap::IndexMap;

use crate::classify::RepLayoutKind;
use crate::error::BuildError;
use crate::layout::{LifetimeCondition, RepNotifyCondition};
use crate::reflection::{FieldDescriptor, FieldId, FunctionId, RpcDirection, TypeId, TypeKind};

macro_rules! node_ref {
    ($name:ident, $prefix:literal) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u32);

        impl $name {
            pub fn index(self) -> usize {
                self.0 as usize
            }

            /// Index of the next node in an arena holding `len` nodes.
            fn from_len(len: usize) -> Result<Self, BuildError> {
                u32::try_from(len)
                    .map($name)
                    .map_err(|_| BuildError::GraphTooLarge { nodes: $prefix })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

node_ref!(TypeRef, "type");
node_ref!(PropertyRef, "property");
node_ref!(RpcRef, "rpc");

/// One concrete class or struct in the graph.
#[derive(Clone, Debug)]
pub struct TypeNode {
    pub source_type: TypeId,
    pub kind: TypeKind,
    /// Properties keyed by field, in declaration order.
    pub properties: IndexMap<FieldId, PropertyRef>,
    /// Remote procedures, in declaration order. Always empty for structs.
    pub rpcs: IndexMap<FunctionId, RpcRef>,
    /// Property whose nested type this is. `None` for the root.
    pub parent_property: Option<PropertyRef>,
}

/// Replication data attached from the flat layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplicationInfo {
    pub layout_kind: RepLayoutKind,
    pub condition: LifetimeCondition,
    pub notify: RepNotifyCondition,
    /// Position of the originating command in the flat layout.
    pub flat_index: usize,
    pub handle: u16,
    pub role_swap_handle: Option<u16>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MigrationInfo {
    pub handle: u16,
    pub layout_kind: RepLayoutKind,
}

/// One field of a type, or one parameter of an RPC.
#[derive(Clone, Debug)]
pub struct PropertyNode {
    pub field: FieldDescriptor,
    /// Owning type. `None` for RPC parameters.
    pub container_type: Option<TypeRef>,
    /// Present for struct fields and for strongly owned object fields.
    pub nested_type: Option<TypeRef>,
    pub replication: Option<ReplicationInfo>,
    pub migration: Option<MigrationInfo>,
}

impl PropertyNode {
    pub fn name(&self) -> &str {
        self.field.name()
    }
}

#[derive(Clone, Debug)]
pub struct RpcNode {
    /// Type node the RPC was discovered on.
    pub owning_type: TypeRef,
    /// Function identity; its owner is the declaring class.
    pub function: FunctionId,
    pub direction: RpcDirection,
    pub reliable: bool,
    pub parameters: IndexMap<FieldId, PropertyRef>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// Multicast delegates cannot be modeled.
    DelegateSkipped,
    /// Object value on the default instance is editor-only content.
    EditorOnlySkipped,
}

/// A field left out of the graph while building it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub type_id: TypeId,
    pub field: FieldId,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self.kind {
            DiagnosticKind::DelegateSkipped => "multicast delegate property",
            DiagnosticKind::EditorOnlySkipped => "editor only",
        };
        write!(f, "{}: {} - {reason}, skipping", self.type_id, self.field)
    }
}

/// The annotated graph of one root type.
#[derive(Clone, Debug)]
pub struct TypeGraph {
    types: Vec<TypeNode>,
    properties: Vec<PropertyNode>,
    rpcs: Vec<RpcNode>,
    diagnostics: Vec<Diagnostic>,
}

impl TypeGraph {
    pub(crate) fn new() -> Self {
        TypeGraph {
            types: Vec::new(),
            properties: Vec::new(),
            rpcs: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// The root type. Always the first type allocated.
    pub fn root(&self) -> TypeRef {
        TypeRef(0)
    }

    pub fn root_type(&self) -> &TypeId {
        &self.ty(self.root()).source_type
    }

    pub fn ty(&self, r: TypeRef) -> &TypeNode {
        &self.types[r.index()]
    }

    pub fn property(&self, r: PropertyRef) -> &PropertyNode {
        &self.properties[r.index()]
    }

    pub fn rpc(&self, r: RpcRef) -> &RpcNode {
        &self.rpcs[r.index()]
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    pub fn types(&self) -> impl Iterator<Item = (TypeRef, &TypeNode)> + '_ {
        self.types
            .iter()
            .enumerate()
            .filter_map(|(idx, node)| Some((TypeRef::from_len(idx).ok()?, node)))
    }

    /// Direct child of `ty` declared by `field`.
    pub fn child(&self, ty: TypeRef, field: &FieldId) -> Option<PropertyRef> {
        self.ty(ty).properties.get(field).copied()
    }

    /// Direct child of `ty` by field name.
    pub fn child_by_name(&self, ty: TypeRef, name: &str) -> Option<PropertyRef> {
        self.ty(ty)
            .properties
            .iter()
            .find(|(field, _)| &*field.name == name)
            .map(|(_, r)| *r)
    }

    pub(crate) fn add_type(
        &mut self,
        source_type: TypeId,
        kind: TypeKind,
    ) -> Result<TypeRef, BuildError> {
        let r = TypeRef::from_len(self.types.len())?;
        self.types.push(TypeNode {
            source_type,
            kind,
            properties: IndexMap::new(),
            rpcs: IndexMap::new(),
            parent_property: None,
        });
        Ok(r)
    }

    /// Adds a field of `container`. A container never holds two properties
    /// for the same field.
    pub(crate) fn add_property(
        &mut self,
        field: FieldDescriptor,
        container: TypeRef,
    ) -> Result<PropertyRef, BuildError> {
        let node = &self.types[container.index()];
        if node.properties.contains_key(&field.id) {
            return Err(BuildError::DuplicateField {
                type_id: node.source_type.clone(),
                field: field.id,
            });
        }
        let id = field.id.clone();
        let r = self.push_property(field, Some(container))?;
        self.types[container.index()].properties.insert(id, r);
        Ok(r)
    }

    pub(crate) fn add_rpc(
        &mut self,
        owning_type: TypeRef,
        function: FunctionId,
        direction: RpcDirection,
        reliable: bool,
    ) -> Result<RpcRef, BuildError> {
        let node = &self.types[owning_type.index()];
        if node.rpcs.contains_key(&function) {
            return Err(BuildError::DuplicateFunction {
                type_id: node.source_type.clone(),
                function,
            });
        }
        let r = RpcRef::from_len(self.rpcs.len())?;
        self.types[owning_type.index()]
            .rpcs
            .insert(function.clone(), r);
        self.rpcs.push(RpcNode {
            owning_type,
            function,
            direction,
            reliable,
            parameters: IndexMap::new(),
        });
        Ok(r)
    }

    pub(crate) fn add_parameter(
        &mut self,
        rpc: RpcRef,
        field: FieldDescriptor,
    ) -> Result<PropertyRef, BuildError> {
        let node = &self.rpcs[rpc.index()];
        if node.parameters.contains_key(&field.id) {
            return Err(BuildError::DuplicateParameter {
                function: node.function.clone(),
                field: field.id,
            });
        }
        let id = field.id.clone();
        let r = self.push_property(field, None)?;
        self.rpcs[rpc.index()].parameters.insert(id, r);
        Ok(r)
    }

    fn push_property(
        &mut self,
        field: FieldDescriptor,
        container_type: Option<TypeRef>,
    ) -> Result<PropertyRef, BuildError> {
        let r = PropertyRef::from_len(self.properties.len())?;
        self.properties.push(PropertyNode {
            field,
            container_type,
            nested_type: None,
            replication: None,
            migration: None,
        });
        Ok(r)
    }

    /// Links `nested` below `property` in both directions.
    pub(crate) fn attach_nested(&mut self, property: PropertyRef, nested: TypeRef) {
        self.properties[property.index()].nested_type = Some(nested);
        self.types[nested.index()].parent_property = Some(property);
    }

    pub(crate) fn property_mut(&mut self, r: PropertyRef) -> &mut PropertyNode {
        &mut self.properties[r.index()]
    }

    pub(crate) fn push_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}
