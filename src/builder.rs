// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Builds the [`TypeGraph`] of a root type and annotates it.
//!
//! Struct fields are always expanded. Object fields are expanded only when
//! the value stored on the class default instance is owned by that default
//! instance; the expansion then follows the value's runtime class. Every
//! class node is reconciled against its own flat replication layout, and the
//! root additionally receives the requested migratable chains.

use tracing::{debug, warn};

use crate::error::BuildError;
use crate::graph::{Diagnostic, DiagnosticKind, TypeGraph, TypeRef};
use crate::layout::LayoutProvider;
use crate::migration::{self, PropertyChain};
use crate::reflection::{
    DefaultValueProvider, FieldDescriptor, FieldType, ReflectionProvider, TypeDescriptor, TypeId,
    TypeKind,
};
use crate::replication;

/// How an object field relates to the class that declares it.
enum Ownership {
    /// Subobject created by the default instance; expanded as `TypeId`.
    Owned(TypeId),
    Weak,
    /// Editor-only content, left out of the graph entirely.
    EditorOnly,
}

pub struct TypeGraphBuilder<'a> {
    reflection: &'a dyn ReflectionProvider,
    defaults: &'a dyn DefaultValueProvider,
    layout: &'a dyn LayoutProvider,
}

impl<'a> TypeGraphBuilder<'a> {
    pub fn new(
        reflection: &'a dyn ReflectionProvider,
        defaults: &'a dyn DefaultValueProvider,
        layout: &'a dyn LayoutProvider,
    ) -> Self {
        Self {
            reflection,
            defaults,
            layout,
        }
    }

    /// Builds the graph rooted at `root` and attaches migration handles for
    /// `chains`, numbered from 1 in the order given.
    ///
    /// Any configuration error aborts the build; no partial graph is
    /// returned.
    pub fn build(&self, root: &TypeId, chains: &[PropertyChain]) -> Result<TypeGraph, BuildError> {
        let mut graph = TypeGraph::new();
        let mut path = Vec::new();
        let root_ref = self.build_type(&mut graph, root, &mut path)?;

        if !chains.is_empty() {
            if graph.ty(root_ref).kind != TypeKind::Class {
                return Err(BuildError::MigrationOnStruct {
                    type_id: root.clone(),
                });
            }
            migration::reconcile(&mut graph, root_ref, self.reflection, chains)?;
        }

        Ok(graph)
    }

    fn build_type(
        &self,
        graph: &mut TypeGraph,
        ty: &TypeId,
        path: &mut Vec<TypeId>,
    ) -> Result<TypeRef, BuildError> {
        if path.contains(ty) {
            let path = path
                .iter()
                .chain(core::iter::once(ty))
                .map(TypeId::name)
                .collect::<Vec<_>>()
                .join(" -> ");
            return Err(BuildError::RecursiveType {
                type_id: ty.clone(),
                path,
            });
        }

        let descriptor = self.reflection.describe(ty)?;
        path.push(ty.clone());

        let node = graph.add_type(descriptor.id.clone(), descriptor.kind)?;
        self.build_fields(graph, node, &descriptor, path)?;

        if descriptor.is_class() {
            self.build_rpcs(graph, node, &descriptor.id, path)?;
            let layout = self.layout.compute_layout(&descriptor.id)?;
            replication::reconcile(graph, node, &layout)?;
        }

        path.pop();
        Ok(node)
    }

    fn build_fields(
        &self,
        graph: &mut TypeGraph,
        node: TypeRef,
        descriptor: &TypeDescriptor,
        path: &mut Vec<TypeId>,
    ) -> Result<(), BuildError> {
        for field in self.reflection.fields(&descriptor.id)? {
            match &field.ty {
                FieldType::MulticastDelegate => {
                    warn!(
                        type_id = %descriptor.id,
                        field = %field.id,
                        "multicast delegate property, skipping"
                    );
                    graph.push_diagnostic(Diagnostic {
                        kind: DiagnosticKind::DelegateSkipped,
                        type_id: descriptor.id.clone(),
                        field: field.id,
                    });
                }
                FieldType::Struct(struct_type) => {
                    let struct_type = struct_type.clone();
                    let property = graph.add_property(field, node)?;
                    let nested = self.build_type(graph, &struct_type, path)?;
                    graph.attach_nested(property, nested);
                }
                FieldType::Object(_) => match self.ownership(descriptor, &field)? {
                    Ownership::EditorOnly => {
                        warn!(
                            type_id = %descriptor.id,
                            field = %field.id,
                            "editor only, skipping"
                        );
                        graph.push_diagnostic(Diagnostic {
                            kind: DiagnosticKind::EditorOnlySkipped,
                            type_id: descriptor.id.clone(),
                            field: field.id,
                        });
                    }
                    Ownership::Weak => {
                        graph.add_property(field, node)?;
                    }
                    Ownership::Owned(runtime_type) => {
                        let property = graph.add_property(field, node)?;
                        let nested = self.build_type(graph, &runtime_type, path)?;
                        graph.attach_nested(property, nested);
                    }
                },
                _ => {
                    graph.add_property(field, node)?;
                }
            }
        }
        Ok(())
    }

    fn ownership(
        &self,
        descriptor: &TypeDescriptor,
        field: &FieldDescriptor,
    ) -> Result<Ownership, BuildError> {
        if !descriptor.is_class() {
            debug!(
                type_id = %descriptor.id,
                field = %field.id,
                "object field inside a struct, weak reference"
            );
            return Ok(Ownership::Weak);
        }

        let value = match self.defaults.default_value(&descriptor.id, &field.id)? {
            Some(value) => value,
            None => {
                debug!(
                    type_id = %descriptor.id,
                    field = %field.id,
                    "null on the default instance, weak reference"
                );
                return Ok(Ownership::Weak);
            }
        };

        if value.editor_only {
            return Ok(Ownership::EditorOnly);
        }

        let default_instance = self.defaults.default_instance(&descriptor.id)?;
        if value.owner.as_ref() == Some(&default_instance) {
            debug!(
                type_id = %descriptor.id,
                field = %field.id,
                runtime_type = %value.runtime_type,
                "owned by the default instance, expanding"
            );
            Ok(Ownership::Owned(value.runtime_type))
        } else {
            debug!(
                type_id = %descriptor.id,
                field = %field.id,
                object = %value.object,
                "owned elsewhere, weak reference"
            );
            Ok(Ownership::Weak)
        }
    }

    fn build_rpcs(
        &self,
        graph: &mut TypeGraph,
        node: TypeRef,
        class: &TypeId,
        path: &mut Vec<TypeId>,
    ) -> Result<(), BuildError> {
        for function in self.reflection.functions(class)? {
            let direction = match function.flags.direction() {
                Some(direction) => direction,
                None => continue,
            };
            let rpc = graph.add_rpc(node, function.id, direction, function.flags.net_reliable)?;

            for parameter in function.parameters {
                let struct_type = match &parameter.ty {
                    FieldType::Struct(struct_type) => Some(struct_type.clone()),
                    _ => None,
                };
                let property = graph.add_parameter(rpc, parameter)?;
                if let Some(struct_type) = struct_type {
                    let nested = self.build_type(graph, &struct_type, path)?;
                    graph.attach_nested(property, nested);
                }
            }
        }
        Ok(())
    }
}
