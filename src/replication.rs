// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Matches a flat replication layout against a freshly built type graph.
//!
//! Root-level commands name their own property. Commands produced by
//! expanding a struct without a whole-struct serializer only name the root
//! property that contains them, and the layout carries no record of the
//! structs in between:
//!
//! ```text
//! class Foo {
//!     struct Bar {
//!         struct Baz { int Nested; } Baz;
//!     } Bar;
//! }
//! ```
//!
//! Here the layout has a command for `Nested` whose parent is `Bar`, and
//! nothing for `Baz`. The reconciler recovers the property by searching the
//! whole struct subtree below `Bar`.

use std::collections::BTreeSet;

use tracing::debug;

use crate::classify::classify;
use crate::error::BuildError;
use crate::graph::{PropertyRef, ReplicationInfo, TypeGraph, TypeRef};
use crate::layout::{FlatCommand, ReplicationLayout};
use crate::reflection::FieldId;
use crate::views::ReplicatedGroup;
use crate::visit::{RecursionPolicy, Visit};

pub(crate) fn reconcile(
    graph: &mut TypeGraph,
    root: TypeRef,
    layout: &ReplicationLayout,
) -> Result<(), BuildError> {
    let commands = &layout.commands;
    let mut used_handles = BTreeSet::new();

    let mut index = 0;
    while index < commands.len() {
        let command = &commands[index];
        let current = index;
        index += 1;

        let field = match &command.field {
            Some(field) if !command.is_return() => field,
            _ => continue,
        };

        let target = resolve(graph, root, command, field, current)?;

        let group = ReplicatedGroup::of(command.condition);
        if !used_handles.insert((group, command.handle)) {
            return Err(BuildError::DuplicateReplicationHandle {
                type_id: graph.ty(root).source_type.clone(),
                group,
                handle: command.handle,
            });
        }

        let node = graph.property_mut(target);
        if node.replication.is_some() {
            let field = node.field.id.clone();
            return Err(BuildError::DuplicateReplication {
                type_id: graph.ty(root).source_type.clone(),
                field,
                index: current,
            });
        }
        node.replication = Some(ReplicationInfo {
            layout_kind: command.kind.unwrap_or_else(|| classify(&node.field.ty)),
            condition: command.condition,
            notify: command.notify,
            flat_index: current,
            handle: command.handle,
            role_swap_handle: command.role_swap_handle,
        });

        if command.is_array_marker() {
            // Inner commands and the terminator replicate as part of the array.
            index = match index.checked_add(command.array_span) {
                Some(next) if next <= commands.len() => next,
                _ => {
                    return Err(BuildError::ArraySpanOutOfBounds {
                        type_id: graph.ty(root).source_type.clone(),
                        index: current,
                    })
                }
            };
            debug!(
                field = %field,
                skipped = command.array_span,
                "skipping inner array commands"
            );
        }
    }

    Ok(())
}

fn resolve(
    graph: &TypeGraph,
    root: TypeRef,
    command: &FlatCommand,
    field: &FieldId,
    index: usize,
) -> Result<PropertyRef, BuildError> {
    let type_id = || graph.ty(root).source_type.clone();

    if command.parent == *field {
        return graph
            .child(root, field)
            .ok_or_else(|| BuildError::LayoutFieldNotInGraph {
                type_id: type_id(),
                field: field.clone(),
                index,
            });
    }

    let parent = graph
        .child(root, &command.parent)
        .ok_or_else(|| BuildError::LayoutFieldNotInGraph {
            type_id: type_id(),
            field: command.parent.clone(),
            index,
        })?;
    let subtree = graph
        .property(parent)
        .nested_type
        .ok_or_else(|| BuildError::ParentWithoutSubtree {
            type_id: type_id(),
            parent: command.parent.clone(),
        })?;

    let mut found = None;
    let mut ambiguous = false;
    graph.visit_properties(subtree, RecursionPolicy::StructsOnly, |r, property| {
        if property.field.id == *field {
            if found.is_some() {
                ambiguous = true;
            }
            found = Some(r);
        }
        Visit::Descend
    });

    match found {
        _ if ambiguous => Err(BuildError::AmbiguousCommandField {
            type_id: type_id(),
            parent: command.parent.clone(),
            field: field.clone(),
        }),
        Some(r) => Ok(r),
        None => Err(BuildError::CommandFieldNotFound {
            type_id: type_id(),
            parent: command.parent.clone(),
            field: field.clone(),
        }),
    }
}
