// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Builds replication schema graphs from reflected type metadata.
//!
//! A root class is walked through a [`ReflectionProvider`] into a
//! [`TypeGraph`]: an arena of type, property and RPC nodes covering every
//! nested struct and every strongly owned subobject. Two metadata layers are
//! then overlaid on that graph:
//!
//! * replication data, reconciled from the flat command list produced by a
//!   [`LayoutProvider`];
//! * migration data, attached to the properties named by dotted
//!   [`PropertyChain`]s.
//!
//! Code generators consume the result through the read-only views in
//! [`views`] and the property chain helpers in [`chain`].

#![allow(clippy::module_name_repetitions)]

#[cfg(feature = "arc")]
pub use std::sync::Arc as Rc;

#[cfg(not(feature = "arc"))]
pub use std::rc::Rc;

pub mod builder;
pub mod chain;
pub mod classify;
pub mod compiler;
pub mod config;
pub mod error;
pub mod graph;
pub mod layout;
pub mod migration;
pub mod reflection;
pub mod registry;
pub mod replication;
pub mod views;
pub mod visit;

pub use builder::TypeGraphBuilder;
pub use classify::{classify, RepLayoutKind};
pub use compiler::SchemaCompiler;
pub use config::{ClassConfig, GeneratorConfig};
pub use error::{BuildError, CompileError, ConfigError};
pub use graph::{
    Diagnostic, DiagnosticKind, MigrationInfo, PropertyNode, PropertyRef, ReplicationInfo,
    RpcNode, RpcRef, TypeGraph, TypeNode, TypeRef,
};
pub use layout::{FlatCommand, LayoutProvider, LifetimeCondition, RepNotifyCondition, ReplicationLayout};
pub use migration::PropertyChain;
pub use reflection::memory::TypeDatabase;
pub use reflection::{
    DefaultValue, DefaultValueProvider, FieldDescriptor, FieldId, FieldType, FunctionDescriptor,
    FunctionId, ObjectId, ReflectionError, ReflectionProvider, RpcDirection, TypeDescriptor,
    TypeId, TypeKind,
};
pub use views::{ReplicatedGroup, ReplicatedGroups, RpcsByDirection};
pub use visit::{RecursionPolicy, Visit};

#[cfg(test)]
mod tests;
