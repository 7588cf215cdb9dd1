// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Maps declared field types onto wire-level layout kinds.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::reflection::FieldType;

/// Wire-level kind of a replicated or migrated property.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RepLayoutKind {
    Bool,
    Float,
    Int,
    #[serde(rename = "uint32")]
    UInt32,
    #[serde(rename = "uint64")]
    UInt64,
    Byte,
    Name,
    String,
    Object,
    Vector,
    Rotator,
    Plane,
    Vector100,
    Vector10,
    VectorNormal,
    VectorQ,
    NetId,
    RepMovement,
    /// Struct without a specialized whole-struct representation.
    GenericStruct,
    /// Anything else, serialized through the generic property path.
    Generic,
    /// Layout-only marker for the start of a dynamic array.
    DynamicArray,
    /// Layout-only terminator.
    Return,
}

impl RepLayoutKind {
    /// Struct kinds that travel as one opaque unit.
    pub fn is_specialized_struct(self) -> bool {
        matches!(
            self,
            RepLayoutKind::Vector
                | RepLayoutKind::Rotator
                | RepLayoutKind::Plane
                | RepLayoutKind::Vector100
                | RepLayoutKind::Vector10
                | RepLayoutKind::VectorNormal
                | RepLayoutKind::VectorQ
                | RepLayoutKind::NetId
                | RepLayoutKind::RepMovement
        )
    }
}

lazy_static::lazy_static! {
    /// Struct types with a dedicated wire representation, by exact type name.
    static ref SPECIALIZED_STRUCTS: BTreeMap<&'static str, RepLayoutKind> = [
        ("Vector", RepLayoutKind::Vector),
        ("Rotator", RepLayoutKind::Rotator),
        ("Plane", RepLayoutKind::Plane),
        ("Vector_NetQuantize100", RepLayoutKind::Vector100),
        ("Vector_NetQuantize10", RepLayoutKind::Vector10),
        ("Vector_NetQuantizeNormal", RepLayoutKind::VectorNormal),
        ("Vector_NetQuantize", RepLayoutKind::VectorQ),
        ("UniqueNetIdRepl", RepLayoutKind::NetId),
        ("RepMovement", RepLayoutKind::RepMovement),
    ]
    .into_iter()
    .collect();
}

/// Classifies a declared field type.
///
/// Struct types are matched by name only, so same-named structs from
/// different namespaces classify identically.
pub fn classify(ty: &FieldType) -> RepLayoutKind {
    match ty.underlying() {
        FieldType::Struct(struct_type) => SPECIALIZED_STRUCTS
            .get(struct_type.name())
            .copied()
            .unwrap_or(RepLayoutKind::GenericStruct),
        FieldType::Bool => RepLayoutKind::Bool,
        FieldType::Float => RepLayoutKind::Float,
        FieldType::Int => RepLayoutKind::Int,
        FieldType::Byte => RepLayoutKind::Byte,
        FieldType::Object(_) => RepLayoutKind::Object,
        FieldType::Name => RepLayoutKind::Name,
        FieldType::UInt32 => RepLayoutKind::UInt32,
        FieldType::UInt64 => RepLayoutKind::UInt64,
        FieldType::String => RepLayoutKind::String,
        _ => RepLayoutKind::Generic,
    }
}
