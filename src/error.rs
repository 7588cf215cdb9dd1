// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::reflection::{FieldId, FunctionId, ReflectionError, TypeId};
use crate::registry::RegistryError;
use crate::views::ReplicatedGroup;

/// Configuration errors that abort a graph build.
///
/// A failed build produces no graph; the whole type is unprocessable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Reflection(#[from] ReflectionError),

    #[error("type graph has more {nodes} nodes than it can index")]
    GraphTooLarge { nodes: &'static str },

    #[error("`{type_id}` declares field `{field}` more than once")]
    DuplicateField { type_id: TypeId, field: FieldId },

    #[error("`{type_id}` declares function `{function}` more than once")]
    DuplicateFunction { type_id: TypeId, function: FunctionId },

    #[error("`{function}` declares parameter `{field}` more than once")]
    DuplicateParameter { function: FunctionId, field: FieldId },

    #[error("`{type_id}` contains itself through `{path}`")]
    RecursiveType { type_id: TypeId, path: String },

    #[error("cannot find property `{name}` in container `{container}` (chain `{chain}`)")]
    UnknownChainField {
        container: TypeId,
        name: String,
        chain: String,
    },

    #[error("property `{field}` of `{container}` is not part of the type graph (chain `{chain}`)")]
    ChainFieldNotInGraph {
        container: TypeId,
        field: FieldId,
        chain: String,
    },

    #[error("property `{field}` in chain `{chain}` has no nested type; only the last segment may be a leaf")]
    ChainThroughLeaf { field: FieldId, chain: String },

    #[error("migratable chain for `{type_id}` is empty")]
    EmptyChain { type_id: TypeId },

    #[error("`{type_id}` is a struct and cannot carry migratable properties")]
    MigrationOnStruct { type_id: TypeId },

    #[error("`{type_id}` has more migratable properties than available handles")]
    MigrationHandleOverflow { type_id: TypeId },

    #[error("property `{field}` of `{type_id}` is listed as migratable more than once")]
    DuplicateMigration { type_id: TypeId, field: FieldId },

    #[error("layout command {index} of `{type_id}` names `{field}`, which is not a root property")]
    LayoutFieldNotInGraph {
        type_id: TypeId,
        field: FieldId,
        index: usize,
    },

    #[error("layout parent `{parent}` of `{type_id}` has no nested type to search")]
    ParentWithoutSubtree { type_id: TypeId, parent: FieldId },

    #[error("couldn't find `{field}` inside the sub-properties of parent `{parent}` of `{type_id}`")]
    CommandFieldNotFound {
        type_id: TypeId,
        parent: FieldId,
        field: FieldId,
    },

    #[error("`{field}` appears more than once under parent `{parent}` of `{type_id}`; diamond-shaped containment is not supported")]
    AmbiguousCommandField {
        type_id: TypeId,
        parent: FieldId,
        field: FieldId,
    },

    #[error("property `{field}` of `{type_id}` already carries replication data (command {index})")]
    DuplicateReplication {
        type_id: TypeId,
        field: FieldId,
        index: usize,
    },

    #[error("replication handle {handle} is used twice in group {group} of `{type_id}`")]
    DuplicateReplicationHandle {
        type_id: TypeId,
        group: ReplicatedGroup,
        handle: u16,
    },

    #[error("array command {index} of `{type_id}` spans past the end of the layout")]
    ArraySpanOutOfBounds { type_id: TypeId, index: usize },
}

/// Errors in a generator configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("JSON parse error: {0}")]
    Json(String),

    #[error("YAML parse error: {0}")]
    Yaml(String),

    #[error("class `{0}` is listed more than once")]
    DuplicateClass(TypeId),

    #[error("invalid property chain `{0}`")]
    InvalidChain(String),

    #[error("invalid field type `{0}`")]
    InvalidFieldType(String),

    #[error("type `{0}` is defined more than once")]
    DuplicateType(TypeId),

    #[error("type `{ty}` declares field `{field}` more than once")]
    DuplicateField { ty: TypeId, field: String },

    #[error("type `{ty}` declares function `{function}` more than once")]
    DuplicateFunction { ty: TypeId, function: String },

    #[error("function `{ty}::{function}` declares parameter `{parameter}` more than once")]
    DuplicateParameter {
        ty: TypeId,
        function: String,
        parameter: String,
    },

    #[error("type `{0}` inherits from itself")]
    InheritanceCycle(TypeId),
}

impl From<serde_json::Error> for ConfigError {
    fn from(error: serde_json::Error) -> Self {
        ConfigError::Json(error.to_string())
    }
}

#[cfg(feature = "yaml")]
impl From<serde_yaml::Error> for ConfigError {
    fn from(error: serde_yaml::Error) -> Self {
        ConfigError::Yaml(error.to_string())
    }
}

/// Failure while compiling a configured class.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("schema generation failed for `{class}`: {source}")]
    Build {
        class: TypeId,
        #[source]
        source: BuildError,
    },
}
