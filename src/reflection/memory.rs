// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! An in-memory reflection system loaded from JSON or YAML.
//!
//! ```yaml
//! types:
//!   - name: Pawn
//!     kind: class
//!     base: Actor
//!     fields:
//!       - { name: Health, type: float }
//!       - name: Weapon
//!         type: object Weapon
//!         default: { class: Rifle, owned: true }
//!     functions:
//!       - name: ServerFire
//!         flags: { netServer: true, netReliable: true }
//!         params:
//!           - { name: Origin, type: struct Vector }
//!     layout:
//!       - { parent: Health, handle: 1 }
//! ```
//!
//! Fields and functions of a base class are listed before those of the
//! derived class and keep the base class as their declaring owner.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::classify::RepLayoutKind;
use crate::error::ConfigError;
use crate::layout::{
    FlatCommand, LayoutProvider, LifetimeCondition, RepNotifyCondition, ReplicationLayout,
};
use crate::reflection::{
    DefaultValue, DefaultValueProvider, FieldDescriptor, FieldId, FieldType, FunctionDescriptor,
    FunctionFlags, FunctionId, ObjectId, ReflectionError, ReflectionProvider, TypeDescriptor,
    TypeId, TypeKind,
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TypeSpec {
    pub name: TypeId,
    pub kind: TypeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<TypeId>,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
    #[serde(default)]
    pub functions: Vec<FunctionSpec>,
    /// Flat replication layout. Only meaningful for classes.
    #[serde(default)]
    pub layout: Vec<CommandSpec>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FieldSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: FieldType,
    /// Value of an object field on the class default instance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultSpec>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DefaultSpec {
    /// Runtime class of the value.
    pub class: TypeId,
    /// Whether the default instance owns the value.
    #[serde(default)]
    pub owned: bool,
    #[serde(default)]
    pub editor_only: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FunctionSpec {
    pub name: String,
    #[serde(default)]
    pub flags: FunctionFlags,
    #[serde(default)]
    pub params: Vec<ParameterSpec>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ParameterSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: FieldType,
}

/// One flat layout command.
///
/// `field` defaults to `parent`, except for `return` markers which carry no
/// field. Names are looked up on the class and its bases; `fieldOwner`
/// names the declaring struct for fields nested below `parent`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CommandSpec {
    pub parent: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_owner: Option<TypeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<RepLayoutKind>,
    #[serde(default)]
    pub condition: LifetimeCondition,
    #[serde(default)]
    pub notify: RepNotifyCondition,
    #[serde(default)]
    pub handle: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_swap_handle: Option<u16>,
    #[serde(default)]
    pub array_span: usize,
}

impl TypeSpec {
    /// Rejects fields, functions or parameters declared twice under one name.
    fn check_names(&self) -> Result<(), ConfigError> {
        let mut fields = BTreeSet::new();
        for field in &self.fields {
            if !fields.insert(field.name.as_str()) {
                return Err(ConfigError::DuplicateField {
                    ty: self.name.clone(),
                    field: field.name.clone(),
                });
            }
        }

        let mut functions = BTreeSet::new();
        for function in &self.functions {
            if !functions.insert(function.name.as_str()) {
                return Err(ConfigError::DuplicateFunction {
                    ty: self.name.clone(),
                    function: function.name.clone(),
                });
            }
            let mut params = BTreeSet::new();
            for param in &function.params {
                if !params.insert(param.name.as_str()) {
                    return Err(ConfigError::DuplicateParameter {
                        ty: self.name.clone(),
                        function: function.name.clone(),
                        parameter: param.name.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DatabaseSpec {
    types: Vec<TypeSpec>,
}

/// Reflection, default-instance and layout provider backed by plain data.
#[derive(Clone, Debug, Default)]
pub struct TypeDatabase {
    types: IndexMap<TypeId, TypeSpec>,
}

impl TypeDatabase {
    pub fn new(types: Vec<TypeSpec>) -> Result<Self, ConfigError> {
        let mut database = TypeDatabase::default();
        for spec in types {
            if database.types.contains_key(&spec.name) {
                return Err(ConfigError::DuplicateType(spec.name));
            }
            spec.check_names()?;
            database.types.insert(spec.name.clone(), spec);
        }
        database.check_inheritance()?;
        Ok(database)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let spec: DatabaseSpec = serde_json::from_str(json)?;
        Self::new(spec.types)
    }

    #[cfg(feature = "yaml")]
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let spec: DatabaseSpec = serde_yaml::from_str(yaml)?;
        Self::new(spec.types)
    }

    fn check_inheritance(&self) -> Result<(), ConfigError> {
        for start in self.types.keys() {
            let mut seen = vec![start];
            let mut cursor = self.types.get(start).and_then(|spec| spec.base.as_ref());
            while let Some(base) = cursor {
                if seen.contains(&base) {
                    return Err(ConfigError::InheritanceCycle(start.clone()));
                }
                seen.push(base);
                cursor = self.types.get(base).and_then(|spec| spec.base.as_ref());
            }
        }
        Ok(())
    }

    fn spec(&self, ty: &TypeId) -> Result<&TypeSpec, ReflectionError> {
        self.types
            .get(ty)
            .ok_or_else(|| ReflectionError::UnknownType(ty.clone()))
    }

    fn class_spec(&self, ty: &TypeId) -> Result<&TypeSpec, ReflectionError> {
        let spec = self.spec(ty)?;
        match spec.kind {
            TypeKind::Class => Ok(spec),
            TypeKind::Struct => Err(ReflectionError::NotAClass(ty.clone())),
        }
    }

    /// `ty` and its bases, the most basic type first.
    fn hierarchy(&self, ty: &TypeId) -> Result<Vec<&TypeSpec>, ReflectionError> {
        let mut chain = vec![self.spec(ty)?];
        while let Some(base) = chain.last().copied().and_then(|spec| spec.base.as_ref()) {
            chain.push(self.spec(base)?);
        }
        chain.reverse();
        Ok(chain)
    }
}

impl ReflectionProvider for TypeDatabase {
    fn describe(&self, ty: &TypeId) -> Result<TypeDescriptor, ReflectionError> {
        let spec = self.spec(ty)?;
        Ok(TypeDescriptor {
            id: spec.name.clone(),
            kind: spec.kind,
        })
    }

    fn fields(&self, ty: &TypeId) -> Result<Vec<FieldDescriptor>, ReflectionError> {
        Ok(self
            .hierarchy(ty)?
            .into_iter()
            .flat_map(|spec| {
                spec.fields.iter().map(move |field| FieldDescriptor {
                    id: FieldId::new(spec.name.name(), field.name.as_str()),
                    ty: field.ty.clone(),
                })
            })
            .collect())
    }

    fn functions(&self, class: &TypeId) -> Result<Vec<FunctionDescriptor>, ReflectionError> {
        self.class_spec(class)?;
        let mut functions = Vec::new();
        for spec in self.hierarchy(class)? {
            for function in &spec.functions {
                let id = FunctionId::new(spec.name.clone(), function.name.as_str());
                let scope = id.to_string();
                functions.push(FunctionDescriptor {
                    parameters: function
                        .params
                        .iter()
                        .map(|param| FieldDescriptor {
                            id: FieldId::new(scope.as_str(), param.name.as_str()),
                            ty: param.ty.clone(),
                        })
                        .collect(),
                    id,
                    flags: function.flags,
                });
            }
        }
        Ok(functions)
    }
}

impl DefaultValueProvider for TypeDatabase {
    fn default_instance(&self, class: &TypeId) -> Result<ObjectId, ReflectionError> {
        self.class_spec(class)?;
        Ok(ObjectId::new(format!("Default__{class}")))
    }

    fn default_value(
        &self,
        class: &TypeId,
        field: &FieldId,
    ) -> Result<Option<DefaultValue>, ReflectionError> {
        let instance = self.default_instance(class)?;
        let spec = self
            .hierarchy(class)?
            .into_iter()
            .filter(|spec| spec.name.name() == &*field.owner)
            .flat_map(|spec| spec.fields.iter())
            .find(|candidate| candidate.name == &*field.name)
            .ok_or_else(|| ReflectionError::UnknownField {
                class: class.clone(),
                field: field.clone(),
            })?;

        Ok(spec.default.as_ref().map(|value| DefaultValue {
            object: ObjectId::new(format!("{instance}.{}", field.name)),
            runtime_type: value.class.clone(),
            owner: value.owned.then(|| instance.clone()),
            editor_only: value.editor_only,
        }))
    }
}

impl LayoutProvider for TypeDatabase {
    fn compute_layout(&self, class: &TypeId) -> Result<ReplicationLayout, ReflectionError> {
        let spec = self.class_spec(class)?;
        let fields = self.fields(class)?;
        let lookup = |name: &str| {
            fields
                .iter()
                .find(|field| field.name() == name)
                .map(|field| field.id.clone())
                .unwrap_or_else(|| FieldId::new(class.name(), name))
        };

        let commands = spec
            .layout
            .iter()
            .map(|command| {
                let parent = lookup(&command.parent);
                let field = match (&command.field, &command.field_owner) {
                    (None, _) if command.kind == Some(RepLayoutKind::Return) => None,
                    (None, _) => Some(parent.clone()),
                    (Some(name), Some(owner)) => Some(FieldId::new(owner.name(), name.as_str())),
                    (Some(name), None) => Some(lookup(name)),
                };
                FlatCommand {
                    parent,
                    field,
                    kind: command.kind,
                    condition: command.condition,
                    notify: command.notify,
                    handle: command.handle,
                    role_swap_handle: command.role_swap_handle,
                    array_span: command.array_span,
                }
            })
            .collect();

        Ok(ReplicationLayout { commands })
    }
}
