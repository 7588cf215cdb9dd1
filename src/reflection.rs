// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Interface to the reflection system that describes the types being modeled.
//!
//! The graph builder never inspects a type directly. Everything it knows
//! about fields, functions and default-instance values comes through the two
//! capabilities declared here, which keeps the builder usable with synthetic
//! types (see [`memory::TypeDatabase`]).

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ConfigError;
use crate::Rc;

pub mod memory;

/// Opaque identifier of a reflected class or struct.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeId(Rc<str>);

impl TypeId {
    pub fn new(name: impl Into<Rc<str>>) -> Self {
        TypeId(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeId {
    fn from(name: &str) -> Self {
        TypeId::new(name)
    }
}

/// Identity of a reflected field.
///
/// Two fields are the same field only if both the declaring scope and the
/// name match. A struct type nested twice under one parent therefore exposes
/// the same `FieldId`s twice, which the replication reconciler rejects as
/// ambiguous.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FieldId {
    /// Type or function that declares the field.
    pub owner: Rc<str>,
    pub name: Rc<str>,
}

impl FieldId {
    pub fn new(owner: impl Into<Rc<str>>, name: impl Into<Rc<str>>) -> Self {
        FieldId {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.owner, self.name)
    }
}

/// Identity of a reflected function.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FunctionId {
    /// Type that declares the function. May be a base class of the type the
    /// function was listed on.
    pub owner: TypeId,
    pub name: Rc<str>,
}

impl FunctionId {
    pub fn new(owner: TypeId, name: impl Into<Rc<str>>) -> Self {
        FunctionId {
            owner,
            name: name.into(),
        }
    }
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.owner, self.name)
    }
}

/// Identity of a live object, such as a class default instance or a value
/// stored in one of its fields.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(Rc<str>);

impl ObjectId {
    pub fn new(name: impl Into<Rc<str>>) -> Self {
        ObjectId(name.into())
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Declared type of a field or parameter.
///
/// The textual form is a prefix notation: `int`, `enum byte`,
/// `struct Vector`, `object Actor`, `array struct Vector`, `map name int`,
/// `delegate`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FieldType {
    Bool,
    Float,
    Double,
    Int,
    Int64,
    UInt32,
    UInt64,
    Byte,
    Name,
    String,
    Text,
    /// Enumeration stored as its underlying integer type.
    Enum(Box<FieldType>),
    /// Inline struct value of the named struct type.
    Struct(TypeId),
    /// Reference to an object whose declared class is the named type.
    Object(TypeId),
    Array(Box<FieldType>),
    Map {
        key: Box<FieldType>,
        value: Box<FieldType>,
    },
    MulticastDelegate,
}

impl FieldType {
    pub fn is_struct(&self) -> bool {
        matches!(self, FieldType::Struct(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(self, FieldType::Object(_))
    }

    pub fn is_delegate(&self) -> bool {
        matches!(self, FieldType::MulticastDelegate)
    }

    /// Strips enum wrappers down to the storage type.
    pub fn underlying(&self) -> &FieldType {
        match self {
            FieldType::Enum(inner) => inner.underlying(),
            other => other,
        }
    }

    fn parse<'s, I: Iterator<Item = &'s str>>(
        tokens: &mut I,
        source: &str,
    ) -> Result<FieldType, ConfigError> {
        let invalid = || ConfigError::InvalidFieldType(source.to_string());
        let type_name = |tokens: &mut I| tokens.next().map(TypeId::from).ok_or_else(invalid);

        Ok(match tokens.next().ok_or_else(invalid)? {
            "bool" => FieldType::Bool,
            "float" => FieldType::Float,
            "double" => FieldType::Double,
            "int" => FieldType::Int,
            "int64" => FieldType::Int64,
            "uint32" => FieldType::UInt32,
            "uint64" => FieldType::UInt64,
            "byte" => FieldType::Byte,
            "name" => FieldType::Name,
            "string" => FieldType::String,
            "text" => FieldType::Text,
            "delegate" => FieldType::MulticastDelegate,
            "enum" => FieldType::Enum(Box::new(Self::parse(tokens, source)?)),
            "struct" => FieldType::Struct(type_name(tokens)?),
            "object" => FieldType::Object(type_name(tokens)?),
            "array" => FieldType::Array(Box::new(Self::parse(tokens, source)?)),
            "map" => FieldType::Map {
                key: Box::new(Self::parse(tokens, source)?),
                value: Box::new(Self::parse(tokens, source)?),
            },
            _ => return Err(invalid()),
        })
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Bool => f.write_str("bool"),
            FieldType::Float => f.write_str("float"),
            FieldType::Double => f.write_str("double"),
            FieldType::Int => f.write_str("int"),
            FieldType::Int64 => f.write_str("int64"),
            FieldType::UInt32 => f.write_str("uint32"),
            FieldType::UInt64 => f.write_str("uint64"),
            FieldType::Byte => f.write_str("byte"),
            FieldType::Name => f.write_str("name"),
            FieldType::String => f.write_str("string"),
            FieldType::Text => f.write_str("text"),
            FieldType::MulticastDelegate => f.write_str("delegate"),
            FieldType::Enum(inner) => write!(f, "enum {inner}"),
            FieldType::Struct(ty) => write!(f, "struct {ty}"),
            FieldType::Object(ty) => write!(f, "object {ty}"),
            FieldType::Array(inner) => write!(f, "array {inner}"),
            FieldType::Map { key, value } => write!(f, "map {key} {value}"),
        }
    }
}

impl FromStr for FieldType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut tokens = s.split_whitespace();
        let ty = FieldType::parse(&mut tokens, s)?;
        if tokens.next().is_some() {
            return Err(ConfigError::InvalidFieldType(s.to_string()));
        }
        Ok(ty)
    }
}

impl Serialize for FieldType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FieldType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// One reflected field of a type, or one parameter of a function.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub id: FieldId,
    pub ty: FieldType,
}

impl FieldDescriptor {
    pub fn name(&self) -> &str {
        &self.id.name
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TypeKind {
    Class,
    Struct,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeDescriptor {
    pub id: TypeId,
    pub kind: TypeKind,
}

impl TypeDescriptor {
    pub fn is_class(&self) -> bool {
        self.kind == TypeKind::Class
    }
}

/// Which side of the connection invokes a remote procedure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RpcDirection {
    /// Invoked by the server, executed on the owning client.
    Client,
    /// Invoked by the owning client, executed on the server.
    Server,
}

impl RpcDirection {
    pub const ALL: [RpcDirection; 2] = [RpcDirection::Client, RpcDirection::Server];

    pub fn name(self) -> &'static str {
        match self {
            RpcDirection::Client => "Client",
            RpcDirection::Server => "Server",
        }
    }
}

impl fmt::Display for RpcDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Network flags of a reflected function.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FunctionFlags {
    #[serde(default)]
    pub net_client: bool,
    #[serde(default)]
    pub net_server: bool,
    #[serde(default)]
    pub net_reliable: bool,
}

impl FunctionFlags {
    /// Direction of the call, or `None` when the function is not remote.
    /// A function flagged both ways is treated as a client call.
    pub fn direction(&self) -> Option<RpcDirection> {
        if self.net_client {
            Some(RpcDirection::Client)
        } else if self.net_server {
            Some(RpcDirection::Server)
        } else {
            None
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionDescriptor {
    pub id: FunctionId,
    pub flags: FunctionFlags,
    pub parameters: Vec<FieldDescriptor>,
}

/// Value found in an object-typed field of a class default instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DefaultValue {
    pub object: ObjectId,
    /// Concrete class of the value. May be more derived than the field's
    /// declared class.
    pub runtime_type: TypeId,
    /// Object that owns the value, if any.
    pub owner: Option<ObjectId>,
    pub editor_only: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ReflectionError {
    #[error("unknown type `{0}`")]
    UnknownType(TypeId),
    #[error("`{0}` is not a class")]
    NotAClass(TypeId),
    #[error("`{class}` has no field `{field}`")]
    UnknownField { class: TypeId, field: FieldId },
}

/// Field and function metadata for reflected types.
pub trait ReflectionProvider {
    fn describe(&self, ty: &TypeId) -> Result<TypeDescriptor, ReflectionError>;

    /// Fields of `ty` in declaration order.
    fn fields(&self, ty: &TypeId) -> Result<Vec<FieldDescriptor>, ReflectionError>;

    /// Functions callable on the class `class`, in declaration order.
    fn functions(&self, class: &TypeId) -> Result<Vec<FunctionDescriptor>, ReflectionError>;

    fn find_field(
        &self,
        ty: &TypeId,
        name: &str,
    ) -> Result<Option<FieldDescriptor>, ReflectionError> {
        Ok(self
            .fields(ty)?
            .into_iter()
            .find(|field| field.name() == name))
    }
}

/// Access to class default instances, used to tell owned subobjects apart
/// from references to external objects.
pub trait DefaultValueProvider {
    fn default_instance(&self, class: &TypeId) -> Result<ObjectId, ReflectionError>;

    /// Value of the object-typed `field` on the default instance of `class`,
    /// or `None` when the field is null there.
    fn default_value(
        &self,
        class: &TypeId,
        field: &FieldId,
    ) -> Result<Option<DefaultValue>, ReflectionError>;
}
