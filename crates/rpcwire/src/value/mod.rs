// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! In-memory values and object graphs.
//!
//! Objects live in an arena ([`ObjectGraph`]) and refer to each other by
//! [`ObjectId`], so shared references and cycles need no `Rc`/`RefCell`.
//!
//! # Example
//!
//! ```rust
//! use rpcwire::{ObjectGraph, PrimitiveKind, TypeDescriptorBuilder, TypeRegistry, Value};
//!
//! let mut registry = TypeRegistry::new();
//! registry.register(
//!     TypeDescriptorBuilder::new("Node")
//!         .field("label", PrimitiveKind::String)
//!         .object_field("next", "Node")
//!         .build(),
//! ).unwrap();
//!
//! let mut graph = ObjectGraph::new();
//! let a = graph.create(&registry, "Node").unwrap();
//! graph.set(a, "label", "a").unwrap();
//! graph.set(a, "next", a).unwrap(); // self cycle
//! graph.set_root(a);
//!
//! assert_eq!(graph.follow(a, "next").unwrap(), a);
//! let label: String = graph.get_as(a, "label").unwrap();
//! assert_eq!(label, "a");
//! ```

mod graph;
mod object;

pub use graph::{ObjectGraph, ObjectId};
pub use object::Object;

use crate::error::AccessError;
use crate::types::EnumVariant;
use chrono::{DateTime, Utc};
use std::fmt;

/// Value of one enum variant.
///
/// Equality compares the enum type and the stable code only.
#[derive(Debug, Clone, Eq)]
pub struct EnumValue {
    /// Enum type id.
    pub type_id: String,
    /// Stable code (the only part written to the wire).
    pub code: i32,
    /// Variant name.
    pub name: String,
    /// Variant description.
    pub description: String,
}

impl EnumValue {
    /// Build from a registered variant.
    pub fn from_variant(type_id: impl Into<String>, variant: &EnumVariant) -> Self {
        Self {
            type_id: type_id.into(),
            code: variant.code,
            name: variant.name.clone(),
            description: variant.description.clone(),
        }
    }
}

impl PartialEq for EnumValue {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.code == other.code
    }
}

impl std::hash::Hash for EnumValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
        self.code.hash(state);
    }
}

/// A value that can appear in a field, a collection or as a graph root.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,

    // Primitives
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Char(char),
    String(String),
    Bytes(Vec<u8>),
    Date(DateTime<Utc>),

    // Composites
    Enum(EnumValue),
    List(Vec<Value>),
    Set(Vec<Value>),
    Map(Vec<(Value, Value)>),
    Object(ObjectId),
}

impl Value {
    /// Byte array value.
    pub fn bytes(data: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(data.into())
    }

    /// Set value from any iterator of values (duplicates are kept as given).
    pub fn set_of<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Self::Set(items.into_iter().map(Into::into).collect())
    }

    /// Map value from key/value pairs, in iteration order.
    pub fn map_of<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Value>,
        V: Into<Value>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Check if value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short kind name, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::I8(_) => "i8",
            Self::I16(_) => "i16",
            Self::I32(_) => "i32",
            Self::I64(_) => "i64",
            Self::U8(_) => "u8",
            Self::U16(_) => "u16",
            Self::U32(_) => "u32",
            Self::U64(_) => "u64",
            Self::F32(_) => "f32",
            Self::F64(_) => "f64",
            Self::Char(_) => "char",
            Self::String(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::Date(_) => "date",
            Self::Enum(_) => "enum",
            Self::List(_) => "list",
            Self::Set(_) => "set",
            Self::Map(_) => "map",
            Self::Object(_) => "object",
        }
    }

    /// Try to get as bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as i64, widening any signed integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::I8(v) => Some(i64::from(*v)),
            Self::I16(v) => Some(i64::from(*v)),
            Self::I32(v) => Some(i64::from(*v)),
            Self::I64(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as u64, widening any unsigned integer.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::U8(v) => Some(u64::from(*v)),
            Self::U16(v) => Some(u64::from(*v)),
            Self::U32(v) => Some(u64::from(*v)),
            Self::U64(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::F32(v) => Some(f64::from(*v)),
            Self::F64(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as string slice.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as byte slice.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Try to get as date.
    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Try to get as enum value.
    pub fn as_enum(&self) -> Option<&EnumValue> {
        match self {
            Self::Enum(e) => Some(e),
            _ => None,
        }
    }

    /// Try to get list or set elements.
    pub fn as_elements(&self) -> Option<&[Value]> {
        match self {
            Self::List(v) | Self::Set(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get map entries.
    pub fn as_map(&self) -> Option<&[(Value, Value)]> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Try to get as object reference.
    pub fn as_object(&self) -> Option<ObjectId> {
        match self {
            Self::Object(id) => Some(*id),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::String(s) => write!(f, "{:?}", s),
            Self::Enum(e) => write!(f, "{}::{}", e.type_id, e.name),
            Self::Object(id) => write!(f, "{}", id),
            Self::Bytes(b) => write!(f, "bytes[{}]", b.len()),
            Self::Date(d) => write!(f, "{}", d.to_rfc3339()),
            Self::List(v) | Self::Set(v) => write!(f, "{}[{}]", self.kind_name(), v.len()),
            Self::Map(m) => write!(f, "map[{}]", m.len()),
            Self::Bool(v) => write!(f, "{}", v),
            Self::I8(v) => write!(f, "{}", v),
            Self::I16(v) => write!(f, "{}", v),
            Self::I32(v) => write!(f, "{}", v),
            Self::I64(v) => write!(f, "{}", v),
            Self::U8(v) => write!(f, "{}", v),
            Self::U16(v) => write!(f, "{}", v),
            Self::U32(v) => write!(f, "{}", v),
            Self::U64(v) => write!(f, "{}", v),
            Self::F32(v) => write!(f, "{}", v),
            Self::F64(v) => write!(f, "{}", v),
            Self::Char(v) => write!(f, "{:?}", v),
        }
    }
}

/// Trait for converting from Value.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self, AccessError>;
}

fn mismatch(expected: &str, got: &Value) -> AccessError {
    AccessError::TypeMismatch {
        expected: expected.to_string(),
        got: got.kind_name().to_string(),
    }
}

// Primitives: FromValue and From<T> for Value
macro_rules! impl_value_primitive {
    ($ty:ty, $variant:ident, $name:expr) => {
        impl FromValue for $ty {
            fn from_value(value: &Value) -> Result<Self, AccessError> {
                match value {
                    Value::$variant(v) => Ok(*v),
                    other => Err(mismatch($name, other)),
                }
            }
        }

        impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::$variant(v)
            }
        }
    };
}

impl_value_primitive!(bool, Bool, "bool");
impl_value_primitive!(i8, I8, "i8");
impl_value_primitive!(i16, I16, "i16");
impl_value_primitive!(i32, I32, "i32");
impl_value_primitive!(i64, I64, "i64");
impl_value_primitive!(u8, U8, "u8");
impl_value_primitive!(u16, U16, "u16");
impl_value_primitive!(u32, U32, "u32");
impl_value_primitive!(u64, U64, "u64");
impl_value_primitive!(f32, F32, "f32");
impl_value_primitive!(f64, F64, "f64");
impl_value_primitive!(char, Char, "char");
impl_value_primitive!(DateTime<Utc>, Date, "date");
impl_value_primitive!(ObjectId, Object, "object");

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, AccessError> {
        match value {
            Value::String(s) => Ok(s.clone()),
            other => Err(mismatch("string", other)),
        }
    }
}

impl FromValue for EnumValue {
    fn from_value(value: &Value) -> Result<Self, AccessError> {
        match value {
            Value::Enum(e) => Ok(e.clone()),
            other => Err(mismatch("enum", other)),
        }
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, AccessError> {
        Ok(value.clone())
    }
}

/// `Null` maps to `None`.
impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self, AccessError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<EnumValue> for Value {
    fn from(e: EnumValue) -> Self {
        Value::Enum(e)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Vectors become lists; use [`Value::bytes`] for byte arrays.
impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}
