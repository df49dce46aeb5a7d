// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type descriptors: the wire layout of every encodable type.

use crate::error::{CodecError, Result};
use crate::value::{Object, Value};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Primitive (non-composite) value kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Char,
    String,
    Bytes,
    Date,
}

impl PrimitiveKind {
    /// Stable name, also accepted as a parameter type id in call envelopes.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Char => "char",
            Self::String => "string",
            Self::Bytes => "bytes",
            Self::Date => "date",
        }
    }

    /// Inverse of [`PrimitiveKind::name`].
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "bool" => Self::Bool,
            "i8" => Self::I8,
            "i16" => Self::I16,
            "i32" => Self::I32,
            "i64" => Self::I64,
            "u8" => Self::U8,
            "u16" => Self::U16,
            "u32" => Self::U32,
            "u64" => Self::U64,
            "f32" => Self::F32,
            "f64" => Self::F64,
            "char" => Self::Char,
            "string" => Self::String,
            "bytes" => Self::Bytes,
            "date" => Self::Date,
            _ => return None,
        };
        Some(kind)
    }

    /// Whether a field of this kind may hold `Null`.
    pub fn is_nullable(&self) -> bool {
        matches!(self, Self::String | Self::Bytes | Self::Date)
    }

    /// Default value of a field of this kind.
    pub fn default_value(&self) -> Value {
        match self {
            Self::Bool => Value::Bool(false),
            Self::I8 => Value::I8(0),
            Self::I16 => Value::I16(0),
            Self::I32 => Value::I32(0),
            Self::I64 => Value::I64(0),
            Self::U8 => Value::U8(0),
            Self::U16 => Value::U16(0),
            Self::U32 => Value::U32(0),
            Self::U64 => Value::U64(0),
            Self::F32 => Value::F32(0.0),
            Self::F64 => Value::F64(0.0),
            Self::Char => Value::Char('\0'),
            Self::String | Self::Bytes | Self::Date => Value::Null,
        }
    }
}

/// Declared kind of a field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Primitive value.
    Primitive(PrimitiveKind),
    /// Value of the registered enum type with this id.
    Enum(String),
    /// Reference to an object of the registered struct type with this id.
    Object(String),
    /// Ordered collection.
    List(Box<FieldKind>),
    /// Collection with set semantics (insertion order is kept on the wire).
    Set(Box<FieldKind>),
    /// Key/value pairs.
    Map(Box<FieldKind>, Box<FieldKind>),
    /// Any value; the stream carries its kind.
    Any,
}

impl FieldKind {
    /// Reference to an object of `type_id`.
    pub fn object(type_id: impl Into<String>) -> Self {
        Self::Object(type_id.into())
    }

    /// Value of enum `type_id`.
    pub fn enumeration(type_id: impl Into<String>) -> Self {
        Self::Enum(type_id.into())
    }

    /// List of `element`.
    pub fn list(element: impl Into<FieldKind>) -> Self {
        Self::List(Box::new(element.into()))
    }

    /// Set of `element`.
    pub fn set(element: impl Into<FieldKind>) -> Self {
        Self::Set(Box::new(element.into()))
    }

    /// Map from `key` to `value`.
    pub fn map(key: impl Into<FieldKind>, value: impl Into<FieldKind>) -> Self {
        Self::Map(Box::new(key.into()), Box::new(value.into()))
    }

    /// Whether a field of this kind may hold `Null`.
    pub fn is_nullable(&self) -> bool {
        match self {
            Self::Primitive(p) => p.is_nullable(),
            _ => true,
        }
    }

    /// Default value of a field of this kind.
    pub fn default_value(&self) -> Value {
        match self {
            Self::Primitive(p) => p.default_value(),
            _ => Value::Null,
        }
    }

    /// Collect the type ids this kind refers to (recursively).
    pub fn referenced_types<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Enum(t) | Self::Object(t) => out.push(t),
            Self::List(e) | Self::Set(e) => e.referenced_types(out),
            Self::Map(k, v) => {
                k.referenced_types(out);
                v.referenced_types(out);
            }
            Self::Primitive(_) | Self::Any => {}
        }
    }
}

impl From<PrimitiveKind> for FieldKind {
    fn from(kind: PrimitiveKind) -> Self {
        Self::Primitive(kind)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(p) => f.write_str(p.name()),
            Self::Enum(t) => write!(f, "enum<{}>", t),
            Self::Object(t) => write!(f, "object<{}>", t),
            Self::List(e) => write!(f, "list<{}>", e),
            Self::Set(e) => write!(f, "set<{}>", e),
            Self::Map(k, v) => write!(f, "map<{}, {}>", k, v),
            Self::Any => f.write_str("any"),
        }
    }
}

/// Field descriptor for struct members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Field name; the key used to align fields across schema versions.
    pub name: String,
    /// Declared kind.
    pub kind: FieldKind,
    /// Never written to the wire; always default after decode.
    pub transient: bool,
}

impl FieldDescriptor {
    /// Create a new field descriptor.
    pub fn new(name: impl Into<String>, kind: impl Into<FieldKind>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            transient: false,
        }
    }

    /// Mark as transient.
    pub fn transient(mut self) -> Self {
        self.transient = true;
        self
    }
}

/// Enumeration type descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDescriptor {
    /// Enum variants.
    pub variants: Vec<EnumVariant>,
}

impl EnumDescriptor {
    /// Create enum descriptor.
    pub fn new(variants: Vec<EnumVariant>) -> Self {
        Self { variants }
    }

    /// Get variant by name.
    pub fn variant(&self, name: &str) -> Option<&EnumVariant> {
        self.variants.iter().find(|v| v.name == name)
    }

    /// Get variant by its stable code.
    pub fn variant_by_code(&self, code: i32) -> Option<&EnumVariant> {
        self.variants.iter().find(|v| v.code == code)
    }
}

/// Enum variant. Only `code` travels on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumVariant {
    /// Symbolic name.
    pub name: String,
    /// Stable code; must not change once published.
    pub code: i32,
    /// Human readable description.
    pub description: String,
}

impl EnumVariant {
    /// Create enum variant.
    pub fn new(name: impl Into<String>, code: i32) -> Self {
        Self {
            name: name.into(),
            code,
            description: String::new(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Type kind enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    /// Class with named fields, in wire order.
    Struct(Vec<FieldDescriptor>),
    /// Enumeration.
    Enum(EnumDescriptor),
}

/// Hook run on a freshly defaulted blank instance.
pub type Initializer = Arc<dyn Fn(&mut Object) -> std::result::Result<(), String> + Send + Sync>;

/// How the decoder produces a blank instance before populating its fields.
#[derive(Clone, Default)]
pub enum Constructor {
    /// Every field at its kind's default.
    #[default]
    Default,
    /// Defaults, then the initializer (like field initializers in a constructor).
    Initializer(Initializer),
    /// The type cannot be instantiated by the decoder.
    Unavailable(String),
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("Default"),
            Self::Initializer(_) => f.write_str("Initializer(..)"),
            Self::Unavailable(reason) => f.debug_tuple("Unavailable").field(reason).finish(),
        }
    }
}

/// A complete type descriptor.
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    /// Type id; the stable name the registry and the wire use.
    pub name: String,
    /// Type kind.
    pub kind: TypeKind,
    constructor: Constructor,
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.kind == other.kind
    }
}

impl TypeDescriptor {
    /// Create a new type descriptor.
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            constructor: Constructor::Default,
        }
    }

    /// Create a struct type descriptor.
    pub fn struct_type(name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        Self::new(name, TypeKind::Struct(fields))
    }

    /// Create an enum type descriptor.
    pub fn enum_type(name: impl Into<String>, descriptor: EnumDescriptor) -> Self {
        Self::new(name, TypeKind::Enum(descriptor))
    }

    /// Replace the blank-instance constructor.
    pub fn with_constructor(mut self, constructor: Constructor) -> Self {
        self.constructor = constructor;
        self
    }

    /// Blank-instance constructor.
    pub fn constructor(&self) -> &Constructor {
        &self.constructor
    }

    /// Check if this is a struct type.
    pub fn is_struct(&self) -> bool {
        matches!(self.kind, TypeKind::Struct(_))
    }

    /// Check if this is an enum type.
    pub fn is_enum(&self) -> bool {
        matches!(self.kind, TypeKind::Enum(_))
    }

    /// Fields in wire order (empty for enums).
    pub fn fields(&self) -> &[FieldDescriptor] {
        match &self.kind {
            TypeKind::Struct(fields) => fields,
            TypeKind::Enum(_) => &[],
        }
    }

    /// Get field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields().iter().find(|f| f.name == name)
    }

    /// Get field index by name.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields().iter().position(|f| f.name == name)
    }

    /// Fields that are written to the wire, with their descriptor index.
    pub fn wire_fields(&self) -> impl Iterator<Item = (usize, &FieldDescriptor)> {
        self.fields().iter().enumerate().filter(|(_, f)| !f.transient)
    }

    /// Enum variants if this is an enum.
    pub fn enum_descriptor(&self) -> Option<&EnumDescriptor> {
        match &self.kind {
            TypeKind::Enum(e) => Some(e),
            TypeKind::Struct(_) => None,
        }
    }

    /// Check descriptor invariants: non-empty name, unique field names,
    /// unique enum names and codes.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| CodecError::InvalidDescriptor {
            type_id: self.name.clone(),
            reason,
        };
        if self.name.is_empty() {
            return Err(invalid("type id is empty".into()));
        }
        match &self.kind {
            TypeKind::Struct(fields) => {
                let mut seen = HashSet::new();
                for field in fields {
                    if field.name.is_empty() {
                        return Err(invalid("field with empty name".into()));
                    }
                    if !seen.insert(field.name.as_str()) {
                        return Err(invalid(format!("duplicate field {}", field.name)));
                    }
                }
            }
            TypeKind::Enum(e) => {
                let mut names = HashSet::new();
                let mut codes = HashSet::new();
                for v in &e.variants {
                    if !names.insert(v.name.as_str()) {
                        return Err(invalid(format!("duplicate variant {}", v.name)));
                    }
                    if !codes.insert(v.code) {
                        return Err(invalid(format!("duplicate variant code {}", v.code)));
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_names_roundtrip() {
        for kind in [
            PrimitiveKind::Bool,
            PrimitiveKind::I32,
            PrimitiveKind::U64,
            PrimitiveKind::F64,
            PrimitiveKind::String,
            PrimitiveKind::Bytes,
            PrimitiveKind::Date,
        ] {
            assert_eq!(PrimitiveKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(PrimitiveKind::from_name("int"), None);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(PrimitiveKind::I32.default_value(), Value::I32(0));
        assert_eq!(PrimitiveKind::String.default_value(), Value::Null);
        assert_eq!(FieldKind::list(PrimitiveKind::I32).default_value(), Value::Null);
        assert!(!FieldKind::from(PrimitiveKind::F64).is_nullable());
        assert!(FieldKind::object("A").is_nullable());
    }

    #[test]
    fn test_kind_display() {
        let kind = FieldKind::map(
            PrimitiveKind::String,
            FieldKind::list(PrimitiveKind::String),
        );
        assert_eq!(kind.to_string(), "map<string, list<string>>");
        assert_eq!(FieldKind::object("B").to_string(), "object<B>");
    }

    #[test]
    fn test_referenced_types() {
        let kind = FieldKind::map(FieldKind::enumeration("E"), FieldKind::set(FieldKind::object("B")));
        let mut out = Vec::new();
        kind.referenced_types(&mut out);
        assert_eq!(out, vec!["E", "B"]);
    }

    #[test]
    fn test_type_descriptor_struct() {
        let desc = TypeDescriptor::struct_type(
            "Point",
            vec![
                FieldDescriptor::new("x", PrimitiveKind::I32),
                FieldDescriptor::new("y", PrimitiveKind::I32),
                FieldDescriptor::new("label", PrimitiveKind::String).transient(),
            ],
        );
        assert!(desc.is_struct());
        assert_eq!(desc.fields().len(), 3);
        assert_eq!(desc.field_index("y"), Some(1));
        assert!(desc.field("z").is_none());
        let wire: Vec<_> = desc.wire_fields().map(|(i, f)| (i, f.name.as_str())).collect();
        assert_eq!(wire, vec![(0, "x"), (1, "y")]);
        assert!(desc.validate().is_ok());
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let desc = TypeDescriptor::struct_type(
            "Dup",
            vec![
                FieldDescriptor::new("x", PrimitiveKind::I32),
                FieldDescriptor::new("x", PrimitiveKind::I64),
            ],
        );
        assert!(matches!(
            desc.validate(),
            Err(CodecError::InvalidDescriptor { .. })
        ));
    }

    #[test]
    fn test_enum_descriptor() {
        let e = EnumDescriptor::new(vec![
            EnumVariant::new("A", 1).with_description("first"),
            EnumVariant::new("B", 7).with_description("second"),
        ]);
        assert_eq!(e.variant("B").map(|v| v.code), Some(7));
        assert_eq!(
            e.variant_by_code(1).map(|v| v.description.as_str()),
            Some("first")
        );
        assert!(e.variant_by_code(2).is_none());

        let dup = TypeDescriptor::enum_type(
            "E",
            EnumDescriptor::new(vec![EnumVariant::new("A", 1), EnumVariant::new("B", 1)]),
        );
        assert!(dup.validate().is_err());
    }

    #[test]
    fn test_equality_ignores_constructor() {
        let a = TypeDescriptor::struct_type("T", vec![]);
        let b = TypeDescriptor::struct_type("T", vec![])
            .with_constructor(Constructor::Unavailable("abstract".into()));
        assert_eq!(a, b);
        assert!(matches!(b.constructor(), Constructor::Unavailable(_)));
    }
}
