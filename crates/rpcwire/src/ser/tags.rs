// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! One-byte value tags.
//!
//! Every value on the wire starts with a tag, which makes the stream
//! self-describing: a reader can walk (and discard) values whose field it
//! does not know.

use crate::types::{FieldKind, PrimitiveKind};
use crate::value::Value;

/// Value tag.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Null = 0,
    False = 1,
    True = 2,
    I8 = 3,
    I16 = 4,
    I32 = 5,
    I64 = 6,
    U8 = 7,
    U16 = 8,
    U32 = 9,
    U64 = 10,
    F32 = 11,
    F64 = 12,
    Char = 13,
    String = 14,
    Bytes = 15,
    Date = 16,
    Enum = 17,
    List = 18,
    Set = 19,
    Map = 20,
    /// First occurrence of an object: type ref, ref id, fields.
    ObjectNew = 21,
    /// Backreference to an object already in the stream.
    ObjectRef = 22,
}

impl TryFrom<u8> for Tag {
    type Error = u8;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        let tag = match byte {
            0 => Self::Null,
            1 => Self::False,
            2 => Self::True,
            3 => Self::I8,
            4 => Self::I16,
            5 => Self::I32,
            6 => Self::I64,
            7 => Self::U8,
            8 => Self::U16,
            9 => Self::U32,
            10 => Self::U64,
            11 => Self::F32,
            12 => Self::F64,
            13 => Self::Char,
            14 => Self::String,
            15 => Self::Bytes,
            16 => Self::Date,
            17 => Self::Enum,
            18 => Self::List,
            19 => Self::Set,
            20 => Self::Map,
            21 => Self::ObjectNew,
            22 => Self::ObjectRef,
            other => return Err(other),
        };
        Ok(tag)
    }
}

impl Tag {
    /// Tag under which `value` is written (object values are refined to
    /// `ObjectRef` by the encoder when already seen).
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(false) => Self::False,
            Value::Bool(true) => Self::True,
            Value::I8(_) => Self::I8,
            Value::I16(_) => Self::I16,
            Value::I32(_) => Self::I32,
            Value::I64(_) => Self::I64,
            Value::U8(_) => Self::U8,
            Value::U16(_) => Self::U16,
            Value::U32(_) => Self::U32,
            Value::U64(_) => Self::U64,
            Value::F32(_) => Self::F32,
            Value::F64(_) => Self::F64,
            Value::Char(_) => Self::Char,
            Value::String(_) => Self::String,
            Value::Bytes(_) => Self::Bytes,
            Value::Date(_) => Self::Date,
            Value::Enum(_) => Self::Enum,
            Value::List(_) => Self::List,
            Value::Set(_) => Self::Set,
            Value::Map(_) => Self::Map,
            Value::Object(_) => Self::ObjectNew,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::False | Self::True => "bool",
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
            Self::Enum => "enum",
            Self::List => "list",
            Self::Set => "set",
            Self::Map => "map",
            Self::ObjectNew | Self::ObjectRef => "object",
        }
    }

    /// Whether a value with this tag may occupy a slot of `kind`.
    ///
    /// Type ids of enums and objects are checked separately.
    pub fn fits(self, kind: &FieldKind) -> bool {
        use PrimitiveKind as P;
        match kind {
            FieldKind::Any => true,
            _ if self == Self::Null => kind.is_nullable(),
            FieldKind::Primitive(p) => matches!(
                (p, self),
                (P::Bool, Self::False | Self::True)
                    | (P::I8, Self::I8)
                    | (P::I16, Self::I16)
                    | (P::I32, Self::I32)
                    | (P::I64, Self::I64)
                    | (P::U8, Self::U8)
                    | (P::U16, Self::U16)
                    | (P::U32, Self::U32)
                    | (P::U64, Self::U64)
                    | (P::F32, Self::F32)
                    | (P::F64, Self::F64)
                    | (P::Char, Self::Char)
                    | (P::String, Self::String)
                    | (P::Bytes, Self::Bytes)
                    | (P::Date, Self::Date)
            ),
            FieldKind::Enum(_) => self == Self::Enum,
            FieldKind::Object(_) => matches!(self, Self::ObjectNew | Self::ObjectRef),
            FieldKind::List(_) => self == Self::List,
            FieldKind::Set(_) => self == Self::Set,
            FieldKind::Map(_, _) => self == Self::Map,
        }
    }
}
