// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bytes -> object graph.
//!
//! Every length, count and id read from the stream is validated before it
//! is used, so hostile input yields an error rather than a panic or an
//! oversized allocation.

use crate::codec::refs::ReadReferences;
use crate::codec::session::{DecodeTypeTable, DefinitionKind, ResolvedType};
use crate::config::{CodecConfig, WIRE_VERSION};
use crate::error::{CodecError, Result};
use crate::ser::{Tag, WireReader};
use crate::types::{FieldKind, TypeRegistry};
use crate::value::{EnumValue, Object, ObjectGraph, ObjectId, Value};
use chrono::DateTime;
use std::sync::Arc;

static ANY: FieldKind = FieldKind::Any;

/// One deserialization call. Tables live only as long as the decoder.
pub(crate) struct Decoder<'a> {
    registry: &'a TypeRegistry,
    config: &'a CodecConfig,
    input: WireReader<'a>,
    graph: ObjectGraph,
    refs: ReadReferences,
    types: DecodeTypeTable,
}

impl<'a> Decoder<'a> {
    pub(crate) fn new(registry: &'a TypeRegistry, config: &'a CodecConfig, bytes: &'a [u8]) -> Self {
        Self {
            registry,
            config,
            input: WireReader::new(bytes),
            graph: ObjectGraph::new(),
            refs: ReadReferences::new(),
            types: DecodeTypeTable::new(),
        }
    }

    pub(crate) fn decode(mut self) -> Result<ObjectGraph> {
        let version = self.input.read_u8()?;
        if version != WIRE_VERSION {
            return Err(CodecError::malformed(
                0,
                format!(
                    "unsupported wire version {} (expected {})",
                    version, WIRE_VERSION
                ),
            ));
        }
        let root = self.decode_value(&ANY, 0)?;
        if !self.input.is_eof() {
            return Err(CodecError::malformed(
                self.input.offset(),
                format!("{} trailing bytes after root value", self.input.remaining()),
            ));
        }
        log::trace!(
            "[codec] decoded {} objects ({} types)",
            self.refs.len(),
            self.types.len()
        );
        self.graph.set_root(root);
        Ok(self.graph)
    }

    /// Collection count, checked against the limit and against the bytes
    /// left (every element needs at least `min_item_len` bytes).
    fn read_count(&mut self, min_item_len: usize) -> Result<usize> {
        let offset = self.input.offset();
        let count: usize = self.input.read_varint_as("element count")?;
        if count > self.config.max_collection_len {
            return Err(CodecError::malformed(
                offset,
                format!(
                    "element count {} exceeds limit {}",
                    count, self.config.max_collection_len
                ),
            ));
        }
        if count.saturating_mul(min_item_len) > self.input.remaining() {
            return Err(CodecError::malformed(
                offset,
                format!(
                    "element count {} but only {} bytes left",
                    count,
                    self.input.remaining()
                ),
            ));
        }
        Ok(count)
    }

    // Recursion runs decode_value -> decode_elements/decode_entries/decode_object
    // -> decode_value. Everything else stays out of line to keep each level's
    // stack frame small, so `max_depth` levels fit a default thread stack.
    fn decode_value(&mut self, kind: &FieldKind, depth: usize) -> Result<Value> {
        let offset = self.input.offset();
        if depth > self.config.max_depth {
            return Err(self.too_deep(offset));
        }
        let tag = self.read_tag(kind, offset)?;
        match tag {
            Tag::Enum => self.decode_enum(kind, offset),
            Tag::List | Tag::Set => self.decode_elements(tag, kind, depth),
            Tag::Map => self.decode_entries(kind, depth),
            Tag::ObjectNew => self.decode_object(kind, depth, offset),
            Tag::ObjectRef => self.decode_backreference(kind, offset),
            _ => self.decode_scalar(tag),
        }
    }

    #[cold]
    #[inline(never)]
    fn too_deep(&self, offset: usize) -> CodecError {
        CodecError::malformed(
            offset,
            format!("nesting deeper than {}", self.config.max_depth),
        )
    }

    #[inline(never)]
    fn read_tag(&mut self, kind: &FieldKind, offset: usize) -> Result<Tag> {
        let byte = self.input.read_u8()?;
        let tag = Tag::try_from(byte)
            .map_err(|b| CodecError::malformed(offset, format!("unknown value tag 0x{:02x}", b)))?;
        if !tag.fits(kind) {
            return Err(CodecError::malformed(
                offset,
                format!("expected {}, found {}", kind, tag.name()),
            ));
        }
        Ok(tag)
    }

    /// Tags with no nested values.
    #[inline(never)]
    fn decode_scalar(&mut self, tag: Tag) -> Result<Value> {
        let max_string = self.config.max_string_len;
        let value = match tag {
            Tag::Null => Value::Null,
            Tag::False => Value::Bool(false),
            Tag::True => Value::Bool(true),
            Tag::I8 => Value::I8(self.input.read_u8()? as i8),
            Tag::I16 => Value::I16(self.input.read_signed_as("i16")?),
            Tag::I32 => Value::I32(self.input.read_signed_as("i32")?),
            Tag::I64 => Value::I64(self.input.read_varint_signed()?),
            Tag::U8 => Value::U8(self.input.read_u8()?),
            Tag::U16 => Value::U16(self.input.read_varint_as("u16")?),
            Tag::U32 => Value::U32(self.input.read_varint_as("u32")?),
            Tag::U64 => Value::U64(self.input.read_varint()?),
            Tag::F32 => Value::F32(self.input.read_f32()?),
            Tag::F64 => Value::F64(self.input.read_f64()?),
            Tag::Char => {
                let at = self.input.offset();
                let raw: u32 = self.input.read_varint_as("char")?;
                let c = char::from_u32(raw).ok_or_else(|| {
                    CodecError::malformed(at, format!("invalid char U+{:X}", raw))
                })?;
                Value::Char(c)
            }
            Tag::String => Value::String(self.input.read_str(max_string)?.to_string()),
            Tag::Bytes => Value::Bytes(self.input.read_blob(max_string)?.to_vec()),
            Tag::Date => {
                let at = self.input.offset();
                let secs = self.input.read_varint_signed()?;
                let nanos: u32 = self.input.read_varint_as("nanoseconds")?;
                let date = DateTime::from_timestamp(secs, nanos).ok_or_else(|| {
                    CodecError::malformed(at, format!("date out of range: {}s {}ns", secs, nanos))
                })?;
                Value::Date(date)
            }
            Tag::Enum | Tag::List | Tag::Set | Tag::Map | Tag::ObjectNew | Tag::ObjectRef => {
                return Err(CodecError::malformed(
                    self.input.offset(),
                    format!("{} is not a scalar", tag.name()),
                ));
            }
        };
        Ok(value)
    }

    fn decode_elements(&mut self, tag: Tag, kind: &FieldKind, depth: usize) -> Result<Value> {
        let element = match kind {
            FieldKind::List(e) | FieldKind::Set(e) => e.as_ref(),
            _ => &ANY,
        };
        let count = self.read_count(1)?;
        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            items.push(self.decode_value(element, depth + 1)?);
        }
        Ok(if tag == Tag::List {
            Value::List(items)
        } else {
            Value::Set(items)
        })
    }

    fn decode_entries(&mut self, kind: &FieldKind, depth: usize) -> Result<Value> {
        let (key_kind, value_kind) = match kind {
            FieldKind::Map(k, v) => (k.as_ref(), v.as_ref()),
            _ => (&ANY, &ANY),
        };
        let count = self.read_count(2)?;
        let mut entries = Vec::with_capacity(count);
        for _ in 0..count {
            let k = self.decode_value(key_kind, depth + 1)?;
            let v = self.decode_value(value_kind, depth + 1)?;
            entries.push((k, v));
        }
        Ok(Value::Map(entries))
    }

    #[inline(never)]
    fn decode_backreference(&mut self, kind: &FieldKind, offset: usize) -> Result<Value> {
        let wire_id: u32 = self.input.read_varint_as("object id")?;
        let id = self.refs.resolve(wire_id)?;
        if let FieldKind::Object(expected) = kind {
            let actual = self.graph.object(id)?.type_id();
            if actual != expected {
                return Err(CodecError::malformed(
                    offset,
                    format!("reference to {} where {} expected", actual, kind),
                ));
            }
        }
        Ok(Value::Object(id))
    }

    /// Type reference: code 0 plus an inline definition, or a session code.
    fn read_type_ref(&mut self, expected: DefinitionKind) -> Result<Arc<ResolvedType>> {
        let offset = self.input.offset();
        let code: u32 = self.input.read_varint_as("type code")?;
        let resolved = if code == 0 {
            let kind_offset = self.input.offset();
            let kind = DefinitionKind::from_byte(self.input.read_u8()?, kind_offset)?;
            let name = self.input.read_str(self.config.max_string_len)?;
            let mut writer_fields = Vec::new();
            if kind == DefinitionKind::Struct {
                let count = self.read_count(1)?;
                writer_fields.reserve(count);
                for _ in 0..count {
                    writer_fields.push(self.input.read_str(self.config.max_string_len)?);
                }
            }
            let descriptor = Arc::clone(self.registry.resolve(name)?);
            self.types
                .push(ResolvedType::new(kind, descriptor, &writer_fields, offset)?)
        } else {
            self.types.resolve_by_code(code, offset)?
        };
        if resolved.kind != expected {
            return Err(CodecError::malformed(
                offset,
                format!(
                    "{} used as {} but defined as {}",
                    resolved.descriptor.name,
                    expected.name(),
                    resolved.kind.name()
                ),
            ));
        }
        Ok(resolved)
    }

    #[inline(never)]
    fn decode_enum(&mut self, kind: &FieldKind, offset: usize) -> Result<Value> {
        let resolved = self.read_type_ref(DefinitionKind::Enum)?;
        let descriptor = &resolved.descriptor;
        if let FieldKind::Enum(expected) = kind {
            if descriptor.name != *expected {
                return Err(CodecError::malformed(
                    offset,
                    format!("enum {} where {} expected", descriptor.name, kind),
                ));
            }
        }
        let code: i32 = self.input.read_signed_as("enum code")?;
        let variant = descriptor
            .enum_descriptor()
            .and_then(|e| e.variant_by_code(code))
            .ok_or_else(|| {
                CodecError::malformed(
                    offset,
                    format!("{} has no variant with code {}", descriptor.name, code),
                )
            })?;
        Ok(Value::Enum(EnumValue::from_variant(
            descriptor.name.as_str(),
            variant,
        )))
    }

    fn decode_object(&mut self, kind: &FieldKind, depth: usize, offset: usize) -> Result<Value> {
        let (resolved, id) = self.begin_object(kind, offset)?;
        let descriptor = &resolved.descriptor;
        for target in &resolved.field_map {
            match *target {
                Some(index) => {
                    let field_kind = &descriptor.fields()[index].kind;
                    let value = self.decode_value(field_kind, depth + 1)?;
                    self.graph.object_mut(id)?.set_at(index, value);
                }
                None => {
                    self.decode_value(&ANY, depth + 1)?;
                }
            }
        }
        Ok(Value::Object(id))
    }

    /// Type reference and wire id of a new object. The blank object is
    /// registered before its fields are read so backreferences to it resolve.
    #[inline(never)]
    fn begin_object(
        &mut self,
        kind: &FieldKind,
        offset: usize,
    ) -> Result<(Arc<ResolvedType>, ObjectId)> {
        let resolved = self.read_type_ref(DefinitionKind::Struct)?;
        if let FieldKind::Object(expected) = kind {
            if resolved.descriptor.name != *expected {
                return Err(CodecError::malformed(
                    offset,
                    format!("object {} where {} expected", resolved.descriptor.name, kind),
                ));
            }
        }

        let id_offset = self.input.offset();
        let wire_id: u32 = self.input.read_varint_as("object id")?;
        self.refs.expect_next(wire_id, id_offset)?;

        let id = self.graph.insert(Object::blank(&resolved.descriptor)?);
        self.refs.register(id);
        Ok((resolved, id))
    }
}
