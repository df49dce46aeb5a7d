// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Object graph -> bytes.

use crate::codec::refs::WriteReferences;
use crate::codec::session::{DefinitionKind, EncodeTypeTable};
use crate::config::{CodecConfig, WIRE_VERSION};
use crate::error::{CodecError, Result};
use crate::ser::{Tag, WireWriter};
use crate::types::{FieldKind, TypeDescriptor, TypeRegistry};
use crate::value::{EnumValue, Object, ObjectGraph, ObjectId, Value};

static ANY: FieldKind = FieldKind::Any;

/// Where a value sits, for error messages.
#[derive(Clone, Copy)]
struct Site<'s> {
    type_id: &'s str,
    field: &'s str,
}

const ROOT: Site<'static> = Site {
    type_id: "<root>",
    field: "value",
};

/// One serialization call. Tables live only as long as the encoder.
pub(crate) struct Encoder<'a> {
    registry: &'a TypeRegistry,
    config: &'a CodecConfig,
    graph: &'a ObjectGraph,
    out: WireWriter,
    refs: WriteReferences,
    types: EncodeTypeTable,
}

impl<'a> Encoder<'a> {
    pub(crate) fn new(
        registry: &'a TypeRegistry,
        config: &'a CodecConfig,
        graph: &'a ObjectGraph,
    ) -> Self {
        Self {
            registry,
            config,
            graph,
            out: WireWriter::with_capacity(64),
            refs: WriteReferences::new(),
            types: EncodeTypeTable::new(),
        }
    }

    pub(crate) fn encode(mut self) -> Result<Vec<u8>> {
        self.out.write_u8(WIRE_VERSION);
        let graph = self.graph;
        self.encode_value(graph.root(), &ANY, ROOT, 0)?;
        log::trace!(
            "[codec] encoded {} bytes ({} objects, {} types)",
            self.out.len(),
            self.refs.len(),
            self.types.len()
        );
        Ok(self.out.into_bytes())
    }

    fn mismatch(site: Site<'_>, kind: &FieldKind, found: String) -> CodecError {
        CodecError::KindMismatch {
            type_id: site.type_id.to_string(),
            field: site.field.to_string(),
            expected: kind.to_string(),
            found,
        }
    }

    fn check_len(&self, what: &'static str, actual: usize, limit: usize) -> Result<()> {
        if actual > limit {
            return Err(CodecError::LimitExceeded {
                what,
                actual,
                limit,
            });
        }
        Ok(())
    }

    // Only collections and objects recurse; scalars and error formatting are
    // kept out of line so each nesting level costs a small stack frame.
    fn encode_value(
        &mut self,
        value: &Value,
        kind: &FieldKind,
        site: Site<'_>,
        depth: usize,
    ) -> Result<()> {
        if depth > self.config.max_depth {
            return Err(self.too_deep(depth));
        }
        let tag = Tag::of(value);
        if !tag.fits(kind) {
            return Err(Self::value_mismatch(site, kind, value));
        }
        match value {
            Value::Object(id) => self.encode_object(*id, kind, site, depth),
            Value::Enum(e) => self.encode_enum(e, kind, site),
            Value::List(items) | Value::Set(items) => {
                self.encode_elements(tag, items, kind, site, depth)
            }
            Value::Map(entries) => self.encode_entries(entries, kind, site, depth),
            _ => self.encode_scalar(tag, value),
        }
    }

    #[cold]
    #[inline(never)]
    fn too_deep(&self, depth: usize) -> CodecError {
        CodecError::LimitExceeded {
            what: "nesting depth",
            actual: depth,
            limit: self.config.max_depth,
        }
    }

    #[cold]
    #[inline(never)]
    fn value_mismatch(site: Site<'_>, kind: &FieldKind, value: &Value) -> CodecError {
        Self::mismatch(site, kind, value.kind_name().to_string())
    }

    #[inline(never)]
    fn encode_scalar(&mut self, tag: Tag, value: &Value) -> Result<()> {
        self.out.write_u8(tag as u8);
        match value {
            Value::Null | Value::Bool(_) => {}
            Value::I8(v) => self.out.write_u8(*v as u8),
            Value::I16(v) => self.out.write_varint_signed(i64::from(*v)),
            Value::I32(v) => self.out.write_varint_signed(i64::from(*v)),
            Value::I64(v) => self.out.write_varint_signed(*v),
            Value::U8(v) => self.out.write_u8(*v),
            Value::U16(v) => self.out.write_varint(u64::from(*v)),
            Value::U32(v) => self.out.write_varint(u64::from(*v)),
            Value::U64(v) => self.out.write_varint(*v),
            Value::F32(v) => self.out.write_f32(*v),
            Value::F64(v) => self.out.write_f64(*v),
            Value::Char(c) => self.out.write_varint(u64::from(u32::from(*c))),
            Value::String(s) => {
                self.check_len("string length", s.len(), self.config.max_string_len)?;
                self.out.write_str(s);
            }
            Value::Bytes(b) => {
                self.check_len("byte array length", b.len(), self.config.max_string_len)?;
                self.out.write_blob(b);
            }
            Value::Date(d) => {
                self.out.write_varint_signed(d.timestamp());
                self.out.write_varint(u64::from(d.timestamp_subsec_nanos()));
            }
            Value::List(_) | Value::Set(_) | Value::Map(_) | Value::Enum(_) | Value::Object(_) => {
                return Err(CodecError::InvalidValue(format!(
                    "{} is not a scalar",
                    value.kind_name()
                )));
            }
        }
        Ok(())
    }

    fn encode_elements(
        &mut self,
        tag: Tag,
        items: &[Value],
        kind: &FieldKind,
        site: Site<'_>,
        depth: usize,
    ) -> Result<()> {
        self.check_len("collection length", items.len(), self.config.max_collection_len)?;
        let element = match kind {
            FieldKind::List(e) | FieldKind::Set(e) => e.as_ref(),
            _ => &ANY,
        };
        self.out.write_u8(tag as u8);
        self.out.write_varint(items.len() as u64);
        for item in items {
            self.encode_value(item, element, site, depth + 1)?;
        }
        Ok(())
    }

    fn encode_entries(
        &mut self,
        entries: &[(Value, Value)],
        kind: &FieldKind,
        site: Site<'_>,
        depth: usize,
    ) -> Result<()> {
        self.check_len("map length", entries.len(), self.config.max_collection_len)?;
        let (key_kind, value_kind) = match kind {
            FieldKind::Map(k, v) => (k.as_ref(), v.as_ref()),
            _ => (&ANY, &ANY),
        };
        self.out.write_u8(Tag::Map as u8);
        self.out.write_varint(entries.len() as u64);
        for (k, v) in entries {
            self.encode_value(k, key_kind, site, depth + 1)?;
            self.encode_value(v, value_kind, site, depth + 1)?;
        }
        Ok(())
    }

    #[inline(never)]
    fn encode_enum(&mut self, value: &EnumValue, kind: &FieldKind, site: Site<'_>) -> Result<()> {
        if let FieldKind::Enum(expected) = kind {
            if *expected != value.type_id {
                return Err(Self::mismatch(site, kind, format!("enum<{}>", value.type_id)));
            }
        }
        let registry = self.registry;
        let descriptor = registry.resolve(&value.type_id)?;
        let known = descriptor
            .enum_descriptor()
            .is_some_and(|e| e.variant_by_code(value.code).is_some());
        if !known {
            return Err(CodecError::InvalidValue(format!(
                "{} has no variant with code {}",
                value.type_id, value.code
            )));
        }
        self.out.write_u8(Tag::Enum as u8);
        self.write_type_ref(descriptor);
        self.out.write_varint_signed(i64::from(value.code));
        Ok(())
    }

    fn encode_object(
        &mut self,
        id: ObjectId,
        kind: &FieldKind,
        site: Site<'_>,
        depth: usize,
    ) -> Result<()> {
        let graph = self.graph;
        let object = graph.object(id)?;
        if !self.begin_object(object, id, kind, site)? {
            return Ok(());
        }
        let descriptor = object.descriptor();
        for (index, field) in descriptor.wire_fields() {
            let value = object.value_at(index).unwrap_or(&Value::Null);
            let field_site = Site {
                type_id: &descriptor.name,
                field: &field.name,
            };
            self.encode_value(value, &field.kind, field_site, depth + 1)?;
        }
        Ok(())
    }

    /// Writes a backreference (returns false) or the header of a new object
    /// (returns true, fields follow).
    #[inline(never)]
    fn begin_object(
        &mut self,
        object: &Object,
        id: ObjectId,
        kind: &FieldKind,
        site: Site<'_>,
    ) -> Result<bool> {
        if let FieldKind::Object(expected) = kind {
            if object.type_id() != expected {
                return Err(Self::mismatch(
                    site,
                    kind,
                    format!("object<{}>", object.type_id()),
                ));
            }
        }

        if let Some(wire_id) = self.refs.lookup(id) {
            self.out.write_u8(Tag::ObjectRef as u8);
            self.out.write_varint(u64::from(wire_id));
            return Ok(false);
        }

        // The registry decides what may go on the wire; layout follows the
        // object's own descriptor.
        self.registry.resolve(object.type_id())?;

        self.out.write_u8(Tag::ObjectNew as u8);
        self.write_type_ref(object.descriptor());
        let wire_id = self.refs.assign(id);
        self.out.write_varint(u64::from(wire_id));
        Ok(true)
    }

    fn write_type_ref(&mut self, descriptor: &TypeDescriptor) {
        if let Some(code) = self.types.lookup(&descriptor.name) {
            self.out.write_varint(u64::from(code));
            return;
        }
        self.types.assign(&descriptor.name);
        self.out.write_varint(0);
        let kind = DefinitionKind::of(descriptor);
        self.out.write_u8(kind as u8);
        self.out.write_str(&descriptor.name);
        if kind == DefinitionKind::Struct {
            self.out
                .write_varint(descriptor.wire_fields().count() as u64);
            for (_, field) in descriptor.wire_fields() {
                self.out.write_str(&field.name);
            }
        }
    }
}
