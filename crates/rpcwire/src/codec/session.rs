// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-call type tables.
//!
//! The first time a type appears in a stream it is written inline (code 0,
//! then its definition) and implicitly receives the next session code,
//! starting at 1. Later occurrences write only the code.
//!
//! A struct definition carries the writer's non-transient field names in
//! the writer's order. The reader matches them to its own descriptor *by
//! name*, which is what makes added, removed and reordered fields safe.

use crate::error::{CodecError, Result};
use crate::types::TypeDescriptor;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Marker written at the start of an inline type definition.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DefinitionKind {
    Struct = 0,
    Enum = 1,
}

impl DefinitionKind {
    pub(crate) fn of(descriptor: &TypeDescriptor) -> Self {
        if descriptor.is_enum() {
            Self::Enum
        } else {
            Self::Struct
        }
    }

    pub(crate) fn from_byte(byte: u8, offset: usize) -> Result<Self> {
        match byte {
            0 => Ok(Self::Struct),
            1 => Ok(Self::Enum),
            other => Err(CodecError::malformed(
                offset,
                format!("unknown type definition kind {}", other),
            )),
        }
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            Self::Struct => "struct",
            Self::Enum => "enum",
        }
    }
}

/// Encode side: type id -> session code.
#[derive(Debug, Default)]
pub(crate) struct EncodeTypeTable {
    codes: HashMap<String, u32>,
}

impl EncodeTypeTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn lookup(&self, type_id: &str) -> Option<u32> {
        self.codes.get(type_id).copied()
    }

    /// Give `type_id` the next code (codes start at 1; 0 means "inline").
    pub(crate) fn assign(&mut self, type_id: &str) -> u32 {
        let next = self.codes.len() as u32 + 1;
        *self.codes.entry(type_id.to_string()).or_insert(next)
    }

    pub(crate) fn len(&self) -> usize {
        self.codes.len()
    }
}

/// A stream type resolved against the local registry.
#[derive(Debug)]
pub(crate) struct ResolvedType {
    pub(crate) kind: DefinitionKind,
    pub(crate) descriptor: Arc<TypeDescriptor>,
    /// For each writer field in stream order: the local field index to
    /// populate, or `None` to decode and discard.
    pub(crate) field_map: Vec<Option<usize>>,
}

impl ResolvedType {
    /// Match the writer's field list against the local descriptor.
    pub(crate) fn new(
        kind: DefinitionKind,
        descriptor: Arc<TypeDescriptor>,
        writer_fields: &[&str],
        offset: usize,
    ) -> Result<Self> {
        if DefinitionKind::of(&descriptor) != kind {
            return Err(CodecError::malformed(
                offset,
                format!(
                    "{} is defined as {} in the stream but {} locally",
                    descriptor.name,
                    kind.name(),
                    DefinitionKind::of(&descriptor).name()
                ),
            ));
        }

        let mut seen = HashSet::with_capacity(writer_fields.len());
        let mut field_map = Vec::with_capacity(writer_fields.len());
        for name in writer_fields {
            if !seen.insert(*name) {
                return Err(CodecError::malformed(
                    offset,
                    format!("duplicate field {} in definition of {}", name, descriptor.name),
                ));
            }
            let target = match descriptor.field_index(name) {
                Some(index) if descriptor.fields()[index].transient => {
                    log::debug!(
                        "[codec] {}: field '{}' is transient locally, discarding stream value",
                        descriptor.name,
                        name
                    );
                    None
                }
                Some(index) => Some(index),
                None => {
                    log::debug!(
                        "[codec] {}: stream field '{}' not declared locally, discarding",
                        descriptor.name,
                        name
                    );
                    None
                }
            };
            field_map.push(target);
        }

        for (_, field) in descriptor.wire_fields() {
            if !seen.contains(field.name.as_str()) {
                log::trace!(
                    "[codec] {}: field '{}' absent from stream, keeping default",
                    descriptor.name,
                    field.name
                );
            }
        }

        Ok(Self {
            kind,
            descriptor,
            field_map,
        })
    }
}

/// Decode side: session code -> resolved type.
#[derive(Debug, Default)]
pub(crate) struct DecodeTypeTable {
    entries: Vec<Arc<ResolvedType>>,
}

impl DecodeTypeTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Record an inline definition under the next code.
    pub(crate) fn push(&mut self, resolved: ResolvedType) -> Arc<ResolvedType> {
        let resolved = Arc::new(resolved);
        self.entries.push(Arc::clone(&resolved));
        resolved
    }

    pub(crate) fn resolve_by_code(&self, code: u32, offset: usize) -> Result<Arc<ResolvedType>> {
        code.checked_sub(1)
            .and_then(|index| self.entries.get(index as usize))
            .cloned()
            .ok_or_else(|| {
                CodecError::malformed(
                    offset,
                    format!(
                        "type code {} not defined ({} types so far)",
                        code,
                        self.entries.len()
                    ),
                )
            })
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
