// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-call object reference tables.
//!
//! Wire ids are assigned in first-occurrence order starting at 0 and are
//! registered *before* the object's fields are walked, so a field pointing
//! back at an ancestor becomes a backreference instead of infinite recursion.

use crate::error::{CodecError, Result};
use crate::value::ObjectId;
use std::collections::HashMap;

/// Encode side: graph handle -> wire id.
#[derive(Debug, Default)]
pub(crate) struct WriteReferences {
    ids: HashMap<ObjectId, u32>,
}

impl WriteReferences {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Wire id of an object already written.
    pub(crate) fn lookup(&self, id: ObjectId) -> Option<u32> {
        self.ids.get(&id).copied()
    }

    /// Assign the next wire id to a first occurrence.
    pub(crate) fn assign(&mut self, id: ObjectId) -> u32 {
        let next = self.ids.len() as u32;
        *self.ids.entry(id).or_insert(next)
    }

    pub(crate) fn len(&self) -> usize {
        self.ids.len()
    }
}

/// Decode side: wire id -> graph handle.
#[derive(Debug, Default)]
pub(crate) struct ReadReferences {
    objects: Vec<ObjectId>,
}

impl ReadReferences {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// A first occurrence must carry exactly the next id.
    pub(crate) fn expect_next(&self, wire_id: u32, offset: usize) -> Result<()> {
        if wire_id as usize != self.objects.len() {
            return Err(CodecError::malformed(
                offset,
                format!(
                    "object id {} out of sequence (expected {})",
                    wire_id,
                    self.objects.len()
                ),
            ));
        }
        Ok(())
    }

    pub(crate) fn register(&mut self, id: ObjectId) {
        self.objects.push(id);
    }

    /// Resolve a backreference.
    pub(crate) fn resolve(&self, wire_id: u32) -> Result<ObjectId> {
        self.objects
            .get(wire_id as usize)
            .copied()
            .ok_or(CodecError::DanglingReference {
                id: wire_id,
                known: self.objects.len(),
            })
    }

    pub(crate) fn len(&self) -> usize {
        self.objects.len()
    }
}
