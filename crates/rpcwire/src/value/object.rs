// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type-erased struct instance with named field access.

use crate::error::{AccessError, CodecError, Result};
use crate::types::{Constructor, TypeDescriptor};
use crate::value::{FromValue, Value};
use std::sync::Arc;

/// An instance of a registered struct type.
///
/// Holds one value per descriptor field (transient fields included), in
/// descriptor order.
#[derive(Debug, Clone)]
pub struct Object {
    descriptor: Arc<TypeDescriptor>,
    fields: Vec<Value>,
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.descriptor.name == other.descriptor.name && self.fields == other.fields
    }
}

impl Object {
    /// Blank instance: every field at its default, then the descriptor's
    /// initializer if it has one.
    pub fn blank(descriptor: &Arc<TypeDescriptor>) -> Result<Self> {
        let failure = |reason: String| CodecError::ConstructionFailure {
            type_id: descriptor.name.clone(),
            reason,
        };
        if !descriptor.is_struct() {
            return Err(failure("enum types have no instances".into()));
        }
        let mut object = Self {
            descriptor: Arc::clone(descriptor),
            fields: descriptor
                .fields()
                .iter()
                .map(|f| f.kind.default_value())
                .collect(),
        };
        match descriptor.constructor() {
            Constructor::Default => {}
            Constructor::Initializer(init) => init(&mut object).map_err(failure)?,
            Constructor::Unavailable(reason) => return Err(failure(reason.clone())),
        }
        Ok(object)
    }

    /// Type id of this instance.
    pub fn type_id(&self) -> &str {
        &self.descriptor.name
    }

    /// Descriptor of this instance.
    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }

    fn index_of(&self, name: &str) -> std::result::Result<usize, AccessError> {
        self.descriptor
            .field_index(name)
            .ok_or_else(|| AccessError::FieldNotFound {
                type_id: self.descriptor.name.clone(),
                field: name.to_string(),
            })
    }

    /// Get a field value.
    pub fn get(&self, name: &str) -> std::result::Result<&Value, AccessError> {
        let index = self.index_of(name)?;
        Ok(&self.fields[index])
    }

    /// Get a field value converted to `T`.
    pub fn get_as<T: FromValue>(&self, name: &str) -> std::result::Result<T, AccessError> {
        T::from_value(self.get(name)?)
    }

    /// Set a field value. Kinds are checked when the graph is encoded.
    pub fn set(
        &mut self,
        name: &str,
        value: impl Into<Value>,
    ) -> std::result::Result<(), AccessError> {
        let index = self.index_of(name)?;
        self.fields[index] = value.into();
        Ok(())
    }

    /// Field value by descriptor index.
    pub fn value_at(&self, index: usize) -> Option<&Value> {
        self.fields.get(index)
    }

    pub(crate) fn set_at(&mut self, index: usize, value: Value) {
        if let Some(slot) = self.fields.get_mut(index) {
            *slot = value;
        }
    }

    /// Iterate over `(field name, value)` in descriptor order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.descriptor
            .fields()
            .iter()
            .map(|f| f.name.as_str())
            .zip(self.fields.iter())
    }
}
