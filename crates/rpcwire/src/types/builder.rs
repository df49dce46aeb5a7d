// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fluent builder API for TypeDescriptor.

use crate::types::{
    Constructor, EnumDescriptor, EnumVariant, FieldDescriptor, FieldKind, PrimitiveKind,
    TypeDescriptor,
};
use crate::value::Object;
use std::sync::Arc;

/// Builder for struct type descriptors.
#[derive(Debug)]
pub struct TypeDescriptorBuilder {
    name: String,
    fields: Vec<FieldDescriptor>,
    constructor: Constructor,
}

impl TypeDescriptorBuilder {
    /// Create a new builder for a struct type.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            constructor: Constructor::Default,
        }
    }

    /// Add a field of any kind.
    pub fn field(mut self, name: impl Into<String>, kind: impl Into<FieldKind>) -> Self {
        self.fields.push(FieldDescriptor::new(name, kind));
        self
    }

    /// Add a transient field: kept in memory, never written.
    pub fn transient_field(mut self, name: impl Into<String>, kind: impl Into<FieldKind>) -> Self {
        self.fields
            .push(FieldDescriptor::new(name, kind).transient());
        self
    }

    /// Add a string field.
    pub fn string_field(self, name: impl Into<String>) -> Self {
        self.field(name, PrimitiveKind::String)
    }

    /// Add a list field.
    pub fn list_field(self, name: impl Into<String>, element: impl Into<FieldKind>) -> Self {
        self.field(name, FieldKind::list(element))
    }

    /// Add a set field.
    pub fn set_field(self, name: impl Into<String>, element: impl Into<FieldKind>) -> Self {
        self.field(name, FieldKind::set(element))
    }

    /// Add a map field.
    pub fn map_field(
        self,
        name: impl Into<String>,
        key: impl Into<FieldKind>,
        value: impl Into<FieldKind>,
    ) -> Self {
        self.field(name, FieldKind::map(key, value))
    }

    /// Add a reference to an object of a registered struct type.
    pub fn object_field(self, name: impl Into<String>, type_id: impl Into<String>) -> Self {
        self.field(name, FieldKind::object(type_id))
    }

    /// Add a field holding a value of a registered enum type.
    pub fn enum_field(self, name: impl Into<String>, type_id: impl Into<String>) -> Self {
        self.field(name, FieldKind::enumeration(type_id))
    }

    /// Add a field that accepts any value.
    pub fn any_field(self, name: impl Into<String>) -> Self {
        self.field(name, FieldKind::Any)
    }

    /// Run `init` on every blank instance after field defaults are applied.
    pub fn initializer<F>(mut self, init: F) -> Self
    where
        F: Fn(&mut Object) -> Result<(), String> + Send + Sync + 'static,
    {
        self.constructor = Constructor::Initializer(Arc::new(init));
        self
    }

    /// Declare that the decoder cannot construct instances of this type.
    pub fn without_constructor(mut self, reason: impl Into<String>) -> Self {
        self.constructor = Constructor::Unavailable(reason.into());
        self
    }

    /// Build the TypeDescriptor.
    pub fn build(self) -> TypeDescriptor {
        TypeDescriptor::struct_type(self.name, self.fields).with_constructor(self.constructor)
    }
}

/// Builder for enum types.
///
/// Codes are explicit: declaration order never decides what goes on the wire.
#[derive(Debug)]
pub struct EnumBuilder {
    name: String,
    variants: Vec<EnumVariant>,
}

impl EnumBuilder {
    /// Create a new enum builder.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variants: Vec::new(),
        }
    }

    /// Add a variant with its stable code.
    pub fn variant(mut self, name: impl Into<String>, code: i32) -> Self {
        self.variants.push(EnumVariant::new(name, code));
        self
    }

    /// Add a variant with its stable code and a description.
    pub fn described_variant(
        mut self,
        name: impl Into<String>,
        code: i32,
        description: impl Into<String>,
    ) -> Self {
        self.variants
            .push(EnumVariant::new(name, code).with_description(description));
        self
    }

    /// Build the TypeDescriptor.
    pub fn build(self) -> TypeDescriptor {
        TypeDescriptor::enum_type(self.name, EnumDescriptor::new(self.variants))
    }
}
