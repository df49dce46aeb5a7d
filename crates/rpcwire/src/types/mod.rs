// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type metadata: descriptors, builders and the registry.
//!
//! # Example
//!
//! ```rust
//! use rpcwire::{EnumBuilder, FieldKind, PrimitiveKind, TypeDescriptorBuilder, TypeRegistry};
//!
//! let mut registry = TypeRegistry::new();
//! registry.register(
//!     EnumBuilder::new("shop.Status")
//!         .described_variant("Open", 1, "accepting lines")
//!         .described_variant("Closed", 2, "frozen")
//!         .build(),
//! ).unwrap();
//! registry.register(
//!     TypeDescriptorBuilder::new("shop.Order")
//!         .field("id", PrimitiveKind::I64)
//!         .enum_field("status", "shop.Status")
//!         .list_field("items", PrimitiveKind::String)
//!         .transient_field("cached_total", PrimitiveKind::F64)
//!         .build(),
//! ).unwrap();
//! registry.validate().unwrap();
//!
//! let order = registry.resolve("shop.Order").unwrap();
//! assert_eq!(order.field("items").unwrap().kind, FieldKind::list(PrimitiveKind::String));
//! ```

mod builder;
mod descriptor;
pub mod registry;

pub use builder::{EnumBuilder, TypeDescriptorBuilder};
pub use descriptor::{
    Constructor, EnumDescriptor, EnumVariant, FieldDescriptor, FieldKind, Initializer,
    PrimitiveKind, TypeDescriptor, TypeKind,
};
pub use registry::TypeRegistry;

/// A Rust type with a compile-time descriptor.
///
/// Usually implemented with `#[derive(Described)]`.
pub trait Described {
    /// Stable type id used by the registry and on the wire.
    const TYPE_ID: &'static str;

    /// Descriptor to register for this type.
    fn type_descriptor() -> TypeDescriptor;

    /// Kind of a field holding this type.
    fn field_kind() -> FieldKind {
        FieldKind::Object(Self::TYPE_ID.to_string())
    }
}
