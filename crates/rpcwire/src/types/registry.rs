// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type registry: stable type id -> descriptor.
//!
//! The registry is populated during startup and then shared read-only
//! (behind an `Arc`) by every codec instance. A process-wide instance can be
//! installed once with [`install_global`].

use crate::error::{CodecError, Result};
use crate::types::{Described, TypeDescriptor, TypeKind};
use crate::value::EnumValue;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

static GLOBAL_REGISTRY: OnceLock<Arc<TypeRegistry>> = OnceLock::new();

/// Mapping from type id to descriptor.
#[derive(Debug, Default, Clone)]
pub struct TypeRegistry {
    types: HashMap<String, Arc<TypeDescriptor>>,
}

impl TypeRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor under its type id.
    ///
    /// Fails with `DuplicateType` if the id is taken and `InvalidDescriptor`
    /// if the descriptor itself is inconsistent. Field kinds may name types
    /// that are registered later; see [`TypeRegistry::validate`].
    pub fn register(&mut self, descriptor: TypeDescriptor) -> Result<Arc<TypeDescriptor>> {
        descriptor.validate()?;
        if self.types.contains_key(&descriptor.name) {
            return Err(CodecError::DuplicateType(descriptor.name));
        }
        let descriptor = Arc::new(descriptor);
        log::debug!(
            "[registry] registered {} ({} fields)",
            descriptor.name,
            descriptor.fields().len()
        );
        self.types
            .insert(descriptor.name.clone(), Arc::clone(&descriptor));
        Ok(descriptor)
    }

    /// Register a type described at compile time.
    pub fn register_described<T: Described>(&mut self) -> Result<Arc<TypeDescriptor>> {
        self.register(T::type_descriptor())
    }

    /// Look up a descriptor by type id.
    pub fn resolve(&self, type_id: &str) -> Result<&Arc<TypeDescriptor>> {
        self.types
            .get(type_id)
            .ok_or_else(|| CodecError::UnknownType(type_id.to_string()))
    }

    /// Look up a descriptor, `None` if absent.
    pub fn get(&self, type_id: &str) -> Option<&Arc<TypeDescriptor>> {
        self.types.get(type_id)
    }

    /// Returns `true` if `type_id` is registered.
    pub fn contains(&self, type_id: &str) -> bool {
        self.types.contains_key(type_id)
    }

    /// Number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if no types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Registered type ids, sorted.
    pub fn type_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.types.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Build the value of variant `name` of enum `type_id`.
    pub fn enum_value(&self, type_id: &str, name: &str) -> Result<EnumValue> {
        let descriptor = self.resolve(type_id)?;
        let variants = descriptor.enum_descriptor().ok_or_else(|| {
            CodecError::InvalidValue(format!("{} is not an enum type", type_id))
        })?;
        let variant = variants.variant(name).ok_or_else(|| {
            CodecError::InvalidValue(format!("{} has no variant {}", type_id, name))
        })?;
        Ok(EnumValue::from_variant(type_id, variant))
    }

    /// Build the value of the variant of enum `type_id` with `code`.
    pub fn enum_value_by_code(&self, type_id: &str, code: i32) -> Result<EnumValue> {
        let descriptor = self.resolve(type_id)?;
        descriptor
            .enum_descriptor()
            .and_then(|e| e.variant_by_code(code))
            .map(|v| EnumValue::from_variant(type_id, v))
            .ok_or_else(|| CodecError::InvalidValue(format!("{} has no code {}", type_id, code)))
    }

    /// Check that every type named by a field kind is registered with the
    /// right kind (struct for `object<..>`, enum for `enum<..>`).
    pub fn validate(&self) -> Result<()> {
        for descriptor in self.types.values() {
            for field in descriptor.fields() {
                let mut referenced = Vec::new();
                field.kind.referenced_types(&mut referenced);
                for type_id in referenced {
                    let target = self.types.get(type_id).ok_or_else(|| {
                        CodecError::InvalidDescriptor {
                            type_id: descriptor.name.clone(),
                            reason: format!(
                                "field {} references unregistered type {}",
                                field.name, type_id
                            ),
                        }
                    })?;
                    let expected_enum = kind_names_enum(&field.kind, type_id);
                    if expected_enum != matches!(target.kind, TypeKind::Enum(_)) {
                        return Err(CodecError::InvalidDescriptor {
                            type_id: descriptor.name.clone(),
                            reason: format!(
                                "field {} uses {} as {}",
                                field.name,
                                type_id,
                                if expected_enum { "an enum" } else { "an object" }
                            ),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

// True when `type_id` occurs inside `kind` as enum<type_id>.
fn kind_names_enum(kind: &crate::types::FieldKind, type_id: &str) -> bool {
    use crate::types::FieldKind;
    match kind {
        FieldKind::Enum(t) => t == type_id,
        FieldKind::List(e) | FieldKind::Set(e) => kind_names_enum(e, type_id),
        FieldKind::Map(k, v) => kind_names_enum(k, type_id) || kind_names_enum(v, type_id),
        FieldKind::Object(_) | FieldKind::Primitive(_) | FieldKind::Any => false,
    }
}

/// Install the process-wide registry. Can only succeed once.
pub fn install_global(registry: TypeRegistry) -> Result<Arc<TypeRegistry>> {
    let registry = Arc::new(registry);
    GLOBAL_REGISTRY
        .set(Arc::clone(&registry))
        .map_err(|_| CodecError::RegistryAlreadyInstalled)?;
    log::debug!("[registry] global registry installed ({} types)", registry.len());
    Ok(registry)
}

/// The process-wide registry, if installed.
pub fn global() -> Option<Arc<TypeRegistry>> {
    GLOBAL_REGISTRY.get().cloned()
}
