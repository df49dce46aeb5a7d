// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The codec: object graphs to bytes and back.
//!
//! # Wire layout
//!
//! ```text
//! stream   := version:u8 value
//! value    := tag:u8 payload
//! object   := OBJECT_NEW typeref id:varint field-value*   (writer's field order)
//!           | OBJECT_REF id:varint
//! enum     := ENUM typeref code:zigzag
//! typeref  := 0 kind:u8 name [count:varint field-name*]  (first use)
//!           | code:varint                                (later uses, from 1)
//! ```
//!
//! Reference and type tables are created per call; nothing carries over
//! between calls, so a [`Codec`] can be shared freely across threads.

mod decoder;
mod encoder;
mod refs;
mod session;

use crate::config::CodecConfig;
use crate::error::{CodecError, Result};
use crate::types::{registry, TypeRegistry};
use crate::value::ObjectGraph;
use decoder::Decoder;
use encoder::Encoder;
use std::sync::Arc;

/// Serializer/deserializer bound to a registry.
#[derive(Debug, Clone)]
pub struct Codec {
    registry: Arc<TypeRegistry>,
    config: Arc<CodecConfig>,
}

impl Codec {
    /// Codec with default limits.
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self::with_config(registry, CodecConfig::default())
    }

    /// Codec with explicit limits.
    pub fn with_config(registry: Arc<TypeRegistry>, config: CodecConfig) -> Self {
        Self {
            registry,
            config: Arc::new(config),
        }
    }

    /// Codec over the process-wide registry.
    pub fn global() -> Result<Self> {
        registry::global()
            .map(Self::new)
            .ok_or(CodecError::RegistryNotInstalled)
    }

    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Encode the graph reachable from its root.
    pub fn serialize(&self, graph: &ObjectGraph) -> Result<Vec<u8>> {
        Encoder::new(&self.registry, &self.config, graph).encode()
    }

    /// Decode a stream produced by [`Codec::serialize`], possibly by a
    /// peer with an older or newer version of the same types.
    pub fn deserialize(&self, bytes: &[u8]) -> Result<ObjectGraph> {
        Decoder::new(&self.registry, &self.config, bytes).decode()
    }
}
