// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # rpcwire - binary object-graph codec for RPC payloads
//!
//! Serializes arbitrary object graphs (shared references and cycles
//! included) into a compact, self-describing byte stream, and rebuilds them
//! on a peer whose type definitions may be older or newer.
//!
//! ## Quick Start
//!
//! ```rust
//! use rpcwire::{Codec, ObjectGraph, Described, TypeRegistry};
//! use std::sync::Arc;
//!
//! #[derive(Described)]
//! #[wire(name = "demo.Sensor")]
//! struct Sensor {
//!     id: u32,
//!     label: String,
//!     readings: Vec<f64>,
//!     #[wire(transient)]
//!     cached_mean: f64,
//! }
//!
//! let mut registry = TypeRegistry::new();
//! registry.register_described::<Sensor>().unwrap();
//! let codec = Codec::new(Arc::new(registry));
//!
//! let mut graph = ObjectGraph::new();
//! let s = graph.create(codec.registry(), Sensor::TYPE_ID).unwrap();
//! graph.set(s, "id", 7u32).unwrap();
//! graph.set(s, "readings", vec![20.5f64, 21.0]).unwrap();
//! graph.set(s, "cached_mean", 20.75f64).unwrap();
//! graph.set_root(s);
//!
//! let bytes = codec.serialize(&graph).unwrap();
//! let back = codec.deserialize(&bytes).unwrap();
//! let s2 = back.root_object().unwrap();
//! assert_eq!(back.get_as::<u32>(s2, "id").unwrap(), 7);
//! assert_eq!(back.get_as::<f64>(s2, "cached_mean").unwrap(), 0.0); // transient
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +------------------------------------------------------------------+
//! |  rpc:    CallEnvelope / ReplyEnvelope (ordinary registered types) |
//! +------------------------------------------------------------------+
//! |  codec:  Encoder / Decoder, per-call reference + type tables     |
//! +------------------------------------------------------------------+
//! |  value:  ObjectGraph arena, Value, Object                        |
//! |  types:  TypeRegistry, TypeDescriptor, #[derive(Described)]      |
//! +------------------------------------------------------------------+
//! |  ser:    WireWriter / WireReader, varints, value tags            |
//! +------------------------------------------------------------------+
//! ```
//!
//! ## Compatibility
//!
//! Struct fields are matched by name. A reader ignores fields it does not
//! declare and leaves fields missing from the stream at their default, so
//! peers can add, remove and reorder fields independently. Enum variants
//! travel as stable codes, never as declaration order.
//!
//! ## Modules Overview
//!
//! - [`types`] - descriptors, builders, registry
//! - [`value`] - values and object graphs
//! - [`codec`] - serialize / deserialize
//! - [`rpc`] - call and reply envelopes
//! - [`config`] - limits and wire constants

// Allow the derive's `::rpcwire::` paths to resolve inside this crate.
extern crate self as rpcwire;

pub mod codec;
pub mod config;
pub mod error;
pub mod rpc;
pub mod ser;
pub mod types;
pub mod value;

pub use codec::Codec;
pub use config::{CodecConfig, ConfigError};
pub use error::{AccessError, CodecError, Result};
pub use types::registry::{global, install_global};
pub use types::{
    Constructor, Described, EnumBuilder, EnumDescriptor, EnumVariant, FieldDescriptor,
    FieldKind, PrimitiveKind, TypeDescriptor, TypeDescriptorBuilder, TypeKind, TypeRegistry,
};
pub use value::{EnumValue, FromValue, Object, ObjectGraph, ObjectId, Value};

pub use rpcwire_codegen::Described; // Derive macro (for #[derive(rpcwire::Described)])
