// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! RPC payload envelopes.
//!
//! A caller wraps the method descriptor and its arguments in a
//! [`CallEnvelope`]; the callee answers with a [`ReplyEnvelope`]. Both are
//! ordinary registered types, so they go through the codec like any other
//! object graph. Transport and dispatch are out of scope.
//!
//! # Example
//!
//! ```rust
//! use rpcwire::rpc::{register_envelope_types, CallEnvelope};
//! use rpcwire::{Codec, ObjectGraph, TypeRegistry};
//! use std::sync::Arc;
//!
//! let mut registry = TypeRegistry::new();
//! register_envelope_types(&mut registry).unwrap();
//! let codec = Codec::new(Arc::new(registry));
//!
//! let mut graph = ObjectGraph::new();
//! CallEnvelope::new("calc.add(i32, i32)")
//!     .with_parameter("i32", 2i32)
//!     .with_parameter("i32", 3i32)
//!     .attach(&mut graph, codec.registry())
//!     .unwrap();
//!
//! let bytes = codec.serialize(&graph).unwrap();
//! let decoded = codec.deserialize(&bytes).unwrap();
//! let call = CallEnvelope::from_graph(&decoded).unwrap();
//! assert_eq!(call.method_descriptor(), "calc.add(i32, i32)");
//! call.verify_parameter_types(&decoded).unwrap();
//! ```

mod call;
mod reply;

pub use call::CallEnvelope;
pub use reply::{FaultCode, RemoteFault, ReplyEnvelope};

use crate::error::{CodecError, Result};
use crate::types::{FieldKind, PrimitiveKind, TypeDescriptorBuilder, TypeRegistry};
use crate::value::{ObjectGraph, ObjectId};

/// Type id of [`CallEnvelope`].
pub const CALL_ENVELOPE_TYPE: &str = "rpc.CallEnvelope";
/// Type id of [`ReplyEnvelope`].
pub const REPLY_ENVELOPE_TYPE: &str = "rpc.ReplyEnvelope";
/// Type id of [`RemoteFault`].
pub const REMOTE_FAULT_TYPE: &str = "rpc.RemoteFault";
/// Type id of [`FaultCode`].
pub const FAULT_CODE_TYPE: &str = "rpc.FaultCode";

/// Register the envelope types. Both peers must call this during startup.
pub fn register_envelope_types(registry: &mut TypeRegistry) -> Result<()> {
    registry.register(
        TypeDescriptorBuilder::new(CALL_ENVELOPE_TYPE)
            .string_field("method_descriptor")
            .list_field("parameter_types", PrimitiveKind::String)
            .list_field("parameter_values", FieldKind::Any)
            .build(),
    )?;
    registry.register_described::<FaultCode>()?;
    registry.register_described::<RemoteFault>()?;
    registry.register(
        TypeDescriptorBuilder::new(REPLY_ENVELOPE_TYPE)
            .any_field("value")
            .object_field("fault", REMOTE_FAULT_TYPE)
            .build(),
    )?;
    Ok(())
}

fn root_of_type(graph: &ObjectGraph, type_id: &str) -> Result<ObjectId> {
    let id = graph.root_object().ok_or_else(|| {
        CodecError::InvalidEnvelope(format!("root is {}, not an object", graph.root().kind_name()))
    })?;
    let actual = graph.object(id)?.type_id();
    if actual != type_id {
        return Err(CodecError::InvalidEnvelope(format!(
            "root is {}, expected {}",
            actual, type_id
        )));
    }
    Ok(id)
}
