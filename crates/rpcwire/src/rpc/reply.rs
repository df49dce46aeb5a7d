// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Return-trip envelope: a result value or a remote fault.

use crate::error::{CodecError, Result};
use crate::rpc::{REMOTE_FAULT_TYPE, REPLY_ENVELOPE_TYPE};
use crate::types::TypeRegistry;
use crate::Described;
use crate::value::{EnumValue, ObjectGraph, ObjectId, Value};
use std::fmt;

/// Fault codes carried by a [`RemoteFault`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Described)]
#[wire(name = "rpc.FaultCode")]
#[repr(i32)]
pub enum FaultCode {
    /// No error, request processed successfully
    #[default]
    #[wire(description = "request processed")]
    Ok = 0,
    /// Method not found at the callee
    #[wire(description = "unsupported method")]
    UnsupportedMethod = 2,
    /// Invalid arguments
    #[wire(description = "invalid argument")]
    InvalidArgument = 3,
    /// Callee is unavailable
    #[wire(description = "service unavailable")]
    Unavailable = 4,
    /// Call timed out
    #[wire(description = "timeout")]
    Timeout = 5,
    /// Internal error at the callee
    #[wire(description = "internal error")]
    Internal = 6,
    /// Unknown/custom error
    #[wire(description = "unknown error")]
    Unknown = -1,
}

impl FaultCode {
    /// Convert from a wire code. Unlisted codes map to `Unknown`.
    pub fn from_i32(value: i32) -> Self {
        match value {
            0 => Self::Ok,
            2 => Self::UnsupportedMethod,
            3 => Self::InvalidArgument,
            4 => Self::Unavailable,
            5 => Self::Timeout,
            6 => Self::Internal,
            _ => Self::Unknown,
        }
    }

    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Enum value of this code, as stored in a graph.
    pub fn to_value(self, registry: &TypeRegistry) -> Result<EnumValue> {
        registry.enum_value_by_code(Self::TYPE_ID, self.as_i32())
    }
}

/// Failure reported by the callee.
#[derive(Debug, Clone, PartialEq, Eq, Described)]
#[wire(name = "rpc.RemoteFault")]
pub struct RemoteFault {
    pub code: FaultCode,
    pub message: String,
}

impl RemoteFault {
    pub fn new(code: FaultCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for RemoteFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

/// Reply to a call: either `value` or `fault`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplyEnvelope {
    value: Value,
    fault: Option<RemoteFault>,
}

impl ReplyEnvelope {
    /// Successful reply. The value's objects live in the graph it is attached to.
    pub fn success(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            fault: None,
        }
    }

    /// Failed reply.
    pub fn failure(fault: RemoteFault) -> Self {
        Self {
            value: Value::Null,
            fault: Some(fault),
        }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn fault(&self) -> Option<&RemoteFault> {
        self.fault.as_ref()
    }

    pub fn is_success(&self) -> bool {
        self.fault.is_none()
    }

    /// `Ok(value)` or the fault.
    pub fn into_result(self) -> std::result::Result<Value, RemoteFault> {
        match self.fault {
            Some(fault) => Err(fault),
            None => Ok(self.value),
        }
    }

    /// Store the envelope in `graph` and make it the root.
    pub fn attach(self, graph: &mut ObjectGraph, registry: &TypeRegistry) -> Result<ObjectId> {
        let id = graph.create(registry, REPLY_ENVELOPE_TYPE)?;
        if let Some(fault) = self.fault {
            let fault_id = graph.create(registry, REMOTE_FAULT_TYPE)?;
            graph.set(fault_id, "code", fault.code.to_value(registry)?)?;
            graph.set(fault_id, "message", fault.message)?;
            graph.set(id, "fault", fault_id)?;
        }
        graph.set(id, "value", self.value)?;
        graph.set_root(id);
        Ok(id)
    }

    /// Read the envelope at the root of a decoded graph.
    pub fn from_graph(graph: &ObjectGraph) -> Result<Self> {
        let id = super::root_of_type(graph, REPLY_ENVELOPE_TYPE)?;
        let value = graph.get(id, "value")?.clone();
        let fault = match graph.get(id, "fault")? {
            Value::Null => None,
            Value::Object(fault_id) => {
                let code = match graph.get(*fault_id, "code")? {
                    Value::Enum(e) => FaultCode::from_i32(e.code),
                    _ => FaultCode::Unknown,
                };
                let message: Option<String> = graph.get_as(*fault_id, "message")?;
                Some(RemoteFault::new(code, message.unwrap_or_default()))
            }
            other => {
                return Err(CodecError::InvalidEnvelope(format!(
                    "fault is {}, not an object",
                    other.kind_name()
                )))
            }
        };
        Ok(Self { value, fault })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::register_envelope_types;
    use crate::types::TypeKind;

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        register_envelope_types(&mut registry).expect("register");
        registry
    }

    #[test]
    fn test_fault_code_descriptor() {
        let desc = FaultCode::type_descriptor();
        assert_eq!(desc.name, "rpc.FaultCode");
        let TypeKind::Enum(e) = &desc.kind else {
            panic!("not an enum");
        };
        assert_eq!(e.variant_by_code(-1).map(|v| v.name.as_str()), Some("Unknown"));
        assert_eq!(
            e.variant("Timeout").map(|v| v.description.as_str()),
            Some("timeout")
        );
        assert_eq!(FaultCode::from_i32(42), FaultCode::Unknown);
        assert_eq!(FaultCode::Internal.as_i32(), 6);
    }

    #[test]
    fn test_remote_fault_descriptor() {
        let desc = RemoteFault::type_descriptor();
        assert_eq!(desc.name, REMOTE_FAULT_TYPE);
        assert_eq!(
            desc.field("code").map(|f| f.kind.clone()),
            Some(crate::FieldKind::Enum("rpc.FaultCode".into()))
        );
    }

    #[test]
    fn test_failure_attach_and_read_back() {
        let registry = registry();
        let mut graph = ObjectGraph::new();
        ReplyEnvelope::failure(RemoteFault::new(FaultCode::Timeout, "deadline passed"))
            .attach(&mut graph, &registry)
            .expect("attach");

        let reply = ReplyEnvelope::from_graph(&graph).expect("read");
        assert!(!reply.is_success());
        let fault = reply.into_result().expect_err("fault");
        assert_eq!(fault.code, FaultCode::Timeout);
        assert_eq!(fault.to_string(), "Timeout: deadline passed");
    }

    #[test]
    fn test_success_reply() {
        let registry = registry();
        let mut graph = ObjectGraph::new();
        ReplyEnvelope::success(42i64)
            .attach(&mut graph, &registry)
            .expect("attach");
        let reply = ReplyEnvelope::from_graph(&graph).expect("read");
        assert_eq!(reply.value(), &Value::I64(42));
        assert!(reply.fault().is_none());
    }
}
