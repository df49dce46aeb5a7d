// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Call envelope: the per-call payload.

use crate::error::{CodecError, Result};
use crate::rpc::CALL_ENVELOPE_TYPE;
use crate::ser::Tag;
use crate::types::{FieldKind, PrimitiveKind, TypeRegistry};
use crate::value::{ObjectGraph, ObjectId, Value};

/// Method descriptor plus ordered parameter types and values.
///
/// To the codec this is an ordinary registered type; parameters that are
/// objects live in the same graph as the envelope, so sharing and cycles
/// between arguments survive the trip.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CallEnvelope {
    method_descriptor: String,
    parameter_types: Vec<String>,
    parameter_values: Vec<Value>,
}

impl CallEnvelope {
    pub fn new(method_descriptor: impl Into<String>) -> Self {
        Self {
            method_descriptor: method_descriptor.into(),
            ..Self::default()
        }
    }

    /// Append a parameter and its declared type id.
    ///
    /// Type ids are registered type names, or primitive names such as
    /// `i32` and `string`, or `any`.
    pub fn with_parameter(mut self, type_id: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameter_types.push(type_id.into());
        self.parameter_values.push(value.into());
        self
    }

    pub fn method_descriptor(&self) -> &str {
        &self.method_descriptor
    }

    pub fn parameter_types(&self) -> &[String] {
        &self.parameter_types
    }

    pub fn parameter_values(&self) -> &[Value] {
        &self.parameter_values
    }

    pub fn len(&self) -> usize {
        self.parameter_values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameter_values.is_empty()
    }

    fn check_arity(types: usize, values: usize) -> Result<()> {
        if types != values {
            return Err(CodecError::InvalidEnvelope(format!(
                "{} parameter types but {} parameter values",
                types, values
            )));
        }
        Ok(())
    }

    /// Store the envelope in `graph` and make it the root.
    pub fn attach(self, graph: &mut ObjectGraph, registry: &TypeRegistry) -> Result<ObjectId> {
        Self::check_arity(self.parameter_types.len(), self.parameter_values.len())?;
        let id = graph.create(registry, CALL_ENVELOPE_TYPE)?;
        graph.set(id, "method_descriptor", self.method_descriptor)?;
        graph.set(id, "parameter_types", self.parameter_types)?;
        graph.set(id, "parameter_values", Value::List(self.parameter_values))?;
        graph.set_root(id);
        Ok(id)
    }

    /// Read the envelope at the root of a decoded graph.
    pub fn from_graph(graph: &ObjectGraph) -> Result<Self> {
        let id = super::root_of_type(graph, CALL_ENVELOPE_TYPE)?;

        let method_descriptor: Option<String> = graph.get_as(id, "method_descriptor")?;
        let method_descriptor = method_descriptor
            .ok_or_else(|| CodecError::InvalidEnvelope("missing method descriptor".into()))?;

        let parameter_types = match graph.get(id, "parameter_types")? {
            Value::Null => Vec::new(),
            Value::List(items) => items
                .iter()
                .map(|v| {
                    v.as_str().map(str::to_string).ok_or_else(|| {
                        CodecError::InvalidEnvelope(format!(
                            "parameter type is {}, not a string",
                            v.kind_name()
                        ))
                    })
                })
                .collect::<Result<Vec<_>>>()?,
            other => {
                return Err(CodecError::InvalidEnvelope(format!(
                    "parameter types is {}",
                    other.kind_name()
                )))
            }
        };
        let parameter_values = match graph.get(id, "parameter_values")? {
            Value::Null => Vec::new(),
            Value::List(items) => items.clone(),
            other => {
                return Err(CodecError::InvalidEnvelope(format!(
                    "parameter values is {}",
                    other.kind_name()
                )))
            }
        };
        Self::check_arity(parameter_types.len(), parameter_values.len())?;

        Ok(Self {
            method_descriptor,
            parameter_types,
            parameter_values,
        })
    }

    /// Check every parameter value against its declared type id.
    ///
    /// Objects and enums match by type id, primitives by kind name. `Null`
    /// matches any nullable declaration.
    pub fn verify_parameter_types(&self, graph: &ObjectGraph) -> Result<()> {
        for (index, (type_id, value)) in self
            .parameter_types
            .iter()
            .zip(&self.parameter_values)
            .enumerate()
        {
            let matches = match (PrimitiveKind::from_name(type_id), value) {
                _ if type_id == "any" => true,
                (Some(kind), v) => Tag::of(v).fits(&FieldKind::Primitive(kind)),
                (None, Value::Null) => true,
                (None, Value::Enum(e)) => e.type_id == *type_id,
                (None, Value::Object(id)) => graph.object(*id)?.type_id() == type_id,
                (None, _) => false,
            };
            if !matches {
                return Err(CodecError::InvalidEnvelope(format!(
                    "parameter {} declared {}, found {}",
                    index,
                    type_id,
                    describe(graph, value)
                )));
            }
        }
        Ok(())
    }
}

fn describe(graph: &ObjectGraph, value: &Value) -> String {
    match value {
        Value::Object(id) => graph
            .object(*id)
            .map_or_else(|_| "dangling object".to_string(), |o| o.type_id().to_string()),
        Value::Enum(e) => e.type_id.clone(),
        other => other.kind_name().to_string(),
    }
}
