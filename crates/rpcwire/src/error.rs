// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for the codec, the registry and graph access.

use thiserror::Error;

/// Result type for codec and registry operations.
pub type Result<T> = std::result::Result<T, CodecError>;

/// Errors raised by `serialize`, `deserialize` and type registration.
///
/// Every error aborts the current call only. The registry is never mutated by
/// a failing encode or decode.
#[derive(Debug, Error)]
pub enum CodecError {
    // ========================================================================
    // Decode errors
    // ========================================================================
    /// A type id in the stream (or handed to a lookup) has no registered descriptor.
    #[error("unknown type: {0}")]
    UnknownType(String),

    /// Truncated, corrupted or structurally inconsistent input.
    #[error("malformed stream at offset {offset}: {reason}")]
    MalformedStream { offset: usize, reason: String },

    /// A backreference points at an id never seen as a first occurrence.
    #[error("dangling reference to object #{id} ({known} objects decoded so far)")]
    DanglingReference { id: u32, known: usize },

    /// The blank-instance capability of a descriptor failed.
    #[error("cannot construct blank instance of {type_id}: {reason}")]
    ConstructionFailure { type_id: String, reason: String },

    // ========================================================================
    // Encode errors
    // ========================================================================
    /// A field value does not fit the field's declared kind.
    #[error("{type_id}.{field}: expected {expected}, found {found}")]
    KindMismatch {
        type_id: String,
        field: String,
        expected: String,
        found: String,
    },

    /// The value cannot be encoded (e.g. it references an object missing from the graph).
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// An encode-side resource limit was hit.
    #[error("{what} exceeds limit ({actual} > {limit})")]
    LimitExceeded {
        what: &'static str,
        actual: usize,
        limit: usize,
    },

    // ========================================================================
    // Registration errors
    // ========================================================================
    /// A type with the same id is already registered.
    #[error("type already registered: {0}")]
    DuplicateType(String),

    /// The descriptor violates a descriptor invariant (e.g. duplicate field names).
    #[error("invalid descriptor {type_id}: {reason}")]
    InvalidDescriptor { type_id: String, reason: String },

    /// The process-wide registry was installed more than once.
    #[error("global type registry already installed")]
    RegistryAlreadyInstalled,

    /// `Codec::global` was called before `install_global`.
    #[error("global type registry not installed")]
    RegistryNotInstalled,

    // ========================================================================
    // Envelope errors
    // ========================================================================
    /// The graph does not hold a well-formed call or reply envelope.
    #[error("invalid envelope: {0}")]
    InvalidEnvelope(String),
}

impl CodecError {
    pub(crate) fn malformed(offset: usize, reason: impl Into<String>) -> Self {
        Self::MalformedStream {
            offset,
            reason: reason.into(),
        }
    }

    /// True for the errors a peer can cause by sending bad bytes.
    pub fn is_stream_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedStream { .. } | Self::DanglingReference { .. }
        )
    }
}

impl From<AccessError> for CodecError {
    fn from(e: AccessError) -> Self {
        Self::InvalidValue(e.to_string())
    }
}

/// Errors for field and object access on an [`ObjectGraph`](crate::ObjectGraph).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("{type_id} has no field named {field}")]
    FieldNotFound { type_id: String, field: String },

    #[error("no object #{0} in graph")]
    NoSuchObject(u32),

    #[error("value is not an object reference: {0}")]
    NotAnObject(String),

    #[error("type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_variants() {
        let err = CodecError::malformed(12, "unexpected end of buffer");
        assert_eq!(
            err.to_string(),
            "malformed stream at offset 12: unexpected end of buffer"
        );

        let err = CodecError::DanglingReference { id: 7, known: 3 };
        assert_eq!(
            err.to_string(),
            "dangling reference to object #7 (3 objects decoded so far)"
        );

        let err = CodecError::UnknownType("com.acme.Order".into());
        assert_eq!(err.to_string(), "unknown type: com.acme.Order");
    }

    #[test]
    fn test_stream_error_classification() {
        assert!(CodecError::malformed(0, "x").is_stream_error());
        assert!(CodecError::DanglingReference { id: 1, known: 0 }.is_stream_error());
        assert!(!CodecError::UnknownType("T".into()).is_stream_error());
    }

    #[test]
    fn test_access_error_into_codec_error() {
        let err: CodecError = AccessError::NoSuchObject(4).into();
        match err {
            CodecError::InvalidValue(msg) => assert_eq!(msg, "no object #4 in graph"),
            other => panic!("unexpected error {other:?}"),
        }
    }
}
