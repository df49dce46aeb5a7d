// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec configuration - wire constants and runtime limits.
//!
//! # Architecture
//!
//! - **Level 1 (Static)**: wire format constants (version byte)
//! - **Level 2 (Dynamic)**: [`CodecConfig`] resource limits, set in code or
//!   loaded from TOML
//!
//! # Example
//!
//! ```
//! use rpcwire::config::CodecConfig;
//!
//! let config = CodecConfig::from_toml_str("max_depth = 128").unwrap();
//! assert_eq!(config.max_depth, 128);
//! assert_eq!(config.max_collection_len, CodecConfig::default().max_collection_len);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =======================================================================
// Wire format
// =======================================================================

/// First byte of every stream. Bumped only for incompatible layout changes.
pub const WIRE_VERSION: u8 = 1;

/// Default maximum nesting depth of values (objects, collections, maps).
///
/// Encode and decode recurse once per level; 64 levels fit a 2 MiB thread
/// stack in unoptimized builds.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Default maximum element count of a single list, set or map.
pub const DEFAULT_MAX_COLLECTION_LEN: usize = 16 * 1024 * 1024;

/// Default maximum byte length of a single string or byte array.
pub const DEFAULT_MAX_STRING_LEN: usize = 64 * 1024 * 1024;

// =======================================================================
// Runtime configuration
// =======================================================================

/// Resource limits applied to every encode and decode call.
///
/// Limits protect the decoder against hostile input: a violation while
/// decoding is reported as `MalformedStream`, while encoding as
/// `LimitExceeded`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodecConfig {
    /// Maximum nesting depth of values.
    ///
    /// Every object reached through a field counts as one level, so this
    /// also bounds the length of linked structures: a chain of `n` objects
    /// needs `max_depth >= n`, even when it is acyclic. Raise it for long
    /// linked lists, and run the codec on a thread whose stack grows with
    /// it.
    pub max_depth: usize,
    /// Maximum element count of a collection or map.
    pub max_collection_len: usize,
    /// Maximum byte length of a string or byte array.
    pub max_string_len: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_collection_len: DEFAULT_MAX_COLLECTION_LEN,
            max_string_len: DEFAULT_MAX_STRING_LEN,
        }
    }
}

impl CodecConfig {
    /// Parse a configuration from TOML. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the maximum nesting depth.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the maximum collection length.
    pub fn with_max_collection_len(mut self, max: usize) -> Self {
        self.max_collection_len = max;
        self
    }

    /// Set the maximum string/byte array length.
    pub fn with_max_string_len(mut self, max: usize) -> Self {
        self.max_string_len = max;
        self
    }

    /// Reject limits that would make every non-trivial graph unencodable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::Invalid("max_depth must be at least 1".into()));
        }
        Ok(())
    }
}

/// Errors loading a [`CodecConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
