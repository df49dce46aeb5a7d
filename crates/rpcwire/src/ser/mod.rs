// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Low-level wire primitives: cursors, varints, value tags.

pub mod cursor;
pub mod tags;

pub use cursor::{zigzag_decode, zigzag_encode, WireReader, WireWriter};
pub use tags::Tag;
