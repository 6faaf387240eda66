// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Byte-order codec.
//!
//! The portable encoding of every multi-byte scalar is little-endian,
//! whatever the host. Only the packed path (see [`crate::view`]) copies
//! host-order memory.

pub mod cursor;

pub use cursor::{Cursor, CursorMut};

/// Byte order of the portable encoding.
pub type WireOrder = byteorder::LittleEndian;

/// True when host memory order equals the wire order, i.e. when the packed
/// path and the portable path produce the same bytes.
pub const HOST_IS_WIRE_ORDER: bool = cfg!(target_endian = "little");
