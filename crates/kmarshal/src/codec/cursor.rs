// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Read/write cursors over fixed-size buffers.
//!
//! Multi-byte scalars always go through [`WireOrder`]; single bytes are copied
//! verbatim.

use super::WireOrder;
use crate::{Error, Result};
use byteorder::ByteOrder;

/// Generate write methods for multi-byte scalars.
///
/// Each generated method checks bounds (`Error::BufferTooSmall`), encodes the
/// value in wire order and advances the offset.
macro_rules! impl_write_le {
    ($name:ident, $type:ty, $size:expr, $write:path) => {
        pub fn $name(&mut self, value: $type) -> Result<()> {
            let dst = self.reserve($size)?;
            $write(dst, value);
            Ok(())
        }
    };
}

/// Generate read methods for multi-byte scalars.
macro_rules! impl_read_le {
    ($name:ident, $type:ty, $size:expr, $read:path) => {
        pub fn $name(&mut self) -> Result<$type> {
            let src = self.read_bytes($size)?;
            Ok($read(src))
        }
    };
}

macro_rules! impl_cursor_common {
    () => {
        pub fn offset(&self) -> usize {
            self.offset
        }

        pub fn remaining(&self) -> usize {
            self.buffer.len().saturating_sub(self.offset)
        }

        fn overflow(&self, len: usize) -> Error {
            Error::BufferTooSmall {
                need: self.offset.saturating_add(len),
                have: self.buffer.len(),
            }
        }
    };
}

/// Mutable cursor for writing (bounds-checked).
pub struct CursorMut<'a> {
    buffer: &'a mut [u8],
    offset: usize,
}

impl<'a> CursorMut<'a> {
    pub fn new(buffer: &'a mut [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    fn reserve(&mut self, len: usize) -> Result<&mut [u8]> {
        if len > self.remaining() {
            return Err(self.overflow(len));
        }
        let start = self.offset;
        self.offset += len;
        Ok(&mut self.buffer[start..start + len])
    }

    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.reserve(1)?[0] = value;
        Ok(())
    }

    pub fn write_i8(&mut self, value: i8) -> Result<()> {
        self.write_u8(value as u8)
    }

    impl_write_le!(write_u16_le, u16, 2, WireOrder::write_u16);
    impl_write_le!(write_i16_le, i16, 2, WireOrder::write_i16);
    impl_write_le!(write_u32_le, u32, 4, WireOrder::write_u32);
    impl_write_le!(write_i32_le, i32, 4, WireOrder::write_i32);
    impl_write_le!(write_u64_le, u64, 8, WireOrder::write_u64);
    impl_write_le!(write_i64_le, i64, 8, WireOrder::write_i64);
    impl_write_le!(write_f32_le, f32, 4, WireOrder::write_f32);
    impl_write_le!(write_f64_le, f64, 8, WireOrder::write_f64);

    pub fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.reserve(data.len())?.copy_from_slice(data);
        Ok(())
    }

    impl_cursor_common!();
}

/// Immutable cursor for reading (bounds-checked, zero-copy).
pub struct Cursor<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    impl_read_le!(read_u16_le, u16, 2, WireOrder::read_u16);
    impl_read_le!(read_i16_le, i16, 2, WireOrder::read_i16);
    impl_read_le!(read_u32_le, u32, 4, WireOrder::read_u32);
    impl_read_le!(read_i32_le, i32, 4, WireOrder::read_i32);
    impl_read_le!(read_u64_le, u64, 8, WireOrder::read_u64);
    impl_read_le!(read_i64_le, i64, 8, WireOrder::read_i64);
    impl_read_le!(read_f32_le, f32, 4, WireOrder::read_f32);
    impl_read_le!(read_f64_le, f64, 8, WireOrder::read_f64);

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(self.overflow(len));
        }
        let slice = &self.buffer[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    impl_cursor_common!();

    pub fn is_eof(&self) -> bool {
        self.offset >= self.buffer.len()
    }
}
