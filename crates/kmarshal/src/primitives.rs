// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `Marshallable` for fixed-width scalars and fixed-size arrays.
//!
//! `bool`, `char`, `usize` and `isize` are deliberately left out: the first
//! two have invalid bit patterns, the last two have no fixed width.

use crate::codec::{Cursor, CursorMut};
use crate::view::{ByteView, ByteViewMut};
use crate::{Marshallable, Result};
use std::mem;

macro_rules! impl_scalar {
    ($type:ty, $write:ident, $read:ident) => {
        // SAFETY: fixed-width scalar without padding; every bit pattern is a
        // valid value.
        unsafe impl Marshallable for $type {
            const SIZE: usize = mem::size_of::<$type>();
            const PACKED: bool = true;

            #[inline]
            fn encode(&self, cursor: &mut CursorMut<'_>) -> Result<()> {
                cursor.$write(*self)
            }

            #[inline]
            fn decode(&mut self, cursor: &mut Cursor<'_>) -> Result<()> {
                *self = cursor.$read()?;
                Ok(())
            }
        }
    };
}

impl_scalar!(u8, write_u8, read_u8);
impl_scalar!(i8, write_i8, read_i8);
impl_scalar!(u16, write_u16_le, read_u16_le);
impl_scalar!(i16, write_i16_le, read_i16_le);
impl_scalar!(u32, write_u32_le, read_u32_le);
impl_scalar!(i32, write_i32_le, read_i32_le);
impl_scalar!(u64, write_u64_le, read_u64_le);
impl_scalar!(i64, write_i64_le, read_i64_le);
impl_scalar!(f32, write_f32_le, read_f32_le);
impl_scalar!(f64, write_f64_le, read_f64_le);

// SAFETY: array elements are contiguous; `PACKED` additionally requires the
// array stride to equal the element wire size, so no element carries padding.
unsafe impl<T: Marshallable, const N: usize> Marshallable for [T; N] {
    const SIZE: usize = T::SIZE * N;
    const PACKED: bool = T::PACKED && mem::size_of::<[T; N]>() == T::SIZE * N;

    fn encode(&self, cursor: &mut CursorMut<'_>) -> Result<()> {
        // Single-byte elements have no byte order.
        if T::SIZE == 1 {
            if let Some(view) = ByteView::of(self) {
                return cursor.write_bytes(view.as_slice());
            }
        }
        for element in self {
            element.encode(cursor)?;
        }
        Ok(())
    }

    fn decode(&mut self, cursor: &mut Cursor<'_>) -> Result<()> {
        if T::SIZE == 1 {
            if let Some(mut view) = ByteViewMut::of(self) {
                view.copy_from(cursor.read_bytes(N)?);
                return Ok(());
            }
        }
        for element in self.iter_mut() {
            element.decode(cursor)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_sizes() {
        assert_eq!(<u8 as Marshallable>::SIZE, 1);
        assert_eq!(<i16 as Marshallable>::SIZE, 2);
        assert_eq!(<f32 as Marshallable>::SIZE, 4);
        assert_eq!(<u64 as Marshallable>::SIZE, 8);
        assert!(0u32.is_packed());
    }

    #[test]
    fn test_scalar_is_little_endian() {
        let mut buf = [0u8; 4];
        0x0A0B_0C0Du32.marshal_bytes(&mut buf).unwrap();
        assert_eq!(buf, [0x0D, 0x0C, 0x0B, 0x0A]);
    }

    #[test]
    fn test_array_of_arrays() {
        let value: [[u16; 2]; 2] = [[1, 2], [3, 4]];
        assert_eq!(<[[u16; 2]; 2] as Marshallable>::SIZE, 8);
        assert!(value.is_packed());
        let mut buf = [0u8; 8];
        value.marshal_bytes(&mut buf).unwrap();
        assert_eq!(buf, [1, 0, 2, 0, 3, 0, 4, 0]);

        let mut back = [[0u16; 2]; 2];
        back.unmarshal_bytes(&buf).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_byte_array_fast_path() {
        let name = *b"kmarshal";
        let mut buf = [0u8; 8];
        assert_eq!(name.marshal_bytes(&mut buf).unwrap(), 8);
        assert_eq!(&buf, b"kmarshal");
        let mut back = [0u8; 8];
        back.unmarshal_bytes(&buf).unwrap();
        assert_eq!(back, name);
    }

    #[test]
    fn test_undersized_buffer_fails_before_writing() {
        let mut buf = [0xFFu8; 3];
        let err = 1u32.marshal_bytes(&mut buf).unwrap_err();
        assert_eq!(err.to_string(), "Buffer too small: need 4 bytes, have 3");
        assert_eq!(buf, [0xFF; 3]);
    }
}
