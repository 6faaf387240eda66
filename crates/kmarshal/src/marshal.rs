// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The `Marshallable` capability.

use crate::codec::{Cursor, CursorMut};
use crate::memory::{self, AddressSpace, Addr};
use crate::view::{self, ByteView, ByteViewMut};
use crate::{stream, Error, Result};
use std::io;

/// Fail with `BufferTooSmall` unless `have >= need`.
#[inline]
pub(crate) fn ensure_len(need: usize, have: usize) -> Result<()> {
    if have < need {
        return Err(Error::BufferTooSmall { need, have });
    }
    Ok(())
}

/// A fixed-layout type with a wire encoding of exactly `SIZE` bytes.
///
/// The portable encoding (`marshal_bytes` / `unmarshal_bytes`) is the
/// concatenation of the fields in declaration order, multi-byte scalars in
/// little-endian, no padding. The `*_unsafe`, `copy_*` and `write_to`
/// operations copy the value's memory directly when the type is packed, which
/// yields host byte order; on little-endian hosts both encodings are the same
/// bytes.
///
/// Usually implemented with `#[derive(Marshallable)]`.
///
/// # Safety
///
/// Implementors guarantee that:
/// - `SIZE` is the number of bytes `encode` writes and `decode` reads;
/// - if `PACKED` is true, `size_of::<Self>() == SIZE`, the type contains no
///   padding, and every bit pattern of `SIZE` bytes is a valid `Self`.
pub unsafe trait Marshallable: Sized {
    /// Wire size in bytes. Never depends on the value.
    const SIZE: usize;

    /// True when the in-memory image is the wire image.
    const PACKED: bool;

    /// Write exactly `SIZE` bytes, field by field.
    fn encode(&self, cursor: &mut CursorMut<'_>) -> Result<()>;

    /// Read exactly `SIZE` bytes, field by field.
    fn decode(&mut self, cursor: &mut Cursor<'_>) -> Result<()>;

    fn size_bytes(&self) -> usize {
        Self::SIZE
    }

    fn is_packed(&self) -> bool {
        view::is_viewable::<Self>()
    }

    /// Encode into the front of `dst`; returns `SIZE`.
    ///
    /// Fails before writing anything if `dst` is shorter than `SIZE`.
    fn marshal_bytes(&self, dst: &mut [u8]) -> Result<usize> {
        ensure_len(Self::SIZE, dst.len())?;
        let mut cursor = CursorMut::new(&mut dst[..Self::SIZE]);
        self.encode(&mut cursor)?;
        debug_assert_eq!(cursor.offset(), Self::SIZE);
        Ok(Self::SIZE)
    }

    /// Decode from the front of `src`; returns `SIZE`.
    fn unmarshal_bytes(&mut self, src: &[u8]) -> Result<usize> {
        ensure_len(Self::SIZE, src.len())?;
        let mut cursor = Cursor::new(&src[..Self::SIZE]);
        self.decode(&mut cursor)?;
        Ok(Self::SIZE)
    }

    /// Decode a fresh value.
    fn unmarshal_new(src: &[u8]) -> Result<Self>
    where
        Self: Default,
    {
        let mut value = Self::default();
        value.unmarshal_bytes(src)?;
        Ok(value)
    }

    /// Raw bytes of the value, if the type is packed.
    fn as_bytes(&self) -> Option<ByteView<'_>> {
        ByteView::of(self)
    }

    fn as_bytes_mut(&mut self) -> Option<ByteViewMut<'_>> {
        ByteViewMut::of(self)
    }

    /// Bulk copy of the value's memory when packed, `marshal_bytes` otherwise.
    fn marshal_unsafe(&self, dst: &mut [u8]) -> Result<usize> {
        if let Some(view) = self.as_bytes() {
            ensure_len(Self::SIZE, dst.len())?;
            dst[..Self::SIZE].copy_from_slice(view.as_slice());
            return Ok(Self::SIZE);
        }
        self.marshal_bytes(dst)
    }

    /// Bulk copy into the value's memory when packed, `unmarshal_bytes` otherwise.
    fn unmarshal_unsafe(&mut self, src: &[u8]) -> Result<usize> {
        ensure_len(Self::SIZE, src.len())?;
        if let Some(mut view) = self.as_bytes_mut() {
            view.copy_from(&src[..Self::SIZE]);
            return Ok(Self::SIZE);
        }
        self.unmarshal_bytes(src)
    }

    /// Copy the encoding to `addr` in a foreign address space.
    ///
    /// Returns `SIZE`, or an [`Error::Fault`] carrying the number of bytes
    /// that reached the destination before the fault.
    fn copy_out<S: AddressSpace + ?Sized>(&self, space: &mut S, addr: Addr) -> Result<usize> {
        self.copy_out_n(space, addr, Self::SIZE)
    }

    /// Copy at most `limit` bytes of the encoding (a prefix) to `addr`.
    fn copy_out_n<S: AddressSpace + ?Sized>(
        &self,
        space: &mut S,
        addr: Addr,
        limit: usize,
    ) -> Result<usize> {
        let len = limit.min(Self::SIZE);
        if let Some(view) = self.as_bytes() {
            return memory::write_all(space, addr, &view.as_slice()[..len]);
        }
        let mut buf = vec![0u8; Self::SIZE];
        self.marshal_bytes(&mut buf)?;
        memory::write_all(space, addr, &buf[..len])
    }

    /// Fill the value from `SIZE` bytes at `addr` in a foreign address space.
    ///
    /// On a partial transfer a non-packed value is left untouched; a packed
    /// value holds the bytes that arrived before the fault.
    fn copy_in<S: AddressSpace + ?Sized>(&mut self, space: &S, addr: Addr) -> Result<usize> {
        if let Some(mut view) = self.as_bytes_mut() {
            return memory::read_exact(space, addr, view.as_mut_slice());
        }
        let mut buf = vec![0u8; Self::SIZE];
        let n = memory::read_exact(space, addr, &mut buf)?;
        self.unmarshal_bytes(&buf)?;
        Ok(n)
    }

    /// Write the encoding to a byte stream; returns `SIZE`.
    fn write_to<W: io::Write + ?Sized>(&self, writer: &mut W) -> Result<usize> {
        if let Some(view) = self.as_bytes() {
            return stream::write_fully(writer, view.as_slice());
        }
        let mut buf = vec![0u8; Self::SIZE];
        self.marshal_bytes(&mut buf)?;
        stream::write_fully(writer, &buf)
    }
}
