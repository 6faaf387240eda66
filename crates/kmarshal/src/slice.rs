// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Operations over slices of `Marshallable` values.
//!
//! The encoding of a slice is the concatenation of its elements. Packed
//! element types move as one contiguous block; others go element by element.

use crate::codec::{Cursor, CursorMut};
use crate::marshal::ensure_len;
use crate::memory::{self, Addr, AddressSpace};
use crate::view::{ByteView, ByteViewMut};
use crate::{stream, Error, Marshallable, Result};
use std::io;

/// Encoded size of `count` elements.
///
/// Fails with `SizeOverflow` when the total does not fit in `usize`.
pub fn total_size<T: Marshallable>(count: usize) -> Result<usize> {
    count.checked_mul(T::SIZE).ok_or(Error::SizeOverflow {
        count,
        element_size: T::SIZE,
    })
}

/// Encode every element of `values` into the front of `dst`.
pub fn marshal_slice<T: Marshallable>(values: &[T], dst: &mut [u8]) -> Result<usize> {
    let total = total_size::<T>(values.len())?;
    ensure_len(total, dst.len())?;
    let mut cursor = CursorMut::new(&mut dst[..total]);
    for value in values {
        value.encode(&mut cursor)?;
    }
    Ok(total)
}

/// Decode `values.len()` elements from the front of `src`.
pub fn unmarshal_slice<T: Marshallable>(values: &mut [T], src: &[u8]) -> Result<usize> {
    let total = total_size::<T>(values.len())?;
    ensure_len(total, src.len())?;
    let mut cursor = Cursor::new(&src[..total]);
    for value in values.iter_mut() {
        value.decode(&mut cursor)?;
    }
    Ok(total)
}

pub fn marshal_unsafe_slice<T: Marshallable>(values: &[T], dst: &mut [u8]) -> Result<usize> {
    match ByteView::of_slice(values) {
        Some(view) => {
            ensure_len(view.len(), dst.len())?;
            dst[..view.len()].copy_from_slice(view.as_slice());
            Ok(view.len())
        }
        None => marshal_slice(values, dst),
    }
}

pub fn unmarshal_unsafe_slice<T: Marshallable>(values: &mut [T], src: &[u8]) -> Result<usize> {
    let total = total_size::<T>(values.len())?;
    ensure_len(total, src.len())?;
    match ByteViewMut::of_slice(values) {
        Some(mut view) => {
            view.copy_from(&src[..total]);
            Ok(total)
        }
        None => unmarshal_slice(values, src),
    }
}

/// Copy the encoding of `values` to `addr` in a foreign address space.
///
/// On a fault the error carries the number of bytes that reached the
/// destination, which may end in the middle of an element.
pub fn copy_slice_out<T, S>(values: &[T], space: &mut S, addr: Addr) -> Result<usize>
where
    T: Marshallable,
    S: AddressSpace + ?Sized,
{
    if let Some(view) = ByteView::of_slice(values) {
        return memory::write_all(space, addr, view.as_slice());
    }
    let mut buf = vec![0u8; total_size::<T>(values.len())?];
    marshal_slice(values, &mut buf)?;
    memory::write_all(space, addr, &buf)
}

/// Fill `values` from a foreign address space.
///
/// On a fault, non-packed element types keep every element that arrived
/// whole; the element cut by the fault and those after it are left as they
/// were.
pub fn copy_slice_in<T, S>(values: &mut [T], space: &S, addr: Addr) -> Result<usize>
where
    T: Marshallable,
    S: AddressSpace + ?Sized,
{
    if let Some(mut view) = ByteViewMut::of_slice(values) {
        return memory::read_exact(space, addr, view.as_mut_slice());
    }
    let total = total_size::<T>(values.len())?;
    let mut buf = vec![0u8; total];
    match memory::read_exact(space, addr, &mut buf) {
        Ok(n) => {
            unmarshal_slice(values, &buf)?;
            Ok(n)
        }
        Err(err) => {
            if T::SIZE > 0 {
                let whole = err.transferred() / T::SIZE;
                log::debug!(
                    "[kmarshal] partial slice copy-in: {} of {} elements",
                    whole,
                    values.len()
                );
                unmarshal_slice(&mut values[..whole], &buf)?;
            }
            Err(err)
        }
    }
}

/// Write the encoding of `values` to a byte stream.
pub fn write_slice_to<T, W>(values: &[T], writer: &mut W) -> Result<usize>
where
    T: Marshallable,
    W: io::Write + ?Sized,
{
    if let Some(view) = ByteView::of_slice(values) {
        return stream::write_fully(writer, view.as_slice());
    }
    let mut buf = vec![0u8; total_size::<T>(values.len())?];
    marshal_slice(values, &mut buf)?;
    stream::write_fully(writer, &buf)
}
