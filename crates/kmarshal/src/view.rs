// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Zero-copy byte views over packed values.
//!
//! A view borrows the value it exposes, so the value can neither move nor be
//! mutated through another path while the bytes are in use.

use crate::Marshallable;
use std::{mem, ptr, slice};

/// Shared view of the raw bytes of a packed value (or slice of them).
#[derive(Debug, Clone, Copy)]
pub struct ByteView<'a> {
    bytes: &'a [u8],
}

/// Mutable view of the raw bytes of a packed value (or slice of them).
#[derive(Debug)]
pub struct ByteViewMut<'a> {
    bytes: &'a mut [u8],
}

/// True when the in-memory image of `T` is exactly its wire image.
#[inline]
pub(crate) fn is_viewable<T: Marshallable>() -> bool {
    T::PACKED && mem::size_of::<T>() == T::SIZE
}

impl<'a> ByteView<'a> {
    /// View `value` as `T::SIZE` bytes, or `None` if `T` is not packed.
    pub fn of<T: Marshallable>(value: &'a T) -> Option<Self> {
        if !is_viewable::<T>() {
            return None;
        }
        // SAFETY: `value` is a live, aligned `T` borrowed for 'a, and
        // `is_viewable` guarantees `size_of::<T>() == T::SIZE` with no padding,
        // so all `T::SIZE` bytes are initialized.
        let bytes = unsafe { slice::from_raw_parts(ptr::from_ref(value).cast::<u8>(), T::SIZE) };
        Some(Self { bytes })
    }

    /// View a whole slice of packed values as one contiguous byte range.
    pub fn of_slice<T: Marshallable>(values: &'a [T]) -> Option<Self> {
        if !is_viewable::<T>() {
            return None;
        }
        let len = values.len().checked_mul(T::SIZE)?;
        // SAFETY: slice elements are contiguous with stride `size_of::<T>()`,
        // which equals `T::SIZE`, and every element is fully initialized.
        let bytes = unsafe { slice::from_raw_parts(values.as_ptr().cast::<u8>(), len) };
        Some(Self { bytes })
    }

    pub fn as_slice(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl<'a> ByteViewMut<'a> {
    /// Mutable view of `value`, or `None` if `T` is not packed.
    pub fn of<T: Marshallable>(value: &'a mut T) -> Option<Self> {
        if !is_viewable::<T>() {
            return None;
        }
        // SAFETY: as for `ByteView::of`; in addition every bit pattern of a
        // packed `Marshallable` is a valid value, so arbitrary writes through
        // the view cannot produce an invalid `T`.
        let bytes =
            unsafe { slice::from_raw_parts_mut(ptr::from_mut(value).cast::<u8>(), T::SIZE) };
        Some(Self { bytes })
    }

    pub fn of_slice<T: Marshallable>(values: &'a mut [T]) -> Option<Self> {
        if !is_viewable::<T>() {
            return None;
        }
        let len = values.len().checked_mul(T::SIZE)?;
        // SAFETY: see `ByteView::of_slice` and `ByteViewMut::of`.
        let bytes = unsafe { slice::from_raw_parts_mut(values.as_mut_ptr().cast::<u8>(), len) };
        Some(Self { bytes })
    }

    /// Overwrite the value with `src`, which must be exactly as long as the view.
    pub fn copy_from(&mut self, src: &[u8]) {
        self.bytes.copy_from_slice(src);
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut *self.bytes
    }

    pub fn as_slice(&self) -> &[u8] {
        &*self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
