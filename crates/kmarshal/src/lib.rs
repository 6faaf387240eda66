// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # kmarshal
//!
//! Binary marshalling for fixed-layout types.
//!
//! A type that derives [`Marshallable`] gets a constant wire size and
//! operations to encode itself into byte buffers, copy itself into or out of
//! a foreign [`AddressSpace`], and write itself to a byte stream.
//!
//! ## Wire format
//!
//! The concatenation of the fields in declaration order. Multi-byte scalars
//! are little-endian, single bytes are verbatim, and there is no header and
//! no padding.
//!
//! ## Packed types
//!
//! A type is *packed* when its memory image is exactly its wire image: every
//! field is packed and `#[repr(C)]` placed no padding between them. Packed
//! types take a bulk-copy path through a borrowed [`ByteView`]; that path
//! copies host-order memory, so it matches the portable encoding only on
//! little-endian hosts ([`codec::HOST_IS_WIRE_ORDER`]).
//!
//! ## Example
//!
//! ```rust
//! use kmarshal::{Addr, BufferSpace, Marshallable};
//!
//! #[derive(Marshallable, Clone, Copy, Default, Debug, PartialEq)]
//! #[repr(C)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! let p = Point { x: 1, y: 2 };
//! assert_eq!(p.size_bytes(), 8);
//! assert!(p.is_packed());
//!
//! let mut buf = [0u8; 8];
//! p.marshal_bytes(&mut buf).unwrap();
//! assert_eq!(buf, [1, 0, 0, 0, 2, 0, 0, 0]);
//!
//! let mut space = BufferSpace::new(Addr(0x1000), 8);
//! assert_eq!(p.copy_out(&mut space, Addr(0x1000)).unwrap(), 8);
//!
//! let mut q = Point::default();
//! q.copy_in(&space, Addr(0x1000)).unwrap();
//! assert_eq!(q, p);
//! ```

// Generated impls name `::kmarshal`, including inside this crate's tests.
extern crate self as kmarshal;

pub mod codec;
pub mod error;
pub mod marshal;
pub mod memory;
mod primitives;
pub mod slice;
pub mod stream;
pub mod view;

pub use error::{Error, Result};
pub use marshal::Marshallable;
pub use memory::{Addr, AddressSpace, BufferSpace, FaultKind, PagedMemory, Protection, Transfer};
pub use view::{ByteView, ByteViewMut};

/// Derive macro for [`Marshallable`](trait@Marshallable).
pub use kmarshal_codegen::Marshallable;

/// Common imports.
pub mod prelude {
    pub use crate::memory::{Addr, AddressSpace};
    pub use crate::slice::{copy_slice_in, copy_slice_out, marshal_slice, unmarshal_slice};
    pub use crate::{Error, Marshallable, Result};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Marshallable, Clone, Copy, Default, Debug, PartialEq)]
    #[repr(C)]
    struct Header {
        kind: u16,
        flags: u16,
        len: u32,
    }

    #[derive(Marshallable, Clone, Copy, Default, Debug, PartialEq)]
    #[repr(C)]
    struct Padded {
        tag: u8,
        value: u32,
    }

    #[test]
    fn test_derived_in_crate() {
        assert_eq!(Header::SIZE, 8);
        assert!(Header::default().is_packed());
        assert_eq!(Padded::SIZE, 5);
        assert!(!Padded::default().is_packed());

        let p = Padded { tag: 9, value: 0x0102_0304 };
        let mut buf = [0u8; 5];
        p.marshal_bytes(&mut buf).unwrap();
        assert_eq!(buf, [9, 4, 3, 2, 1]);
    }
}
