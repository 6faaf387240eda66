// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Foreign address spaces.
//!
//! An [`AddressSpace`] is memory owned by another process (or another
//! protection domain) that can only be reached through bounded copies. A copy
//! can stop part-way; the returned [`Transfer`] says how many bytes moved and
//! why it stopped.

mod buffer;
mod paged;

pub use buffer::BufferSpace;
pub use paged::{PagedMemory, Protection, PAGE_SIZE};

use crate::{Error, Result};
use std::fmt;

/// Address in a foreign address space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Addr(pub u64);

impl Addr {
    pub fn checked_add(self, offset: usize) -> Option<Addr> {
        let offset = u64::try_from(offset).ok()?;
        self.0.checked_add(offset).map(Addr)
    }
}

impl fmt::Display for Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Why a foreign access stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultKind {
    /// No memory mapped at the address.
    Unmapped,
    /// Mapped, but not readable.
    NotReadable,
    /// Mapped, but not writable.
    ReadOnly,
    /// Range wraps past the end of the address space.
    Overflow,
    /// The space moved fewer bytes than asked without naming a fault.
    ShortTransfer,
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FaultKind::Unmapped => "unmapped page",
            FaultKind::NotReadable => "page not readable",
            FaultKind::ReadOnly => "page read-only",
            FaultKind::Overflow => "address overflow",
            FaultKind::ShortTransfer => "short transfer",
        };
        f.write_str(text)
    }
}

/// Where and why a transfer stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fault {
    pub addr: Addr,
    pub kind: FaultKind,
}

/// Outcome of one copy to or from a foreign address space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    /// Bytes moved, always a prefix of the requested range.
    pub count: usize,
    pub fault: Option<Fault>,
}

impl Transfer {
    pub fn complete(count: usize) -> Self {
        Self { count, fault: None }
    }

    pub fn faulted(count: usize, addr: Addr, kind: FaultKind) -> Self {
        Self {
            count,
            fault: Some(Fault { addr, kind }),
        }
    }

    /// Turn a transfer of `requested` bytes starting at `start` into a result.
    ///
    /// A short count without a fault is still an error, reported at the first
    /// byte that did not move.
    pub fn finish(self, start: Addr, requested: usize) -> Result<usize> {
        match self.fault {
            Some(fault) => Err(Error::Fault {
                transferred: self.count,
                addr: fault.addr,
                kind: fault.kind,
            }),
            None if self.count < requested => Err(Error::Fault {
                transferred: self.count,
                addr: start.checked_add(self.count).unwrap_or(start),
                kind: FaultKind::ShortTransfer,
            }),
            None => Ok(self.count),
        }
    }
}

/// Memory reachable only through bounded copies.
///
/// Implementations copy the longest prefix they can and report the first
/// fault; they never move bytes past a fault.
pub trait AddressSpace {
    /// Copy from `addr` into `dst`.
    fn read_bytes(&self, addr: Addr, dst: &mut [u8]) -> Transfer;

    /// Copy `src` to `addr`.
    fn write_bytes(&mut self, addr: Addr, src: &[u8]) -> Transfer;
}

impl<S: AddressSpace + ?Sized> AddressSpace for &mut S {
    fn read_bytes(&self, addr: Addr, dst: &mut [u8]) -> Transfer {
        (**self).read_bytes(addr, dst)
    }

    fn write_bytes(&mut self, addr: Addr, src: &[u8]) -> Transfer {
        (**self).write_bytes(addr, src)
    }
}

/// Read exactly `dst.len()` bytes, or fail with the partial count.
pub fn read_exact<S: AddressSpace + ?Sized>(space: &S, addr: Addr, dst: &mut [u8]) -> Result<usize> {
    let len = dst.len();
    let transfer = space.read_bytes(addr, dst);
    log::trace!("[kmarshal] read {} of {} bytes at {}", transfer.count, len, addr);
    transfer.finish(addr, len)
}

/// Write all of `src`, or fail with the partial count.
pub fn write_all<S: AddressSpace + ?Sized>(space: &mut S, addr: Addr, src: &[u8]) -> Result<usize> {
    let transfer = space.write_bytes(addr, src);
    log::trace!(
        "[kmarshal] wrote {} of {} bytes at {}",
        transfer.count,
        src.len(),
        addr
    );
    transfer.finish(addr, src.len())
}
