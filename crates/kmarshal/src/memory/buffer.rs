// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::{AddressSpace, Addr, FaultKind, Transfer};

/// One contiguous, fully accessible region starting at `base`.
///
/// Anything outside `[base, base + len)` is unmapped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferSpace {
    base: Addr,
    bytes: Vec<u8>,
}

impl BufferSpace {
    pub fn new(base: Addr, len: usize) -> Self {
        Self {
            base,
            bytes: vec![0; len],
        }
    }

    pub fn from_bytes(base: Addr, bytes: Vec<u8>) -> Self {
        Self { base, bytes }
    }

    pub fn base(&self) -> Addr {
        self.base
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Offset of `addr` in the region and the bytes available from there.
    fn window(&self, addr: Addr) -> Option<(usize, usize)> {
        let offset = usize::try_from(addr.0.checked_sub(self.base.0)?).ok()?;
        let available = self.bytes.len().checked_sub(offset)?;
        (available > 0).then_some((offset, available))
    }

    fn end(&self) -> Addr {
        self.base.checked_add(self.bytes.len()).unwrap_or(Addr(u64::MAX))
    }
}

impl AddressSpace for BufferSpace {
    fn read_bytes(&self, addr: Addr, dst: &mut [u8]) -> Transfer {
        if dst.is_empty() {
            return Transfer::complete(0);
        }
        let Some((offset, available)) = self.window(addr) else {
            return Transfer::faulted(0, addr, FaultKind::Unmapped);
        };
        let n = dst.len().min(available);
        dst[..n].copy_from_slice(&self.bytes[offset..offset + n]);
        if n < dst.len() {
            Transfer::faulted(n, self.end(), FaultKind::Unmapped)
        } else {
            Transfer::complete(n)
        }
    }

    fn write_bytes(&mut self, addr: Addr, src: &[u8]) -> Transfer {
        if src.is_empty() {
            return Transfer::complete(0);
        }
        let Some((offset, available)) = self.window(addr) else {
            return Transfer::faulted(0, addr, FaultKind::Unmapped);
        };
        let n = src.len().min(available);
        self.bytes[offset..offset + n].copy_from_slice(&src[..n]);
        if n < src.len() {
            Transfer::faulted(n, self.end(), FaultKind::Unmapped)
        } else {
            Transfer::complete(n)
        }
    }
}
