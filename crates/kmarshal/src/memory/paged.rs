// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Simulated paged address space with per-page protection.

use super::{AddressSpace, Addr, FaultKind, Transfer};
use std::collections::BTreeMap;

/// Page granularity of [`PagedMemory`].
pub const PAGE_SIZE: usize = 4096;

const PAGE_SIZE_U64: u64 = PAGE_SIZE as u64;

/// Access rights of a mapped page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Protection {
    pub read: bool,
    pub write: bool,
}

impl Protection {
    pub const READ_WRITE: Protection = Protection {
        read: true,
        write: true,
    };
    pub const READ_ONLY: Protection = Protection {
        read: true,
        write: false,
    };
    pub const NONE: Protection = Protection {
        read: false,
        write: false,
    };
}

#[derive(Debug, Clone)]
struct Page {
    data: Box<[u8]>,
    prot: Protection,
}

/// Sparse address space made of 4 KiB pages.
///
/// Copies proceed page by page and stop at the first page that is unmapped
/// or lacks the needed right, so a transfer can complete partially.
#[derive(Debug, Clone, Default)]
pub struct PagedMemory {
    pages: BTreeMap<u64, Page>,
}

/// Page numbers covering `[addr, addr + len)`.
fn page_span(addr: Addr, len: usize) -> std::ops::RangeInclusive<u64> {
    let first = addr.0 / PAGE_SIZE_U64;
    let last_byte = addr
        .checked_add(len.saturating_sub(1))
        .unwrap_or(Addr(u64::MAX));
    first..=last_byte.0 / PAGE_SIZE_U64
}

impl PagedMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map zeroed pages over `[addr, addr + len)`. Already mapped pages keep
    /// their contents and take the new protection.
    pub fn map(&mut self, addr: Addr, len: usize, prot: Protection) {
        if len == 0 {
            return;
        }
        for page_no in page_span(addr, len) {
            self.pages
                .entry(page_no)
                .and_modify(|page| page.prot = prot)
                .or_insert_with(|| Page {
                    data: vec![0; PAGE_SIZE].into_boxed_slice(),
                    prot,
                });
        }
        log::debug!("[kmarshal] mapped {} bytes at {} ({:?})", len, addr, prot);
    }

    pub fn unmap(&mut self, addr: Addr, len: usize) {
        if len == 0 {
            return;
        }
        for page_no in page_span(addr, len) {
            self.pages.remove(&page_no);
        }
    }

    /// Change the protection of mapped pages in range; unmapped pages are skipped.
    pub fn protect(&mut self, addr: Addr, len: usize, prot: Protection) {
        if len == 0 {
            return;
        }
        for page_no in page_span(addr, len) {
            if let Some(page) = self.pages.get_mut(&page_no) {
                page.prot = prot;
            }
        }
    }

    pub fn is_mapped(&self, addr: Addr) -> bool {
        self.pages.contains_key(&(addr.0 / PAGE_SIZE_U64))
    }

    pub fn mapped_pages(&self) -> usize {
        self.pages.len()
    }
}

/// Next chunk of a copy: the current address, its page number, the offset in
/// that page and the chunk length.
fn next_chunk(addr: Addr, done: usize, len: usize) -> Result<(Addr, u64, usize, usize), Transfer> {
    let Some(cur) = addr.checked_add(done) else {
        return Err(Transfer::faulted(done, Addr(u64::MAX), FaultKind::Overflow));
    };
    let in_page = (cur.0 % PAGE_SIZE_U64) as usize;
    let n = (PAGE_SIZE - in_page).min(len - done);
    Ok((cur, cur.0 / PAGE_SIZE_U64, in_page, n))
}

fn unmapped(cur: Addr, done: usize) -> Transfer {
    log::debug!("[kmarshal] fault at {}: unmapped after {} bytes", cur, done);
    Transfer::faulted(done, cur, FaultKind::Unmapped)
}

impl AddressSpace for PagedMemory {
    fn read_bytes(&self, addr: Addr, dst: &mut [u8]) -> Transfer {
        let len = dst.len();
        let mut done = 0;
        while done < len {
            let (cur, page_no, in_page, n) = match next_chunk(addr, done, len) {
                Ok(chunk) => chunk,
                Err(fault) => return fault,
            };
            let Some(page) = self.pages.get(&page_no) else {
                return unmapped(cur, done);
            };
            if !page.prot.read {
                return Transfer::faulted(done, cur, FaultKind::NotReadable);
            }
            dst[done..done + n].copy_from_slice(&page.data[in_page..in_page + n]);
            done += n;
        }
        Transfer::complete(done)
    }

    fn write_bytes(&mut self, addr: Addr, src: &[u8]) -> Transfer {
        let len = src.len();
        let mut done = 0;
        while done < len {
            let (cur, page_no, in_page, n) = match next_chunk(addr, done, len) {
                Ok(chunk) => chunk,
                Err(fault) => return fault,
            };
            let Some(page) = self.pages.get_mut(&page_no) else {
                return unmapped(cur, done);
            };
            if !page.prot.write {
                return Transfer::faulted(done, cur, FaultKind::ReadOnly);
            }
            page.data[in_page..in_page + n].copy_from_slice(&src[done..done + n]);
            done += n;
        }
        Transfer::complete(done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_across_page_boundary() {
        let mut mem = PagedMemory::new();
        mem.map(Addr(0x1000), 2 * PAGE_SIZE, Protection::READ_WRITE);
        assert_eq!(mem.mapped_pages(), 2);

        let src: Vec<u8> = (0..16).collect();
        let at = Addr(0x2000 - 8);
        assert_eq!(mem.write_bytes(at, &src), Transfer::complete(16));
        let mut out = [0u8; 16];
        assert_eq!(mem.read_bytes(at, &mut out), Transfer::complete(16));
        assert_eq!(&out[..], &src[..]);
    }

    #[test]
    fn test_unmapped_page_stops_transfer() {
        let mut mem = PagedMemory::new();
        mem.map(Addr(0x1000), PAGE_SIZE, Protection::READ_WRITE);
        let transfer = mem.write_bytes(Addr(0x2000 - 4), &[1; 8]);
        assert_eq!(transfer, Transfer::faulted(4, Addr(0x2000), FaultKind::Unmapped));
    }

    #[test]
    fn test_read_only_page_rejects_writes() {
        let mut mem = PagedMemory::new();
        mem.map(Addr(0), 2 * PAGE_SIZE, Protection::READ_WRITE);
        mem.protect(Addr(0x1000), PAGE_SIZE, Protection::READ_ONLY);
        let transfer = mem.write_bytes(Addr(0x0ffe), &[7; 4]);
        assert_eq!(transfer, Transfer::faulted(2, Addr(0x1000), FaultKind::ReadOnly));

        let mut out = [0u8; 4];
        assert_eq!(mem.read_bytes(Addr(0x0ffe), &mut out), Transfer::complete(4));
        assert_eq!(out, [7, 7, 0, 0]);
    }

    #[test]
    fn test_unreadable_page() {
        let mut mem = PagedMemory::new();
        mem.map(Addr(0), PAGE_SIZE, Protection::NONE);
        let mut out = [0u8; 1];
        let transfer = mem.read_bytes(Addr(0x10), &mut out);
        assert_eq!(transfer.fault.map(|f| f.kind), Some(FaultKind::NotReadable));
    }

    #[test]
    fn test_unmap() {
        let mut mem = PagedMemory::new();
        mem.map(Addr(0), 3 * PAGE_SIZE, Protection::READ_WRITE);
        mem.unmap(Addr(0x1000), 1);
        assert!(mem.is_mapped(Addr(0)));
        assert!(!mem.is_mapped(Addr(0x1000)));
        assert!(mem.is_mapped(Addr(0x2000)));
    }
}
