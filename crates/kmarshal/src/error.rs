// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Run-time errors.

use crate::memory::{Addr, FaultKind};
use std::io;

/// Errors returned by marshalling operations.
///
/// Operations that can stop part-way (foreign address space copies, stream
/// writes) report how far they got; see [`Error::transferred`].
#[derive(Debug)]
pub enum Error {
    /// Destination or source buffer is shorter than the encoding.
    BufferTooSmall { need: usize, have: usize },
    /// Encoding of `count` elements of `element_size` bytes overflows `usize`.
    SizeOverflow { count: usize, element_size: usize },
    /// Foreign address space access stopped at `addr` after `transferred` bytes.
    Fault {
        transferred: usize,
        addr: Addr,
        kind: FaultKind,
    },
    /// Output stream failed after `written` bytes.
    Io { written: usize, source: io::Error },
}

impl Error {
    /// Bytes moved before the failure.
    pub fn transferred(&self) -> usize {
        match self {
            Error::BufferTooSmall { .. } | Error::SizeOverflow { .. } => 0,
            Error::Fault { transferred, .. } => *transferred,
            Error::Io { written, .. } => *written,
        }
    }

    pub fn is_fault(&self) -> bool {
        matches!(self, Error::Fault { .. })
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::BufferTooSmall { need, have } => {
                write!(f, "Buffer too small: need {} bytes, have {}", need, have)
            }
            Error::SizeOverflow {
                count,
                element_size,
            } => write!(
                f,
                "Size overflow: {} elements of {} bytes",
                count, element_size
            ),
            Error::Fault {
                transferred,
                addr,
                kind,
            } => write!(
                f,
                "Fault at {} ({}) after {} bytes",
                addr, kind, transferred
            ),
            Error::Io { written, source } => {
                write!(f, "I/O error after {} bytes: {}", written, source)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result alias for marshalling operations.
pub type Result<T> = core::result::Result<T, Error>;
