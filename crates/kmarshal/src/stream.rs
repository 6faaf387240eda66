// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Writes to output byte streams.

use crate::{Error, Result};
use std::io;

/// Write all of `bytes`, retrying interrupted writes.
///
/// On failure the error carries how many bytes the sink accepted.
pub fn write_fully<W: io::Write + ?Sized>(writer: &mut W, bytes: &[u8]) -> Result<usize> {
    let mut written = 0;
    while written < bytes.len() {
        match writer.write(&bytes[written..]) {
            Ok(0) => {
                return Err(Error::Io {
                    written,
                    source: io::Error::new(io::ErrorKind::WriteZero, "sink accepted no bytes"),
                })
            }
            Ok(n) => written += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(source) => {
                log::debug!("[kmarshal] stream write failed after {} bytes: {}", written, source);
                return Err(Error::Io { written, source });
            }
        }
    }
    Ok(written)
}
