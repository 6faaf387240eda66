// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Types emitted by the batch generator from `abi.toml`, compiled as-is.

include!(concat!(env!("OUT_DIR"), "/abi.rs"));
