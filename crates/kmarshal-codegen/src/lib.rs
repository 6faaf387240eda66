// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

extern crate proc_macro;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// `#[derive(Marshallable)]`: emits `unsafe impl kmarshal::Marshallable`.
///
/// Requirements:
/// - a non-generic struct, `#[repr(C)]` (or `#[repr(transparent)]` with a
///   single field); `repr(packed)` is rejected
/// - fields of fixed-width scalar types (`u8`..`i64`, `f32`, `f64`), fixed
///   arrays of them, or types that implement `Marshallable` themselves
///
/// Ambiguous-width (`usize`, `isize`), dynamically sized (`String`, `Vec<T>`,
/// slices) and invalid-bit-pattern (`bool`, `char`) fields are compile errors.
///
/// Example:
/// ```ignore
/// use kmarshal::Marshallable;
///
/// #[derive(Marshallable, Clone, Copy, Default)]
/// #[repr(C)]
/// struct Timespec {
///     sec: i64,
///     nsec: i64,
/// }
/// ```
#[proc_macro_derive(Marshallable)]
pub fn derive_marshallable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match kmarshal_gen::derive::expand_derive(&input) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(err) => err.to_compile_error().into(),
    }
}
