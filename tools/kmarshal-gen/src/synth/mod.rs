// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Operation synthesis.
//!
//! Turns a descriptor and its layout verdict into an `unsafe impl
//! Marshallable`. The impl only carries the layout constants and the
//! field-by-field encode/decode bodies; every other operation (zero-copy
//! views, foreign address space copies, stream writes) is a provided method of
//! the trait and picks the packed or non-packed path from `PACKED`.

mod context;
mod definition;
mod emit;

pub use context::SynthContext;
pub use definition::emit_definition;

use crate::descriptor::{TypeDescriptor, TypeKind};
use crate::error::Diagnostic;
use crate::layout::LayoutVerdict;
use emit::{decode_stmt, encode_stmt, invalid, member_place, named_type, packed_tokens, size_tokens};
use proc_macro2::{Ident, Span, TokenStream};
use quote::{quote, ToTokens};

/// Knobs for emitted code.
#[derive(Debug, Clone)]
pub struct SynthOptions {
    /// Path of the run-time crate in emitted code.
    pub crate_path: syn::Path,
    /// Attach doc comments describing the layout to each impl.
    pub emit_docs: bool,
}

impl Default for SynthOptions {
    fn default() -> Self {
        Self {
            crate_path: syn::parse_quote!(::kmarshal),
            emit_docs: true,
        }
    }
}

/// Output of one synthesis call.
#[derive(Debug, Clone)]
pub struct Synthesized {
    pub tokens: TokenStream,
    pub context: SynthContext,
}

/// Emit the `Marshallable` impl for `desc`.
pub fn synthesize(
    desc: &TypeDescriptor,
    verdict: &LayoutVerdict,
    options: &SynthOptions,
    mut context: SynthContext,
) -> Result<Synthesized, Diagnostic> {
    let owner = desc.name.as_str();
    if let TypeKind::Scalar(kind) = desc.kind {
        return Err(invalid(
            owner,
            format!("'{kind}' is a built-in scalar and already implements the trait"),
        ));
    }
    let krate = &options.crate_path;
    context.record_import(krate.to_token_stream().to_string().replace(' ', ""));

    let ty = named_type(owner, owner)?;
    let size = size_tokens(krate, owner, &verdict.size)?;
    let packed = packed_tokens(krate, owner, verdict.packed, &verdict.fields)?;

    let mut encode = Vec::with_capacity(verdict.fields.len());
    let mut decode = Vec::with_capacity(verdict.fields.len());
    for field in &verdict.fields {
        let place = member_place(owner, &field.name)?;
        encode.push(encode_stmt(krate, &field.ty, &place, 0));
        decode.push(decode_stmt(krate, &field.ty, &place, 0));
        if let Some(name) = field.ty.referenced_name() {
            context.record_marshallable(name);
        }
    }
    for field in verdict.offending_fields.iter().chain(&verdict.conditional_fields) {
        context.record_non_packed_field(owner, field);
    }

    let cursor = if verdict.fields.is_empty() {
        Ident::new("_cursor", Span::call_site())
    } else {
        Ident::new("cursor", Span::call_site())
    };

    let layout_check = if desc.is_composite() {
        quote! {
            const _: () = assert!(
                ::core::mem::size_of::<#ty>() >= <#ty as #krate::Marshallable>::SIZE,
                "in-memory size is smaller than the wire size"
            );
        }
    } else {
        quote!()
    };

    let doc = if options.emit_docs {
        let mut text = format!(
            " Wire size: {} bytes. Statically packed: {}.",
            verdict.size, verdict.packed
        );
        if !verdict.offending_fields.is_empty() {
            let fields: Vec<&str> = verdict.offending_fields.iter().map(String::as_str).collect();
            text.push_str(&format!(" Non-packed fields: {}.", fields.join(", ")));
        }
        if !verdict.is_unconditionally_packed() && verdict.packed {
            let deps: Vec<&str> = verdict.packed_if().collect();
            text.push_str(&format!(" Packed only if {} are.", deps.join(", ")));
        }
        text.push_str(" Portable encoding is little-endian; the packed path copies host-order memory.");
        quote!(#[doc = #text])
    } else {
        quote!()
    };

    let tokens = quote! {
        #doc
        #[automatically_derived]
        // SAFETY: every field is itself `Marshallable` (fixed-width scalars,
        // arrays of them, or types implementing the trait), so every byte
        // pattern of `SIZE` bytes is a valid value whenever `PACKED` holds.
        unsafe impl #krate::Marshallable for #ty {
            const SIZE: usize = #size;
            const PACKED: bool = #packed;

            fn encode(&self, #cursor: &mut #krate::codec::CursorMut<'_>) -> #krate::Result<()> {
                #(#encode)*
                Ok(())
            }

            fn decode(&mut self, #cursor: &mut #krate::codec::Cursor<'_>) -> #krate::Result<()> {
                #(#decode)*
                Ok(())
            }
        }

        #layout_check
    };

    tracing::debug!(
        "synthesized Marshallable for '{}' ({} fields, packed {})",
        owner,
        verdict.fields.len(),
        verdict.packed
    );

    Ok(Synthesized { tokens, context })
}
