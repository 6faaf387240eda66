// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type definitions for batch generation.
//!
//! Composites become `#[repr(C)]` structs; newtypes and named arrays become
//! `#[repr(transparent)]` wrappers. The marshalling impl is emitted
//! separately.

use super::emit::{field_type_tokens, invalid};
use crate::descriptor::{FieldType, TypeDescriptor, TypeKind};
use crate::error::Diagnostic;
use proc_macro2::TokenStream;
use quote::quote;

/// Emit the Rust definition of `desc` with the given derives.
pub fn emit_definition(
    desc: &TypeDescriptor,
    derives: &[syn::Path],
    emit_docs: bool,
) -> Result<TokenStream, Diagnostic> {
    let owner = desc.name.as_str();
    let last = owner.rsplit("::").next().unwrap_or(owner);
    let ident: syn::Ident = syn::parse_str(last)
        .map_err(|_| invalid(owner, format!("'{last}' is not a valid identifier")))?;

    let derive = if derives.is_empty() {
        quote!()
    } else {
        quote!(#[derive(#(#derives),*)])
    };
    let doc = if emit_docs {
        let text = format!(" Wire layout of `{owner}`.");
        quote!(#[doc = #text])
    } else {
        quote!()
    };

    let tokens = match &desc.kind {
        TypeKind::Scalar(_) => {
            return Err(invalid(owner, "built-in scalars have no definition"));
        }
        TypeKind::Newtype { base } => {
            let base = field_type_tokens(owner, &FieldType::Scalar(*base))?;
            quote! {
                #doc
                #derive
                #[repr(transparent)]
                pub struct #ident(pub #base);
            }
        }
        TypeKind::FixedArray { element, length } => {
            let array = field_type_tokens(owner, &FieldType::array(element.clone(), *length))?;
            quote! {
                #doc
                #derive
                #[repr(transparent)]
                pub struct #ident(pub #array);
            }
        }
        TypeKind::Composite { fields } => {
            let types = fields
                .iter()
                .map(|f| field_type_tokens(owner, &f.ty))
                .collect::<Result<Vec<_>, _>>()?;
            if !fields.is_empty() && fields.iter().all(|f| f.is_positional()) {
                quote! {
                    #doc
                    #derive
                    #[repr(C)]
                    pub struct #ident(#(pub #types),*);
                }
            } else {
                let names = fields
                    .iter()
                    .map(|f| {
                        syn::parse_str::<syn::Ident>(&f.name).map_err(|_| {
                            invalid(owner, format!("'{}' is not a valid field name", f.name))
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                quote! {
                    #doc
                    #derive
                    #[repr(C)]
                    pub struct #ident {
                        #(pub #names: #types,)*
                    }
                }
            }
        }
    };
    Ok(tokens)
}
