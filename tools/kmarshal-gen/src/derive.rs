// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Expansion of `#[derive(Marshallable)]`.
//!
//! Runs the same validator, layout analyzer and synthesizer as the batch
//! generator, on a registry holding only the derived type. Named field types
//! are resolved open-world: each must implement `Marshallable` itself, and
//! the derived `PACKED` folds in theirs.

use crate::declared::{DeclBody, DeclaredType, FieldDecl, TypeDecl};
use crate::descriptor::FieldType;
use crate::layout::{LayoutAnalyzer, Resolution};
use crate::registry::TypeRegistry;
use crate::synth::{synthesize, SynthContext, SynthOptions};
use crate::validate::validate_field_type;
use proc_macro2::TokenStream;
use syn::{Data, DeriveInput, Fields};

#[derive(Debug, Default)]
struct Repr {
    c: bool,
    transparent: bool,
}

fn parse_repr(input: &DeriveInput) -> syn::Result<Repr> {
    let mut repr = Repr::default();
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("repr")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("C") {
                repr.c = true;
            } else if meta.path.is_ident("transparent") {
                repr.transparent = true;
            } else if meta.path.is_ident("packed") {
                return Err(meta.error(
                    "repr(packed) is not supported: fields would be unaligned, use repr(C)",
                ));
            } else if meta.input.peek(syn::token::Paren) {
                // align(N) and friends only add trailing padding.
                let content;
                syn::parenthesized!(content in meta.input);
                let _: TokenStream = content.parse()?;
            }
            Ok(())
        })?;
    }
    Ok(repr)
}

/// Expand the derive for one type.
pub fn expand_derive(input: &DeriveInput) -> syn::Result<TokenStream> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Marshallable cannot be derived for generic types",
        ));
    }
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "Marshallable can only be derived for structs",
        ));
    };
    let repr = parse_repr(input)?;
    let name = input.ident.to_string();

    let fields: Vec<(String, &syn::Field)> = match &data.fields {
        Fields::Named(named) => named
            .named
            .iter()
            .filter_map(|f| f.ident.as_ref().map(|id| (id.to_string(), f)))
            .collect(),
        Fields::Unnamed(unnamed) => unnamed
            .unnamed
            .iter()
            .enumerate()
            .map(|(i, f)| (i.to_string(), f))
            .collect(),
        Fields::Unit => Vec::new(),
    };

    let mut decls = Vec::with_capacity(fields.len());
    for (field_name, field) in &fields {
        let declared = DeclaredType::from_syn(&field.ty);
        if let Err(kind) = validate_field_type(&declared) {
            return Err(syn::Error::new_spanned(
                &field.ty,
                format!("{name}.{field_name}: {kind}"),
            ));
        }
        decls.push(FieldDecl::new(field_name.clone(), declared));
    }

    let single_positional = matches!(data.fields, Fields::Unnamed(_)) && decls.len() == 1;
    let body = if single_positional {
        let ty = decls[0].ty.clone();
        match validate_field_type(&ty) {
            Ok(FieldType::Scalar(_)) => DeclBody::Newtype(ty),
            Ok(FieldType::Array { .. }) => DeclBody::Array(ty),
            _ => DeclBody::Struct(decls),
        }
    } else {
        DeclBody::Struct(decls)
    };

    let layout_ok = repr.c || (repr.transparent && fields.len() == 1);
    if !layout_ok {
        let msg = if fields.len() == 1 {
            "Marshallable requires #[repr(C)] or #[repr(transparent)]"
        } else {
            "Marshallable requires #[repr(C)]"
        };
        return Err(syn::Error::new_spanned(&input.ident, msg));
    }

    let decl = TypeDecl::new(&name, body);
    let mut registry = TypeRegistry::new();
    registry
        .declare(&decl)
        .map_err(|diag| syn::Error::new_spanned(&input.ident, diag.to_string()))?;

    let mut analyzer = LayoutAnalyzer::new(&registry, Resolution::OpenWorld);
    let verdict = analyzer
        .analyze(&name)
        .map_err(|diag| syn::Error::new_spanned(&input.ident, diag.to_string()))?;
    let desc = registry
        .resolve(&name)
        .ok_or_else(|| syn::Error::new_spanned(&input.ident, "type vanished from registry"))?;

    let options = SynthOptions {
        emit_docs: false,
        ..SynthOptions::default()
    };
    let synthesized = synthesize(desc, &verdict, &options, SynthContext::new())
        .map_err(|diag| syn::Error::new_spanned(&input.ident, diag.to_string()))?;
    Ok(synthesized.tokens)
}
