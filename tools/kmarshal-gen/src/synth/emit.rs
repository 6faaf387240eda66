// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Token emission for the pieces of a `Marshallable` impl.

use crate::descriptor::{FieldType, ScalarKind};
use crate::error::{Diagnostic, DiagnosticKind};
use crate::layout::{FieldLayout, SizeExpr};
use proc_macro2::{Ident, Literal, Span, TokenStream};
use quote::{format_ident, quote};

pub(crate) fn invalid(type_name: &str, reason: impl Into<String>) -> Diagnostic {
    Diagnostic::new(
        type_name,
        DiagnosticKind::UnsupportedLayout {
            reason: reason.into(),
        },
    )
}

/// Rust type tokens for a field type.
pub(crate) fn field_type_tokens(owner: &str, ty: &FieldType) -> Result<TokenStream, Diagnostic> {
    match ty {
        FieldType::Scalar(kind) => {
            let ident = Ident::new(kind.rust_name(), Span::call_site());
            Ok(quote!(#ident))
        }
        FieldType::Array { element, length } => {
            let element = field_type_tokens(owner, element)?;
            let length = Literal::usize_unsuffixed(*length);
            Ok(quote!([#element; #length]))
        }
        FieldType::Named(name) => named_type(owner, name),
    }
}

pub(crate) fn named_type(owner: &str, name: &str) -> Result<TokenStream, Diagnostic> {
    let ty: syn::Type = syn::parse_str(name)
        .map_err(|e| invalid(owner, format!("'{name}' is not a type path: {e}")))?;
    Ok(quote!(#ty))
}

/// `self.<member>` for a field name, numeric names becoming tuple indices.
pub(crate) fn member_place(owner: &str, name: &str) -> Result<Place, Diagnostic> {
    let member = member(owner, name)?;
    Ok(Place::Field(quote!(self.#member)))
}

pub(crate) fn member(owner: &str, name: &str) -> Result<syn::Member, Diagnostic> {
    syn::parse_str(name).map_err(|_| invalid(owner, format!("'{name}' is not a valid field name")))
}

fn scalar_codec(kind: ScalarKind) -> (Ident, Ident) {
    let (write, read) = match kind {
        ScalarKind::U8 => ("write_u8", "read_u8"),
        ScalarKind::I8 => ("write_i8", "read_i8"),
        ScalarKind::U16 => ("write_u16_le", "read_u16_le"),
        ScalarKind::I16 => ("write_i16_le", "read_i16_le"),
        ScalarKind::U32 => ("write_u32_le", "read_u32_le"),
        ScalarKind::I32 => ("write_i32_le", "read_i32_le"),
        ScalarKind::U64 => ("write_u64_le", "read_u64_le"),
        ScalarKind::I64 => ("write_i64_le", "read_i64_le"),
        ScalarKind::F32 => ("write_f32_le", "read_f32_le"),
        ScalarKind::F64 => ("write_f64_le", "read_f64_le"),
    };
    (
        Ident::new(write, Span::call_site()),
        Ident::new(read, Span::call_site()),
    )
}

/// Where a field value lives in emitted code.
#[derive(Debug, Clone)]
pub(crate) enum Place {
    /// `self.<member>`.
    Field(TokenStream),
    /// Loop binding holding a reference to an array element.
    Elem(Ident),
}

impl Place {
    fn value(&self) -> TokenStream {
        match self {
            Self::Field(place) => place.clone(),
            Self::Elem(elem) => quote!(*#elem),
        }
    }

    fn receiver(&self) -> TokenStream {
        match self {
            Self::Field(place) => place.clone(),
            Self::Elem(elem) => quote!(#elem),
        }
    }

    fn borrowed(&self) -> TokenStream {
        match self {
            Self::Field(place) => quote!(&#place),
            Self::Elem(elem) => quote!(#elem),
        }
    }

    fn borrowed_mut(&self) -> TokenStream {
        match self {
            Self::Field(place) => quote!(&mut #place),
            Self::Elem(elem) => quote!(#elem),
        }
    }
}

fn is_byte_array(ty: &FieldType) -> bool {
    matches!(ty, FieldType::Array { element, .. } if **element == FieldType::Scalar(ScalarKind::U8))
}

/// Statements encoding `place` (of type `ty`) into `cursor`.
pub(crate) fn encode_stmt(krate: &syn::Path, ty: &FieldType, place: &Place, depth: usize) -> TokenStream {
    match ty {
        FieldType::Scalar(kind) => {
            let (write, _) = scalar_codec(*kind);
            let value = place.value();
            quote! { cursor.#write(#value)?; }
        }
        FieldType::Array { .. } if is_byte_array(ty) => {
            let bytes = place.borrowed();
            quote! { cursor.write_bytes(#bytes)?; }
        }
        FieldType::Array { element, .. } => {
            let elem = format_ident!("e{}", depth);
            let receiver = place.receiver();
            let inner = encode_stmt(krate, element, &Place::Elem(elem.clone()), depth + 1);
            quote! {
                for #elem in #receiver.iter() {
                    #inner
                }
            }
        }
        FieldType::Named(_) => {
            let borrowed = place.borrowed();
            quote! { #krate::Marshallable::encode(#borrowed, cursor)?; }
        }
    }
}

/// Statements decoding from `cursor` into `place`.
pub(crate) fn decode_stmt(krate: &syn::Path, ty: &FieldType, place: &Place, depth: usize) -> TokenStream {
    match ty {
        FieldType::Scalar(kind) => {
            let (_, read) = scalar_codec(*kind);
            let value = place.value();
            quote! { #value = cursor.#read()?; }
        }
        FieldType::Array { length, .. } if is_byte_array(ty) => {
            let receiver = place.receiver();
            let length = Literal::usize_unsuffixed(*length);
            quote! { #receiver.copy_from_slice(cursor.read_bytes(#length)?); }
        }
        FieldType::Array { element, .. } => {
            let elem = format_ident!("e{}", depth);
            let receiver = place.receiver();
            let inner = decode_stmt(krate, element, &Place::Elem(elem.clone()), depth + 1);
            quote! {
                for #elem in #receiver.iter_mut() {
                    #inner
                }
            }
        }
        FieldType::Named(_) => {
            let borrowed = place.borrowed_mut();
            quote! { #krate::Marshallable::decode(#borrowed, cursor)?; }
        }
    }
}

/// Constant expression for a size.
pub(crate) fn size_tokens(
    krate: &syn::Path,
    owner: &str,
    size: &SizeExpr,
) -> Result<TokenStream, Diagnostic> {
    let mut terms = Vec::new();
    if size.constant != 0 || size.external.is_empty() {
        let constant = Literal::usize_unsuffixed(size.constant);
        terms.push(quote!(#constant));
    }
    for (name, mult) in &size.external {
        let ty = named_type(owner, name)?;
        let term = quote!(<#ty as #krate::Marshallable>::SIZE);
        if *mult == 1 {
            terms.push(term);
        } else {
            let mult = Literal::usize_unsuffixed(*mult);
            terms.push(quote!(#mult * #term));
        }
    }
    Ok(quote!(#(#terms)+*))
}

/// Constant expression for `PACKED`.
///
/// A statically packed verdict still has to be confirmed against the layout
/// the compiler actually chose for the type, and against the `PACKED` of
/// every named type it contains.
pub(crate) fn packed_tokens(
    krate: &syn::Path,
    owner: &str,
    static_packed: bool,
    fields: &[FieldLayout],
) -> Result<TokenStream, Diagnostic> {
    if !static_packed {
        return Ok(quote!(false));
    }
    let mut checks = vec![quote!(
        ::core::mem::size_of::<Self>() == <Self as #krate::Marshallable>::SIZE
    )];
    for field in fields {
        let member = member(owner, &field.name)?;
        let offset = size_tokens(krate, owner, &field.offset)?;
        checks.push(quote!(::core::mem::offset_of!(Self, #member) == #offset));
        if let Some(name) = field.ty.referenced_name() {
            let ty = named_type(owner, name)?;
            checks.push(quote!(<#ty as #krate::Marshallable>::PACKED));
        }
    }
    Ok(quote!(#(#checks)&&*))
}
