// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Raw declarations, as written in source and before validation.

use crate::error::SourceLocation;
use quote::ToTokens;
use syn::{Expr, Lit, PathArguments, Type};

/// A field type exactly as declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclaredType {
    /// Path without generic arguments, segments joined with `::`.
    Path(String),
    /// Path carrying generic arguments (`Vec<u8>`, `Box<[u8]>`).
    Generic { path: String, rendered: String },
    Array {
        element: Box<DeclaredType>,
        length: usize,
    },
    /// Unsized slice `[T]`.
    Slice(Box<DeclaredType>),
    /// Anything else (references, pointers, tuples, symbolic array lengths).
    Unsupported(String),
}

impl DeclaredType {
    /// Parse Rust type syntax, e.g. `"[u8; 16]"` or `"abi::Timespec"`.
    pub fn parse(src: &str) -> syn::Result<Self> {
        let ty: Type = syn::parse_str(src)?;
        Ok(Self::from_syn(&ty))
    }

    pub fn from_syn(ty: &Type) -> Self {
        match ty {
            Type::Path(type_path) if type_path.qself.is_none() => {
                let path = &type_path.path;
                let joined = path
                    .segments
                    .iter()
                    .map(|s| s.ident.to_string())
                    .collect::<Vec<_>>()
                    .join("::");
                let joined = if path.leading_colon.is_some() {
                    format!("::{joined}")
                } else {
                    joined
                };
                let generic = path
                    .segments
                    .iter()
                    .any(|s| !matches!(s.arguments, PathArguments::None));
                if generic {
                    Self::Generic {
                        path: joined,
                        rendered: render(ty),
                    }
                } else {
                    Self::Path(joined)
                }
            }
            Type::Array(array) => match array_length(&array.len) {
                Some(length) => Self::Array {
                    element: Box::new(Self::from_syn(&array.elem)),
                    length,
                },
                None => Self::Unsupported(render(ty)),
            },
            Type::Slice(slice) => Self::Slice(Box::new(Self::from_syn(&slice.elem))),
            Type::Paren(inner) => Self::from_syn(&inner.elem),
            Type::Group(inner) => Self::from_syn(&inner.elem),
            _ => Self::Unsupported(render(ty)),
        }
    }

    /// Last path segment, used to recognise built-in names.
    pub fn last_segment(&self) -> Option<&str> {
        match self {
            Self::Path(path) | Self::Generic { path, .. } => path.rsplit("::").next(),
            _ => None,
        }
    }

    /// Source-like rendering, used in diagnostics.
    pub fn rendered(&self) -> String {
        match self {
            Self::Path(path) => path.clone(),
            Self::Generic { rendered, .. } | Self::Unsupported(rendered) => rendered.clone(),
            Self::Array { element, length } => format!("[{}; {length}]", element.rendered()),
            Self::Slice(element) => format!("[{}]", element.rendered()),
        }
    }
}

fn render(ty: &Type) -> String {
    ty.to_token_stream()
        .to_string()
        .replace(" :: ", "::")
        .replace(" < ", "<")
        .replace(" >", ">")
        .replace("[ ", "[")
        .replace(" ]", "]")
        .replace(" ;", ";")
}

fn array_length(expr: &Expr) -> Option<usize> {
    match expr {
        Expr::Lit(lit) => match &lit.lit {
            Lit::Int(int) => int.base10_parse::<usize>().ok(),
            _ => None,
        },
        Expr::Group(group) => array_length(&group.expr),
        Expr::Paren(paren) => array_length(&paren.expr),
        _ => None,
    }
}

/// One field of a struct declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    pub name: String,
    pub ty: DeclaredType,
}

impl FieldDecl {
    pub fn new(name: impl Into<String>, ty: DeclaredType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Body of a declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclBody {
    Struct(Vec<FieldDecl>),
    /// Named type over a single scalar.
    Newtype(DeclaredType),
    /// Named fixed-size array.
    Array(DeclaredType),
}

/// A type declaration about to be validated and registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    pub name: String,
    pub body: DeclBody,
    pub location: Option<SourceLocation>,
}

impl TypeDecl {
    pub fn new(name: impl Into<String>, body: DeclBody) -> Self {
        Self {
            name: name.into(),
            body,
            location: None,
        }
    }

    #[must_use]
    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }
}
