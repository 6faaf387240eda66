// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type registry for one generation pass.
//!
//! Registration order is kept so generated output is deterministic; lookups
//! go through the [`TypeLookup`] trait so the layout analyzer does not depend
//! on the concrete storage.

use crate::declared::TypeDecl;
use crate::descriptor::TypeDescriptor;
use crate::error::{Diagnostic, DiagnosticKind, SourceLocation};
use crate::validate::{validate_decl, validate_descriptor};
use std::collections::HashMap;

/// Resolves a type name to its descriptor.
pub trait TypeLookup {
    /// Returns `None` if the name is unknown.
    fn lookup(&self, name: &str) -> Option<&TypeDescriptor>;

    /// True if `name` was declared but rejected before registration.
    fn is_rejected(&self, _name: &str) -> bool {
        false
    }
}

/// [`HashMap`]-backed registry of validated descriptors.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: HashMap<String, TypeDescriptor>,
    order: Vec<String>,
    rejected: HashMap<String, Diagnostic>,
}

impl TypeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an already-built descriptor.
    pub fn register(&mut self, desc: TypeDescriptor) -> Result<(), Diagnostic> {
        if let Err(diag) = validate_descriptor(&desc) {
            return Err(self.reject(diag));
        }
        if self.types.contains_key(&desc.name) {
            let location = desc.location.clone();
            return Err(self.fail(&desc.name, DiagnosticKind::DuplicateType, location));
        }
        tracing::debug!("registered type '{}'", desc.name);
        self.order.push(desc.name.clone());
        self.types.insert(desc.name.clone(), desc);
        Ok(())
    }

    /// Validate a raw declaration, then register it.
    pub fn declare(&mut self, decl: &TypeDecl) -> Result<(), Diagnostic> {
        match validate_decl(decl) {
            Ok(desc) => self.register(desc),
            Err(diag) => Err(self.reject(diag)),
        }
    }

    /// Look a type up by name.
    ///
    /// An exact match wins; a qualified path (`abi::Timespec`) otherwise
    /// resolves to the single registered type with the same final segment.
    pub fn resolve(&self, name: &str) -> Option<&TypeDescriptor> {
        if let Some(desc) = self.types.get(name) {
            return Some(desc);
        }
        let last = name.rsplit("::").next()?;
        if last == name {
            return None;
        }
        let mut candidates = self
            .order
            .iter()
            .filter(|n| n.rsplit("::").next() == Some(last));
        match (candidates.next(), candidates.next()) {
            (Some(only), None) => self.types.get(only),
            _ => None,
        }
    }

    /// Record a fatal failure for `type_name` and return the diagnostic.
    pub fn fail(
        &mut self,
        type_name: &str,
        kind: DiagnosticKind,
        location: Option<SourceLocation>,
    ) -> Diagnostic {
        let diag = Diagnostic::new(type_name, kind).with_location(location);
        self.reject(diag)
    }

    fn reject(&mut self, diag: Diagnostic) -> Diagnostic {
        tracing::warn!("rejected type: {}", diag);
        self.rejected
            .entry(diag.type_name.clone())
            .or_insert_with(|| diag.clone());
        diag
    }

    /// The recorded rejection for a declaration that never made it in.
    pub fn rejection(&self, name: &str) -> Option<&Diagnostic> {
        self.rejected.get(name)
    }

    pub fn rejections(&self) -> impl Iterator<Item = &Diagnostic> {
        self.rejected.values()
    }

    /// Descriptors in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.order.iter().filter_map(|name| self.types.get(name))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl TypeLookup for TypeRegistry {
    fn lookup(&self, name: &str) -> Option<&TypeDescriptor> {
        self.resolve(name)
    }

    fn is_rejected(&self, name: &str) -> bool {
        self.rejected.contains_key(name)
            || name
                .rsplit("::")
                .next()
                .is_some_and(|last| self.rejected.contains_key(last))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declared::{DeclBody, DeclaredType};
    use crate::descriptor::ScalarKind;

    #[test]
    fn test_register_and_resolve() {
        let mut registry = TypeRegistry::new();
        registry
            .register(TypeDescriptor::newtype("Fd", ScalarKind::I32))
            .unwrap();
        assert!(registry.resolve("Fd").is_some());
        assert!(registry.resolve("abi::Fd").is_some());
        assert!(registry.resolve("Pid").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut registry = TypeRegistry::new();
        registry
            .register(TypeDescriptor::newtype("Fd", ScalarKind::I32))
            .unwrap();
        let err = registry
            .register(TypeDescriptor::newtype("Fd", ScalarKind::U32))
            .unwrap_err();
        assert_eq!(err.kind, DiagnosticKind::DuplicateType);
        assert!(registry.rejection("Fd").is_some());
    }

    #[test]
    fn test_declare_records_rejection() {
        let mut registry = TypeRegistry::new();
        let decl = TypeDecl::new("Len", DeclBody::Newtype(DeclaredType::parse("usize").unwrap()));
        assert!(registry.declare(&decl).is_err());
        assert!(registry.is_empty());
        assert!(matches!(
            registry.rejection("Len").map(|d| &d.kind),
            Some(DiagnosticKind::AmbiguousWidth { .. })
        ));
    }

    #[test]
    fn test_ambiguous_suffix_does_not_resolve() {
        let mut registry = TypeRegistry::new();
        registry
            .register(TypeDescriptor::newtype("a::Id", ScalarKind::U32))
            .unwrap();
        registry
            .register(TypeDescriptor::newtype("b::Id", ScalarKind::U64))
            .unwrap();
        assert!(registry.resolve("c::Id").is_none());
        let order: Vec<&str> = registry.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(order, vec!["a::Id", "b::Id"]);
    }
}
