// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Layout analysis: size and packedness verdicts.
//!
//! A type is packed when its in-memory image is exactly its wire image, which
//! holds for scalars and newtypes, for fixed arrays of packed elements, and for
//! composites whose fields are all packed. A type that depends on a type
//! outside the registry is packed conditionally: the emitted code confirms it
//! at compile time through the external type's own `PACKED`.
//! Verdicts are computed once per type, after every type is registered, and
//! are cached for the rest of the pass.

use crate::descriptor::{FieldType, TypeDescriptor, TypeKind};
use crate::error::{Diagnostic, DiagnosticKind};
use crate::registry::TypeLookup;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// Size in bytes, possibly depending on types outside the registry.
///
/// External terms are compile-time constants of the emitted code
/// (`<T as Marshallable>::SIZE`), never instance data.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SizeExpr {
    pub constant: usize,
    /// `(type name, multiplier)` pairs, in first-use order.
    pub external: Vec<(String, usize)>,
}

impl SizeExpr {
    pub fn fixed(bytes: usize) -> Self {
        Self {
            constant: bytes,
            external: Vec::new(),
        }
    }

    pub fn external(name: impl Into<String>) -> Self {
        Self {
            constant: 0,
            external: vec![(name.into(), 1)],
        }
    }

    pub fn is_static(&self) -> bool {
        self.external.is_empty()
    }

    pub fn as_static(&self) -> Option<usize> {
        self.is_static().then_some(self.constant)
    }

    /// Sum of two sizes; `None` on overflow.
    pub fn plus(&self, other: &SizeExpr) -> Option<SizeExpr> {
        let mut out = self.clone();
        out.constant = out.constant.checked_add(other.constant)?;
        for (name, mult) in &other.external {
            match out.external.iter_mut().find(|(n, _)| n == name) {
                Some((_, m)) => *m = m.checked_add(*mult)?,
                None => out.external.push((name.clone(), *mult)),
            }
        }
        Some(out)
    }

    /// Size scaled by an array length; `None` on overflow.
    pub fn times(&self, length: usize) -> Option<SizeExpr> {
        let external = self
            .external
            .iter()
            .map(|(name, mult)| Some((name.clone(), mult.checked_mul(length)?)))
            .collect::<Option<Vec<_>>>()?;
        Some(SizeExpr {
            constant: self.constant.checked_mul(length)?,
            external: external.into_iter().filter(|(_, m)| *m != 0).collect(),
        })
    }
}

impl fmt::Display for SizeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        if self.constant != 0 || self.external.is_empty() {
            write!(f, "{}", self.constant)?;
            first = false;
        }
        for (name, mult) in &self.external {
            if !first {
                f.write_str(" + ")?;
            }
            first = false;
            if *mult == 1 {
                write!(f, "size_of({name})")?;
            } else {
                write!(f, "{mult} * size_of({name})")?;
            }
        }
        Ok(())
    }
}

/// How a type (or field) is marshalled, decided at analysis time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Scalar,
    Newtype,
    Composite,
    FixedArray,
    /// Named type outside the registry, assumed to implement the trait itself.
    /// Its size and packedness are only known to the compiler.
    External,
}

/// Placement of one member within its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLayout {
    /// Field name, or `"0"` for the inner value of a newtype or array wrapper.
    pub name: String,
    pub ty: FieldType,
    pub capability: Capability,
    pub offset: SizeExpr,
    pub size: SizeExpr,
    /// Packed as far as the registry can tell; see [`FieldLayout::is_conditional`].
    pub packed: bool,
}

impl FieldLayout {
    /// Packedness also hinges on types outside the registry.
    pub fn is_conditional(&self) -> bool {
        !self.size.is_static()
    }
}

/// Cached result of analyzing one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutVerdict {
    pub type_name: String,
    pub capability: Capability,
    /// Packed, provided every external type in `size` is packed too.
    pub packed: bool,
    pub size: SizeExpr,
    /// Fields that forced the type to be non-packed.
    pub offending_fields: BTreeSet<String>,
    /// Fields whose packedness is settled by external types at compile time.
    pub conditional_fields: BTreeSet<String>,
    pub fields: Vec<FieldLayout>,
}

impl LayoutVerdict {
    /// Size when static; external sizes have no build-time value.
    pub fn static_size(&self) -> Option<usize> {
        self.size.as_static()
    }

    /// Packed whatever the external types turn out to be.
    pub fn is_unconditionally_packed(&self) -> bool {
        self.packed && self.size.is_static()
    }

    /// External types the packed verdict depends on.
    pub fn packed_if(&self) -> impl Iterator<Item = &str> {
        self.size.external.iter().map(|(name, _)| name.as_str())
    }
}

/// What to do with names the registry does not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Resolution {
    /// Unknown names are fatal.
    #[default]
    Strict,
    /// Unknown names are external marshallable types.
    OpenWorld,
}

pub struct LayoutAnalyzer<'r> {
    lookup: &'r dyn TypeLookup,
    resolution: Resolution,
    verdicts: HashMap<String, LayoutVerdict>,
    failed: HashMap<String, Diagnostic>,
    stack: Vec<String>,
}

impl<'r> LayoutAnalyzer<'r> {
    pub fn new(lookup: &'r dyn TypeLookup, resolution: Resolution) -> Self {
        Self {
            lookup,
            resolution,
            verdicts: HashMap::new(),
            failed: HashMap::new(),
            stack: Vec::new(),
        }
    }

    /// Cached verdict, if `name` was analyzed successfully.
    pub fn verdict(&self, name: &str) -> Option<&LayoutVerdict> {
        self.verdicts.get(name)
    }

    /// Analyze every name, in order. Failures do not stop the pass.
    pub fn analyze_all<'a, I>(&mut self, names: I) -> (Vec<LayoutVerdict>, Vec<Diagnostic>)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut verdicts = Vec::new();
        let mut failures = Vec::new();
        for name in names {
            match self.analyze(name) {
                Ok(verdict) => verdicts.push(verdict),
                Err(diag) => failures.push(diag),
            }
        }
        (verdicts, failures)
    }

    /// Analyze one registered type, recursing into its dependencies.
    pub fn analyze(&mut self, name: &str) -> Result<LayoutVerdict, Diagnostic> {
        let lookup = self.lookup;
        let Some(desc) = lookup.lookup(name) else {
            return Err(Diagnostic::new(
                name,
                DiagnosticKind::UnresolvedType {
                    name: name.to_string(),
                },
            ));
        };
        let key = desc.name.as_str();
        if let Some(verdict) = self.verdicts.get(key) {
            return Ok(verdict.clone());
        }
        if let Some(diag) = self.failed.get(key) {
            return Err(diag.clone());
        }
        if let Some(pos) = self.stack.iter().position(|n| n == key) {
            let mut cycle = self.stack[pos..].to_vec();
            cycle.push(key.to_string());
            return Err(Diagnostic::new(key, DiagnosticKind::CyclicType { cycle })
                .with_location(desc.location.clone()));
        }

        self.stack.push(key.to_string());
        let result = self.compute(desc);
        self.stack.pop();

        match result {
            Ok(verdict) => {
                tracing::debug!(
                    "layout of '{}': size {}, packed {}",
                    key,
                    verdict.size,
                    verdict.packed
                );
                self.verdicts.insert(key.to_string(), verdict.clone());
                Ok(verdict)
            }
            Err(diag) => {
                self.failed.insert(key.to_string(), diag.clone());
                Err(diag)
            }
        }
    }

    fn compute(&mut self, desc: &TypeDescriptor) -> Result<LayoutVerdict, Diagnostic> {
        match &desc.kind {
            TypeKind::Scalar(kind) => Ok(LayoutVerdict {
                type_name: desc.name.clone(),
                capability: Capability::Scalar,
                packed: true,
                size: SizeExpr::fixed(kind.width()),
                offending_fields: BTreeSet::new(),
                conditional_fields: BTreeSet::new(),
                fields: Vec::new(),
            }),
            TypeKind::Newtype { base } => {
                let size = SizeExpr::fixed(base.width());
                Ok(LayoutVerdict {
                    type_name: desc.name.clone(),
                    capability: Capability::Newtype,
                    packed: true,
                    size: size.clone(),
                    offending_fields: BTreeSet::new(),
                    conditional_fields: BTreeSet::new(),
                    fields: vec![FieldLayout {
                        name: "0".into(),
                        ty: FieldType::Scalar(*base),
                        capability: Capability::Scalar,
                        offset: SizeExpr::fixed(0),
                        size,
                        packed: true,
                    }],
                })
            }
            TypeKind::FixedArray { element, length } => {
                let ty = FieldType::array(element.clone(), *length);
                let member = self.member(desc, "0", &ty, SizeExpr::fixed(0))?;
                let mut offending = BTreeSet::new();
                let mut conditional = BTreeSet::new();
                if !member.packed {
                    offending.insert(member.name.clone());
                } else if member.is_conditional() {
                    conditional.insert(member.name.clone());
                }
                Ok(LayoutVerdict {
                    type_name: desc.name.clone(),
                    capability: Capability::FixedArray,
                    packed: member.packed,
                    size: member.size.clone(),
                    offending_fields: offending,
                    conditional_fields: conditional,
                    fields: vec![member],
                })
            }
            TypeKind::Composite { fields } => {
                let mut offset = SizeExpr::fixed(0);
                let mut layouts = Vec::with_capacity(fields.len());
                let mut offending = BTreeSet::new();
                let mut conditional = BTreeSet::new();
                for field in fields {
                    let member = self.member(desc, &field.name, &field.ty, offset.clone())?;
                    offset = offset
                        .plus(&member.size)
                        .ok_or_else(|| overflow(desc, &field.name))?;
                    if !member.packed {
                        tracing::debug!(
                            "'{}.{}' is potentially non-packed, '{}' falls back to field-by-field",
                            desc.name,
                            field.name,
                            desc.name
                        );
                        offending.insert(field.name.clone());
                    } else if member.is_conditional() {
                        tracing::debug!(
                            "'{}.{}' is potentially non-packed, decided by its type at compile time",
                            desc.name,
                            field.name
                        );
                        conditional.insert(field.name.clone());
                    }
                    layouts.push(member);
                }
                Ok(LayoutVerdict {
                    type_name: desc.name.clone(),
                    capability: Capability::Composite,
                    packed: offending.is_empty(),
                    size: offset,
                    offending_fields: offending,
                    conditional_fields: conditional,
                    fields: layouts,
                })
            }
        }
    }

    fn member(
        &mut self,
        owner: &TypeDescriptor,
        name: &str,
        ty: &FieldType,
        offset: SizeExpr,
    ) -> Result<FieldLayout, Diagnostic> {
        let (capability, size, packed) = self.field_type(owner, name, ty)?;
        Ok(FieldLayout {
            name: name.to_string(),
            ty: ty.clone(),
            capability,
            offset,
            size,
            packed,
        })
    }

    fn field_type(
        &mut self,
        owner: &TypeDescriptor,
        field: &str,
        ty: &FieldType,
    ) -> Result<(Capability, SizeExpr, bool), Diagnostic> {
        match ty {
            FieldType::Scalar(kind) => Ok((Capability::Scalar, SizeExpr::fixed(kind.width()), true)),
            FieldType::Array { element, length } => {
                let (_, size, packed) = self.field_type(owner, field, element)?;
                let size = size.times(*length).ok_or_else(|| overflow(owner, field))?;
                Ok((Capability::FixedArray, size, packed))
            }
            FieldType::Named(name) => {
                if self.lookup.lookup(name).is_some() {
                    let verdict = self
                        .analyze(name)
                        .map_err(|diag| dependency_error(owner, field, name, diag))?;
                    return Ok((verdict.capability, verdict.size, verdict.packed));
                }
                if self.lookup.is_rejected(name) {
                    return Err(Diagnostic::new(
                        &owner.name,
                        DiagnosticKind::DependencyFailed {
                            dependency: name.clone(),
                        },
                    )
                    .with_field(field)
                    .with_location(owner.location.clone()));
                }
                match self.resolution {
                    Resolution::Strict => Err(Diagnostic::new(
                        &owner.name,
                        DiagnosticKind::UnresolvedType { name: name.clone() },
                    )
                    .with_field(field)
                    .with_location(owner.location.clone())),
                    Resolution::OpenWorld => {
                        tracing::debug!(
                            "'{}' is not in the registry, treating it as externally marshallable",
                            name
                        );
                        Ok((Capability::External, SizeExpr::external(name), true))
                    }
                }
            }
        }
    }
}

fn overflow(owner: &TypeDescriptor, field: &str) -> Diagnostic {
    Diagnostic::new(
        &owner.name,
        DiagnosticKind::UnsupportedLayout {
            reason: "size overflows usize".into(),
        },
    )
    .with_field(field)
    .with_location(owner.location.clone())
}

/// Re-attribute a dependency's failure to the type that referenced it.
fn dependency_error(
    owner: &TypeDescriptor,
    field: &str,
    dependency: &str,
    diag: Diagnostic,
) -> Diagnostic {
    let kind = match diag.kind {
        DiagnosticKind::CyclicType { cycle } if cycle.iter().any(|n| *n == owner.name) => {
            DiagnosticKind::CyclicType { cycle }
        }
        _ => DiagnosticKind::DependencyFailed {
            dependency: dependency.to_string(),
        },
    };
    Diagnostic::new(&owner.name, kind)
        .with_field(field)
        .with_location(owner.location.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::TypeDescriptorBuilder;
    use crate::descriptor::ScalarKind;
    use crate::registry::TypeRegistry;

    fn registry(types: Vec<TypeDescriptor>) -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        for desc in types {
            registry.register(desc).unwrap();
        }
        registry
    }

    #[test]
    fn test_point_is_packed() {
        let reg = registry(vec![TypeDescriptorBuilder::composite("Point")
            .field("x", ScalarKind::I32)
            .field("y", ScalarKind::I32)
            .build()]);
        let mut analyzer = LayoutAnalyzer::new(&reg, Resolution::Strict);
        let verdict = analyzer.analyze("Point").unwrap();
        assert!(verdict.packed);
        assert_eq!(verdict.static_size(), Some(8));
        assert_eq!(verdict.fields[1].offset, SizeExpr::fixed(4));
        assert!(verdict.offending_fields.is_empty());
    }

    #[test]
    fn test_newtype_and_array_of_newtype_are_packed() {
        let reg = registry(vec![
            TypeDescriptor::newtype("Fd", ScalarKind::I32),
            TypeDescriptor::fixed_array("FdSet", FieldType::named("Fd"), 16),
        ]);
        let mut analyzer = LayoutAnalyzer::new(&reg, Resolution::Strict);
        let fd = analyzer.analyze("Fd").unwrap();
        assert!(fd.packed);
        assert_eq!(fd.capability, Capability::Newtype);
        let set = analyzer.analyze("FdSet").unwrap();
        assert!(set.packed);
        assert_eq!(set.static_size(), Some(64));
    }

    #[test]
    fn test_external_field_makes_packing_conditional() {
        let reg = registry(vec![TypeDescriptorBuilder::composite("Outer")
            .field("a", ScalarKind::U8)
            .named_field("inner", "Opaque")
            .build()]);
        let mut analyzer = LayoutAnalyzer::new(&reg, Resolution::OpenWorld);
        let verdict = analyzer.analyze("Outer").unwrap();
        assert!(verdict.packed);
        assert!(!verdict.is_unconditionally_packed());
        assert!(verdict.offending_fields.is_empty());
        assert!(verdict.conditional_fields.contains("inner"));
        assert_eq!(verdict.packed_if().collect::<Vec<_>>(), ["Opaque"]);
        assert_eq!(verdict.size.to_string(), "1 + size_of(Opaque)");
        assert_eq!(verdict.fields[1].capability, Capability::External);
    }

    #[test]
    fn test_conditional_packing_propagates_through_registry_types() {
        let reg = registry(vec![
            TypeDescriptorBuilder::composite("Inner")
                .named_field("ts", "abi::Timespec")
                .build(),
            TypeDescriptorBuilder::composite("Outer")
                .field("tag", ScalarKind::U32)
                .field_with_type("pair", FieldType::array(FieldType::named("Inner"), 2))
                .build(),
            TypeDescriptorBuilder::composite("Flagged")
                .field("on", ScalarKind::U8)
                .named_field("inner", "Inner")
                .build(),
        ]);
        let mut analyzer = LayoutAnalyzer::new(&reg, Resolution::OpenWorld);
        let outer = analyzer.analyze("Outer").unwrap();
        assert!(outer.packed);
        assert!(outer.conditional_fields.contains("pair"));
        assert_eq!(outer.fields[1].offset, SizeExpr::fixed(4));
        assert_eq!(outer.size.to_string(), "4 + 2 * size_of(abi::Timespec)");
        assert_eq!(outer.packed_if().collect::<Vec<_>>(), ["abi::Timespec"]);

        let flagged = analyzer.analyze("Flagged").unwrap();
        assert!(flagged.packed);
        assert_eq!(flagged.fields[1].offset, SizeExpr::fixed(1));
    }

    #[test]
    fn test_strict_mode_rejects_unknown_names() {
        let reg = registry(vec![TypeDescriptorBuilder::composite("Outer")
            .named_field("inner", "Opaque")
            .build()]);
        let mut analyzer = LayoutAnalyzer::new(&reg, Resolution::Strict);
        let err = analyzer.analyze("Outer").unwrap_err();
        assert_eq!(err.field.as_deref(), Some("inner"));
        assert_eq!(
            err.kind,
            DiagnosticKind::UnresolvedType {
                name: "Opaque".into()
            }
        );
    }

    #[test]
    fn test_cycle_members_and_dependents() {
        let reg = registry(vec![
            TypeDescriptorBuilder::composite("User").named_field("a", "A").build(),
            TypeDescriptorBuilder::composite("A").named_field("b", "B").build(),
            TypeDescriptorBuilder::composite("B")
                .field_with_type("a", FieldType::array(FieldType::named("A"), 2))
                .build(),
        ]);
        let mut analyzer = LayoutAnalyzer::new(&reg, Resolution::Strict);
        let (verdicts, failures) = analyzer.analyze_all(["User", "A", "B"]);
        assert!(verdicts.is_empty());
        assert_eq!(failures.len(), 3);

        assert_eq!(
            failures[0].kind,
            DiagnosticKind::DependencyFailed {
                dependency: "A".into()
            }
        );
        assert!(failures[1].is_cycle());
        assert!(failures[2].is_cycle());
        assert_eq!(failures[1].type_name, "A");
        assert_eq!(failures[2].type_name, "B");
    }

    #[test]
    fn test_size_expr_arithmetic() {
        let a = SizeExpr::fixed(4).plus(&SizeExpr::external("T")).unwrap();
        let b = a.times(3).unwrap();
        assert_eq!(b.constant, 12);
        assert_eq!(b.external, vec![("T".to_string(), 3)]);
        assert_eq!(b.to_string(), "12 + 3 * size_of(T)");
        assert!(SizeExpr::fixed(usize::MAX).times(2).is_none());
        assert_eq!(SizeExpr::fixed(0).to_string(), "0");
    }
}
