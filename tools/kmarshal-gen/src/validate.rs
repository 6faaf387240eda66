// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Declaration validation.
//!
//! Rejects field types whose wire size cannot be known from the declaration
//! alone, or whose in-memory representation cannot be rebuilt from arbitrary
//! bytes. Every name that is not a built-in is accepted as an optimistic
//! reference to another marshallable type.

use crate::declared::{DeclBody, DeclaredType, TypeDecl};
use crate::descriptor::{FieldDescriptor, FieldType, ScalarKind, TypeDescriptor, TypeKind};
use crate::error::{Diagnostic, DiagnosticKind};
use std::collections::HashSet;

const AMBIGUOUS: &[(&str, &str)] = &[
    ("int", "i32 or i64"),
    ("uint", "u32 or u64"),
    ("isize", "i32 or i64"),
    ("usize", "u32 or u64"),
    ("uintptr", "u32 or u64"),
    ("c_int", "i32"),
    ("c_uint", "u32"),
    ("c_long", "i32 or i64"),
    ("c_ulong", "u32 or u64"),
    ("long", "i32 or i64"),
];

const DYNAMICALLY_SIZED: &[&str] = &[
    "string", "String", "str", "OsString", "OsStr", "PathBuf", "Path", "CString", "CStr", "Vec",
    "VecDeque", "Box", "Rc", "Arc", "HashMap", "BTreeMap", "HashSet", "BTreeSet",
];

fn invalid_bit_patterns(name: &str) -> Option<&'static str> {
    match name {
        "bool" => Some("u8"),
        "char" => Some("u32"),
        _ => None,
    }
}

/// Classify a single declared field type.
pub fn validate_field_type(ty: &DeclaredType) -> Result<FieldType, DiagnosticKind> {
    match ty {
        DeclaredType::Path(path) => {
            let last = ty.last_segment().unwrap_or(path);
            if let Some(kind) = ScalarKind::from_name(last) {
                return Ok(FieldType::Scalar(kind));
            }
            if let Some((_, suggestion)) = AMBIGUOUS.iter().find(|(n, _)| *n == last) {
                return Err(DiagnosticKind::AmbiguousWidth {
                    found: path.clone(),
                    suggestion,
                });
            }
            if DYNAMICALLY_SIZED.contains(&last) {
                return Err(DiagnosticKind::DynamicallySized {
                    found: path.clone(),
                });
            }
            if let Some(suggestion) = invalid_bit_patterns(last) {
                return Err(DiagnosticKind::InvalidBitPatterns {
                    found: path.clone(),
                    suggestion,
                });
            }
            tracing::debug!(
                "Found derived type '{}', will attempt dispatch via Marshallable",
                path
            );
            Ok(FieldType::Named(path.clone()))
        }
        DeclaredType::Generic { path, rendered } => {
            let last = ty.last_segment().unwrap_or(path);
            if DYNAMICALLY_SIZED.contains(&last) {
                Err(DiagnosticKind::DynamicallySized {
                    found: rendered.clone(),
                })
            } else {
                Err(DiagnosticKind::UnsupportedType {
                    found: rendered.clone(),
                })
            }
        }
        DeclaredType::Array { element, length } => {
            let element = validate_field_type(element)?;
            Ok(FieldType::array(element, *length))
        }
        DeclaredType::Slice(_) => Err(DiagnosticKind::DynamicallySized {
            found: ty.rendered(),
        }),
        DeclaredType::Unsupported(rendered) => Err(DiagnosticKind::UnsupportedType {
            found: rendered.clone(),
        }),
    }
}

/// Validate a declaration and lower it into a descriptor.
pub fn validate_decl(decl: &TypeDecl) -> Result<TypeDescriptor, Diagnostic> {
    let fail = |kind| Diagnostic::new(&decl.name, kind).with_location(decl.location.clone());
    if decl.name.trim().is_empty() {
        return Err(fail(DiagnosticKind::EmptyName));
    }

    let kind = match &decl.body {
        DeclBody::Struct(fields) => {
            let mut seen = HashSet::new();
            let mut out = Vec::with_capacity(fields.len());
            for field in fields {
                if field.name.is_empty() {
                    return Err(fail(DiagnosticKind::EmptyName));
                }
                if !seen.insert(field.name.as_str()) {
                    return Err(fail(DiagnosticKind::DuplicateField).with_field(&field.name));
                }
                let ty = validate_field_type(&field.ty)
                    .map_err(|kind| fail(kind).with_field(&field.name))?;
                out.push(FieldDescriptor::new(&field.name, ty));
            }
            TypeKind::Composite { fields: out }
        }
        DeclBody::Newtype(base) => match validate_field_type(base).map_err(fail)? {
            FieldType::Scalar(base) => TypeKind::Newtype { base },
            _ => {
                return Err(fail(DiagnosticKind::InvalidNewtypeBase {
                    found: base.rendered(),
                }))
            }
        },
        DeclBody::Array(array) => match validate_field_type(array).map_err(fail)? {
            FieldType::Array { element, length } => TypeKind::FixedArray {
                element: *element,
                length,
            },
            _ => {
                return Err(fail(DiagnosticKind::UnsupportedLayout {
                    reason: format!("'{}' is not a fixed-size array", array.rendered()),
                }))
            }
        },
    };

    let mut desc = TypeDescriptor::new(&decl.name, kind);
    desc.location = decl.location.clone();
    Ok(desc)
}

/// Structural checks on a descriptor built directly (builder or hand-written).
pub fn validate_descriptor(desc: &TypeDescriptor) -> Result<(), Diagnostic> {
    let fail = |kind| Diagnostic::new(&desc.name, kind).with_location(desc.location.clone());
    if desc.name.trim().is_empty() {
        return Err(fail(DiagnosticKind::EmptyName));
    }
    let mut seen = HashSet::new();
    for field in desc.fields() {
        if field.name.is_empty() {
            return Err(fail(DiagnosticKind::EmptyName));
        }
        if !seen.insert(field.name.as_str()) {
            return Err(fail(DiagnosticKind::DuplicateField).with_field(&field.name));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declared::FieldDecl;

    fn field(src: &str) -> Result<FieldType, DiagnosticKind> {
        validate_field_type(&DeclaredType::parse(src).unwrap())
    }

    #[test]
    fn test_fixed_width_scalars_accepted() {
        assert_eq!(field("int32"), Ok(FieldType::Scalar(ScalarKind::I32)));
        assert_eq!(field("uint64"), Ok(FieldType::Scalar(ScalarKind::U64)));
        assert_eq!(
            field("[uint8; 16]"),
            Ok(FieldType::array(FieldType::Scalar(ScalarKind::U8), 16))
        );
    }

    #[test]
    fn test_ambiguous_width_rejected() {
        for name in ["int", "uint", "usize", "isize", "core::ffi::c_int"] {
            assert!(
                matches!(field(name), Err(DiagnosticKind::AmbiguousWidth { .. })),
                "{name} should be rejected"
            );
        }
    }

    #[test]
    fn test_dynamically_sized_rejected() {
        for name in ["string", "String", "Vec<u8>", "[u8]", "Box<[u8]>", "[String; 2]"] {
            assert!(
                matches!(field(name), Err(DiagnosticKind::DynamicallySized { .. })),
                "{name} should be rejected"
            );
        }
    }

    #[test]
    fn test_invalid_bit_patterns_rejected() {
        assert_eq!(
            field("bool"),
            Err(DiagnosticKind::InvalidBitPatterns {
                found: "bool".into(),
                suggestion: "u8"
            })
        );
        assert!(matches!(field("char"), Err(DiagnosticKind::InvalidBitPatterns { .. })));
    }

    #[test]
    fn test_unknown_names_are_optimistic_references() {
        assert_eq!(field("abi::Timespec"), Ok(FieldType::named("abi::Timespec")));
        assert!(matches!(field("&u32"), Err(DiagnosticKind::UnsupportedType { .. })));
        assert!(matches!(field("Option<u32>"), Err(DiagnosticKind::UnsupportedType { .. })));
    }

    #[test]
    fn test_newtype_over_uint32() {
        let decl = TypeDecl::new("Fd", DeclBody::Newtype(DeclaredType::parse("uint32").unwrap()));
        let desc = validate_decl(&decl).unwrap();
        assert_eq!(desc.kind, TypeKind::Newtype { base: ScalarKind::U32 });
    }

    #[test]
    fn test_newtype_over_array_rejected() {
        let decl = TypeDecl::new("Fd", DeclBody::Newtype(DeclaredType::parse("[u8; 4]").unwrap()));
        let err = validate_decl(&decl).unwrap_err();
        assert!(matches!(err.kind, DiagnosticKind::InvalidNewtypeBase { .. }));
    }

    #[test]
    fn test_struct_errors_name_the_field() {
        let decl = TypeDecl::new(
            "Stat",
            DeclBody::Struct(vec![
                FieldDecl::new("dev", DeclaredType::parse("u64").unwrap()),
                FieldDecl::new("size", DeclaredType::parse("int").unwrap()),
            ]),
        );
        let err = validate_decl(&decl).unwrap_err();
        assert_eq!(err.type_name, "Stat");
        assert_eq!(err.field.as_deref(), Some("size"));
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let decl = TypeDecl::new(
            "Pair",
            DeclBody::Struct(vec![
                FieldDecl::new("a", DeclaredType::parse("u8").unwrap()),
                FieldDecl::new("a", DeclaredType::parse("u8").unwrap()),
            ]),
        );
        let err = validate_decl(&decl).unwrap_err();
        assert_eq!(err.kind, DiagnosticKind::DuplicateField);
    }
}
