// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Declarations through validation, registry and layout analysis.

use kmarshal_gen::{
    Capability, DeclBody, DeclaredType, DiagnosticKind, FieldDecl, FieldType, LayoutAnalyzer,
    Resolution, ScalarKind, SizeExpr, TypeDecl, TypeDescriptor, TypeDescriptorBuilder,
    TypeRegistry,
};

fn field(name: &str, ty: &str) -> FieldDecl {
    FieldDecl::new(name, DeclaredType::parse(ty).unwrap())
}

fn strukt(name: &str, fields: &[(&str, &str)]) -> TypeDecl {
    TypeDecl::new(
        name,
        DeclBody::Struct(fields.iter().map(|(n, t)| field(n, t)).collect()),
    )
}

fn registry(decls: &[TypeDecl]) -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    for decl in decls {
        let _ = registry.declare(decl);
    }
    registry
}

#[test]
fn test_validator_accepts_fixed_width_declarations() {
    let reg = registry(&[
        strukt(
            "Header",
            &[("kind", "int32"), ("len", "uint64"), ("id", "[uint8; 16]")],
        ),
        TypeDecl::new("Fd", DeclBody::Newtype(DeclaredType::parse("uint32").unwrap())),
    ]);
    assert_eq!(reg.len(), 2);
    assert_eq!(reg.rejections().count(), 0);

    let header = reg.resolve("Header").unwrap();
    assert_eq!(
        header.field("id").unwrap().ty,
        FieldType::array(FieldType::Scalar(ScalarKind::U8), 16)
    );
}

#[test]
fn test_validator_rejections_name_type_and_field() {
    let mut reg = TypeRegistry::new();
    let err = reg
        .declare(&strukt("Msg", &[("len", "int"), ("body", "string")]))
        .unwrap_err();
    assert_eq!(err.type_name, "Msg");
    assert_eq!(err.field.as_deref(), Some("len"));
    assert!(matches!(err.kind, DiagnosticKind::AmbiguousWidth { .. }));

    let err = reg
        .declare(&strukt("Blob", &[("data", "Vec<u8>")]))
        .unwrap_err();
    assert!(matches!(err.kind, DiagnosticKind::DynamicallySized { .. }));
    assert!(err.to_string().contains("fixed size byte array"));

    let err = reg
        .declare(&strukt("Flags", &[("on", "bool")]))
        .unwrap_err();
    assert!(matches!(err.kind, DiagnosticKind::InvalidBitPatterns { suggestion: "u8", .. }));

    let err = reg
        .declare(&strukt("Twice", &[("a", "u8"), ("a", "u16")]))
        .unwrap_err();
    assert_eq!(err.kind, DiagnosticKind::DuplicateField);

    let err = reg
        .declare(&TypeDecl::new(
            "Bad",
            DeclBody::Newtype(DeclaredType::parse("[u8; 4]").unwrap()),
        ))
        .unwrap_err();
    assert!(matches!(err.kind, DiagnosticKind::InvalidNewtypeBase { .. }));

    assert!(reg.is_empty());
    assert_eq!(reg.rejections().count(), 5);
    assert!(reg.rejection("Blob").is_some());
}

#[test]
fn test_packed_point() {
    let reg = registry(&[strukt("Point", &[("x", "i32"), ("y", "i32")])]);
    let mut analyzer = LayoutAnalyzer::new(&reg, Resolution::Strict);
    let verdict = analyzer.analyze("Point").unwrap();
    assert!(verdict.packed);
    assert_eq!(verdict.static_size(), Some(8));
    assert_eq!(verdict.capability, Capability::Composite);
    assert_eq!(verdict.fields[1].offset, SizeExpr::fixed(4));
}

#[test]
fn test_packedness_propagates_through_nesting() {
    let reg = registry(&[
        strukt("Outer", &[("tag", "u32"), ("inner", "Inner"), ("tail", "[Inner; 2]")]),
        strukt("Inner", &[("a", "u16"), ("b", "u16")]),
    ]);
    let mut analyzer = LayoutAnalyzer::new(&reg, Resolution::Strict);
    let verdict = analyzer.analyze("Outer").unwrap();
    assert!(verdict.packed);
    assert_eq!(verdict.static_size(), Some(4 + 4 + 8));
    assert!(analyzer.verdict("Inner").is_some());
}

#[test]
fn test_external_field_makes_packing_conditional() {
    let reg = registry(&[strukt("Stat", &[("dev", "u64"), ("atime", "abi::Timespec")])]);

    let mut strict = LayoutAnalyzer::new(&reg, Resolution::Strict);
    let err = strict.analyze("Stat").unwrap_err();
    assert!(matches!(err.kind, DiagnosticKind::UnresolvedType { ref name } if name == "abi::Timespec"));
    assert_eq!(err.field.as_deref(), Some("atime"));

    let mut open = LayoutAnalyzer::new(&reg, Resolution::OpenWorld);
    let verdict = open.analyze("Stat").unwrap();
    assert!(verdict.packed);
    assert!(!verdict.is_unconditionally_packed());
    assert!(verdict.offending_fields.is_empty());
    assert!(verdict.conditional_fields.contains("atime"));
    assert_eq!(verdict.fields[1].capability, Capability::External);
    assert_eq!(verdict.size.to_string(), "8 + size_of(abi::Timespec)");
}

#[test]
fn test_qualified_reference_resolves_by_last_segment() {
    let reg = registry(&[
        strukt("Timespec", &[("sec", "i64"), ("nsec", "i64")]),
        strukt("Stat", &[("atime", "abi::Timespec")]),
    ]);
    let mut analyzer = LayoutAnalyzer::new(&reg, Resolution::Strict);
    let verdict = analyzer.analyze("Stat").unwrap();
    assert!(verdict.packed);
    assert_eq!(verdict.static_size(), Some(16));
}

#[test]
fn test_cycle_is_detected_and_named() {
    let reg = registry(&[
        strukt("A", &[("b", "B")]),
        strukt("B", &[("x", "u8"), ("a", "[A; 1]")]),
        strukt("User", &[("a", "A")]),
    ]);
    let mut analyzer = LayoutAnalyzer::new(&reg, Resolution::Strict);

    let err = analyzer.analyze("A").unwrap_err();
    assert!(err.is_cycle());
    let text = err.to_string();
    assert!(text.contains("A -> B -> A"), "{text}");

    let err = analyzer.analyze("User").unwrap_err();
    assert!(matches!(err.kind, DiagnosticKind::DependencyFailed { ref dependency } if dependency == "A"));
}

#[test]
fn test_analysis_is_order_independent() {
    let decls = [
        strukt("Top", &[("mid", "Mid"), ("n", "u8")]),
        strukt("Mid", &[("leaf", "Leaf")]),
        strukt("Leaf", &[("v", "u32")]),
    ];
    let reg = registry(&decls);

    let mut forward = LayoutAnalyzer::new(&reg, Resolution::Strict);
    let (a, fa) = forward.analyze_all(["Top", "Mid", "Leaf"]);
    let mut backward = LayoutAnalyzer::new(&reg, Resolution::Strict);
    let (b, fb) = backward.analyze_all(["Leaf", "Mid", "Top"]);

    assert!(fa.is_empty() && fb.is_empty());
    let top_a = a.iter().find(|v| v.type_name == "Top").unwrap();
    let top_b = b.iter().find(|v| v.type_name == "Top").unwrap();
    assert_eq!(top_a, top_b);
    assert_eq!(top_a.static_size(), Some(5));
}

#[test]
fn test_dependency_on_rejected_declaration_fails() {
    let reg = registry(&[
        strukt("Broken", &[("len", "usize")]),
        strukt("User", &[("b", "Broken")]),
    ]);
    let mut analyzer = LayoutAnalyzer::new(&reg, Resolution::OpenWorld);
    let err = analyzer.analyze("User").unwrap_err();
    assert!(matches!(err.kind, DiagnosticKind::DependencyFailed { ref dependency } if dependency == "Broken"));
}

#[test]
fn test_wrappers_are_packed() {
    let mut reg = TypeRegistry::new();
    reg.register(TypeDescriptor::newtype("Fd", ScalarKind::I32)).unwrap();
    reg.register(TypeDescriptorBuilder::fixed_array(
        "SigSet",
        FieldType::Scalar(ScalarKind::U64),
        2,
    ))
    .unwrap();
    let mut analyzer = LayoutAnalyzer::new(&reg, Resolution::Strict);

    let fd = analyzer.analyze("Fd").unwrap();
    assert!(fd.packed);
    assert_eq!(fd.capability, Capability::Newtype);
    assert_eq!(fd.static_size(), Some(4));

    let set = analyzer.analyze("SigSet").unwrap();
    assert!(set.packed);
    assert_eq!(set.static_size(), Some(16));
}

#[test]
fn test_duplicate_registration_fails() {
    let mut reg = TypeRegistry::new();
    reg.register(TypeDescriptor::newtype("Fd", ScalarKind::I32)).unwrap();
    let err = reg
        .register(TypeDescriptor::newtype("Fd", ScalarKind::U32))
        .unwrap_err();
    assert_eq!(err.kind, DiagnosticKind::DuplicateType);
    assert_eq!(reg.len(), 1);
}
