// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fluent builder API for TypeDescriptor.

use crate::descriptor::{FieldDescriptor, FieldType, ScalarKind, TypeDescriptor, TypeKind};
use crate::error::SourceLocation;

/// Builder for composite descriptors.
#[derive(Debug)]
pub struct TypeDescriptorBuilder {
    name: String,
    fields: Vec<FieldDescriptor>,
    location: Option<SourceLocation>,
}

impl TypeDescriptorBuilder {
    /// Create a new builder for a composite type.
    pub fn composite(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            location: None,
        }
    }

    /// Newtypes have no fields, so they skip the builder.
    pub fn newtype(name: impl Into<String>, base: ScalarKind) -> TypeDescriptor {
        TypeDescriptor::newtype(name, base)
    }

    pub fn fixed_array(name: impl Into<String>, element: FieldType, length: usize) -> TypeDescriptor {
        TypeDescriptor::fixed_array(name, element, length)
    }

    /// Add a scalar field.
    pub fn field(mut self, name: impl Into<String>, kind: ScalarKind) -> Self {
        self.fields
            .push(FieldDescriptor::new(name, FieldType::Scalar(kind)));
        self
    }

    /// Add a field with an arbitrary validated type.
    pub fn field_with_type(mut self, name: impl Into<String>, ty: FieldType) -> Self {
        self.fields.push(FieldDescriptor::new(name, ty));
        self
    }

    /// Add a fixed-length array of scalars.
    pub fn array_field(self, name: impl Into<String>, element: ScalarKind, length: usize) -> Self {
        self.field_with_type(name, FieldType::array(FieldType::Scalar(element), length))
    }

    /// Add a by-name reference to another marshallable type.
    pub fn named_field(self, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.field_with_type(name, FieldType::named(type_name))
    }

    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// Build the TypeDescriptor.
    pub fn build(self) -> TypeDescriptor {
        TypeDescriptor {
            name: self.name,
            kind: TypeKind::Composite {
                fields: self.fields,
            },
            location: self.location,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_keeps_declaration_order() {
        let desc = TypeDescriptorBuilder::composite("Stat")
            .field("dev", ScalarKind::U64)
            .array_field("pad", ScalarKind::U8, 4)
            .named_field("atime", "Timespec")
            .at(SourceLocation::file("abi.toml"))
            .build();

        let names: Vec<&str> = desc.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["dev", "pad", "atime"]);
        assert_eq!(desc.field("atime").unwrap().ty, FieldType::named("Timespec"));
        assert_eq!(desc.location, Some(SourceLocation::file("abi.toml")));
    }

    #[test]
    fn test_non_composite_shortcuts() {
        let fd = TypeDescriptorBuilder::newtype("Fd", ScalarKind::I32);
        assert_eq!(fd.kind, TypeKind::Newtype { base: ScalarKind::I32 });
        let sig = TypeDescriptorBuilder::fixed_array("SigSet", FieldType::Scalar(ScalarKind::U64), 1);
        assert!(!sig.is_composite());
    }
}
