// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type descriptors: the validated shape of a marshallable type.
//!
//! A descriptor never looks at instance data. Composite field order is the
//! declaration order and is also the wire order.

use crate::error::SourceLocation;
use std::fmt;

/// Fixed-width scalar kinds.
///
/// Every bit pattern of every kind is a valid value, which is what allows the
/// packed path to reinterpret raw bytes as an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScalarKind {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    F32,
    F64,
}

impl ScalarKind {
    pub const ALL: [ScalarKind; 10] = [
        Self::U8,
        Self::I8,
        Self::U16,
        Self::I16,
        Self::U32,
        Self::I32,
        Self::U64,
        Self::I64,
        Self::F32,
        Self::F64,
    ];

    /// Width in bytes: 1, 2, 4 or 8.
    pub const fn width(self) -> usize {
        match self {
            Self::U8 | Self::I8 => 1,
            Self::U16 | Self::I16 => 2,
            Self::U32 | Self::I32 | Self::F32 => 4,
            Self::U64 | Self::I64 | Self::F64 => 8,
        }
    }

    /// Rust spelling of the scalar.
    pub const fn rust_name(self) -> &'static str {
        match self {
            Self::U8 => "u8",
            Self::I8 => "i8",
            Self::U16 => "u16",
            Self::I16 => "i16",
            Self::U32 => "u32",
            Self::I32 => "i32",
            Self::U64 => "u64",
            Self::I64 => "i64",
            Self::F32 => "f32",
            Self::F64 => "f64",
        }
    }

    /// Accepts Rust names and the explicit fixed-width C/Go style names.
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "u8" | "uint8" | "byte" => Self::U8,
            "i8" | "int8" => Self::I8,
            "u16" | "uint16" => Self::U16,
            "i16" | "int16" => Self::I16,
            "u32" | "uint32" => Self::U32,
            "i32" | "int32" => Self::I32,
            "u64" | "uint64" => Self::U64,
            "i64" | "int64" => Self::I64,
            "f32" | "float32" => Self::F32,
            "f64" | "float64" => Self::F64,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.rust_name())
    }
}

/// Validated type of a field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    Scalar(ScalarKind),
    /// Fixed-length array; the only kind of array that exists.
    Array {
        element: Box<FieldType>,
        length: usize,
    },
    /// By-name reference to another marshallable type, resolved lazily.
    Named(String),
}

impl FieldType {
    pub fn array(element: FieldType, length: usize) -> Self {
        Self::Array {
            element: Box::new(element),
            length,
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Size in bytes when it does not depend on another type's layout.
    pub fn static_size(&self) -> Option<usize> {
        match self {
            Self::Scalar(kind) => Some(kind.width()),
            Self::Array { element, length } => element.static_size()?.checked_mul(*length),
            Self::Named(_) => None,
        }
    }

    /// The named type this field depends on, looking through arrays.
    pub fn referenced_name(&self) -> Option<&str> {
        match self {
            Self::Scalar(_) => None,
            Self::Array { element, .. } => element.referenced_name(),
            Self::Named(name) => Some(name),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(kind) => write!(f, "{kind}"),
            Self::Array { element, length } => write!(f, "[{element}; {length}]"),
            Self::Named(name) => f.write_str(name),
        }
    }
}

/// One field of a composite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Field name; numeric (`"0"`, `"1"`) for tuple structs.
    pub name: String,
    pub ty: FieldType,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    /// True when the field is positional (tuple struct member).
    pub fn is_positional(&self) -> bool {
        !self.name.is_empty() && self.name.bytes().all(|b| b.is_ascii_digit())
    }
}

/// Shape of a described type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    Scalar(ScalarKind),
    /// Named type whose representation is a single scalar.
    Newtype { base: ScalarKind },
    Composite { fields: Vec<FieldDescriptor> },
    FixedArray { element: FieldType, length: usize },
}

/// A complete, validated type descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    /// Stable name used for cross references.
    pub name: String,
    pub kind: TypeKind,
    pub location: Option<SourceLocation>,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            location: None,
        }
    }

    /// Descriptor for a built-in scalar, named by its Rust spelling.
    pub fn scalar(kind: ScalarKind) -> Self {
        Self::new(kind.rust_name(), TypeKind::Scalar(kind))
    }

    pub fn newtype(name: impl Into<String>, base: ScalarKind) -> Self {
        Self::new(name, TypeKind::Newtype { base })
    }

    pub fn composite(name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        Self::new(name, TypeKind::Composite { fields })
    }

    pub fn fixed_array(name: impl Into<String>, element: FieldType, length: usize) -> Self {
        Self::new(name, TypeKind::FixedArray { element, length })
    }

    #[must_use]
    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// Fields if this is a composite, empty otherwise.
    pub fn fields(&self) -> &[FieldDescriptor] {
        match &self.kind {
            TypeKind::Composite { fields } => fields,
            _ => &[],
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields().iter().find(|f| f.name == name)
    }

    pub fn is_composite(&self) -> bool {
        matches!(self.kind, TypeKind::Composite { .. })
    }

    /// Names of the types this descriptor references by value.
    pub fn references(&self) -> Vec<&str> {
        match &self.kind {
            TypeKind::Scalar(_) | TypeKind::Newtype { .. } => Vec::new(),
            TypeKind::Composite { fields } => fields
                .iter()
                .filter_map(|f| f.ty.referenced_name())
                .collect(),
            TypeKind::FixedArray { element, .. } => element.referenced_name().into_iter().collect(),
        }
    }
}
