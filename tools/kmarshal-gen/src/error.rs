// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Build-time diagnostics.
//!
//! Every failure of the generation pass is fatal for the type it names and for
//! every type that depends on it. A [`Diagnostic`] always carries the type
//! name, and the field and source location when they are known.

use std::fmt;
use thiserror::Error;

/// Position of a declaration in its source (Rust file or type-set file).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SourceLocation {
    pub file: String,
    /// 1-based line, `0` when unknown.
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    /// Location that only names a file (type-set entries have no line info).
    pub fn file(file: impl Into<String>) -> Self {
        Self::new(file, 0, 0)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line == 0 {
            write!(f, "{}", self.file)
        } else {
            write!(f, "{}:{}:{}", self.file, self.line, self.column)
        }
    }
}

/// What went wrong, independent of where.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiagnosticKind {
    #[error("type '{found}' has ambiguous width, use {suggestion}")]
    AmbiguousWidth {
        found: String,
        suggestion: &'static str,
    },
    #[error(
        "type '{found}' is dynamically-sized and cannot be marshalled, \
         use a fixed size byte array '[u8; N]' instead"
    )]
    DynamicallySized { found: String },
    #[error("type '{found}' has invalid bit patterns and cannot be read from raw bytes, use {suggestion}")]
    InvalidBitPatterns {
        found: String,
        suggestion: &'static str,
    },
    #[error("type '{found}' cannot be marshalled")]
    UnsupportedType { found: String },
    #[error("field is declared more than once")]
    DuplicateField,
    #[error("declaration has an empty name")]
    EmptyName,
    #[error("newtype base '{found}' is not a fixed-width scalar")]
    InvalidNewtypeBase { found: String },
    #[error("type is already registered")]
    DuplicateType,
    #[error("reference to unknown type '{name}'")]
    UnresolvedType { name: String },
    #[error("type contains itself by value ({})", .cycle.join(" -> "))]
    CyclicType { cycle: Vec<String> },
    #[error("depends on '{dependency}', which failed to generate")]
    DependencyFailed { dependency: String },
    #[error("{reason}")]
    UnsupportedLayout { reason: String },
    #[error("{0}")]
    Custom(String),
}

/// A fatal build-time failure naming the offending declaration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "{}{}{}: {}",
    location_prefix(.location),
    .type_name,
    field_suffix(.field),
    .kind
)]
pub struct Diagnostic {
    pub type_name: String,
    pub field: Option<String>,
    pub location: Option<SourceLocation>,
    #[source]
    pub kind: DiagnosticKind,
}

fn location_prefix(location: &Option<SourceLocation>) -> String {
    location
        .as_ref()
        .map(|loc| format!("{loc}: "))
        .unwrap_or_default()
}

fn field_suffix(field: &Option<String>) -> String {
    field.as_ref().map(|f| format!(".{f}")).unwrap_or_default()
}

impl Diagnostic {
    pub fn new(type_name: impl Into<String>, kind: DiagnosticKind) -> Self {
        Self {
            type_name: type_name.into(),
            field: None,
            location: None,
            kind,
        }
    }

    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    #[must_use]
    pub fn with_location(mut self, location: Option<SourceLocation>) -> Self {
        if self.location.is_none() {
            self.location = location;
        }
        self
    }

    /// True for failures caused by a by-value containment cycle.
    pub fn is_cycle(&self) -> bool {
        matches!(self.kind, DiagnosticKind::CyclicType { .. })
    }
}
