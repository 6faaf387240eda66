// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use std::collections::BTreeSet;

/// Bookkeeping produced while emitting code.
///
/// Passed into each synthesis call and handed back with its output; callers
/// merge the contexts of independent units.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SynthContext {
    /// Crate paths the emitted code refers to.
    pub imports: BTreeSet<String>,
    /// Types whose `Marshallable` impl the emitted code calls into.
    pub marshallables: BTreeSet<String>,
    /// `Type.field` entries that may force a fallback to field-by-field.
    pub non_packed_fields: BTreeSet<String>,
}

impl SynthContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_import(&mut self, path: impl Into<String>) {
        self.imports.insert(path.into());
    }

    pub fn record_marshallable(&mut self, type_name: impl Into<String>) {
        self.marshallables.insert(type_name.into());
    }

    pub fn record_non_packed_field(&mut self, type_name: &str, field: &str) {
        self.non_packed_fields.insert(format!("{type_name}.{field}"));
    }

    pub fn merge(&mut self, other: SynthContext) {
        self.imports.extend(other.imports);
        self.marshallables.extend(other.marshallables);
        self.non_packed_fields.extend(other.non_packed_fields);
    }
}
