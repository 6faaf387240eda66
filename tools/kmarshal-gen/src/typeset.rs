// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! TOML type-set files.
//!
//! ```toml
//! [[type]]
//! name = "Point"
//! fields = [{ name = "x", type = "i32" }, { name = "y", type = "i32" }]
//!
//! [[type]]
//! name = "Fd"
//! newtype = "i32"
//!
//! [[type]]
//! name = "SigSet"
//! array = "[u64; 1]"
//! ```

use crate::config::ConfigError;
use crate::declared::{DeclBody, DeclaredType, FieldDecl, TypeDecl};
use crate::error::SourceLocation;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A whole type-set file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeSetFile {
    #[serde(rename = "type", default)]
    pub types: Vec<TypeEntry>,
}

/// One `[[type]]` entry; exactly one of `fields`, `newtype` or `array` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub newtype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub array: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

impl TypeSetFile {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Lower every entry into a declaration located in `file`.
    pub fn into_decls(self, file: &str) -> Result<Vec<TypeDecl>, ConfigError> {
        self.types
            .into_iter()
            .map(|entry| entry.into_decl(file))
            .collect()
    }
}

impl TypeEntry {
    fn into_decl(self, file: &str) -> Result<TypeDecl, ConfigError> {
        let body = match (self.fields, self.newtype, self.array) {
            (Some(fields), None, None) => DeclBody::Struct(
                fields
                    .into_iter()
                    .map(|f| Ok(FieldDecl::new(f.name, parse_type(&f.ty)?)))
                    .collect::<Result<Vec<_>, ConfigError>>()?,
            ),
            (None, Some(base), None) => DeclBody::Newtype(parse_type(&base)?),
            (None, None, Some(array)) => DeclBody::Array(parse_type(&array)?),
            _ => {
                return Err(ConfigError::Invalid(format!(
                    "type '{}' must set exactly one of 'fields', 'newtype' or 'array'",
                    self.name
                )))
            }
        };
        Ok(TypeDecl::new(self.name, body).at(SourceLocation::file(file)))
    }
}

fn parse_type(src: &str) -> Result<DeclaredType, ConfigError> {
    DeclaredType::parse(src).map_err(|e| ConfigError::Parse {
        entry: src.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [[type]]
        name = "Point"
        fields = [{ name = "x", type = "i32" }, { name = "y", type = "i32" }]

        [[type]]
        name = "Fd"
        newtype = "int32"

        [[type]]
        name = "SigSet"
        array = "[u64; 1]"
    "#;

    #[test]
    fn test_lower_all_entry_kinds() {
        let decls = TypeSetFile::parse(SAMPLE).unwrap().into_decls("abi.toml").unwrap();
        assert_eq!(decls.len(), 3);
        assert!(matches!(&decls[0].body, DeclBody::Struct(f) if f.len() == 2));
        assert!(matches!(&decls[1].body, DeclBody::Newtype(DeclaredType::Path(p)) if p == "int32"));
        assert!(matches!(&decls[2].body, DeclBody::Array(DeclaredType::Array { length: 1, .. })));
        assert_eq!(decls[2].location, Some(SourceLocation::file("abi.toml")));
    }

    #[test]
    fn test_entry_with_two_bodies_rejected() {
        let err = TypeSetFile::parse(
            r#"
            [[type]]
            name = "Bad"
            newtype = "u32"
            array = "[u8; 4]"
            "#,
        )
        .unwrap()
        .into_decls("bad.toml")
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_unparseable_type_rejected() {
        let err = TypeSetFile::parse(
            r#"
            [[type]]
            name = "Bad"
            fields = [{ name = "x", type = "[u8;" }]
            "#,
        )
        .unwrap()
        .into_decls("bad.toml")
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
