// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # kmarshal-gen
//!
//! Build-time half of kmarshal: describes fixed-layout types, decides which
//! of them are packed, and emits their `kmarshal::Marshallable` impls.
//!
//! ## Pipeline
//!
//! ```text
//! declaration -> validate -> TypeRegistry -> LayoutAnalyzer -> synthesize
//!   (syn / TOML)   (reject      (by-name       (size, packed,     (unsafe impl
//!                   bad types)   lookup)        cycles)            Marshallable)
//! ```
//!
//! The same pipeline backs `#[derive(Marshallable)]` (see [`derive`]) and the
//! batch [`Generator`], which works over a whole type set and can also emit
//! the type definitions.
//!
//! ## Example
//!
//! ```rust
//! use kmarshal_gen::{Generator, GeneratorConfig, ScalarKind, TypeDescriptorBuilder};
//!
//! let mut generator = Generator::new(GeneratorConfig::default()).unwrap();
//! generator
//!     .register(
//!         TypeDescriptorBuilder::composite("Point")
//!             .field("x", ScalarKind::I32)
//!             .field("y", ScalarKind::I32)
//!             .build(),
//!     )
//!     .unwrap();
//!
//! let report = generator.generate();
//! assert!(report.is_success());
//! assert!(report.unit("Point").unwrap().verdict.packed);
//! ```

pub mod builder;
pub mod config;
pub mod declared;
pub mod derive;
pub mod descriptor;
pub mod error;
pub mod generator;
pub mod layout;
pub mod registry;
pub mod synth;
pub mod typeset;
pub mod validate;

pub use builder::TypeDescriptorBuilder;
pub use config::{ConfigError, GeneratorConfig};
pub use declared::{DeclBody, DeclaredType, FieldDecl, TypeDecl};
pub use descriptor::{FieldDescriptor, FieldType, ScalarKind, TypeDescriptor, TypeKind};
pub use error::{Diagnostic, DiagnosticKind, SourceLocation};
pub use generator::{GeneratedUnit, GenerationReport, Generator};
pub use layout::{Capability, FieldLayout, LayoutAnalyzer, LayoutVerdict, Resolution, SizeExpr};
pub use registry::{TypeLookup, TypeRegistry};
pub use synth::{synthesize, SynthContext, SynthOptions, Synthesized};
pub use typeset::TypeSetFile;
