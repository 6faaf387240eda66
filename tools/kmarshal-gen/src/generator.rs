// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Batch generation over a whole registry.

use crate::config::{ConfigError, GeneratorConfig};
use crate::declared::TypeDecl;
use crate::descriptor::{TypeDescriptor, TypeKind};
use crate::error::Diagnostic;
use crate::layout::{LayoutAnalyzer, LayoutVerdict};
use crate::registry::TypeRegistry;
use crate::synth::{emit_definition, synthesize, SynthContext, SynthOptions};
use crate::typeset::TypeSetFile;
use proc_macro2::TokenStream;
use std::path::Path;

/// Generated code for one type.
#[derive(Debug, Clone)]
pub struct GeneratedUnit {
    pub type_name: String,
    pub verdict: LayoutVerdict,
    pub tokens: TokenStream,
}

/// Result of a generation pass.
#[derive(Debug, Clone, Default)]
pub struct GenerationReport {
    pub units: Vec<GeneratedUnit>,
    /// Every fatal diagnostic, sorted by type name.
    pub failures: Vec<Diagnostic>,
    pub context: SynthContext,
}

impl GenerationReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn unit(&self, type_name: &str) -> Option<&GeneratedUnit> {
        self.units.iter().find(|u| u.type_name == type_name)
    }

    /// Emitted code as source text, one item group per type.
    pub fn render(&self) -> String {
        self.units
            .iter()
            .map(|u| u.tokens.to_string())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Log a one-line summary plus each failure.
    pub fn summary(&self) {
        let packed = self.units.iter().filter(|u| u.verdict.packed).count();
        tracing::info!(
            "generated {} types ({} statically packed, {} field-by-field), {} failed",
            self.units.len(),
            packed,
            self.units.len() - packed,
            self.failures.len()
        );
        for failure in &self.failures {
            tracing::error!("{}", failure);
        }
    }
}

/// Drives validation, layout analysis and synthesis for a set of types.
pub struct Generator {
    config: GeneratorConfig,
    options: SynthOptions,
    derives: Vec<syn::Path>,
    registry: TypeRegistry,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let options = config.synth_options()?;
        let derives = config.derive_paths()?;
        Ok(Self {
            config,
            options,
            derives,
            registry: TypeRegistry::new(),
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn register(&mut self, desc: TypeDescriptor) -> Result<(), Diagnostic> {
        self.registry.register(desc)
    }

    pub fn declare(&mut self, decl: &TypeDecl) -> Result<(), Diagnostic> {
        self.registry.declare(decl)
    }

    /// Declare every entry of a type-set file.
    ///
    /// Rejected declarations are kept by the registry and reported by
    /// [`Generator::generate`]; only file-level problems are returned here.
    /// Returns the number of declarations that were registered.
    pub fn load_type_set<P: AsRef<Path>>(&mut self, path: P) -> Result<usize, ConfigError> {
        let path = path.as_ref();
        let decls = TypeSetFile::from_file(path)?.into_decls(&path.display().to_string())?;
        let total = decls.len();
        let accepted = decls
            .iter()
            .filter(|decl| self.registry.declare(decl).is_ok())
            .count();
        tracing::debug!(
            "loaded {} of {} declarations from {}",
            accepted,
            total,
            path.display()
        );
        Ok(accepted)
    }

    /// Analyze and synthesize every registered type.
    ///
    /// One failing type does not stop the pass; its dependents fail with it.
    pub fn generate(&self) -> GenerationReport {
        let mut analyzer = LayoutAnalyzer::new(&self.registry, self.config.resolution);
        let mut report = GenerationReport {
            failures: self.registry.rejections().cloned().collect(),
            ..Default::default()
        };

        for desc in self.registry.iter() {
            if matches!(desc.kind, TypeKind::Scalar(_)) {
                continue;
            }
            match self.generate_one(&mut analyzer, desc) {
                Ok((unit, context)) => {
                    report.context.merge(context);
                    report.units.push(unit);
                }
                Err(diag) => report.failures.push(diag),
            }
        }

        report
            .failures
            .sort_by(|a, b| a.type_name.cmp(&b.type_name));
        report
    }

    fn generate_one(
        &self,
        analyzer: &mut LayoutAnalyzer<'_>,
        desc: &TypeDescriptor,
    ) -> Result<(GeneratedUnit, SynthContext), Diagnostic> {
        let verdict = analyzer.analyze(&desc.name)?;
        let synthesized = synthesize(desc, &verdict, &self.options, SynthContext::new())
            .map_err(|d| d.with_location(desc.location.clone()))?;

        let mut tokens = TokenStream::new();
        if self.config.emit_definitions {
            tokens.extend(
                emit_definition(desc, &self.derives, self.config.emit_docs)
                    .map_err(|d| d.with_location(desc.location.clone()))?,
            );
        }
        tokens.extend(synthesized.tokens);

        Ok((
            GeneratedUnit {
                type_name: desc.name.clone(),
                verdict,
                tokens,
            },
            synthesized.context,
        ))
    }
}
