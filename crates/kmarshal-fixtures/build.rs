// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use kmarshal_gen::{Generator, GeneratorConfig};
use std::env;
use std::path::PathBuf;

fn main() {
    if let Err(e) = try_main() {
        eprintln!("Error generating fixture types: {e}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<(), Box<dyn std::error::Error>> {
    let crate_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let out_path = PathBuf::from(env::var("OUT_DIR")?).join("abi.rs");

    let config = GeneratorConfig::from_file(crate_dir.join("kmarshal.toml"))?;
    let mut generator = Generator::new(config)?;
    generator.load_type_set(crate_dir.join("abi.toml"))?;

    let report = generator.generate();
    if let Some(failure) = report.failures.first() {
        let failed = report.failures.len();
        return Err(format!("{failed} fixture types failed, first: {failure}").into());
    }
    std::fs::write(&out_path, report.render())?;

    println!("cargo:rerun-if-changed=kmarshal.toml");
    println!("cargo:rerun-if-changed=abi.toml");
    Ok(())
}
