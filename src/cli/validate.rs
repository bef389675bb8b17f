// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 flowline contributors

//! Validate command - check a stored flow specification

use colored::Colorize;
use std::path::PathBuf;

use crate::errors::FlowlineResult;
use crate::spec::FlowSpec;

/// Run the validate command
pub fn run(flow_spec: PathBuf, verbose: bool) -> FlowlineResult<()> {
    println!("{}", "Validating flow specification...".bold());
    println!();

    let spec = match FlowSpec::read_from(&flow_spec) {
        Ok(spec) => spec,
        Err(e) => {
            eprintln!("  {} Failed to load document", "✗".red());
            return Err(e);
        }
    };
    println!("  {} Document parsed (schema version {})", "✓".green(), spec.schema_version);

    if let Err(e) = spec.validate() {
        eprintln!("  {} Structural validation failed", "✗".red());
        return Err(e);
    }
    println!(
        "  {} Structure is sound: {} steps, {} edges",
        "✓".green(),
        spec.steps.len(),
        spec.edges.len()
    );

    if verbose {
        println!("    flow '{}' run {}", spec.flow_name, spec.run_id);
        println!("    fingerprint {}", spec.fingerprint()?);
    }

    println!();
    println!("{}", "Specification is valid.".green().bold());
    Ok(())
}
