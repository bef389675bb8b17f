// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 flowline contributors

//! Export command - generate a target artifact from a flow specification

use chrono::Utc;
use colored::Colorize;
use std::path::PathBuf;

use crate::errors::{FlowlineError, FlowlineResult};
use crate::export::{export, ExportTarget};
use crate::spec::FlowSpec;

/// Run the export command
pub fn run(flow_spec: PathBuf, to: String, out: PathBuf, verbose: bool) -> FlowlineResult<()> {
    let target: ExportTarget = to.parse()?;

    let spec = FlowSpec::read_from(&flow_spec)?;
    spec.validate()?;

    let artifact = export(&spec, target, Utc::now())?;

    std::fs::write(&out, &artifact.content).map_err(|e| FlowlineError::FileWriteError {
        path: out.clone(),
        error: e.to_string(),
    })?;

    println!(
        "  {} Exported flow '{}' to {} ({})",
        "✓".green(),
        spec.flow_name,
        out.display(),
        artifact.target
    );

    if verbose {
        println!(
            "    {} steps, {} edges, fingerprint {}",
            spec.steps.len(),
            spec.edges.len(),
            spec.fingerprint()?
        );
    }

    Ok(())
}
