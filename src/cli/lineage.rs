// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 flowline contributors

//! Lineage command - print a flow's dependency structure

use chrono::Utc;
use std::path::PathBuf;

use super::LineageFormat;
use crate::errors::FlowlineResult;
use crate::export::{export, ExportTarget};
use crate::spec::FlowSpec;

/// Run the lineage command
pub fn run(flow_spec: PathBuf, format: LineageFormat, _verbose: bool) -> FlowlineResult<()> {
    let spec = FlowSpec::read_from(&flow_spec)?;
    spec.validate()?;

    let target = match format {
        LineageFormat::Diagram => ExportTarget::Mermaid,
        LineageFormat::Document => ExportTarget::Document,
    };

    let artifact = export(&spec, target, Utc::now())?;
    print!("{}", artifact.content);

    Ok(())
}
