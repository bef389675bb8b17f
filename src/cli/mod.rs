// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 flowline contributors

//! CLI command definitions and handlers
//!
//! Thin surface over the core: commands parse flags, load the flow
//! specification document, and invoke the export contract. Error kinds map
//! to process exit codes in `main`.

pub mod export;
pub mod lineage;
pub mod validate;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Flow capture and pipeline export engine
#[derive(Parser, Debug)]
#[clap(
    name = "flowline",
    version,
    about = "Export captured flow specifications to pipeline scaffolds and diagrams",
    long_about = None,
    after_help = "Examples:\n\
        flowline export --flow-spec demo.flow.json --to pipeline --out demo.yaml\n\
        flowline export --flow-spec demo.flow.json --to mermaid --out demo.mmd\n\
        flowline lineage --flow-spec demo.flow.json --format diagram\n\
        flowline validate demo.flow.json\n\n\
        See 'flowline <command> --help' for more information on a specific command."
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[clap(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export a flow specification to a target artifact
    Export {
        /// Flow specification document
        #[clap(long, value_name = "DOC", env = "FLOWLINE_FLOW_SPEC")]
        flow_spec: PathBuf,

        /// Export target (pipeline, mermaid, dot, text, document)
        #[clap(long, value_name = "TARGET")]
        to: String,

        /// Output file path
        #[clap(long, value_name = "PATH")]
        out: PathBuf,
    },

    /// Print the lineage of a flow specification
    Lineage {
        /// Flow specification document
        #[clap(long, value_name = "DOC", env = "FLOWLINE_FLOW_SPEC")]
        flow_spec: PathBuf,

        /// Output format
        #[clap(short, long, default_value = "diagram")]
        format: LineageFormat,
    },

    /// Validate a stored flow specification
    Validate {
        /// Flow specification document
        flow_spec: PathBuf,
    },
}

/// Lineage output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LineageFormat {
    /// Mermaid dependency diagram
    Diagram,
    /// Canonical specification document
    Document,
}
