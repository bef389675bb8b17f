// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 flowline contributors

//! flowline - flow capture and pipeline export engine
//!
//! Translates the core error taxonomy to process exit codes:
//! 0 success, 1 validation/resolution failure, 2 I/O failure,
//! 3 unsupported export target.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use flowline::cli::{Cli, Commands};

fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flowline=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();

    // Dispatch to command handlers
    let result = match cli.command {
        Commands::Export { flow_spec, to, out } => {
            flowline::cli::export::run(flow_spec, to, out, cli.verbose)
        }
        Commands::Lineage { flow_spec, format } => {
            flowline::cli::lineage::run(flow_spec, format, cli.verbose)
        }
        Commands::Validate { flow_spec } => flowline::cli::validate::run(flow_spec, cli.verbose),
    };

    if let Err(error) = result {
        let code = error.exit_code();
        eprintln!("{:?}", miette::Report::new(error));
        std::process::exit(code);
    }
}
