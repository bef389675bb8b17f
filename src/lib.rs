// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 flowline contributors

//! # flowline - Flow Capture and Pipeline Export Engine
//!
//! `flowline` records a sequence of logical execution steps, infers the
//! dependency graph between them from the datasets they declare as
//! read/written, validates the graph, and deterministically compiles it
//! into pipeline scaffolds, diagrams, and a portable interchange document.
//!
//! ## Capturing a flow
//!
//! ```
//! use flowline::dataset::DatasetRef;
//! use flowline::flow::{ComponentType, FlowRegistry};
//! use flowline::spec::FlowSpec;
//!
//! # fn main() -> flowline::errors::FlowlineResult<()> {
//! let registry = FlowRegistry::new();
//! registry.open_flow("demo")?;
//!
//! let load = registry.open_step("load", ComponentType::Loader)?;
//! load.mark_output(DatasetRef::file("accounts.csv"));
//! load.complete()?;
//!
//! let clean = registry.open_step("clean", ComponentType::Transformer)?;
//! clean.mark_input(DatasetRef::file("accounts.csv"));
//! clean.mark_output(DatasetRef::file("accounts.parquet"));
//! clean.complete()?;
//!
//! let flow = registry.close_flow()?;
//! let spec = FlowSpec::from_flow(&flow)?;
//! assert_eq!(spec.edges, vec![(0, 1)]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Exporting
//!
//! ```bash
//! # Generate an orchestrator scaffold
//! flowline export --flow-spec demo.flow.json --to pipeline --out demo.yaml
//!
//! # Render the lineage diagram
//! flowline lineage --flow-spec demo.flow.json --format diagram
//! ```

pub mod cli;
pub mod config;
pub mod dataset;
pub mod errors;
pub mod export;
pub mod flow;
pub mod graph;
pub mod spec;

// Re-export commonly used types
pub use config::Settings;
pub use dataset::DatasetRef;
pub use errors::{FlowlineError, FlowlineResult};
pub use export::{export, Artifact, ExportTarget};
pub use flow::{ComponentType, Flow, FlowRegistry, StepGuard, StepRecord, StepStatus};
pub use graph::{resolve, DependencyGraph, Validator};
pub use spec::{FlowSpec, SCHEMA_VERSION};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
