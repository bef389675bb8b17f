// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 flowline contributors

//! Error types for capture, validation, and export
//!
//! Errors carry the offending step and dataset identifiers so a failing
//! flow can be diagnosed without re-running the capture.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

use crate::flow::StepId;

/// Result type for flowline operations
pub type FlowlineResult<T> = Result<T, FlowlineError>;

/// Main error type for flowline
#[derive(Error, Debug, Diagnostic)]
pub enum FlowlineError {
    // ─────────────────────────────────────────────────────────────────────────
    // Usage Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Flow '{name}' is already open")]
    #[diagnostic(
        code(flowline::flow_already_open),
        help("Close the active flow before opening a new one; nested flows are not merged")
    )]
    FlowAlreadyOpen { name: String },

    #[error("No flow is open")]
    #[diagnostic(
        code(flowline::no_open_flow),
        help("Call open_flow() before opening steps")
    )]
    NoOpenFlow,

    #[error("No step is open for {operation}")]
    #[diagnostic(code(flowline::no_open_step))]
    NoOpenStep { operation: String },

    #[error("Step '{found}' closed out of order; innermost open step is '{expected}'")]
    #[diagnostic(
        code(flowline::out_of_order_close),
        help("Steps must close in reverse order of opening, deepest first")
    )]
    OutOfOrderClose { expected: String, found: String },

    #[error("Step '{step}' already reached a terminal status")]
    #[diagnostic(code(flowline::step_already_closed))]
    StepAlreadyClosed { step: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Structural Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Cannot close flow: {count} step(s) still open: {steps:?}")]
    #[diagnostic(
        code(flowline::unclosed_steps),
        help("Close every open step, deepest first, before closing the flow")
    )]
    UnclosedSteps { count: usize, steps: Vec<String> },

    #[error("Step '{step}' (id {id}) references parent id {parent} which is not an earlier step")]
    #[diagnostic(code(flowline::dangling_parent))]
    DanglingParent {
        step: String,
        id: StepId,
        parent: StepId,
    },

    #[error("Duplicate step id {id}")]
    #[diagnostic(code(flowline::duplicate_step_id))]
    DuplicateStepId { id: StepId },

    #[error("Cycle detected in dependency graph")]
    #[diagnostic(
        code(flowline::cycle_detected),
        help("Dependency edges must always point from an earlier step to a later one")
    )]
    CycleDetected { steps: Vec<String> },

    #[error("Step '{step}' depends on itself")]
    #[diagnostic(code(flowline::self_dependency))]
    SelfDependency { step: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Export Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Unknown export target: '{target}'")]
    #[diagnostic(
        code(flowline::unknown_target),
        help("Available targets: pipeline, mermaid, dot, text, document")
    )]
    UnknownTarget { target: String },

    #[error("Internal ordering failure during export: {detail}")]
    #[diagnostic(
        code(flowline::ordering_failure),
        help("The document's edge list does not admit a topological order; it may have been edited by hand. Run 'flowline validate' against it.")
    )]
    OrderingFailure { detail: String },

    // ─────────────────────────────────────────────────────────────────────────
    // IO/Serialization Errors (boundary only)
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Failed to read file '{path}': {error}")]
    #[diagnostic(code(flowline::file_read_error))]
    FileReadError { path: PathBuf, error: String },

    #[error("Failed to write file '{path}': {error}")]
    #[diagnostic(code(flowline::file_write_error))]
    FileWriteError { path: PathBuf, error: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(flowline::io_error))]
    Io { message: String },

    #[error("JSON error: {message}")]
    #[diagnostic(code(flowline::json_error))]
    Json { message: String },

    #[error("YAML error: {message}")]
    #[diagnostic(code(flowline::yaml_error))]
    Yaml { message: String },
}

impl From<std::io::Error> for FlowlineError {
    fn from(e: std::io::Error) -> Self {
        Self::Io { message: e.to_string() }
    }
}

impl From<serde_json::Error> for FlowlineError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json { message: e.to_string() }
    }
}

impl From<serde_yaml::Error> for FlowlineError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Yaml { message: e.to_string() }
    }
}

impl FlowlineError {
    /// Process exit code for the CLI surface.
    ///
    /// 1 = validation/resolution failure, 2 = I/O failure,
    /// 3 = unsupported export target.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::UnknownTarget { .. } => 3,
            Self::FileReadError { .. }
            | Self::FileWriteError { .. }
            | Self::Io { .. }
            | Self::Json { .. }
            | Self::Yaml { .. } => 2,
            _ => 1,
        }
    }

    /// True for errors raised by out-of-order registry calls.
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            Self::FlowAlreadyOpen { .. }
                | Self::NoOpenFlow
                | Self::NoOpenStep { .. }
                | Self::OutOfOrderClose { .. }
                | Self::StepAlreadyClosed { .. }
        )
    }

    /// True for structural invariant violations.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::UnclosedSteps { .. }
                | Self::DanglingParent { .. }
                | Self::DuplicateStepId { .. }
                | Self::CycleDetected { .. }
                | Self::SelfDependency { .. }
        )
    }
}
