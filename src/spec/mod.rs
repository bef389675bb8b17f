// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 flowline contributors

//! Flow specification document
//!
//! The [`FlowSpec`] is the sole persisted artifact exchanged between the
//! capture and export phases. Edges are persisted rather than re-derived on
//! load, so a reloaded document reproduces byte-for-byte regardless of
//! later resolver changes. Field order is fixed by declaration and all maps
//! are ordered, which makes [`FlowSpec::canonical_bytes`] stable: two
//! builds from an identical capture differ only in timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;
use uuid::Uuid;

use crate::errors::{FlowlineError, FlowlineResult};
use crate::flow::{Flow, StepId, StepRecord};
use crate::graph::{resolve, DependencyGraph, Validator};

/// Document schema version
pub const SCHEMA_VERSION: u32 = 1;

/// Versioned projection of a validated flow
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlowSpec {
    pub schema_version: u32,
    pub flow_id: Uuid,
    pub flow_name: String,
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
    pub steps: Vec<StepRecord>,
    /// Resolved producer→consumer pairs, sorted
    pub edges: Vec<(StepId, StepId)>,
}

impl FlowSpec {
    /// Project a closed flow into a document.
    ///
    /// Resolves the dependency graph and validates it first; a failing flow
    /// produces no document.
    pub fn from_flow(flow: &Flow) -> FlowlineResult<Self> {
        let graph = resolve(flow);
        Validator::validate(flow, &graph)?;

        info!(
            flow = %flow.name,
            steps = flow.steps.len(),
            edges = graph.edges().len(),
            "built flow specification"
        );

        Ok(Self {
            schema_version: SCHEMA_VERSION,
            flow_id: flow.id,
            flow_name: flow.name.clone(),
            run_id: flow.run_id,
            started_at: flow.started_at,
            ended_at: flow.ended_at,
            steps: flow.steps.clone(),
            edges: graph.edges().to_vec(),
        })
    }

    /// Re-validate this document's structure.
    ///
    /// Runs the same checks as [`from_flow`](Self::from_flow) against the
    /// persisted steps and edge list; used for reloaded documents, which
    /// carry no by-construction guarantees.
    pub fn validate(&self) -> FlowlineResult<()> {
        Validator::validate(&self.to_flow(), &self.graph())
    }

    /// Dependency graph over the persisted edge list (not re-derived).
    pub fn graph(&self) -> DependencyGraph {
        DependencyGraph::new(self.steps.iter().map(|s| s.id), self.edges.iter().copied())
    }

    /// Reconstruct the equivalent in-memory flow.
    pub fn to_flow(&self) -> Flow {
        Flow {
            id: self.flow_id,
            name: self.flow_name.clone(),
            run_id: self.run_id,
            steps: self.steps.clone(),
            started_at: self.started_at,
            ended_at: self.ended_at,
            closed: true,
        }
    }

    /// Canonical JSON encoding with stable key order.
    pub fn to_json(&self) -> FlowlineResult<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }

    /// Parse a document previously produced by [`to_json`](Self::to_json).
    pub fn from_json(json: &str) -> FlowlineResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// The canonical bytes of this document.
    pub fn canonical_bytes(&self) -> FlowlineResult<Vec<u8>> {
        Ok(self.to_json()?.into_bytes())
    }

    /// BLAKE3 hex digest of the canonical bytes.
    ///
    /// Two documents built from an identical capture share a fingerprint.
    pub fn fingerprint(&self) -> FlowlineResult<String> {
        Ok(blake3::hash(&self.canonical_bytes()?).to_hex().to_string())
    }

    /// Write the canonical document to a file.
    pub fn write_to(&self, path: &Path) -> FlowlineResult<()> {
        let bytes = self.canonical_bytes()?;
        std::fs::write(path, bytes).map_err(|e| FlowlineError::FileWriteError {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Load a document from a file.
    pub fn read_from(path: &Path) -> FlowlineResult<Self> {
        let json =
            std::fs::read_to_string(path).map_err(|e| FlowlineError::FileReadError {
                path: path.to_path_buf(),
                error: e.to_string(),
            })?;
        Self::from_json(&json)
    }
}
