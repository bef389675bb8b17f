// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 flowline contributors

//! Dependency resolution from dataset references
//!
//! Edges are inferred purely from the datasets each step declares as
//! read/written; nothing else about a step participates.

use std::collections::HashMap;
use tracing::debug;

use crate::dataset::DatasetRef;
use crate::flow::{Flow, StepId, StepStatus};
use crate::graph::DependencyGraph;

/// Infer the dependency graph of a closed flow.
///
/// Steps are processed in execution order against a map from dataset to the
/// most recent successful writer. Each input with a prior writer W yields an
/// edge W→S; each output of a successfully completed step replaces the
/// map entry (last writer wins; an overwritten writer no longer satisfies
/// later consumers). Failed steps stay in the graph as nodes but never
/// become edge sources. Inputs with no prior writer are external and yield
/// no edge.
pub fn resolve(flow: &Flow) -> DependencyGraph {
    let mut last_writer: HashMap<DatasetRef, StepId> = HashMap::new();
    let mut edges: Vec<(StepId, StepId)> = Vec::new();

    for step in &flow.steps {
        for input in &step.inputs {
            if let Some(&writer) = last_writer.get(input) {
                if writer != step.id {
                    debug!(from = writer, to = step.id, dataset = %input, "inferred edge");
                    edges.push((writer, step.id));
                }
            }
        }

        if step.status == StepStatus::Completed {
            for output in &step.outputs {
                last_writer.insert(output.clone(), step.id);
            }
        }
    }

    DependencyGraph::new(flow.steps.iter().map(|s| s.id), edges)
}
