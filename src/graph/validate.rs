// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 flowline contributors

//! Structural validation of a flow and its resolved graph
//!
//! Validation is all-or-nothing: a failing flow produces no document and no
//! exporter runs against it.

use std::collections::HashSet;

use crate::errors::{FlowlineError, FlowlineResult};
use crate::flow::{Flow, StepId};
use crate::graph::DependencyGraph;

/// Structural validator
///
/// The registry upholds these invariants during capture, but a reloaded
/// document has no such guarantee, so every export path re-checks them.
pub struct Validator;

impl Validator {
    /// Check all structural invariants, failing with the first violation.
    pub fn validate(flow: &Flow, graph: &DependencyGraph) -> FlowlineResult<()> {
        Self::check_unique_ids(flow)?;
        Self::check_parents(flow)?;
        Self::check_no_self_dependency(flow, graph)?;
        Self::check_acyclic(flow, graph)?;
        Ok(())
    }

    fn check_unique_ids(flow: &Flow) -> FlowlineResult<()> {
        let mut seen = HashSet::new();
        for step in &flow.steps {
            if !seen.insert(step.id) {
                return Err(FlowlineError::DuplicateStepId { id: step.id });
            }
        }
        Ok(())
    }

    /// Every parent_id must reference an earlier step of the same flow:
    /// nesting forms a tree, never a forward or external reference.
    fn check_parents(flow: &Flow) -> FlowlineResult<()> {
        for step in &flow.steps {
            if let Some(parent) = step.parent_id {
                let dangling = parent >= step.id || flow.step(parent).is_none();
                if dangling {
                    return Err(FlowlineError::DanglingParent {
                        step: step.name.clone(),
                        id: step.id,
                        parent,
                    });
                }
            }
        }
        Ok(())
    }

    fn check_no_self_dependency(flow: &Flow, graph: &DependencyGraph) -> FlowlineResult<()> {
        for &(from, to) in graph.edges() {
            if from == to {
                return Err(FlowlineError::SelfDependency {
                    step: step_name(flow, from),
                });
            }
        }
        Ok(())
    }

    /// Defensive re-check: resolver edges are acyclic by construction, but
    /// a future resolver change or a hand-edited document could break that.
    fn check_acyclic(flow: &Flow, graph: &DependencyGraph) -> FlowlineResult<()> {
        match graph.topo_order() {
            Ok(_) => Ok(()),
            Err(stuck) => Err(FlowlineError::CycleDetected {
                steps: stuck.into_iter().map(|id| step_name(flow, id)).collect(),
            }),
        }
    }
}

fn step_name(flow: &Flow, id: StepId) -> String {
    flow.step(id)
        .map(|s| s.name.clone())
        .unwrap_or_else(|| format!("#{}", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::{ComponentType, StepRecord, StepStatus};
    use chrono::Utc;
    use std::collections::BTreeMap;
    use uuid::Uuid;

    fn step(id: StepId, parent_id: Option<StepId>) -> StepRecord {
        StepRecord {
            id,
            name: format!("step-{}", id),
            component_type: ComponentType::Other,
            parent_id,
            inputs: vec![],
            outputs: vec![],
            status: StepStatus::Completed,
            started_at: Utc::now(),
            ended_at: Some(Utc::now()),
            attachments: BTreeMap::new(),
        }
    }

    fn flow_with(steps: Vec<StepRecord>) -> Flow {
        Flow {
            id: Uuid::new_v4(),
            name: "test".into(),
            run_id: Uuid::new_v4(),
            steps,
            started_at: Utc::now(),
            ended_at: Some(Utc::now()),
            closed: true,
        }
    }

    fn graph_for(flow: &Flow, edges: Vec<(StepId, StepId)>) -> DependencyGraph {
        DependencyGraph::new(flow.steps.iter().map(|s| s.id), edges)
    }

    #[test]
    fn test_valid_flow_passes() {
        let flow = flow_with(vec![step(0, None), step(1, Some(0)), step(2, None)]);
        let graph = graph_for(&flow, vec![(0, 2)]);
        Validator::validate(&flow, &graph).unwrap();
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let flow = flow_with(vec![step(0, None), step(0, None)]);
        let graph = graph_for(&flow, vec![]);
        let err = Validator::validate(&flow, &graph).unwrap_err();
        assert!(matches!(err, FlowlineError::DuplicateStepId { id: 0 }));
    }

    #[test]
    fn test_forward_parent_reference_rejected() {
        let flow = flow_with(vec![step(0, Some(1)), step(1, None)]);
        let graph = graph_for(&flow, vec![]);
        let err = Validator::validate(&flow, &graph).unwrap_err();
        assert!(matches!(err, FlowlineError::DanglingParent { parent: 1, .. }));
    }

    #[test]
    fn test_external_parent_reference_rejected() {
        let flow = flow_with(vec![step(0, None), step(1, Some(7))]);
        let graph = graph_for(&flow, vec![]);
        let err = Validator::validate(&flow, &graph).unwrap_err();
        assert!(matches!(err, FlowlineError::DanglingParent { parent: 7, .. }));
    }

    #[test]
    fn test_cycle_rejected() {
        // edges of a hand-edited document; the resolver never produces these
        let flow = flow_with(vec![step(0, None), step(1, None), step(2, None)]);
        let graph = graph_for(&flow, vec![(0, 1), (1, 2), (2, 0)]);
        let err = Validator::validate(&flow, &graph).unwrap_err();
        match err {
            FlowlineError::CycleDetected { steps } => {
                assert_eq!(steps, vec!["step-0", "step-1", "step-2"]);
            }
            other => panic!("expected CycleDetected, got {:?}", other),
        }
    }

    #[test]
    fn test_self_dependency_rejected() {
        let flow = flow_with(vec![step(0, None)]);
        let graph = graph_for(&flow, vec![(0, 0)]);
        let err = Validator::validate(&flow, &graph).unwrap_err();
        assert!(matches!(err, FlowlineError::SelfDependency { .. }));
    }
}
