// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 flowline contributors

//! Exporters
//!
//! Each exporter turns a flow specification into one target-specific
//! artifact. All exporters are pure: given the same document and the same
//! injected generation timestamp they produce identical bytes.
//!
//! Shared preprocessing computes a deterministic topological order (Kahn's
//! algorithm, original execution order as the tie-break), classifies
//! orchestrator steps with children as grouping labels rather than tasks,
//! and assigns each task a sanitized, collision-free identifier.

mod diagram;
mod document;
mod scaffold;

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::errors::{FlowlineError, FlowlineResult};
use crate::flow::{ComponentType, StepId, StepRecord};
use crate::graph::DependencyGraph;
use crate::spec::FlowSpec;

/// Closed set of export targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportTarget {
    /// Generic task/DAG scaffold (YAML pipeline document)
    Pipeline,
    /// Mermaid flowchart diagram
    Mermaid,
    /// Graphviz DOT diagram
    Dot,
    /// Plain-text execution order listing
    Text,
    /// Canonical specification bytes (identity re-emit)
    Document,
}

impl ExportTarget {
    /// Conventional file extension for the artifact.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Pipeline => "yaml",
            Self::Mermaid => "mmd",
            Self::Dot => "dot",
            Self::Text => "txt",
            Self::Document => "json",
        }
    }
}

impl std::fmt::Display for ExportTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Pipeline => "pipeline",
            Self::Mermaid => "mermaid",
            Self::Dot => "dot",
            Self::Text => "text",
            Self::Document => "document",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for ExportTarget {
    type Err = FlowlineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pipeline" => Ok(Self::Pipeline),
            "mermaid" => Ok(Self::Mermaid),
            "dot" => Ok(Self::Dot),
            "text" => Ok(Self::Text),
            "document" => Ok(Self::Document),
            other => Err(FlowlineError::UnknownTarget {
                target: other.to_string(),
            }),
        }
    }
}

/// One generated export artifact
#[derive(Debug, Clone)]
pub struct Artifact {
    pub target: ExportTarget,
    pub content: String,
}

/// Generate the artifact for `target`.
///
/// `generated_at` is injected rather than read ambiently so repeated
/// exports can be pinned to identical output.
pub fn export(
    spec: &FlowSpec,
    target: ExportTarget,
    generated_at: DateTime<Utc>,
) -> FlowlineResult<Artifact> {
    let plan = ExportPlan::build(spec)?;
    let content = match target {
        ExportTarget::Pipeline => scaffold::render(&plan, generated_at)?,
        ExportTarget::Mermaid => diagram::render_mermaid(&plan, generated_at),
        ExportTarget::Dot => diagram::render_dot(&plan, generated_at),
        ExportTarget::Text => diagram::render_text(&plan, generated_at),
        ExportTarget::Document => document::render(plan.spec)?,
    };
    Ok(Artifact { target, content })
}

/// Shared, target-independent view of a specification
pub(crate) struct ExportPlan<'a> {
    pub spec: &'a FlowSpec,
    pub graph: DependencyGraph,
    /// Deterministic topological order over all steps
    pub order: Vec<StepId>,
    /// Steps rendered as grouping labels instead of tasks
    pub group_steps: HashSet<StepId>,
    /// Nearest grouping ancestor per step
    pub group_of: HashMap<StepId, StepId>,
    /// Sanitized, collision-free identifier per step
    pub idents: BTreeMap<StepId, String>,
}

impl<'a> ExportPlan<'a> {
    pub fn build(spec: &'a FlowSpec) -> FlowlineResult<Self> {
        let graph = spec.graph();
        let order = graph.topo_order().map_err(|stuck| {
            // unreachable if the Validator ran first
            FlowlineError::OrderingFailure {
                detail: format!("steps {:?} have unresolvable dependencies", stuck),
            }
        })?;

        let mut children: HashMap<StepId, Vec<StepId>> = HashMap::new();
        for step in &spec.steps {
            if let Some(parent) = step.parent_id {
                children.entry(parent).or_default().push(step.id);
            }
        }

        // an orchestrator with recorded children becomes a grouping label;
        // a childless one stays an ordinary task
        let group_steps: HashSet<StepId> = spec
            .steps
            .iter()
            .filter(|s| {
                s.component_type == ComponentType::Orchestrator && children.contains_key(&s.id)
            })
            .map(|s| s.id)
            .collect();

        let parent_of: HashMap<StepId, StepId> = spec
            .steps
            .iter()
            .filter_map(|s| s.parent_id.map(|p| (s.id, p)))
            .collect();

        let mut group_of = HashMap::new();
        for step in &spec.steps {
            let mut cursor = parent_of.get(&step.id);
            while let Some(&ancestor) = cursor {
                if group_steps.contains(&ancestor) {
                    group_of.insert(step.id, ancestor);
                    break;
                }
                cursor = parent_of.get(&ancestor);
            }
        }

        let idents = assign_idents(&spec.steps);

        Ok(Self {
            spec,
            graph,
            order,
            group_steps,
            group_of,
            idents,
        })
    }

    pub fn step(&self, id: StepId) -> &StepRecord {
        self.spec
            .steps
            .iter()
            .find(|s| s.id == id)
            .expect("plan ids come from the document")
    }

    /// True when the step maps to a target-native task.
    pub fn is_task(&self, id: StepId) -> bool {
        !self.group_steps.contains(&id)
    }

    /// Task ids in deterministic order.
    pub fn task_order(&self) -> Vec<StepId> {
        self.order
            .iter()
            .copied()
            .filter(|id| self.is_task(*id))
            .collect()
    }

    /// Dependencies of `id` that are themselves tasks, in id order.
    pub fn task_dependencies(&self, id: StepId) -> Vec<StepId> {
        self.graph
            .dependencies_of(id)
            .into_iter()
            .filter(|dep| self.is_task(*dep))
            .collect()
    }

    /// Edges whose endpoints are both tasks, in sorted order.
    pub fn task_edges(&self) -> Vec<(StepId, StepId)> {
        self.graph
            .edges()
            .iter()
            .copied()
            .filter(|(from, to)| self.is_task(*from) && self.is_task(*to))
            .collect()
    }
}

/// Sanitize a step name into a target-friendly identifier.
///
/// Lowercase, non-alphanumerics collapsed to single underscores; a leading
/// digit gets a `task_` prefix.
fn sanitize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_underscore = true;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
            last_underscore = false;
        } else if !last_underscore {
            out.push('_');
            last_underscore = true;
        }
    }
    while out.ends_with('_') {
        out.pop();
    }
    if out.is_empty() {
        return "step".to_string();
    }
    if out.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        return format!("task_{}", out);
    }
    out
}

/// Assign a unique identifier per step; collisions get the step id appended.
fn assign_idents(steps: &[StepRecord]) -> BTreeMap<StepId, String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for step in steps {
        *counts.entry(sanitize(&step.name)).or_insert(0) += 1;
    }

    steps
        .iter()
        .map(|step| {
            let base = sanitize(&step.name);
            let ident = if counts[&base] > 1 {
                format!("{}_{}", base, step.id)
            } else {
                base
            };
            (step.id, ident)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::BTreeMap as Map;
    use uuid::Uuid;

    use crate::flow::{Flow, StepStatus};

    pub(crate) fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    pub(crate) fn make_step(
        id: StepId,
        name: &str,
        component_type: ComponentType,
        parent_id: Option<StepId>,
    ) -> StepRecord {
        StepRecord {
            id,
            name: name.into(),
            component_type,
            parent_id,
            inputs: vec![],
            outputs: vec![],
            status: StepStatus::Completed,
            started_at: fixed_now(),
            ended_at: Some(fixed_now()),
            attachments: Map::new(),
        }
    }

    pub(crate) fn make_spec(steps: Vec<StepRecord>, edges: Vec<(StepId, StepId)>) -> FlowSpec {
        let flow = Flow {
            id: Uuid::nil(),
            name: "demo".into(),
            run_id: Uuid::nil(),
            steps,
            started_at: fixed_now(),
            ended_at: Some(fixed_now()),
            closed: true,
        };
        FlowSpec {
            schema_version: crate::spec::SCHEMA_VERSION,
            flow_id: flow.id,
            flow_name: flow.name.clone(),
            run_id: flow.run_id,
            started_at: flow.started_at,
            ended_at: flow.ended_at,
            steps: flow.steps,
            edges,
        }
    }

    #[test]
    fn test_sanitize_identifiers() {
        assert_eq!(sanitize("Load Accounts (CRM)"), "load_accounts_crm");
        assert_eq!(sanitize("2nd pass"), "task_2nd_pass");
        assert_eq!(sanitize("---"), "step");
    }

    #[test]
    fn test_ident_collisions_get_id_suffix() {
        let steps = vec![
            make_step(0, "load", ComponentType::Loader, None),
            make_step(1, "Load!", ComponentType::Loader, None),
        ];
        let idents = assign_idents(&steps);
        assert_eq!(idents[&0], "load_0");
        assert_eq!(idents[&1], "load_1");
    }

    #[test]
    fn test_unknown_target_is_export_error() {
        let err = "airflow".parse::<ExportTarget>().unwrap_err();
        assert!(matches!(err, FlowlineError::UnknownTarget { .. }));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_target_names_round_trip() {
        for (name, target, extension) in [
            ("pipeline", ExportTarget::Pipeline, "yaml"),
            ("mermaid", ExportTarget::Mermaid, "mmd"),
            ("dot", ExportTarget::Dot, "dot"),
            ("text", ExportTarget::Text, "txt"),
            ("document", ExportTarget::Document, "json"),
        ] {
            assert_eq!(name.parse::<ExportTarget>().unwrap(), target);
            assert_eq!(target.to_string(), name);
            assert_eq!(target.extension(), extension);
        }
    }

    #[test]
    fn test_orchestrator_with_children_is_a_group() {
        let spec = make_spec(
            vec![
                make_step(0, "nightly", ComponentType::Orchestrator, None),
                make_step(1, "load", ComponentType::Loader, Some(0)),
                make_step(2, "solo", ComponentType::Orchestrator, None),
            ],
            vec![],
        );
        let plan = ExportPlan::build(&spec).unwrap();

        assert!(!plan.is_task(0));
        assert_eq!(plan.group_of[&1], 0);
        // childless orchestrator stays an ordinary task
        assert!(plan.is_task(2));
        assert_eq!(plan.task_order(), vec![1, 2]);
    }

    #[test]
    fn test_group_label_reaches_nested_descendants() {
        let spec = make_spec(
            vec![
                make_step(0, "nightly", ComponentType::Orchestrator, None),
                make_step(1, "stage", ComponentType::Splitter, Some(0)),
                make_step(2, "load", ComponentType::Loader, Some(1)),
            ],
            vec![],
        );
        let plan = ExportPlan::build(&spec).unwrap();

        assert_eq!(plan.group_of[&2], 0);
        // the splitter has children but is not an orchestrator, so it stays a task
        assert!(plan.is_task(1));
    }

    #[test]
    fn test_inconsistent_edges_are_a_fatal_export_error() {
        let spec = make_spec(
            vec![
                make_step(0, "a", ComponentType::Other, None),
                make_step(1, "b", ComponentType::Other, None),
            ],
            vec![(0, 1), (1, 0)],
        );
        let err = export(&spec, ExportTarget::Mermaid, fixed_now()).unwrap_err();
        assert!(matches!(err, FlowlineError::OrderingFailure { .. }));
    }
}
