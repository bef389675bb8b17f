// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 flowline contributors

//! Flow and step records
//!
//! This module defines the captured-execution data model: a [`Flow`] is an
//! ordered sequence of [`StepRecord`]s accumulated by the
//! [`FlowRegistry`](crate::flow::FlowRegistry) during one run.

mod registry;

pub use registry::{FlowRegistry, StepGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::dataset::DatasetRef;

/// Step identifier, unique within its flow.
///
/// Assigned sequentially by the registry; doubles as the execution-order key.
pub type StepId = usize;

/// Role of a step in the flow
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ComponentType {
    Loader,
    Transformer,
    Reconciliator,
    Enricher,
    Exporter,
    QualityCheck,
    Splitter,
    Merger,
    Orchestrator,
    Other,
}

impl std::fmt::Display for ComponentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Loader => "loader",
            Self::Transformer => "transformer",
            Self::Reconciliator => "reconciliator",
            Self::Enricher => "enricher",
            Self::Exporter => "exporter",
            Self::QualityCheck => "quality-check",
            Self::Splitter => "splitter",
            Self::Merger => "merger",
            Self::Orchestrator => "orchestrator",
            Self::Other => "other",
        };
        write!(f, "{}", label)
    }
}

impl std::str::FromStr for ComponentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "loader" => Ok(Self::Loader),
            "transformer" => Ok(Self::Transformer),
            "reconciliator" => Ok(Self::Reconciliator),
            "enricher" => Ok(Self::Enricher),
            "exporter" => Ok(Self::Exporter),
            "quality-check" => Ok(Self::QualityCheck),
            "splitter" => Ok(Self::Splitter),
            "merger" => Ok(Self::Merger),
            "orchestrator" => Ok(Self::Orchestrator),
            "other" => Ok(Self::Other),
            _ => Err(format!("Unknown component type: {}", s)),
        }
    }
}

/// Execution status of a step
///
/// Transitions only `Running -> Completed` or `Running -> Failed`, exactly
/// once; the registry enforces this.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Running,
    Completed,
    Failed,
}

impl StepStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Running)
    }
}

/// One captured unit of work
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepRecord {
    /// Unique within the flow; equals the step's position in execution order
    pub id: StepId,

    /// Step name as given by the caller
    pub name: String,

    /// Role of this step
    pub component_type: ComponentType,

    /// Enclosing step, if this step was opened inside another
    #[serde(default)]
    pub parent_id: Option<StepId>,

    /// Datasets read by this step, in marking order, deduplicated
    #[serde(default)]
    pub inputs: Vec<DatasetRef>,

    /// Datasets written by this step, in marking order, deduplicated
    #[serde(default)]
    pub outputs: Vec<DatasetRef>,

    pub status: StepStatus,

    pub started_at: DateTime<Utc>,

    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,

    /// Opaque payloads (metrics, contracts); stored and forwarded verbatim
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attachments: BTreeMap<String, serde_json::Value>,
}

impl StepRecord {
    /// Append an input ref unless an identical artifact is already marked.
    pub fn push_input(&mut self, dataset: DatasetRef) {
        if !self.inputs.contains(&dataset) {
            self.inputs.push(dataset);
        }
    }

    /// Append an output ref unless an identical artifact is already marked.
    pub fn push_output(&mut self, dataset: DatasetRef) {
        if !self.outputs.contains(&dataset) {
            self.outputs.push(dataset);
        }
    }
}

/// One captured execution instance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Flow {
    pub id: Uuid,

    pub name: String,

    /// Identifies this execution instance
    pub run_id: Uuid,

    /// Insertion order is execution order
    pub steps: Vec<StepRecord>,

    pub started_at: DateTime<Utc>,

    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,

    /// Set exactly once by `close_flow`; the flow is immutable thereafter
    pub closed: bool,
}

impl Flow {
    pub(crate) fn open(name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            run_id: Uuid::new_v4(),
            steps: Vec::new(),
            started_at: Utc::now(),
            ended_at: None,
            closed: false,
        }
    }

    /// Look up a step by id.
    pub fn step(&self, id: StepId) -> Option<&StepRecord> {
        self.steps.iter().find(|s| s.id == id)
    }

    /// Ids of the steps directly nested under `id`.
    pub fn children_of(&self, id: StepId) -> Vec<StepId> {
        self.steps
            .iter()
            .filter(|s| s.parent_id == Some(id))
            .map(|s| s.id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_type_round_trip() {
        for ct in [
            ComponentType::Loader,
            ComponentType::QualityCheck,
            ComponentType::Other,
        ] {
            let parsed: ComponentType = ct.to_string().parse().unwrap();
            assert_eq!(parsed, ct);
        }
        assert!("widget".parse::<ComponentType>().is_err());
    }

    #[test]
    fn test_component_type_serde_is_kebab_case() {
        let json = serde_json::to_string(&ComponentType::QualityCheck).unwrap();
        assert_eq!(json, "\"quality-check\"");
    }

    #[test]
    fn test_io_dedup_on_insert() {
        let mut step = StepRecord {
            id: 0,
            name: "load".into(),
            component_type: ComponentType::Loader,
            parent_id: None,
            inputs: vec![],
            outputs: vec![],
            status: StepStatus::Running,
            started_at: Utc::now(),
            ended_at: None,
            attachments: BTreeMap::new(),
        };

        step.push_output(DatasetRef::file("a.csv"));
        step.push_output(DatasetRef::file("a.csv"));
        step.push_output(DatasetRef::file("b.csv"));

        assert_eq!(step.outputs.len(), 2);
    }
}
