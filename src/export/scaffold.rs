// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 flowline contributors

//! Generic task/DAG scaffold generator
//!
//! Emits a YAML pipeline document, one task per step with explicit
//! `depends_on` declarations, that maps onto any orchestrator modeling a
//! task graph with declared dependencies. Tasks appear in deterministic
//! topological order; grouped steps carry their orchestrator's label.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::errors::FlowlineResult;
use crate::export::ExportPlan;

#[derive(Serialize)]
struct ScaffoldDoc {
    version: String,
    kind: String,
    name: String,
    run_id: String,
    generated_at: String,
    tasks: Vec<TaskDef>,
}

#[derive(Serialize)]
struct TaskDef {
    name: String,
    component: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    group: Option<String>,
    inputs: Vec<String>,
    outputs: Vec<String>,
    depends_on: Vec<String>,
}

pub(crate) fn render(plan: &ExportPlan<'_>, generated_at: DateTime<Utc>) -> FlowlineResult<String> {
    let tasks = plan
        .task_order()
        .into_iter()
        .map(|id| {
            let step = plan.step(id);
            TaskDef {
                name: plan.idents[&id].clone(),
                component: step.component_type.to_string(),
                group: plan
                    .group_of
                    .get(&id)
                    .map(|group| plan.step(*group).name.clone()),
                inputs: step.inputs.iter().map(|ds| ds.to_string()).collect(),
                outputs: step.outputs.iter().map(|ds| ds.to_string()).collect(),
                depends_on: plan
                    .task_dependencies(id)
                    .into_iter()
                    .map(|dep| plan.idents[&dep].clone())
                    .collect(),
            }
        })
        .collect();

    let doc = ScaffoldDoc {
        version: "1".to_string(),
        kind: "task-graph".to_string(),
        name: plan.spec.flow_name.clone(),
        run_id: plan.spec.run_id.to_string(),
        generated_at: generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        tasks,
    };

    Ok(serde_yaml::to_string(&doc)?)
}
