// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 flowline contributors

//! Diagram generators: Mermaid flowchart, Graphviz DOT, plain text
//!
//! One node per step annotated with its component type, one edge per
//! resolved dependency. Orchestrator groups render as Mermaid `subgraph`
//! blocks and DOT `cluster` subgraphs.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::export::ExportPlan;
use crate::flow::StepId;

pub(crate) fn render_mermaid(plan: &ExportPlan<'_>, generated_at: DateTime<Utc>) -> String {
    let mut out = String::from("flowchart TD\n");
    out.push_str(&format!(
        "    %% flow: {} (run {})\n",
        plan.spec.flow_name, plan.spec.run_id
    ));
    out.push_str(&format!("    %% generated at: {}\n\n", stamp(generated_at)));

    for &id in &plan.order {
        if plan.is_task(id) && !plan.group_of.contains_key(&id) {
            out.push_str(&format!("    {}\n", mermaid_node(plan, id)));
        }
    }

    for &group in &sorted_groups(plan) {
        let label = escape_label(&plan.step(group).name);
        out.push_str(&format!("    subgraph {} [\"{}\"]\n", plan.idents[&group], label));
        for &id in &plan.order {
            if plan.is_task(id) && plan.group_of.get(&id) == Some(&group) {
                out.push_str(&format!("        {}\n", mermaid_node(plan, id)));
            }
        }
        out.push_str("    end\n");
    }

    out.push('\n');
    for (from, to) in plan.task_edges() {
        out.push_str(&format!(
            "    {} --> {}\n",
            plan.idents[&from], plan.idents[&to]
        ));
    }

    out
}

pub(crate) fn render_dot(plan: &ExportPlan<'_>, generated_at: DateTime<Utc>) -> String {
    let mut out = String::from("digraph flow {\n");
    out.push_str(&format!("    // generated at: {}\n", stamp(generated_at)));
    out.push_str(&format!("    label=\"{}\";\n", escape_label(&plan.spec.flow_name)));
    out.push_str("    labelloc=t;\n");
    out.push_str("    rankdir=TB;\n");
    out.push_str("    node [shape=box, style=rounded];\n\n");

    for &id in &plan.order {
        if plan.is_task(id) && !plan.group_of.contains_key(&id) {
            out.push_str(&format!("    {};\n", dot_node(plan, id)));
        }
    }

    for &group in &sorted_groups(plan) {
        out.push_str(&format!("    subgraph cluster_{} {{\n", plan.idents[&group]));
        out.push_str(&format!(
            "        label=\"{}\";\n",
            escape_label(&plan.step(group).name)
        ));
        for &id in &plan.order {
            if plan.is_task(id) && plan.group_of.get(&id) == Some(&group) {
                out.push_str(&format!("        {};\n", dot_node(plan, id)));
            }
        }
        out.push_str("    }\n");
    }

    out.push('\n');
    for (from, to) in plan.task_edges() {
        out.push_str(&format!(
            "    {} -> {};\n",
            plan.idents[&from], plan.idents[&to]
        ));
    }

    out.push_str("}\n");
    out
}

pub(crate) fn render_text(plan: &ExportPlan<'_>, generated_at: DateTime<Utc>) -> String {
    let mut out = format!(
        "Flow: {} (run {})\nGenerated: {}\n\n",
        plan.spec.flow_name,
        plan.spec.run_id,
        stamp(generated_at)
    );

    for (position, &id) in plan.task_order().iter().enumerate() {
        let step = plan.step(id);
        out.push_str(&format!(
            "{}. {} ({})",
            position + 1,
            step.name,
            step.component_type
        ));

        let deps: Vec<String> = plan
            .task_dependencies(id)
            .into_iter()
            .map(|dep| plan.step(dep).name.clone())
            .collect();
        if !deps.is_empty() {
            out.push_str(&format!(" [depends: {}]", deps.join(", ")));
        }

        if let Some(&group) = plan.group_of.get(&id) {
            out.push_str(&format!(" [group: {}]", plan.step(group).name));
        }

        out.push('\n');
    }

    out
}

fn mermaid_node(plan: &ExportPlan<'_>, id: StepId) -> String {
    let step = plan.step(id);
    format!(
        "{}[\"{} ({})\"]",
        plan.idents[&id],
        escape_label(&step.name),
        step.component_type
    )
}

fn dot_node(plan: &ExportPlan<'_>, id: StepId) -> String {
    let step = plan.step(id);
    format!(
        "{} [label=\"{}\\n({})\"]",
        plan.idents[&id],
        escape_label(&step.name),
        step.component_type
    )
}

fn sorted_groups(plan: &ExportPlan<'_>) -> Vec<StepId> {
    let mut groups: Vec<StepId> = plan.group_steps.iter().copied().collect();
    groups.sort_unstable();
    groups
}

fn escape_label(name: &str) -> String {
    name.replace('"', "'")
}

fn stamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}
