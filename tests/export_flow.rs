// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 flowline contributors

//! End-to-end capture and export through the public API

use chrono::TimeZone;

use flowline::dataset::DatasetRef;
use flowline::export::{export, ExportTarget};
use flowline::flow::{ComponentType, Flow, FlowRegistry};
use flowline::spec::FlowSpec;

fn fixed_now() -> chrono::DateTime<chrono::Utc> {
    chrono::Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

/// An orchestrated run: a nightly group containing load and clean, then a
/// top-level quality check reading the cleaned output, plus a failed
/// publish attempt that recorded an output before failing.
fn captured_flow() -> Flow {
    let registry = FlowRegistry::new();
    registry.open_flow("nightly-sync").unwrap();

    let nightly = registry
        .open_step("nightly", ComponentType::Orchestrator)
        .unwrap();

    let load = registry.open_step("load accounts", ComponentType::Loader).unwrap();
    load.mark_input(DatasetRef::api("crm", "/v1/accounts"));
    load.mark_output(DatasetRef::file("accounts.csv"));
    load.attach("metrics", serde_json::json!({"rows": 1200}));
    load.complete().unwrap();

    let clean = registry
        .open_step("clean accounts", ComponentType::Transformer)
        .unwrap();
    clean.mark_input(DatasetRef::file("accounts.csv"));
    clean.mark_output(DatasetRef::file("accounts.parquet"));
    clean.complete().unwrap();

    nightly.complete().unwrap();

    let check = registry
        .open_step("verify accounts", ComponentType::QualityCheck)
        .unwrap();
    check.mark_input(DatasetRef::file("accounts.parquet"));
    check.complete().unwrap();

    let publish = registry
        .open_step("publish accounts", ComponentType::Exporter)
        .unwrap();
    publish.mark_input(DatasetRef::file("accounts.parquet"));
    publish.mark_output(DatasetRef::table("warehouse", "accounts"));
    publish.fail().unwrap();

    registry.close_flow().unwrap()
}

#[test]
fn test_capture_to_spec_end_to_end() {
    let flow = captured_flow();
    let spec = FlowSpec::from_flow(&flow).unwrap();

    // load(1) -> clean(2) -> check(3), clean(2) -> publish(4)
    assert_eq!(spec.edges, vec![(1, 2), (2, 3), (2, 4)]);
    assert_eq!(spec.steps.len(), 5);

    // the orchestrator produced no edges of its own
    assert!(spec.edges.iter().all(|&(from, to)| from != 0 && to != 0));
}

#[test]
fn test_failed_publish_is_not_a_source_on_reexport() {
    let spec = FlowSpec::from_flow(&captured_flow()).unwrap();

    // nothing consumes the failed publish's recorded output
    assert!(spec.edges.iter().all(|&(from, _)| from != 4));
}

#[test]
fn test_every_target_renders_and_is_deterministic() {
    let spec = FlowSpec::from_flow(&captured_flow()).unwrap();

    for target in [
        ExportTarget::Pipeline,
        ExportTarget::Mermaid,
        ExportTarget::Dot,
        ExportTarget::Text,
        ExportTarget::Document,
    ] {
        let first = export(&spec, target, fixed_now()).unwrap();
        let second = export(&spec, target, fixed_now()).unwrap();
        assert!(!first.content.is_empty(), "{} artifact is empty", target);
        assert_eq!(first.content, second.content, "{} export is not deterministic", target);
    }
}

#[test]
fn test_reloaded_document_exports_identically() {
    let spec = FlowSpec::from_flow(&captured_flow()).unwrap();
    let reloaded = FlowSpec::from_json(&spec.to_json().unwrap()).unwrap();

    assert_eq!(reloaded, spec);
    assert_eq!(
        reloaded.fingerprint().unwrap(),
        spec.fingerprint().unwrap()
    );

    for target in [ExportTarget::Pipeline, ExportTarget::Mermaid] {
        assert_eq!(
            export(&reloaded, target, fixed_now()).unwrap().content,
            export(&spec, target, fixed_now()).unwrap().content
        );
    }
}

#[test]
fn test_scaffold_groups_nightly_steps() {
    let spec = FlowSpec::from_flow(&captured_flow()).unwrap();
    let yaml = export(&spec, ExportTarget::Pipeline, fixed_now())
        .unwrap()
        .content;

    let doc: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
    let tasks = doc["tasks"].as_sequence().unwrap();

    // four tasks; the orchestrator is a group label, not a task
    assert_eq!(tasks.len(), 4);
    assert_eq!(tasks[0]["name"], "load_accounts");
    assert_eq!(tasks[0]["group"], "nightly");
    assert_eq!(tasks[1]["group"], "nightly");
    assert!(tasks[2]["group"].is_null() || tasks[2].get("group").is_none());

    let clean_deps = tasks[1]["depends_on"].as_sequence().unwrap();
    assert_eq!(clean_deps.len(), 1);
    assert_eq!(clean_deps[0], "load_accounts");
}

#[test]
fn test_attachments_survive_to_document() {
    let spec = FlowSpec::from_flow(&captured_flow()).unwrap();
    let json = export(&spec, ExportTarget::Document, fixed_now())
        .unwrap()
        .content;

    let doc: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(
        doc["steps"][1]["attachments"]["metrics"],
        serde_json::json!({"rows": 1200})
    );
}
