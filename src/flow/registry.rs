// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 flowline contributors

//! Flow registry
//!
//! The registry is an explicit handle with a single-active-flow lifecycle:
//! initialized on `open_flow`, torn down on `close_flow`. Steps are scoped
//! acquisitions: a [`StepGuard`] that is dropped without `complete()`
//! closes its step as failed, so every exit path releases the step.
//!
//! Capture is single-threaded by design (interior `RefCell`); concurrent
//! capture against one registry requires external mutual exclusion.
//!
//! Instrumentation problems (marking I/O with no open step, a guard dropped
//! out of order) never surface as errors to the caller's workload; they are
//! recorded in the registry's issue channel and logged.

use chrono::Utc;
use std::cell::RefCell;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::dataset::DatasetRef;
use crate::errors::{FlowlineError, FlowlineResult};
use crate::flow::{ComponentType, Flow, StepId, StepRecord, StepStatus};

#[derive(Default)]
struct Inner {
    flow: Option<Flow>,
    stack: Vec<StepId>,
    issues: Vec<String>,
}

/// Process-scoped builder that accumulates step records into a flow
pub struct FlowRegistry {
    settings: Settings,
    inner: RefCell<Inner>,
}

impl FlowRegistry {
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self {
            settings,
            inner: RefCell::new(Inner::default()),
        }
    }

    /// Open a new flow and make it the active one.
    ///
    /// Fails if a flow is already active; nested flows are rejected, not
    /// merged. A new flow may be opened once the previous one has closed.
    pub fn open_flow(&self, name: &str) -> FlowlineResult<()> {
        let mut inner = self.inner.borrow_mut();
        if let Some(flow) = &inner.flow {
            return Err(FlowlineError::FlowAlreadyOpen {
                name: flow.name.clone(),
            });
        }

        let flow = Flow::open(name);
        info!(flow = %flow.name, run_id = %flow.run_id, "opened flow");
        inner.flow = Some(flow);
        inner.issues.clear();
        Ok(())
    }

    /// Open a step nested under the currently-innermost open step.
    ///
    /// The returned guard must be released on every exit path: call
    /// [`StepGuard::complete`] on success, or let the guard drop to record
    /// the step as failed.
    pub fn open_step(&self, name: &str, component_type: ComponentType) -> FlowlineResult<StepGuard<'_>> {
        let mut inner = self.inner.borrow_mut();
        let parent_id = inner.stack.last().copied();
        let flow = inner.flow.as_mut().ok_or(FlowlineError::NoOpenFlow)?;

        let id = flow.steps.len();
        flow.steps.push(StepRecord {
            id,
            name: name.to_string(),
            component_type,
            parent_id,
            inputs: Vec::new(),
            outputs: Vec::new(),
            status: StepStatus::Running,
            started_at: Utc::now(),
            ended_at: None,
            attachments: BTreeMap::new(),
        });
        inner.stack.push(id);

        info!(step = name, component = %component_type, id, "opened step");
        Ok(StepGuard {
            registry: self,
            id,
            name: name.to_string(),
            released: false,
        })
    }

    /// Mark a dataset as input of the currently-innermost open step.
    ///
    /// With no open step this is a usage error, recorded and logged, never
    /// returned to the caller.
    pub fn mark_input(&self, dataset: DatasetRef) {
        match self.current_step_id() {
            Some(id) => self.mark_input_on(id, dataset),
            None => self.record_issue(FlowlineError::NoOpenStep {
                operation: format!("mark_input({})", dataset),
            }),
        }
    }

    /// Mark a dataset as output of the currently-innermost open step.
    pub fn mark_output(&self, dataset: DatasetRef) {
        match self.current_step_id() {
            Some(id) => self.mark_output_on(id, dataset),
            None => self.record_issue(FlowlineError::NoOpenStep {
                operation: format!("mark_output({})", dataset),
            }),
        }
    }

    /// Attach an opaque payload to the currently-innermost open step.
    ///
    /// The registry stores and forwards the value verbatim.
    pub fn attach(&self, key: &str, value: serde_json::Value) {
        match self.current_step_id() {
            Some(id) => self.attach_on(id, key, value),
            None => self.record_issue(FlowlineError::NoOpenStep {
                operation: format!("attach('{}')", key),
            }),
        }
    }

    /// Close the active flow and hand back the frozen record.
    ///
    /// Fails if any step is still open; a step that never reached a terminal
    /// status renders the flow unclosable.
    pub fn close_flow(&self) -> FlowlineResult<Flow> {
        let mut inner = self.inner.borrow_mut();
        let open_names: Vec<String> = {
            let flow = inner.flow.as_ref().ok_or(FlowlineError::NoOpenFlow)?;
            inner
                .stack
                .iter()
                .filter_map(|id| flow.step(*id).map(|s| s.name.clone()))
                .collect()
        };

        if !open_names.is_empty() {
            return Err(FlowlineError::UnclosedSteps {
                count: open_names.len(),
                steps: open_names,
            });
        }

        let mut flow = inner.flow.take().expect("checked above");
        flow.closed = true;
        flow.ended_at = Some(Utc::now());
        info!(flow = %flow.name, steps = flow.steps.len(), "closed flow");
        Ok(flow)
    }

    /// Capture-time issues recorded so far (cleared when a new flow opens).
    pub fn issues(&self) -> Vec<String> {
        self.inner.borrow().issues.clone()
    }

    fn current_step_id(&self) -> Option<StepId> {
        self.inner.borrow().stack.last().copied()
    }

    fn record_issue(&self, error: FlowlineError) {
        warn!("capture issue: {}", error);
        self.inner.borrow_mut().issues.push(error.to_string());
    }

    fn mark_input_on(&self, id: StepId, dataset: DatasetRef) {
        let mut inner = self.inner.borrow_mut();
        if let Some(step) = inner
            .flow
            .as_mut()
            .and_then(|f| f.steps.iter_mut().find(|s| s.id == id))
        {
            debug!(step = %step.name, dataset = %dataset, "marked input");
            step.push_input(dataset);
        }
    }

    fn mark_output_on(&self, id: StepId, dataset: DatasetRef) {
        let mut inner = self.inner.borrow_mut();
        if let Some(step) = inner
            .flow
            .as_mut()
            .and_then(|f| f.steps.iter_mut().find(|s| s.id == id))
        {
            debug!(step = %step.name, dataset = %dataset, "marked output");
            step.push_output(dataset);
        }
    }

    fn attach_on(&self, id: StepId, key: &str, value: serde_json::Value) {
        let mut inner = self.inner.borrow_mut();
        if let Some(step) = inner
            .flow
            .as_mut()
            .and_then(|f| f.steps.iter_mut().find(|s| s.id == id))
        {
            step.attachments.insert(key.to_string(), value);
        }
    }

    /// Record the terminal status of the innermost open step and pop it.
    fn finish_step(&self, id: StepId, status: StepStatus) -> FlowlineResult<()> {
        let mut inner = self.inner.borrow_mut();
        let inner = &mut *inner;
        let flow = inner.flow.as_mut().ok_or(FlowlineError::NoOpenFlow)?;

        let name_of = |flow: &Flow, id: StepId| {
            flow.step(id)
                .map(|s| s.name.clone())
                .unwrap_or_else(|| format!("#{}", id))
        };

        match inner.stack.last() {
            None => {
                return Err(FlowlineError::StepAlreadyClosed {
                    step: name_of(flow, id),
                })
            }
            Some(top) if *top != id => {
                return Err(FlowlineError::OutOfOrderClose {
                    expected: name_of(flow, *top),
                    found: name_of(flow, id),
                });
            }
            Some(_) => {}
        }

        let warn_missing_io = self.settings.warn_on_missing_io;
        let step = flow
            .steps
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(FlowlineError::StepAlreadyClosed {
                step: format!("#{}", id),
            })?;

        if step.status.is_terminal() {
            return Err(FlowlineError::StepAlreadyClosed {
                step: step.name.clone(),
            });
        }

        step.status = status;
        step.ended_at = Some(Utc::now());
        info!(step = %step.name, status = ?status, "closed step");

        if warn_missing_io && step.inputs.is_empty() && step.outputs.is_empty() {
            inner.issues.push(format!(
                "step '{}' closed with no marked inputs or outputs; lineage edges cannot be inferred for it",
                step.name
            ));
        }

        inner.stack.pop();
        Ok(())
    }
}

impl Default for FlowRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Scoped handle for one open step
///
/// Dropping the guard without calling [`complete`](Self::complete) records
/// the step as failed, so release is guaranteed on every exit path, including
/// unwinding out of the enclosing unit of work.
#[must_use = "dropping a StepGuard marks the step as failed"]
pub struct StepGuard<'a> {
    registry: &'a FlowRegistry,
    id: StepId,
    name: String,
    released: bool,
}

impl StepGuard<'_> {
    pub fn id(&self) -> StepId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Mark a dataset as input of this step.
    pub fn mark_input(&self, dataset: DatasetRef) {
        self.registry.mark_input_on(self.id, dataset);
    }

    /// Mark a dataset as output of this step.
    pub fn mark_output(&self, dataset: DatasetRef) {
        self.registry.mark_output_on(self.id, dataset);
    }

    /// Attach an opaque payload to this step.
    pub fn attach(&self, key: &str, value: serde_json::Value) {
        self.registry.attach_on(self.id, key, value);
    }

    /// Close this step as completed.
    ///
    /// Fails if an inner step is still open; in that case the step stays
    /// open and the enclosing flow cannot close.
    pub fn complete(mut self) -> FlowlineResult<()> {
        self.released = true;
        self.registry.finish_step(self.id, StepStatus::Completed)
    }

    /// Close this step as failed.
    pub fn fail(mut self) -> FlowlineResult<()> {
        self.released = true;
        self.registry.finish_step(self.id, StepStatus::Failed)
    }
}

impl Drop for StepGuard<'_> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = self.registry.finish_step(self.id, StepStatus::Failed) {
            self.registry.record_issue(e);
        }
    }
}
