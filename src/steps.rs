// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Spindrift Labs

//! Observable step tracking for multi-stage operations.
//!
//! A tracker owns the ordered step list for one operation invocation and
//! publishes every change on a watch channel for UI observers. It holds
//! no business logic and performs no I/O; orchestrators drive it.

use serde::Serialize;
use tokio::sync::watch;

/// Status of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Idle,
    Loading,
    Success,
    Error,
}

/// One stage of a multi-stage operation.
#[derive(Debug, Clone, Serialize)]
pub struct Step {
    pub index: usize,
    pub label: String,
    pub status: StepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A recorded status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepTransition {
    pub index: usize,
    pub from: StepStatus,
    pub to: StepStatus,
}

/// Ordered, observable record of an operation's stages.
///
/// A step never jumps straight from `Idle` to a terminal status: a
/// request to do so records an intervening `Loading` transition.
#[derive(Debug)]
pub struct StepTracker {
    steps: Vec<Step>,
    transitions: Vec<StepTransition>,
    tx: watch::Sender<Vec<Step>>,
}

impl StepTracker {
    /// Create a tracker with the given step labels, all `Idle`.
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let steps: Vec<Step> = labels
            .into_iter()
            .enumerate()
            .map(|(index, label)| Step {
                index,
                label: label.into(),
                status: StepStatus::Idle,
                error: None,
            })
            .collect();
        let (tx, _rx) = watch::channel(steps.clone());
        Self {
            steps,
            transitions: Vec::new(),
            tx,
        }
    }

    /// Replace the step list and clear history.
    pub fn reset<I, S>(&mut self, labels: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.steps = labels
            .into_iter()
            .enumerate()
            .map(|(index, label)| Step {
                index,
                label: label.into(),
                status: StepStatus::Idle,
                error: None,
            })
            .collect();
        self.transitions.clear();
        self.publish();
    }

    /// Set a step's status, interposing `Loading` when a terminal status
    /// is requested straight from `Idle`.
    pub fn set_step(&mut self, index: usize, status: StepStatus, error: Option<String>) {
        let Some(current) = self.steps.get(index).map(|s| s.status) else {
            tracing::warn!(index, "step index out of range");
            return;
        };
        if current == status {
            // Still store a fresh error message on a repeated Error set
            if let Some(step) = self.steps.get_mut(index) {
                step.error = error;
            }
            self.publish();
            return;
        }

        let terminal = matches!(status, StepStatus::Success | StepStatus::Error);
        if current == StepStatus::Idle && terminal {
            self.apply(index, StepStatus::Loading, None);
        }
        self.apply(index, status, error);
    }

    /// Mark a step `Loading`.
    pub fn start(&mut self, index: usize) {
        self.set_step(index, StepStatus::Loading, None);
    }

    /// Mark a step `Success`.
    pub fn succeed(&mut self, index: usize) {
        self.set_step(index, StepStatus::Success, None);
    }

    /// Mark a step `Error` with a message.
    pub fn fail(&mut self, index: usize, message: impl Into<String>) {
        self.set_step(index, StepStatus::Error, Some(message.into()));
    }

    /// Current step list.
    pub fn snapshot(&self) -> Vec<Step> {
        self.steps.clone()
    }

    /// Every transition applied since the last reset.
    pub fn transitions(&self) -> &[StepTransition] {
        &self.transitions
    }

    /// Observe the step list.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Step>> {
        self.tx.subscribe()
    }

    fn apply(&mut self, index: usize, status: StepStatus, error: Option<String>) {
        let step = &mut self.steps[index];
        let from = step.status;
        step.status = status;
        step.error = error;
        self.transitions.push(StepTransition {
            index,
            from,
            to: status,
        });
        tracing::debug!(index, label = %step.label, from = ?from, to = ?status, "step transition");
        self.publish();
    }

    fn publish(&self) {
        self.tx.send_replace(self.steps.clone());
    }
}
