// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Spindrift Labs

//! User-facing notifications.
//!
//! The orchestration core emits notifications through a write-only sink;
//! it never depends on delivery. UIs plug in their own sink, the shipped
//! [`TracingSink`] forwards to the log, and [`NullSink`] drops everything.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Error,
}

/// A single user-facing notification.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    /// Optional link (typically a block explorer URL)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub at: DateTime<Utc>,
}

impl Notification {
    fn new(kind: NotificationKind, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            body: body.into(),
            link: None,
            at: Utc::now(),
        }
    }

    pub fn info(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(NotificationKind::Info, title, body)
    }

    pub fn success(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(NotificationKind::Success, title, body)
    }

    pub fn warning(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(NotificationKind::Warning, title, body)
    }

    pub fn error(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(NotificationKind::Error, title, body)
    }

    /// Attach a link.
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }
}

/// Write-only notification outlet.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Sink that forwards notifications to the log.
#[derive(Debug, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, n: Notification) {
        match n.kind {
            NotificationKind::Info | NotificationKind::Success => {
                tracing::info!(title = %n.title, body = %n.body, link = ?n.link, "notification");
            }
            NotificationKind::Warning => {
                tracing::warn!(title = %n.title, body = %n.body, link = ?n.link, "notification");
            }
            NotificationKind::Error => {
                tracing::error!(title = %n.title, body = %n.body, link = ?n.link, "notification");
            }
        }
    }
}

/// Sink that discards notifications.
#[derive(Debug, Default)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn notify(&self, _notification: Notification) {}
}

/// Sink that records notifications for assertions.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct CollectingSink {
    entries: std::sync::Mutex<Vec<Notification>>,
}

#[cfg(test)]
impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<Notification> {
        self.entries.lock().unwrap().clone()
    }

    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.entries.lock().unwrap())
    }
}

#[cfg(test)]
impl NotificationSink for CollectingSink {
    fn notify(&self, notification: Notification) {
        self.entries.lock().unwrap().push(notification);
    }
}
