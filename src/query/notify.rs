//! User-facing toast notifications
//!
//! Toasts queue up until the front end drains them. A toast identical to the
//! one just queued is dropped, so a failing poll does not flood the queue.
//! Every error toast is also logged.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToastLevel {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

impl fmt::Display for Toast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.level {
            ToastLevel::Success => "✔",
            ToastLevel::Error => "✖",
            ToastLevel::Info => "ℹ",
        };
        write!(f, "{} {}", tag, self.message)
    }
}

#[derive(Debug, Default)]
pub struct Notifier {
    queue: Mutex<VecDeque<Toast>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success(&self, message: &str) {
        self.push(ToastLevel::Success, message);
    }

    pub fn info(&self, message: &str) {
        self.push(ToastLevel::Info, message);
    }

    /// Queues an error toast and logs the underlying cause
    pub fn error(&self, message: &str, cause: &dyn fmt::Display) {
        tracing::error!("{}: {}", message, cause);
        self.push(ToastLevel::Error, message);
    }

    /// Removes and returns every queued toast, oldest first
    pub fn drain(&self) -> Vec<Toast> {
        self.lock().drain(..).collect()
    }

    /// Copies the queued toasts without removing them
    pub fn pending(&self) -> Vec<Toast> {
        self.lock().iter().cloned().collect()
    }

    /// True when a queued toast carries exactly `message`
    pub fn contains(&self, message: &str) -> bool {
        self.lock().iter().any(|t| t.message == message)
    }

    fn push(&self, level: ToastLevel, message: &str) {
        let toast = Toast {
            level,
            message: message.to_string(),
        };
        let mut queue = self.lock();
        if queue.back() != Some(&toast) {
            queue.push_back(toast);
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Toast>> {
        self.queue.lock().unwrap_or_else(|e| e.into_inner())
    }
}
