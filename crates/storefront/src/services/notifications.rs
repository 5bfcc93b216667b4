//! Notification channel for workflow outcomes.
//!
//! Workflows report success and failure as toasts. The channel owns display
//! timing: the queue is bounded and each toast expires on its own.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use raritone_core::ToastNotification;

use crate::config::WorkflowConfig;

/// Fire-and-forget sink for toasts.
pub trait NotificationChannel: Send + Sync {
    /// Queue a toast for display.
    fn show_toast(&self, toast: ToastNotification);
}

struct QueuedToast {
    toast: ToastNotification,
    shown_at: Instant,
}

/// Bounded, auto-dismissing toast queue.
///
/// When full, the oldest toast is dropped to make room.
pub struct ToastQueue {
    entries: Mutex<VecDeque<QueuedToast>>,
    capacity: usize,
    dismiss_after: Duration,
}

impl ToastQueue {
    #[must_use]
    pub fn new(capacity: usize, dismiss_after: Duration) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity: capacity.max(1),
            dismiss_after,
        }
    }

    #[must_use]
    pub fn from_config(config: &WorkflowConfig) -> Self {
        Self::new(config.toast_queue_capacity, config.toast_dismiss_after)
    }

    /// How long each toast stays visible.
    #[must_use]
    pub const fn dismiss_after(&self) -> Duration {
        self.dismiss_after
    }

    /// Toasts still visible at `now`, oldest first. Expired toasts are dropped.
    #[must_use]
    pub fn active_at(&self, now: Instant) -> Vec<ToastNotification> {
        let mut entries = self.lock();
        entries.retain(|entry| now.saturating_duration_since(entry.shown_at) < self.dismiss_after);
        entries.iter().map(|entry| entry.toast.clone()).collect()
    }

    /// Toasts currently visible.
    #[must_use]
    pub fn active(&self) -> Vec<ToastNotification> {
        self.active_at(Instant::now())
    }

    /// Dismiss the toast at `index` (oldest first).
    pub fn dismiss(&self, index: usize) -> Option<ToastNotification> {
        self.lock().remove(index).map(|entry| entry.toast)
    }

    /// Remove and return every queued toast.
    pub fn take_all(&self) -> Vec<ToastNotification> {
        self.lock().drain(..).map(|entry| entry.toast).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<QueuedToast>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl NotificationChannel for ToastQueue {
    fn show_toast(&self, toast: ToastNotification) {
        tracing::debug!(kind = ?toast.kind, title = %toast.title, "toast queued");
        let mut entries = self.lock();
        if entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(QueuedToast {
            toast,
            shown_at: Instant::now(),
        });
    }
}
