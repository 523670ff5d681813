//! Transient success and error banners.
//!
//! Only one banner is shown at a time. Each one auto-dismisses after a
//! delay that depends on its kind. Showing a new banner aborts the old
//! banner's timer, and a timer only ever clears the banner it was started
//! for, so an older timer cannot dismiss a newer banner.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BannerKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Banner {
    pub id: u64,
    pub kind: BannerKind,
    pub message: String,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// The banner slot of one view. Must be used inside a tokio runtime.
pub struct Banners {
    current: Arc<Mutex<Option<Banner>>>,
    timer: Mutex<Option<JoinHandle<()>>>,
    next_id: AtomicU64,
    success_delay: Duration,
    error_delay: Duration,
}

impl Banners {
    pub fn new(success_delay: Duration, error_delay: Duration) -> Self {
        Self {
            current: Arc::new(Mutex::new(None)),
            timer: Mutex::new(None),
            next_id: AtomicU64::new(0),
            success_delay,
            error_delay,
        }
    }

    pub fn success(&self, message: impl Into<String>) -> Banner {
        self.show(BannerKind::Success, message.into())
    }

    pub fn error(&self, message: impl Into<String>) -> Banner {
        self.show(BannerKind::Error, message.into())
    }

    /// The banner currently shown, if any.
    pub fn current(&self) -> Option<Banner> {
        lock(&self.current).clone()
    }

    /// Hide the current banner now.
    pub fn dismiss(&self) {
        self.abort_timer();
        *lock(&self.current) = None;
    }

    // ---- private helpers ----

    fn show(&self, kind: BannerKind, message: String) -> Banner {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let banner = Banner { id, kind, message };
        match kind {
            BannerKind::Success => tracing::info!(message = %banner.message, "Success banner"),
            BannerKind::Error => tracing::warn!(message = %banner.message, "Error banner"),
        }
        *lock(&self.current) = Some(banner.clone());

        let delay = match kind {
            BannerKind::Success => self.success_delay,
            BannerKind::Error => self.error_delay,
        };
        let slot = Arc::clone(&self.current);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut current = lock(&slot);
            if current.as_ref().map(|b| b.id) == Some(id) {
                *current = None;
            }
        });
        if let Some(previous) = lock(&self.timer).replace(handle) {
            previous.abort();
        }
        banner
    }

    fn abort_timer(&self) {
        if let Some(timer) = lock(&self.timer).take() {
            timer.abort();
        }
    }
}

impl Drop for Banners {
    fn drop(&mut self) {
        self.abort_timer();
    }
}
