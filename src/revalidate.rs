//! Path revalidation hints.
//!
//! After a successful mutation the action tells the front end which page
//! path holds stale data. The web layer forwards the most recent hint in
//! the `X-Revalidate-Path` response header.

use std::sync::Mutex;

/// Receives cache revalidation hints.
pub trait Revalidator: Send + Sync {
    /// Mark the given page path as stale.
    fn revalidate(&self, path: &str);
}

/// Revalidator that records every hint in order.
#[derive(Debug, Default)]
pub struct RevalidationLog {
    paths: Mutex<Vec<String>>,
}

impl RevalidationLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// All paths revalidated so far.
    pub fn paths(&self) -> Vec<String> {
        self.paths
            .lock()
            .map(|paths| paths.clone())
            .unwrap_or_default()
    }

    /// The most recent path, if any.
    pub fn last(&self) -> Option<String> {
        self.paths.lock().ok().and_then(|paths| paths.last().cloned())
    }
}

impl Revalidator for RevalidationLog {
    fn revalidate(&self, path: &str) {
        tracing::debug!(path, "Revalidating path");
        if let Ok(mut paths) = self.paths.lock() {
            paths.push(path.to_string());
        }
    }
}
