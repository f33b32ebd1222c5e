//! Collaborators the coordinators report to.
//!
//! Both are fire-and-forget from the coordinator's point of view: a
//! notifier cannot fail, and a download failure is reported like any other
//! export failure.

use std::path::PathBuf;

use crate::error::Result;

/// User-facing success and failure notices.
pub trait Notifier: Send + Sync {
    fn notify_success(&self, message: &str);
    fn notify_failure(&self, message: &str);
}

/// Receives an exported payload and stores it somewhere the user can get
/// at it. Returns where it ended up.
pub trait Downloader: Send + Sync {
    fn download(&self, file_name: &str, payload: &[u8]) -> Result<PathBuf>;
}
