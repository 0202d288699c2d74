//! Optional external sync target.
//!
//! The host supplies a handle to some writable location (typically a file the
//! user picked inside a cloud-synced folder). The application pushes the full
//! backup payload to it after each flush. A permission-loss failure tells the
//! application to drop the handle so it stops retrying a dead reference.

use std::fmt;

/// Why a sync write failed.
#[derive(Debug)]
pub enum SyncError {
    /// Access to the target was revoked; the handle must be discarded.
    PermissionLost,
    Failed(String),
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::PermissionLost => write!(f, "permission to the sync target was lost"),
            SyncError::Failed(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for SyncError {}

/// A writable external location for the backup payload.
pub trait SyncTarget {
    /// Display name shown in sync status messages.
    fn name(&self) -> &str;

    fn write(&mut self, payload: &str) -> Result<(), SyncError>;
}
