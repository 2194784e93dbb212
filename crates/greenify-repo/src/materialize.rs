//! Replay a planned history against a driver.

use std::path::Path;

use greenify_core::{CommitHistory, CommitTimestamp, GreenifyError};
use tracing::info;

use crate::driver::RepositoryDriver;

/// Receives progress while a history is being written.
///
/// All methods default to doing nothing.
pub trait ProgressObserver {
    fn started(&mut self, _total: usize) {}

    /// Called after commit number `done` (1-based) succeeds.
    fn committed(&mut self, _done: usize, _total: usize, _timestamp: &CommitTimestamp) {}

    fn finished(&mut self, _total: usize) {}
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {}

/// Initialize the repository at `path` and commit once per timestamp in order.
///
/// Stops at the first failure. Commits made before it are left in place.
/// Returns the number of commits created.
///
/// # Errors
///
/// Returns the driver's error; repository failures during commits are
/// annotated with the commit's position and timestamp.
pub fn materialize<D, P>(
    driver: &mut D,
    path: &Path,
    history: &CommitHistory,
    progress: &mut P,
) -> Result<usize, GreenifyError>
where
    D: RepositoryDriver + ?Sized,
    P: ProgressObserver + ?Sized,
{
    driver.initialize_repository(path)?;

    let total = history.len();
    progress.started(total);

    for (i, timestamp) in history.iter().enumerate() {
        driver.commit_at(timestamp).map_err(|e| match e {
            GreenifyError::RepositoryOperationFailed { operation, detail } => {
                GreenifyError::RepositoryOperationFailed {
                    operation: format!("{operation} {} of {total} at {timestamp}", i + 1),
                    detail,
                }
            }
            other => other,
        })?;
        progress.committed(i + 1, total, timestamp);
    }

    progress.finished(total);
    info!(commits = total, path = %path.display(), "history written");
    Ok(total)
}
