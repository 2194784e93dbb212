//! The interface between the planned history and a version-control backend.

use std::path::Path;

use greenify_core::{AuthorConfig, CommitTimestamp, GreenifyError};
use tracing::debug;

/// A backend able to create a repository and commit at chosen instants.
///
/// Calls are strictly sequential: [`initialize_repository`] once, then
/// [`commit_at`] once per planned timestamp.
///
/// [`initialize_repository`]: RepositoryDriver::initialize_repository
/// [`commit_at`]: RepositoryDriver::commit_at
pub trait RepositoryDriver {
    /// Make `path` an empty, freshly initialized repository.
    ///
    /// Creates the directory if needed and discards any existing `.git`
    /// metadata there.
    fn initialize_repository(&mut self, path: &Path) -> Result<(), GreenifyError>;

    /// Change the working tree, stage everything, and commit with author and
    /// committer dates both set to `timestamp`.
    ///
    /// # Errors
    ///
    /// Returns [`GreenifyError::RepositoryOperationFailed`] if the backend
    /// rejects the commit.
    fn commit_at(&mut self, timestamp: &CommitTimestamp) -> Result<(), GreenifyError>;
}

impl<D: RepositoryDriver + ?Sized> RepositoryDriver for Box<D> {
    fn initialize_repository(&mut self, path: &Path) -> Result<(), GreenifyError> {
        (**self).initialize_repository(path)
    }

    fn commit_at(&mut self, timestamp: &CommitTimestamp) -> Result<(), GreenifyError> {
        (**self).commit_at(timestamp)
    }
}

/// Settings shared by every driver.
///
/// # Examples
///
/// ```
/// use greenify_repo::CommitOptions;
///
/// let opts = CommitOptions::default();
/// assert_eq!(opts.message, ".");
/// assert_eq!(opts.file_name, "output.txt");
/// assert!(opts.author.is_none());
/// ```
#[derive(Debug, Clone)]
pub struct CommitOptions {
    /// Message for every commit (default: `"."`).
    pub message: String,
    /// Identity override; `None` uses the backend's configured user.
    pub author: Option<AuthorConfig>,
    /// File rewritten before each commit (default: `output.txt`).
    pub file_name: String,
    /// Seed for the random file contents.
    pub content_seed: u64,
}

impl Default for CommitOptions {
    fn default() -> Self {
        Self {
            message: ".".into(),
            author: None,
            file_name: "output.txt".into(),
            content_seed: 0,
        }
    }
}

/// Create `path` if needed and delete any `.git` inside it.
pub(crate) fn reset_repository_dir(path: &Path) -> Result<(), GreenifyError> {
    std::fs::create_dir_all(path)?;

    let git_dir = path.join(".git");
    if git_dir.is_dir() {
        debug!(path = %git_dir.display(), "removing existing repository metadata");
        std::fs::remove_dir_all(&git_dir)?;
    } else if git_dir.exists() {
        std::fs::remove_file(&git_dir)?;
    }
    Ok(())
}
