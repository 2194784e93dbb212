//! Driver that shells out to the `git` executable.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use greenify_core::{CommitTimestamp, GreenifyError, TimezoneOffset};
use tracing::{debug, info};

use crate::content::ContentWriter;
use crate::driver::{reset_repository_dir, CommitOptions, RepositoryDriver};

/// Git's raw date format: `<unix seconds> <+HHMM>`.
///
/// # Examples
///
/// ```
/// use chrono::{FixedOffset, TimeZone};
/// use greenify_repo::cli::git_date;
///
/// let ts = FixedOffset::east_opt(3600).unwrap().with_ymd_and_hms(2019, 1, 1, 10, 0, 0).unwrap();
/// assert_eq!(git_date(&ts), "1546333200 +0100");
/// ```
pub fn git_date(timestamp: &CommitTimestamp) -> String {
    format!(
        "{} {}",
        timestamp.timestamp(),
        TimezoneOffset::from(*timestamp.offset())
    )
}

/// Runs `git init`, `git add .`, and `git commit` in the target directory.
///
/// Author and committer dates are passed through `--date` and
/// `GIT_COMMITTER_DATE`. An identity from [`CommitOptions::author`] is
/// exported through the `GIT_AUTHOR_*` / `GIT_COMMITTER_*` variables.
pub struct GitCliDriver {
    program: OsString,
    options: CommitOptions,
    content: ContentWriter,
    workdir: Option<PathBuf>,
}

impl GitCliDriver {
    /// Use the `git` found on `PATH`.
    pub fn new(options: CommitOptions) -> Self {
        Self::with_program("git", options)
    }

    /// Use a specific git executable.
    pub fn with_program(program: impl Into<OsString>, options: CommitOptions) -> Self {
        let content = ContentWriter::new(options.file_name.clone(), options.content_seed);
        Self {
            program: program.into(),
            options,
            content,
            workdir: None,
        }
    }

    fn run(
        &self,
        operation: &str,
        dir: &Path,
        args: &[&str],
        envs: &[(&str, String)],
    ) -> Result<(), GreenifyError> {
        debug!(?args, "running git");
        let output = Command::new(&self.program)
            .args(["-c", "commit.gpgsign=false"])
            .args(args)
            .envs(envs.iter().map(|(k, v)| (*k, v.as_str())))
            .current_dir(dir)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                GreenifyError::repository(
                    operation,
                    format!("failed to run {}: {e}", self.program.to_string_lossy()),
                )
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            let detail = if stderr.trim().is_empty() {
                stdout.trim().to_string()
            } else {
                stderr.trim().to_string()
            };
            return Err(GreenifyError::repository(
                operation,
                format!("git exited with {}: {detail}", output.status),
            ));
        }
        Ok(())
    }
}

impl RepositoryDriver for GitCliDriver {
    fn initialize_repository(&mut self, path: &Path) -> Result<(), GreenifyError> {
        reset_repository_dir(path)?;
        self.run("init", path, &["init", "--quiet"], &[])?;
        info!(path = %path.display(), "initialized repository");
        self.workdir = Some(path.to_path_buf());
        Ok(())
    }

    fn commit_at(&mut self, timestamp: &CommitTimestamp) -> Result<(), GreenifyError> {
        let dir = self
            .workdir
            .clone()
            .ok_or_else(|| GreenifyError::repository("commit", "repository not initialized"))?;

        self.content.write(&dir)?;
        self.run("add", &dir, &["add", "."], &[])?;

        let date = git_date(timestamp);
        let mut envs = vec![("GIT_COMMITTER_DATE", date.clone())];
        if let Some(author) = &self.options.author {
            envs.push(("GIT_AUTHOR_NAME", author.name.clone()));
            envs.push(("GIT_AUTHOR_EMAIL", author.email.clone()));
            envs.push(("GIT_COMMITTER_NAME", author.name.clone()));
            envs.push(("GIT_COMMITTER_EMAIL", author.email.clone()));
        }
        self.run(
            "commit",
            &dir,
            &[
                "commit",
                "--quiet",
                "--no-verify",
                "-m",
                self.options.message.as_str(),
                "--date",
                date.as_str(),
            ],
            &envs,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    #[test]
    fn git_date_uses_offset() {
        let ts = FixedOffset::west_opt(5 * 3600 + 1800)
            .unwrap()
            .with_ymd_and_hms(2019, 1, 1, 0, 0, 0)
            .unwrap();
        assert_eq!(git_date(&ts), format!("{} -0530", ts.timestamp()));
    }

    #[test]
    fn missing_program_is_repository_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut driver =
            GitCliDriver::with_program("greenify-no-such-git-binary", CommitOptions::default());
        let err = driver.initialize_repository(dir.path()).unwrap_err();
        match err {
            GreenifyError::RepositoryOperationFailed { operation, .. } => {
                assert_eq!(operation, "init");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn commit_before_init_fails() {
        let mut driver = GitCliDriver::new(CommitOptions::default());
        let ts = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2019, 1, 1, 12, 0, 0)
            .unwrap();
        assert!(driver.commit_at(&ts).is_err());
    }
}
