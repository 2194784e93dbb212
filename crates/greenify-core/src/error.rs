use std::path::PathBuf;

use chrono::NaiveDate;

/// Errors that can occur while planning or writing a synthetic history.
///
/// Every variant is fatal to a run. Library crates return this type
/// directly; the binary renders it through `miette` at the boundary.
///
/// # Examples
///
/// ```
/// use greenify_core::GreenifyError;
///
/// let err = GreenifyError::InvalidConfig("weekdays.commit_range is empty".into());
/// assert!(err.to_string().contains("commit_range"));
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum GreenifyError {
    /// Malformed or out-of-range configuration value.
    #[error("invalid configuration: {0}")]
    #[diagnostic(code(greenify::config))]
    InvalidConfig(String),

    /// End date lies before start date.
    #[error("invalid date range: end {end} is before start {start}")]
    #[diagnostic(
        code(greenify::range),
        help("pass an --end date on or after --start")
    )]
    InvalidRange {
        /// First day of the requested range.
        start: NaiveDate,
        /// Last day of the requested range.
        end: NaiveDate,
    },

    /// The requested commits cannot be spaced inside the allowed hours.
    #[error(
        "cannot fit {requested} commits on {date}: only {accepted} placed before giving up"
    )]
    #[diagnostic(
        code(greenify::density),
        help("widen commit_range, lower minimum_seconds_between_commits, or lower avg_daily_commits")
    )]
    InfeasibleDensity {
        /// Day being sampled.
        date: NaiveDate,
        /// Commits requested for the day.
        requested: usize,
        /// Commits accepted before the attempt budget ran out.
        accepted: usize,
    },

    /// The version-control backend reported a failure.
    #[error("repository operation `{operation}` failed: {detail}")]
    #[diagnostic(code(greenify::repository))]
    RepositoryOperationFailed {
        /// Name of the failing operation (e.g. `init`, `commit`).
        operation: String,
        /// Backend-provided failure description.
        detail: String,
    },

    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A required file was not found.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),
}

impl GreenifyError {
    /// Shorthand for a [`GreenifyError::RepositoryOperationFailed`].
    pub fn repository(operation: impl Into<String>, detail: impl ToString) -> Self {
        Self::RepositoryOperationFailed {
            operation: operation.into(),
            detail: detail.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: GreenifyError = io_err.into();
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn config_error_displays_message() {
        let err = GreenifyError::InvalidConfig("bad value".into());
        assert_eq!(err.to_string(), "invalid configuration: bad value");
    }

    #[test]
    fn range_error_names_both_dates() {
        let err = GreenifyError::InvalidRange {
            start: NaiveDate::from_ymd_opt(2020, 5, 2).unwrap(),
            end: NaiveDate::from_ymd_opt(2020, 5, 1).unwrap(),
        };
        let msg = err.to_string();
        assert!(msg.contains("2020-05-01"));
        assert!(msg.contains("2020-05-02"));
    }

    #[test]
    fn density_error_names_day() {
        let err = GreenifyError::InfeasibleDensity {
            date: NaiveDate::from_ymd_opt(2019, 1, 1).unwrap(),
            requested: 5,
            accepted: 1,
        };
        assert!(err.to_string().contains("2019-01-01"));
        assert!(err.to_string().contains("5 commits"));
    }

    #[test]
    fn repository_helper_builds_variant() {
        let err = GreenifyError::repository("commit", "nothing to commit");
        assert_eq!(
            err.to_string(),
            "repository operation `commit` failed: nothing to commit"
        );
    }

    #[test]
    fn file_not_found_shows_path() {
        let err = GreenifyError::FileNotFound(PathBuf::from("/tmp/config.json"));
        assert!(err.to_string().contains("/tmp/config.json"));
    }
}
