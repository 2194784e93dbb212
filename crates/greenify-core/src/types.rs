use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, Local, NaiveDate, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::error::GreenifyError;

/// A single commit instant: date, time of day, and UTC offset.
pub type CommitTimestamp = DateTime<FixedOffset>;

/// Half-open `[low, high)` interval of hours of the day.
///
/// # Examples
///
/// ```
/// use greenify_core::HourRange;
///
/// let range = HourRange::new(9.0, 17.0);
/// assert!(range.contains(9.0));
/// assert!(!range.contains(17.0));
/// assert_eq!(range.width(), 8.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HourRange {
    /// Inclusive lower bound.
    pub low: f64,
    /// Exclusive upper bound.
    pub high: f64,
}

impl HourRange {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    pub fn contains(&self, hour: f64) -> bool {
        hour >= self.low && hour < self.high
    }

    pub fn width(&self) -> f64 {
        self.high - self.low
    }
}

/// Statistical parameters for one class of day (weekday or weekend).
///
/// Built from the on-disk settings by
/// [`RateSettings::to_rate_config`](crate::RateSettings::to_rate_config),
/// which converts the minimum spacing from seconds to hours.
///
/// # Examples
///
/// ```
/// use greenify_core::{HourRange, RateConfig};
///
/// let cfg = RateConfig {
///     average_daily_commits: 3.0,
///     commit_hour_mean: 15.0,
///     commit_hour_stddev: 3.0,
///     allowed_hour_range: HourRange::new(9.0, 23.0),
///     minimum_gap_hours: 0.25,
/// };
/// assert!(cfg.validate("weekdays").is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateConfig {
    /// Poisson rate: mean commits per day.
    pub average_daily_commits: f64,
    /// Mean of the hour-of-day normal distribution.
    pub commit_hour_mean: f64,
    /// Standard deviation of the hour-of-day normal distribution.
    pub commit_hour_stddev: f64,
    /// Hours of the day commits may land in.
    pub allowed_hour_range: HourRange,
    /// Minimum spacing between two commits of the same day, in hours.
    pub minimum_gap_hours: f64,
}

impl RateConfig {
    /// Check every field. `label` prefixes the offending field in the error.
    ///
    /// # Errors
    ///
    /// Returns [`GreenifyError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self, label: &str) -> Result<(), GreenifyError> {
        self.validate_rate(label)?;
        self.validate_timing(label)
    }

    /// Check only the daily commit rate.
    ///
    /// A rate of exactly zero is allowed and disables commits for the day
    /// class.
    pub fn validate_rate(&self, label: &str) -> Result<(), GreenifyError> {
        let rate = self.average_daily_commits;
        if !rate.is_finite() || rate < 0.0 {
            return Err(GreenifyError::InvalidConfig(format!(
                "{label}.avg_daily_commits must be a non-negative number, got {rate}"
            )));
        }
        Ok(())
    }

    /// Check the hour-of-day distribution, allowed range, and spacing.
    pub fn validate_timing(&self, label: &str) -> Result<(), GreenifyError> {
        if !self.commit_hour_mean.is_finite() {
            return Err(GreenifyError::InvalidConfig(format!(
                "{label}.commit_hour_mu must be a finite number"
            )));
        }
        let sigma = self.commit_hour_stddev;
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(GreenifyError::InvalidConfig(format!(
                "{label}.commit_hour_sigma must be positive, got {sigma}"
            )));
        }
        let HourRange { low, high } = self.allowed_hour_range;
        if !(low.is_finite() && high.is_finite()) || low >= high {
            return Err(GreenifyError::InvalidConfig(format!(
                "{label}.commit_range [{low}, {high}) is empty"
            )));
        }
        if low < 0.0 || high > 24.0 {
            return Err(GreenifyError::InvalidConfig(format!(
                "{label}.commit_range [{low}, {high}) must lie within [0, 24]"
            )));
        }
        let gap = self.minimum_gap_hours;
        if !gap.is_finite() || gap < 0.0 {
            return Err(GreenifyError::InvalidConfig(format!(
                "{label}.minimum_seconds_between_commits must be non-negative"
            )));
        }
        Ok(())
    }
}

/// The number of commits planned for one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayPlan {
    pub date: NaiveDate,
    /// Saturday or Sunday.
    pub is_weekend: bool,
    pub commit_count: usize,
}

/// Chronologically sorted commit timestamps for a whole date range.
///
/// Produced by the planner, consumed by the repository materializer. The
/// per-day plans are kept alongside for reporting.
///
/// # Examples
///
/// ```
/// use greenify_core::CommitHistory;
///
/// let history = CommitHistory::new(Vec::new(), Vec::new());
/// assert!(history.is_empty());
/// assert_eq!(history.len(), 0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitHistory {
    days: Vec<DayPlan>,
    commits: Vec<CommitTimestamp>,
}

impl CommitHistory {
    /// Wrap already-sorted commits and the day plans they came from.
    pub fn new(days: Vec<DayPlan>, commits: Vec<CommitTimestamp>) -> Self {
        debug_assert!(commits.windows(2).all(|w| w[0] <= w[1]));
        Self { days, commits }
    }

    pub fn days(&self) -> &[DayPlan] {
        &self.days
    }

    pub fn commits(&self) -> &[CommitTimestamp] {
        &self.commits
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CommitTimestamp> {
        self.commits.iter()
    }

    pub fn len(&self) -> usize {
        self.commits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    /// Number of planned days with at least one commit.
    pub fn active_days(&self) -> usize {
        self.days.iter().filter(|d| d.commit_count > 0).count()
    }

    /// Total commits planned on weekend days.
    pub fn weekend_commits(&self) -> usize {
        self.days
            .iter()
            .filter(|d| d.is_weekend)
            .map(|d| d.commit_count)
            .sum()
    }
}

impl<'a> IntoIterator for &'a CommitHistory {
    type Item = &'a CommitTimestamp;
    type IntoIter = std::slice::Iter<'a, CommitTimestamp>;

    fn into_iter(self) -> Self::IntoIter {
        self.commits.iter()
    }
}

/// A fixed UTC offset written as `+HHMM` (git's notation).
///
/// # Examples
///
/// ```
/// use greenify_core::TimezoneOffset;
///
/// let tz: TimezoneOffset = "+0200".parse().unwrap();
/// assert_eq!(tz.as_fixed().local_minus_utc(), 7200);
/// assert_eq!(tz.to_string(), "+0200");
///
/// let tz: TimezoneOffset = "-05:30".parse().unwrap();
/// assert_eq!(tz.to_string(), "-0530");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimezoneOffset(FixedOffset);

impl TimezoneOffset {
    /// The machine's current UTC offset.
    pub fn local() -> Self {
        Self(*Local::now().offset())
    }

    pub fn utc() -> Self {
        Self(Utc.fix())
    }

    pub fn as_fixed(&self) -> FixedOffset {
        self.0
    }
}

impl From<FixedOffset> for TimezoneOffset {
    fn from(offset: FixedOffset) -> Self {
        Self(offset)
    }
}

impl fmt::Display for TimezoneOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.0.local_minus_utc();
        let sign = if secs < 0 { '-' } else { '+' };
        let minutes = secs.abs() / 60;
        write!(f, "{sign}{:02}{:02}", minutes / 60, minutes % 60)
    }
}

impl FromStr for TimezoneOffset {
    type Err = GreenifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            GreenifyError::InvalidConfig(format!(
                "timezone must look like +HHMM or -HH:MM, got {s:?}"
            ))
        };

        let s = s.trim();
        if s.eq_ignore_ascii_case("z") || s.eq_ignore_ascii_case("utc") {
            return Ok(Self::utc());
        }

        let (sign, rest) = match s.chars().next() {
            Some('+') => (1, &s[1..]),
            Some('-') => (-1, &s[1..]),
            _ => return Err(invalid()),
        };
        let digits: String = rest.chars().filter(|c| *c != ':').collect();
        if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let hours: i32 = digits[..2].parse().map_err(|_| invalid())?;
        let minutes: i32 = digits[2..].parse().map_err(|_| invalid())?;
        if hours > 23 || minutes > 59 {
            return Err(invalid());
        }

        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
            .map(Self)
            .ok_or_else(invalid)
    }
}

impl TryFrom<String> for TimezoneOffset {
    type Error = GreenifyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimezoneOffset> for String {
    fn from(value: TimezoneOffset) -> Self {
        value.to_string()
    }
}

/// How `--dry-run` prints a planned history.
///
/// # Examples
///
/// ```
/// use greenify_core::OutputFormat;
///
/// let fmt: OutputFormat = "md".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Markdown);
/// assert_eq!(fmt.to_string(), "markdown");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Every planned timestamp on its own line, then a one-line tally.
    #[default]
    Text,
    /// The whole [`CommitHistory`], days and timestamps, as JSON.
    Json,
    /// Per-day table of commit counts with a total.
    Markdown,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [Self::Text, Self::Json, Self::Markdown];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
            Self::Markdown => "markdown",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        if wanted == "md" {
            return Ok(Self::Markdown);
        }
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == wanted)
            .ok_or_else(|| {
                let names: Vec<_> = Self::ALL.iter().map(|f| f.as_str()).collect();
                format!("unknown report format {s:?}, expected one of: {}", names.join(", "))
            })
    }
}
