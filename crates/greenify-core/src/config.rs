use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::GreenifyError;
use crate::types::{HourRange, RateConfig, TimezoneOffset};

/// Top-level configuration loaded from `config.json` (or a `.toml` file).
///
/// `weekdays` and `weekends` are required; everything else is optional.
///
/// # Examples
///
/// ```
/// use greenify_core::GreenifyConfig;
///
/// let config = GreenifyConfig::default();
/// assert_eq!(config.weekdays.avg_daily_commits, 3.0);
/// assert_eq!(config.commit_message, ".");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GreenifyConfig {
    /// UTC offset for every commit (e.g. `"+0200"`). Defaults to the
    /// machine's offset at startup.
    #[serde(default)]
    pub timezone: Option<TimezoneOffset>,
    /// Message used for every commit (default: `"."`).
    #[serde(default = "default_commit_message")]
    pub commit_message: String,
    /// Identity recorded as author and committer. Falls back to the git
    /// `user.name` / `user.email` settings.
    #[serde(default)]
    pub author: Option<AuthorConfig>,
    /// Settings for Monday through Friday.
    pub weekdays: RateSettings,
    /// Settings for Saturday and Sunday.
    pub weekends: RateSettings,
}

fn default_commit_message() -> String {
    ".".into()
}

impl Default for GreenifyConfig {
    fn default() -> Self {
        Self {
            timezone: None,
            commit_message: default_commit_message(),
            author: None,
            weekdays: RateSettings {
                avg_daily_commits: 3.0,
                commit_hour_mu: 15.0,
                commit_hour_sigma: 3.0,
                commit_range: [9.0, 23.0],
                minimum_seconds_between_commits: 600.0,
            },
            weekends: RateSettings {
                avg_daily_commits: 1.0,
                commit_hour_mu: 14.0,
                commit_hour_sigma: 4.0,
                commit_range: [10.0, 22.0],
                minimum_seconds_between_commits: 1200.0,
            },
        }
    }
}

impl GreenifyConfig {
    /// Load configuration from `path`.
    ///
    /// Files ending in `.toml` are parsed as TOML, anything else as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`GreenifyError::FileNotFound`] if `path` does not exist,
    /// [`GreenifyError::Io`] if it cannot be read, or a parse error.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use greenify_core::GreenifyConfig;
    /// use std::path::Path;
    ///
    /// let config = GreenifyConfig::from_file(Path::new("config.json")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, GreenifyError> {
        if !path.exists() {
            return Err(GreenifyError::FileNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        if is_toml {
            Self::from_toml(&content)
        } else {
            Self::from_json(&content)
        }
    }

    /// Parse configuration from a JSON string.
    ///
    /// # Examples
    ///
    /// ```
    /// use greenify_core::GreenifyConfig;
    ///
    /// let json = r#"{
    ///   "timezone": "+0200",
    ///   "weekdays": { "avg_daily_commits": 4, "commit_hour_mu": 16, "commit_hour_sigma": 2,
    ///                 "commit_range": [9, 23], "minimum_seconds_between_commits": 900 },
    ///   "weekends": { "avg_daily_commits": 1, "commit_hour_mu": 14, "commit_hour_sigma": 3,
    ///                 "commit_range": [10, 22], "minimum_seconds_between_commits": 1800 }
    /// }"#;
    /// let config = GreenifyConfig::from_json(json).unwrap();
    /// assert_eq!(config.weekdays.avg_daily_commits, 4.0);
    /// ```
    pub fn from_json(content: &str) -> Result<Self, GreenifyError> {
        let config: Self = serde_json::from_str(content)?;
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, GreenifyError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Validated weekday and weekend rate configurations, in that order.
    ///
    /// # Errors
    ///
    /// Returns [`GreenifyError::InvalidConfig`] naming the offending field.
    pub fn rates(&self) -> Result<(RateConfig, RateConfig), GreenifyError> {
        Ok((
            self.weekdays.to_rate_config("weekdays")?,
            self.weekends.to_rate_config("weekends")?,
        ))
    }

    /// Configured offset, or the machine's current one.
    pub fn timezone_or_local(&self) -> TimezoneOffset {
        self.timezone.unwrap_or_else(TimezoneOffset::local)
    }
}

/// On-disk rate settings for one class of day.
///
/// Field names follow the configuration file; see [`RateConfig`] for the
/// validated form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSettings {
    /// Mean commits per day.
    pub avg_daily_commits: f64,
    /// Mean commit hour (0-24 scale).
    pub commit_hour_mu: f64,
    /// Standard deviation of the commit hour.
    pub commit_hour_sigma: f64,
    /// `[low, high)` hours commits may fall in.
    pub commit_range: [f64; 2],
    /// Minimum spacing between two commits on the same day.
    pub minimum_seconds_between_commits: f64,
}

impl RateSettings {
    /// Convert to a validated [`RateConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`GreenifyError::InvalidConfig`] with `label` prefixed to the
    /// offending field name.
    ///
    /// # Examples
    ///
    /// ```
    /// use greenify_core::GreenifyConfig;
    ///
    /// let config = GreenifyConfig::default();
    /// let rate = config.weekdays.to_rate_config("weekdays").unwrap();
    /// assert!((rate.minimum_gap_hours - 600.0 / 3600.0).abs() < 1e-12);
    /// ```
    pub fn to_rate_config(&self, label: &str) -> Result<RateConfig, GreenifyError> {
        let [low, high] = self.commit_range;
        let rate = RateConfig {
            average_daily_commits: self.avg_daily_commits,
            commit_hour_mean: self.commit_hour_mu,
            commit_hour_stddev: self.commit_hour_sigma,
            allowed_hour_range: HourRange::new(low, high),
            minimum_gap_hours: self.minimum_seconds_between_commits / 3600.0,
        };
        rate.validate(label)?;
        Ok(rate)
    }
}

/// Commit identity override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorConfig {
    pub name: String,
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_JSON: &str = r#"{
  "timezone": "+0200",
  "weekdays": {
    "avg_daily_commits": 3,
    "commit_hour_mu": 15,
    "commit_hour_sigma": 3,
    "commit_range": [9, 23],
    "minimum_seconds_between_commits": 600
  },
  "weekends": {
    "avg_daily_commits": 1.5,
    "commit_hour_mu": 14,
    "commit_hour_sigma": 4,
    "commit_range": [10, 22],
    "minimum_seconds_between_commits": 1800
  }
}"#;

    #[test]
    fn default_config_has_expected_values() {
        let config = GreenifyConfig::default();
        assert_eq!(config.weekdays.commit_range, [9.0, 23.0]);
        assert_eq!(config.weekends.avg_daily_commits, 1.0);
        assert!(config.timezone.is_none());
        assert!(config.author.is_none());
        assert!(config.rates().is_ok());
    }

    #[test]
    fn parse_sample_json() {
        let config = GreenifyConfig::from_json(SAMPLE_JSON).unwrap();
        assert_eq!(config.weekends.avg_daily_commits, 1.5);
        assert_eq!(config.timezone.unwrap().to_string(), "+0200");
        assert_eq!(config.commit_message, ".");

        let (weekday, weekend) = config.rates().unwrap();
        assert_eq!(weekday.allowed_hour_range, HourRange::new(9.0, 23.0));
        assert!((weekend.minimum_gap_hours - 0.5).abs() < 1e-12);
    }

    #[test]
    fn reparsing_yields_identical_rates() {
        let first = GreenifyConfig::from_json(SAMPLE_JSON).unwrap().rates().unwrap();
        let second = GreenifyConfig::from_json(SAMPLE_JSON).unwrap().rates().unwrap();
        assert_eq!(first, second);

        let config = GreenifyConfig::from_json(SAMPLE_JSON).unwrap();
        let round_trip =
            GreenifyConfig::from_json(&serde_json::to_string(&config).unwrap()).unwrap();
        assert_eq!(config, round_trip);
    }

    #[test]
    fn parse_toml() {
        let toml = r#"
timezone = "-0500"
commit_message = "wip"

[author]
name = "Jane Doe"
email = "jane@example.com"

[weekdays]
avg_daily_commits = 2
commit_hour_mu = 11
commit_hour_sigma = 2.5
commit_range = [8, 20]
minimum_seconds_between_commits = 0

[weekends]
avg_daily_commits = 0
commit_hour_mu = 12
commit_hour_sigma = 1
commit_range = [10, 14]
minimum_seconds_between_commits = 60
"#;
        let config = GreenifyConfig::from_toml(toml).unwrap();
        assert_eq!(config.commit_message, "wip");
        assert_eq!(config.author.as_ref().unwrap().email, "jane@example.com");
        assert_eq!(config.weekdays.commit_range, [8.0, 20.0]);
        let (_, weekend) = config.rates().unwrap();
        assert_eq!(weekend.average_daily_commits, 0.0);
    }

    #[test]
    fn missing_weekends_is_an_error() {
        let json = r#"{ "weekdays": { "avg_daily_commits": 1, "commit_hour_mu": 12,
            "commit_hour_sigma": 1, "commit_range": [9, 17],
            "minimum_seconds_between_commits": 0 } }"#;
        assert!(matches!(
            GreenifyConfig::from_json(json),
            Err(GreenifyError::Serialization(_))
        ));
    }

    #[test]
    fn bad_timezone_is_an_error() {
        let json = SAMPLE_JSON.replace("+0200", "two hours east");
        assert!(GreenifyConfig::from_json(&json).is_err());
    }

    #[test]
    fn invalid_range_names_field() {
        let mut config = GreenifyConfig::default();
        config.weekends.commit_range = [18.0, 9.0];
        let err = config.rates().unwrap_err();
        assert!(matches!(err, GreenifyError::InvalidConfig(_)));
        assert!(err.to_string().contains("weekends.commit_range"));
    }

    #[test]
    fn from_file_picks_format_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("config.json");
        std::fs::write(&json_path, SAMPLE_JSON).unwrap();
        let from_json = GreenifyConfig::from_file(&json_path).unwrap();

        let toml_path = dir.path().join("config.toml");
        std::fs::write(&toml_path, toml::to_string(&from_json).unwrap()).unwrap();
        let from_toml = GreenifyConfig::from_file(&toml_path).unwrap();

        assert_eq!(from_json, from_toml);
    }

    #[test]
    fn from_file_missing_path() {
        let err = GreenifyConfig::from_file(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, GreenifyError::FileNotFound(_)));
    }
}
