//! Whole-range history planning.

use chrono::NaiveDate;
use greenify_core::{CommitHistory, GreenifyConfig, GreenifyError, RateConfig, TimezoneOffset};
use rand::Rng;
use tracing::info;

use crate::daily::sample_daily_counts;
use crate::intraday::{sample_times_for_day_with_limits, SamplerLimits};

/// Plans a [`CommitHistory`] from weekday and weekend rate configurations.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use greenify_core::{GreenifyConfig, TimezoneOffset};
/// use greenify_plan::HistoryPlanner;
///
/// let mut config = GreenifyConfig::default();
/// config.timezone = Some(TimezoneOffset::utc());
/// let planner = HistoryPlanner::from_config(&config).unwrap();
///
/// let start = NaiveDate::from_ymd_opt(2019, 1, 1).unwrap();
/// let end = NaiveDate::from_ymd_opt(2019, 3, 31).unwrap();
/// let history = planner.plan(start, end, &mut rand::rng()).unwrap();
/// assert_eq!(history.days().len(), 90);
/// ```
#[derive(Debug, Clone)]
pub struct HistoryPlanner {
    weekday: RateConfig,
    weekend: RateConfig,
    offset: TimezoneOffset,
    limits: SamplerLimits,
}

impl HistoryPlanner {
    /// Create a planner after validating both configurations.
    ///
    /// # Errors
    ///
    /// Returns [`GreenifyError::InvalidConfig`] naming the bad field.
    pub fn new(
        weekday: RateConfig,
        weekend: RateConfig,
        offset: TimezoneOffset,
    ) -> Result<Self, GreenifyError> {
        weekday.validate("weekdays")?;
        weekend.validate("weekends")?;
        Ok(Self {
            weekday,
            weekend,
            offset,
            limits: SamplerLimits::default(),
        })
    }

    /// Build a planner from a loaded configuration file.
    pub fn from_config(config: &GreenifyConfig) -> Result<Self, GreenifyError> {
        let (weekday, weekend) = config.rates()?;
        Self::new(weekday, weekend, config.timezone_or_local())
    }

    /// Override the rejection-sampling limits.
    pub fn with_limits(mut self, limits: SamplerLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn offset(&self) -> TimezoneOffset {
        self.offset
    }

    /// Plan every commit from `start` to `end` inclusive.
    ///
    /// Days are processed in ascending order and each day's times are
    /// sorted, so the concatenated history is globally sorted.
    ///
    /// # Errors
    ///
    /// Propagates [`GreenifyError::InvalidRange`] and
    /// [`GreenifyError::InfeasibleDensity`] from the samplers.
    pub fn plan<R: Rng + ?Sized>(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        rng: &mut R,
    ) -> Result<CommitHistory, GreenifyError> {
        let days = sample_daily_counts(start, end, &self.weekday, &self.weekend, rng)?;

        let total: usize = days.iter().map(|d| d.commit_count).sum();
        let mut commits = Vec::with_capacity(total);
        for day in &days {
            let cfg = if day.is_weekend {
                &self.weekend
            } else {
                &self.weekday
            };
            let times = sample_times_for_day_with_limits(
                day.date,
                day.commit_count,
                cfg,
                self.offset,
                &self.limits,
                rng,
            )?;
            commits.extend(times);
        }

        info!(
            days = days.len(),
            commits = commits.len(),
            offset = %self.offset,
            "planned commit history"
        );
        Ok(CommitHistory::new(days, commits))
    }
}

/// Plan a history in one call.
///
/// Equivalent to [`HistoryPlanner::new`] followed by [`HistoryPlanner::plan`].
pub fn plan<R: Rng + ?Sized>(
    start: NaiveDate,
    end: NaiveDate,
    weekday_cfg: &RateConfig,
    weekend_cfg: &RateConfig,
    offset: TimezoneOffset,
    rng: &mut R,
) -> Result<CommitHistory, GreenifyError> {
    HistoryPlanner::new(*weekday_cfg, *weekend_cfg, offset)?.plan(start, end, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use greenify_core::HourRange;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn weekday() -> RateConfig {
        RateConfig {
            average_daily_commits: 4.0,
            commit_hour_mean: 15.0,
            commit_hour_stddev: 3.0,
            allowed_hour_range: HourRange::new(9.0, 23.0),
            minimum_gap_hours: 600.0 / 3600.0,
        }
    }

    fn weekend() -> RateConfig {
        RateConfig {
            average_daily_commits: 1.0,
            commit_hour_mean: 13.0,
            commit_hour_stddev: 2.0,
            allowed_hour_range: HourRange::new(10.0, 18.0),
            minimum_gap_hours: 0.5,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn history_is_sorted_and_complete() {
        let mut rng = ChaCha8Rng::seed_from_u64(31);
        let history = plan(
            date(2019, 1, 1),
            date(2019, 6, 30),
            &weekday(),
            &weekend(),
            TimezoneOffset::utc(),
            &mut rng,
        )
        .unwrap();

        let expected: usize = history.days().iter().map(|d| d.commit_count).sum();
        assert_eq!(history.len(), expected);
        assert!(!history.is_empty());
        assert!(history.commits().windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn each_day_uses_its_own_config() {
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        let history = plan(
            date(2019, 1, 1),
            date(2019, 3, 31),
            &weekday(),
            &weekend(),
            TimezoneOffset::utc(),
            &mut rng,
        )
        .unwrap();

        for ts in &history {
            let day = history
                .days()
                .iter()
                .find(|d| d.date == ts.date_naive())
                .expect("commit on a planned day");
            let cfg = if day.is_weekend { weekend() } else { weekday() };
            let hour = f64::from(chrono::Timelike::num_seconds_from_midnight(ts)) / 3600.0;
            assert!(cfg.allowed_hour_range.contains(hour));
        }

        for day in history.days() {
            let on_day = history.iter().filter(|t| t.date_naive() == day.date).count();
            assert_eq!(on_day, day.commit_count);
        }
    }

    #[test]
    fn same_seed_same_history() {
        let planner = HistoryPlanner::new(weekday(), weekend(), "+0100".parse().unwrap()).unwrap();
        let run = |seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            planner.plan(date(2020, 1, 1), date(2020, 12, 31), &mut rng).unwrap()
        };
        assert_eq!(run(123), run(123));
        assert_ne!(run(123), run(124));
    }

    #[test]
    fn invalid_config_rejected_up_front() {
        let bad = RateConfig {
            allowed_hour_range: HourRange::new(20.0, 8.0),
            ..weekend()
        };
        let err = HistoryPlanner::new(weekday(), bad, TimezoneOffset::utc()).unwrap_err();
        assert!(err.to_string().contains("weekends.commit_range"));
    }

    #[test]
    fn infeasible_day_aborts_plan() {
        let crowded = RateConfig {
            average_daily_commits: 30.0,
            allowed_hour_range: HourRange::new(9.0, 10.0),
            minimum_gap_hours: 1.0,
            ..weekday()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let err = plan(
            date(2019, 1, 1),
            date(2019, 1, 7),
            &crowded,
            &weekend(),
            TimezoneOffset::utc(),
            &mut rng,
        )
        .unwrap_err();
        assert!(matches!(err, GreenifyError::InfeasibleDensity { .. }));
    }

    #[test]
    fn sampler_limits_apply_to_every_day() {
        let busy = RateConfig {
            average_daily_commits: 40.0,
            minimum_gap_hours: 0.25,
            ..weekday()
        };
        let planner = HistoryPlanner::new(busy, weekend(), TimezoneOffset::utc())
            .unwrap()
            .with_limits(SamplerLimits {
                max_attempts_per_commit: 1,
                min_attempts: 0,
            });
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let err = planner
            .plan(date(2019, 1, 1), date(2019, 1, 4), &mut rng)
            .unwrap_err();
        match err {
            GreenifyError::InfeasibleDensity {
                requested,
                accepted,
                ..
            } => assert!(accepted < requested),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn reversed_range_is_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let err = plan(
            date(2019, 1, 2),
            date(2019, 1, 1),
            &weekday(),
            &weekend(),
            TimezoneOffset::utc(),
            &mut rng,
        )
        .unwrap_err();
        assert!(matches!(err, GreenifyError::InvalidRange { .. }));
    }

    #[test]
    fn history_serializes_with_camel_case_days() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let history = plan(
            date(2019, 1, 5),
            date(2019, 1, 6),
            &weekday(),
            &weekend(),
            TimezoneOffset::utc(),
            &mut rng,
        )
        .unwrap();
        let json = serde_json::to_value(&history).unwrap();
        assert_eq!(json["days"][0]["date"], "2019-01-05");
        assert_eq!(json["days"][0]["isWeekend"], true);
        assert!(json["days"][1]["commitCount"].is_u64());
        assert!(json["commits"].is_array());
    }
}
