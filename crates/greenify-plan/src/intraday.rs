//! Commit times within a single day.
//!
//! Hours are drawn from a normal distribution and rejected until enough of
//! them land inside the allowed range with the required spacing. Samples
//! are quantized to whole seconds before the checks, so the spacing and
//! range guarantees hold for the resulting timestamps exactly.

use chrono::{NaiveDate, NaiveTime, TimeZone};
use greenify_core::{CommitTimestamp, GreenifyError, RateConfig, TimezoneOffset};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use tracing::{debug, trace};

use crate::daily::is_weekend;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Bounds on the rejection-sampling loop.
///
/// # Examples
///
/// ```
/// use greenify_plan::intraday::SamplerLimits;
///
/// let limits = SamplerLimits::default();
/// assert_eq!(limits.attempt_budget(3), 30_000);
/// assert_eq!(limits.attempt_budget(0), 10_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerLimits {
    /// Draws allowed per requested commit (default: 10 000).
    pub max_attempts_per_commit: usize,
    /// Floor on the total draws for a day (default: 10 000).
    pub min_attempts: usize,
}

impl Default for SamplerLimits {
    fn default() -> Self {
        Self {
            max_attempts_per_commit: 10_000,
            min_attempts: 10_000,
        }
    }
}

impl SamplerLimits {
    /// Total draws allowed when `count` commits are requested.
    pub fn attempt_budget(&self, count: usize) -> usize {
        count
            .saturating_mul(self.max_attempts_per_commit)
            .max(self.min_attempts)
    }
}

/// Upper bound on how many second-aligned samples pairwise at least
/// `gap_secs` apart fit in the range. `None` when there is no spacing.
fn max_slots(cfg: &RateConfig, gap_secs: f64) -> Option<usize> {
    if gap_secs <= 0.0 {
        return None;
    }
    let width_secs = cfg.allowed_hour_range.width() * SECONDS_PER_HOUR;
    // the cast saturates for sub-second gaps
    Some(((width_secs / gap_secs).floor() as usize).saturating_add(1))
}

/// Sample `count` commit timestamps on `date` with the default limits.
///
/// See [`sample_times_for_day_with_limits`].
pub fn sample_times_for_day<R: Rng + ?Sized>(
    date: NaiveDate,
    count: usize,
    cfg: &RateConfig,
    offset: TimezoneOffset,
    rng: &mut R,
) -> Result<Vec<CommitTimestamp>, GreenifyError> {
    sample_times_for_day_with_limits(date, count, cfg, offset, &SamplerLimits::default(), rng)
}

/// Sample `count` commit timestamps on `date`, sorted ascending.
///
/// Every timestamp falls on `date` in `offset`, inside
/// `cfg.allowed_hour_range`, and at least `cfg.minimum_gap_hours` away from
/// every other timestamp of the day.
///
/// # Errors
///
/// Returns [`GreenifyError::InvalidConfig`] if the timing parameters are
/// invalid, or [`GreenifyError::InfeasibleDensity`] if the commits cannot be
/// placed within the attempt budget.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use greenify_core::{GreenifyConfig, TimezoneOffset};
/// use greenify_plan::intraday::{sample_times_for_day_with_limits, SamplerLimits};
///
/// let (weekday, _) = GreenifyConfig::default().rates().unwrap();
/// let date = NaiveDate::from_ymd_opt(2019, 1, 1).unwrap();
/// let times = sample_times_for_day_with_limits(
///     date,
///     4,
///     &weekday,
///     TimezoneOffset::utc(),
///     &SamplerLimits::default(),
///     &mut rand::rng(),
/// )
/// .unwrap();
/// assert_eq!(times.len(), 4);
/// assert!(times.iter().all(|t| t.date_naive() == date));
/// ```
pub fn sample_times_for_day_with_limits<R: Rng + ?Sized>(
    date: NaiveDate,
    count: usize,
    cfg: &RateConfig,
    offset: TimezoneOffset,
    limits: &SamplerLimits,
    rng: &mut R,
) -> Result<Vec<CommitTimestamp>, GreenifyError> {
    let label = if is_weekend(date) { "weekends" } else { "weekdays" };
    cfg.validate_timing(label)?;
    if count == 0 {
        return Ok(Vec::new());
    }

    let normal = Normal::new(cfg.commit_hour_mean, cfg.commit_hour_stddev)
        .map_err(|e| GreenifyError::InvalidConfig(format!("commit hour distribution: {e}")))?;
    let range = cfg.allowed_hour_range;
    let gap_secs = cfg.minimum_gap_hours * SECONDS_PER_HOUR;

    if max_slots(cfg, gap_secs).is_some_and(|slots| count > slots) {
        return Err(GreenifyError::InfeasibleDensity {
            date,
            requested: count,
            accepted: 0,
        });
    }

    let budget = limits.attempt_budget(count);
    let mut accepted: Vec<u32> = Vec::with_capacity(count);
    let mut attempts = 0usize;

    while accepted.len() < count {
        if attempts >= budget {
            debug!(%date, requested = count, accepted = accepted.len(), attempts, "attempt budget exhausted");
            return Err(GreenifyError::InfeasibleDensity {
                date,
                requested: count,
                accepted: accepted.len(),
            });
        }
        attempts += 1;

        let hour: f64 = normal.sample(rng);
        if !range.contains(hour) {
            continue;
        }
        // range lies within [0, 24], so this is below 86 400
        let second = (hour * SECONDS_PER_HOUR).floor() as u32;
        if !range.contains(f64::from(second) / SECONDS_PER_HOUR) {
            continue;
        }
        if accepted
            .iter()
            .any(|&s| f64::from(s.abs_diff(second)) < gap_secs)
        {
            continue;
        }
        accepted.push(second);
    }

    accepted.sort_unstable();
    trace!(%date, count, attempts, "sampled commit times");

    accepted
        .into_iter()
        .map(|second| to_timestamp(date, second, offset))
        .collect()
}

fn to_timestamp(
    date: NaiveDate,
    second_of_day: u32,
    offset: TimezoneOffset,
) -> Result<CommitTimestamp, GreenifyError> {
    let time = NaiveTime::from_num_seconds_from_midnight_opt(second_of_day, 0).ok_or_else(|| {
        GreenifyError::InvalidConfig(format!("{second_of_day}s is past the end of the day"))
    })?;
    let local = date.and_time(time);
    offset
        .as_fixed()
        .from_local_datetime(&local)
        .single()
        .ok_or_else(|| {
            GreenifyError::InvalidConfig(format!("{local} cannot be expressed at offset {offset}"))
        })
}
