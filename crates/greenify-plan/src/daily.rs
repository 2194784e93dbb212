//! Per-day commit counts.
//!
//! Every calendar day in the range gets an independent Poisson draw whose
//! rate depends on whether the day falls on a weekend.

use chrono::{Datelike, NaiveDate, Weekday};
use greenify_core::{DayPlan, GreenifyError, RateConfig};
use rand::Rng;
use rand_distr::{Distribution, Poisson};
use tracing::debug;

/// `true` for Saturday and Sunday.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use greenify_plan::daily::is_weekend;
///
/// assert!(is_weekend(NaiveDate::from_ymd_opt(2019, 1, 5).unwrap()));
/// assert!(!is_weekend(NaiveDate::from_ymd_opt(2019, 1, 1).unwrap()));
/// ```
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Poisson source for one class of day. A zero rate always yields zero.
enum CountDistribution {
    Never,
    Poisson(Poisson<f64>),
}

impl CountDistribution {
    fn new(cfg: &RateConfig, label: &str) -> Result<Self, GreenifyError> {
        cfg.validate_rate(label)?;
        if cfg.average_daily_commits == 0.0 {
            return Ok(Self::Never);
        }
        Poisson::new(cfg.average_daily_commits)
            .map(Self::Poisson)
            .map_err(|e| GreenifyError::InvalidConfig(format!("{label}.avg_daily_commits: {e}")))
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        match self {
            Self::Never => 0,
            Self::Poisson(poisson) => {
                let draw: f64 = poisson.sample(rng);
                draw as usize
            }
        }
    }
}

/// Draw a commit count for every day from `start` to `end` inclusive.
///
/// Returns one [`DayPlan`] per day, in date order.
///
/// # Errors
///
/// Returns [`GreenifyError::InvalidRange`] if `end` is before `start`, or
/// [`GreenifyError::InvalidConfig`] if either rate is negative or not a
/// finite number.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use greenify_core::GreenifyConfig;
/// use greenify_plan::daily::sample_daily_counts;
///
/// let (weekday, weekend) = GreenifyConfig::default().rates().unwrap();
/// let start = NaiveDate::from_ymd_opt(2019, 1, 1).unwrap();
/// let end = NaiveDate::from_ymd_opt(2019, 1, 31).unwrap();
/// let days = sample_daily_counts(start, end, &weekday, &weekend, &mut rand::rng()).unwrap();
/// assert_eq!(days.len(), 31);
/// ```
pub fn sample_daily_counts<R: Rng + ?Sized>(
    start: NaiveDate,
    end: NaiveDate,
    weekday_cfg: &RateConfig,
    weekend_cfg: &RateConfig,
    rng: &mut R,
) -> Result<Vec<DayPlan>, GreenifyError> {
    if end < start {
        return Err(GreenifyError::InvalidRange { start, end });
    }

    let weekday = CountDistribution::new(weekday_cfg, "weekdays")?;
    let weekend = CountDistribution::new(weekend_cfg, "weekends")?;

    let days: Vec<DayPlan> = start
        .iter_days()
        .take_while(|date| *date <= end)
        .map(|date| {
            let is_weekend = is_weekend(date);
            let source = if is_weekend { &weekend } else { &weekday };
            DayPlan {
                date,
                is_weekend,
                commit_count: source.sample(rng),
            }
        })
        .collect();

    debug!(
        %start,
        %end,
        days = days.len(),
        commits = days.iter().map(|d| d.commit_count).sum::<usize>(),
        "sampled daily commit counts"
    );
    Ok(days)
}
