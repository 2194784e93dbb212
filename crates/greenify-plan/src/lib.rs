//! Statistical planning of a synthetic commit history.
//!
//! The planner draws a Poisson commit count for every day in a range, then
//! rejection-samples normally distributed commit times inside each day.
//! All randomness comes from a caller-provided [`rand::Rng`], so a seeded
//! generator reproduces a plan exactly.

pub mod daily;
pub mod intraday;
pub mod planner;

pub use daily::sample_daily_counts;
pub use intraday::{sample_times_for_day, SamplerLimits};
pub use planner::{plan, HistoryPlanner};
