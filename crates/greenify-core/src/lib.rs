//! Core types, configuration, and error handling for greenify.
//!
//! This crate provides the shared foundation used by the other greenify crates:
//! - [`GreenifyError`] — unified error type using `thiserror` and `miette`
//! - [`GreenifyConfig`] — configuration loaded from `config.json`
//! - Shared types: [`RateConfig`], [`DayPlan`], [`CommitTimestamp`],
//!   [`CommitHistory`], [`TimezoneOffset`], [`OutputFormat`]

mod config;
mod error;
mod types;

pub use config::{AuthorConfig, GreenifyConfig, RateSettings};
pub use error::GreenifyError;
pub use types::{
    CommitHistory, CommitTimestamp, DayPlan, HourRange, OutputFormat, RateConfig, TimezoneOffset,
};

/// A convenience `Result` type for greenify operations.
pub type Result<T> = std::result::Result<T, GreenifyError>;
