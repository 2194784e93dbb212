//! Writing a planned history into a real git repository.
//!
//! [`RepositoryDriver`] abstracts the version-control backend. Two drivers
//! ship: [`Git2Driver`] (libgit2, in process) and [`GitCliDriver`] (spawns
//! the `git` executable). [`materialize`] replays a
//! [`CommitHistory`](greenify_core::CommitHistory) through either.

pub mod cli;
pub mod content;
pub mod driver;
pub mod libgit;
pub mod materialize;

pub use cli::GitCliDriver;
pub use driver::{CommitOptions, RepositoryDriver};
pub use libgit::Git2Driver;
pub use materialize::{materialize, NoProgress, ProgressObserver};
