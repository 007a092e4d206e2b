//! Membership management for an athletics club: groups and members,
//! per-session attendance with activation control, monthly payments, and
//! the weekly/daily reports the club runs on.
//!
//! The modules here form the programmatic surface an API layer sits on;
//! the binary in `main.rs` drives the same functions from the command
//! line.

pub mod attendance;
pub mod calendar;
pub mod db;
pub mod eligibility;
pub mod error;
pub mod models;
pub mod payments;
pub mod report;
pub mod stats;
pub mod store;

#[cfg(test)]
pub(crate) mod testutil;

pub use error::{Error, ErrorKind, Result};
