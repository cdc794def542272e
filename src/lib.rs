//! intake - code analysis results, fetched and normalized
//!
//! Talks to a code-analysis backend, turns whatever shape of payload it
//! answers with into one canonical [`normalize::NormalizedResult`], and falls
//! back to cached or locally computed results when the backend is out of
//! reach.

pub mod auth;
pub mod cache;
pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod local;
pub mod normalize;
pub mod report;
pub mod transport;

pub use error::Error;
