//! Dripfeed - Leaky-Bucket Rate Limiter
//!
//! This crate implements a thread-safe rate limiter for a single shared
//! resource, such as an outbound API. A [`Limiter`] smooths bursts of
//! concurrent callers into a steady admission rate: up to `burst_limit`
//! requests fire without delay, subsequent requests are spaced one fill
//! period apart, and a request whose scheduled wait would grow past the
//! configured bound is rejected with [`DripfeedError::Backoff`] instead
//! of queuing indefinitely.

pub mod config;
pub mod error;
pub mod limiter;

pub use config::LimiterConfig;
pub use error::{DripfeedError, Result};
pub use limiter::Limiter;
