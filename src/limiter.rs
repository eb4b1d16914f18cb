//! Leaky-bucket admission control.

use chrono::TimeDelta;
use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::config::LimiterConfig;
use crate::error::{DripfeedError, Result};

/// Admission state shared by all callers, guarded by the limiter's lock.
struct State {
    /// Scheduled-wait accumulator. Negative values are unused burst credit.
    wait_time: TimeDelta,
    /// When the last accounted request arrived.
    last_request: Instant,
}

/// A leaky-bucket rate limiter with burst capacity and a bounded maximum wait.
///
/// One `Limiter` guards one shared resource. Callers invoke
/// [`acquire`](Limiter::acquire) before performing the rate-limited action;
/// the limiter spaces admissions one fill period apart, lets up to
/// `burst_limit` of them fire without delay, and rejects a request outright
/// when its scheduled wait would reach `fill_period * (max_wait_count - 1)`.
///
/// This struct is thread-safe and can be shared across tasks.
pub struct Limiter {
    /// One admission is granted per fill period.
    fill_period: TimeDelta,
    /// Floor of the accumulator; holds up to `burst_limit` periods of credit.
    min_wait_time: TimeDelta,
    /// Scheduled waits at or above this threshold are rejected.
    max_wait_time: TimeDelta,
    /// Mutable admission state.
    state: Mutex<State>,
}

impl Limiter {
    /// Create a new limiter from the given configuration.
    ///
    /// Returns [`DripfeedError::Config`] if the fill period is zero or the
    /// derived wait bounds do not fit the signed duration range. The bucket
    /// starts full: the first `burst_limit` admissions incur no wait.
    pub fn new(config: LimiterConfig) -> Result<Self> {
        if config.fill_period_ms == 0 {
            return Err(DripfeedError::Config(
                "fill_period_ms must be positive".to_string(),
            ));
        }

        let period_ms = i64::try_from(config.fill_period_ms).map_err(|_| {
            DripfeedError::Config(format!(
                "fill_period_ms {} is out of range",
                config.fill_period_ms
            ))
        })?;
        let burst_ms = period_ms
            .checked_mul(i64::from(config.burst_limit))
            .ok_or_else(|| {
                DripfeedError::Config(format!(
                    "burst credit overflows: {} periods of {}ms",
                    config.burst_limit, config.fill_period_ms
                ))
            })?;
        let queue_ms = period_ms
            .checked_mul(i64::from(config.max_wait_count))
            .ok_or_else(|| {
                DripfeedError::Config(format!(
                    "wait bound overflows: {} periods of {}ms",
                    config.max_wait_count, config.fill_period_ms
                ))
            })?;

        let fill_period = TimeDelta::milliseconds(period_ms);
        let min_wait_time = -TimeDelta::milliseconds(burst_ms);

        Ok(Self {
            fill_period,
            min_wait_time,
            // One period less than the full queue: a request that would have
            // to wait max_wait_count periods is rejected, not delayed.
            max_wait_time: TimeDelta::milliseconds(queue_ms - period_ms),
            state: Mutex::new(State {
                wait_time: min_wait_time,
                last_request: Instant::now(),
            }),
        })
    }

    /// Compute and account this caller's required wait, atomically.
    ///
    /// The accumulator leaks by the elapsed time since the last accounted
    /// request, is clamped to the burst-credit floor, and gains one fill
    /// period for the caller's own slot. Returns the post-commit wait
    /// (non-positive means no suspension needed), or
    /// [`DripfeedError::Backoff`] with all state untouched.
    fn admit(&self) -> Result<TimeDelta> {
        let mut state = self.state.lock();

        // Read the elapsed time once; it drives both the leak and the
        // last_request advancement.
        let dt = state.last_request.elapsed();
        let leaked = TimeDelta::from_std(dt).unwrap_or(TimeDelta::MAX);

        let mut wait_time = state
            .wait_time
            .checked_sub(&leaked)
            .unwrap_or(TimeDelta::MIN);
        if wait_time < self.min_wait_time {
            // An idle stretch cannot accrue more than the burst allowance.
            // A candidate below the floor is always admitted.
            wait_time = self.min_wait_time;
        } else if wait_time >= self.max_wait_time {
            debug!(
                wait_ms = wait_time.num_milliseconds(),
                max_wait_ms = self.max_wait_time.num_milliseconds(),
                "Rate limit backoff"
            );
            return Err(DripfeedError::Backoff);
        }

        state.wait_time = wait_time + self.fill_period;
        state.last_request += dt;

        trace!(
            wait_ms = state.wait_time.num_milliseconds(),
            "Admission granted"
        );
        Ok(state.wait_time)
    }

    /// Apply the limiter to the calling task.
    ///
    /// May suspend for up to `fill_period * (max_wait_count - 1)` before
    /// returning `Ok(())`. If enforcing the rate would require a longer
    /// suspension, returns [`DripfeedError::Backoff`] immediately and the
    /// rejected request is not counted against the bucket.
    pub async fn acquire(&self) -> Result<()> {
        let wait_time = self.admit()?;

        // The lock is released before suspending. to_std is Err for a
        // negative wait, which needs no suspension at all.
        if let Ok(delay) = wait_time.to_std() {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }
}
