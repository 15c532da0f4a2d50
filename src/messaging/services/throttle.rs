//! Send gating: per-key rate limiting and a wall-clock access window.
//!
//! Both gates keep explicit per-key state with an injected clock, so they
//! are testable without sleeping and safe to share across threads. Neither
//! touches entity state; they sit in front of the mutation pipeline.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Duration, Timelike, Utc};
use mockable::Clock;
use thiserror::Error;

/// Configuration for [`RateLimiter`].
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    /// Maximum events allowed per key within the window.
    pub max_events: usize,
    /// Length of the sliding window.
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_events: 5,
            window: Duration::seconds(60),
        }
    }
}

/// The key exceeded its event budget for the current window.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("rate limit exceeded: {max_events} events per {window_seconds}s")]
pub struct RateLimited {
    /// The configured budget.
    pub max_events: usize,
    /// The configured window length in seconds.
    pub window_seconds: i64,
}

/// Sliding-window rate limiter keyed by an opaque string (a peer address, a
/// user id rendered to text, etc.).
///
/// # Examples
///
/// ```
/// use missive::messaging::services::{RateLimitConfig, RateLimiter};
/// use mockable::DefaultClock;
///
/// let limiter = RateLimiter::new(RateLimitConfig::default(), DefaultClock);
/// assert!(limiter.check("peer-1").is_ok());
/// ```
#[derive(Debug)]
pub struct RateLimiter<K: Clock> {
    events: Mutex<HashMap<String, Vec<DateTime<Utc>>>>,
    config: RateLimitConfig,
    clock: K,
}

impl<K: Clock> RateLimiter<K> {
    /// Creates a limiter with the given configuration and clock.
    #[must_use]
    pub fn new(config: RateLimitConfig, clock: K) -> Self {
        Self {
            events: Mutex::new(HashMap::new()),
            config,
            clock,
        }
    }

    /// Records an event for `key` if the budget allows it.
    ///
    /// Events older than the window are forgotten before counting.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimited`] when the key already spent its budget inside
    /// the current window; the rejected event is not recorded.
    pub fn check(&self, key: &str) -> Result<(), RateLimited> {
        let now = self.clock.utc();
        let mut events = self
            .events
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let timestamps = events.entry(key.to_owned()).or_default();
        timestamps.retain(|t| now - *t < self.config.window);

        if timestamps.len() >= self.config.max_events {
            return Err(RateLimited {
                max_events: self.config.max_events,
                window_seconds: self.config.window.num_seconds(),
            });
        }

        timestamps.push(now);
        Ok(())
    }

    /// Drops every recorded event, for all keys.
    pub fn reset(&self) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

/// Configuration for [`AccessWindow`]. Hours are evaluated in UTC.
#[derive(Debug, Clone, Copy)]
pub struct AccessWindowConfig {
    /// First hour (inclusive) at which access is allowed.
    pub open_hour: u32,
    /// Hour (exclusive) at which access closes.
    pub close_hour: u32,
}

impl Default for AccessWindowConfig {
    fn default() -> Self {
        // Evening chat hours, 18:00 to 21:00.
        Self {
            open_hour: 18,
            close_hour: 21,
        }
    }
}

/// The current time falls outside the configured access hours.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("access allowed only between {open_hour}:00 and {close_hour}:00")]
pub struct OutsideAccessWindow {
    /// First hour (inclusive) at which access is allowed.
    pub open_hour: u32,
    /// Hour (exclusive) at which access closes.
    pub close_hour: u32,
}

/// Wall-clock gate restricting operations to a daily window.
#[derive(Debug)]
pub struct AccessWindow<K: Clock> {
    config: AccessWindowConfig,
    clock: K,
}

impl<K: Clock> AccessWindow<K> {
    /// Creates a gate with the given configuration and clock.
    #[must_use]
    pub const fn new(config: AccessWindowConfig, clock: K) -> Self {
        Self { config, clock }
    }

    /// Checks whether the current hour falls inside the window.
    ///
    /// # Errors
    ///
    /// Returns [`OutsideAccessWindow`] when the current hour is outside
    /// `[open_hour, close_hour)`.
    pub fn check(&self) -> Result<(), OutsideAccessWindow> {
        let hour = self.clock.utc().hour();
        if hour >= self.config.open_hour && hour < self.config.close_hour {
            Ok(())
        } else {
            Err(OutsideAccessWindow {
                open_hour: self.config.open_hour,
                close_hour: self.config.close_hour,
            })
        }
    }
}
