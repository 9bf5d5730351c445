// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Injected rate-limiter boundary for the authentication path.
//!
//! The limiter is a dependency passed to the authentication service,
//! never a module-level singleton, so tests and deployments can swap
//! the policy.

use std::collections::HashMap;
use std::sync::Mutex;
use time::{Duration, OffsetDateTime};

/// The limiter's verdict for one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The attempt may proceed.
    Allow,
    /// The attempt is throttled.
    Deny,
}

/// A pluggable rate limiter keyed by an opaque string.
pub trait RateLimiter: Send + Sync {
    /// Returns the verdict for `key` without recording an attempt.
    fn check(&self, key: &str) -> Decision;

    /// Records one attempt against `key`.
    fn record(&self, key: &str);
}

/// Fixed-window limiter: at most `max_attempts` per `window` per key.
pub struct FixedWindowLimiter {
    max_attempts: u32,
    window: Duration,
    windows: Mutex<HashMap<String, (OffsetDateTime, u32)>>,
}

impl FixedWindowLimiter {
    /// Creates a limiter allowing `max_attempts` per `window`.
    #[must_use]
    pub fn new(max_attempts: u32, window: Duration) -> Self {
        Self {
            max_attempts,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }
}

impl RateLimiter for FixedWindowLimiter {
    fn check(&self, key: &str) -> Decision {
        let Ok(windows) = self.windows.lock() else {
            // A poisoned limiter fails open: throttling is advisory,
            // authentication still decides.
            return Decision::Allow;
        };
        match windows.get(key) {
            Some((started, count)) => {
                let now = OffsetDateTime::now_utc();
                if now - *started >= self.window || *count < self.max_attempts {
                    Decision::Allow
                } else {
                    Decision::Deny
                }
            }
            None => Decision::Allow,
        }
    }

    fn record(&self, key: &str) {
        let Ok(mut windows) = self.windows.lock() else {
            return;
        };
        let now = OffsetDateTime::now_utc();
        let entry = windows.entry(key.to_string()).or_insert((now, 0));
        if now - entry.0 >= self.window {
            *entry = (now, 0);
        }
        entry.1 += 1;
    }
}
