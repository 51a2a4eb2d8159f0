//! Wall-clock adapter for the token scheduler.
//!
//! Refresh timers are computed from a token's `exp` claim minus
//! [`Clock::epoch_seconds`], so this clock must agree with the identity
//! provider's clock to within the refresh buffer.

use chrono::{DateTime, Utc};
use sessionkit_application::ports::Clock;

/// Reads "now" from the host clock when judging access token expiry.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Creates the host clock.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
