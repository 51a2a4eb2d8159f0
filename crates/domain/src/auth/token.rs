//! Token expiry tracking and refresh timing.

use std::time::Duration;

use super::claims::parse_claims;

/// Seconds before expiry at which a token counts as "near expiry".
pub const TOKEN_EXPIRY_BUFFER_SECONDS: u64 = 60;

/// Shortest delay between two proactive refreshes.
pub const MIN_REFRESH_DELAY_SECONDS: u64 = 15;

/// Cooldown before retrying after a failed fetch.
pub const RETRY_DELAY_SECONDS: u64 = 300;

/// Timing rules for proactive token refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPolicy {
    /// Refresh this long before the token expires.
    pub expiry_buffer: Duration,
    /// Never schedule a refresh sooner than this.
    pub min_refresh_delay: Duration,
    /// Wait this long before retrying a failed fetch.
    pub retry_delay: Duration,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            expiry_buffer: Duration::from_secs(TOKEN_EXPIRY_BUFFER_SECONDS),
            min_refresh_delay: Duration::from_secs(MIN_REFRESH_DELAY_SECONDS),
            retry_delay: Duration::from_secs(RETRY_DELAY_SECONDS),
        }
    }
}

impl RefreshPolicy {
    /// Returns the policy with a different expiry buffer.
    #[must_use]
    pub const fn with_expiry_buffer(mut self, buffer: Duration) -> Self {
        self.expiry_buffer = buffer;
        self
    }

    /// Delay until the next proactive refresh of a token expiring in
    /// `seconds_until_expiry` seconds.
    ///
    /// The refresh fires `expiry_buffer` before expiry, but never sooner than
    /// `min_refresh_delay`.
    #[must_use]
    pub fn refresh_delay(&self, seconds_until_expiry: i64) -> Duration {
        let buffer = duration_secs(self.expiry_buffer);
        let minimum = duration_secs(self.min_refresh_delay);
        let seconds = seconds_until_expiry.saturating_sub(buffer).max(minimum);
        Duration::from_secs(seconds.max(0).unsigned_abs())
    }

    /// Builds the descriptor of `token` using this policy's buffer.
    #[must_use]
    pub fn describe(&self, token: &str, now_epoch_seconds: i64) -> Option<TokenDescriptor> {
        TokenDescriptor::from_token(token, now_epoch_seconds, self.expiry_buffer)
    }
}

fn duration_secs(duration: Duration) -> i64 {
    i64::try_from(duration.as_secs()).unwrap_or(i64::MAX)
}

/// Expiry facts derived from a raw token. Never stored, always recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenDescriptor {
    /// The `exp` claim, or 0 when the token carries none.
    pub expiry_epoch_seconds: i64,
    /// Seconds left until expiry; negative once expired.
    pub seconds_until_expiry: i64,
    /// True when the token expires within the buffer.
    pub is_near_expiry: bool,
}

impl TokenDescriptor {
    /// Describes `token` relative to `now_epoch_seconds`.
    ///
    /// Returns `None` when the token cannot be decoded. A decodable token
    /// without `exp` is treated as already expired.
    #[must_use]
    pub fn from_token(token: &str, now_epoch_seconds: i64, buffer: Duration) -> Option<Self> {
        let claims = parse_claims(token)?;
        let expiry_epoch_seconds = claims.exp.unwrap_or(0);
        let seconds_until_expiry = expiry_epoch_seconds.saturating_sub(now_epoch_seconds);

        Some(Self {
            expiry_epoch_seconds,
            seconds_until_expiry,
            is_near_expiry: seconds_until_expiry <= duration_secs(buffer),
        })
    }
}
