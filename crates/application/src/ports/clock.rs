//! Clock port for time-related operations

use chrono::{DateTime, Utc};

/// Port for getting the current time.
///
/// Token expiry is judged against this clock, so tests can pin "now" to a
/// fixed instant and mint tokens relative to it.
pub trait Clock: Send + Sync {
    /// Returns the current UTC timestamp.
    fn now(&self) -> DateTime<Utc>;

    /// Returns the current time as Unix epoch seconds.
    fn epoch_seconds(&self) -> i64 {
        self.now().timestamp()
    }
}
