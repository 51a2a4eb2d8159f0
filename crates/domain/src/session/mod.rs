//! Session snapshot and the state machine that produces it.

mod reducer;
mod snapshot;

pub use reducer::{RefreshedSession, SessionEvent, reduce};
pub use snapshot::{SessionSnapshot, SessionStatus};
