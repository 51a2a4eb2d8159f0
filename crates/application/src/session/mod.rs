//! The session manager and its consumer-facing views.

pub mod context;
mod manager;
mod options;
mod view;

pub use manager::SessionManager;
pub use options::SessionOptions;
pub use view::{AccessTokenView, AuthView};
