//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the session core and external systems.
//! The authentication client and its factory are implemented by the host
//! application; the clock is implemented in the infrastructure layer.

mod auth_client;
mod client_factory;
mod clock;

pub use auth_client::AuthClient;
pub use client_factory::ClientFactory;
pub use clock::Clock;
