//! Authentication domain types

mod claims;
mod token;
mod types;

pub use claims::{AccessTokenClaims, Actor, decode_claims, parse_claims};
pub use token::{
    MIN_REFRESH_DELAY_SECONDS, RETRY_DELAY_SECONDS, RefreshPolicy, TOKEN_EXPIRY_BUFFER_SECONDS,
    TokenDescriptor,
};
pub use types::{
    AuthenticationResponse, Impersonator, RedirectOptions, RedirectParams, SignOutOptions,
    SwitchOrganizationOptions, User,
};
