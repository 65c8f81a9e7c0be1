//! Bearer-token lifecycle management
//!
//! The token service these clients talk to issues short-lived bearer tokens
//! with an absolute epoch-millis expiry. [`TokenCache`] keeps the current
//! token, refreshes it ahead of expiry, and coalesces concurrent refreshes so
//! a burst of callers produces at most one authentication round trip.

pub mod cache;
pub mod types;

pub use cache::{TokenAuthenticator, TokenCache};
pub use types::AccessToken;
