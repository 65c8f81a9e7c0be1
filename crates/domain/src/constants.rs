//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! pipeline.

// Rate limiting (per distinct endpoint method)
pub const RATE_LIMIT_MAX_CALLS: u32 = 25;
pub const RATE_LIMIT_PERIOD_SECS: u64 = 1;

// Token lifecycle
/// Refresh this long before the reported token expiry.
pub const TOKEN_REFRESH_SKEW_SECS: u64 = 60 * 60;

// Geocoding retry budget (fixed ceiling, fixed delay)
pub const GEOCODE_MAX_ATTEMPTS: u32 = 200;
pub const GEOCODE_RETRY_DELAY_SECS: u64 = 10;

// Default page sizes
pub const DEFAULT_CODE_PAGE_SIZE: u32 = 1000;
pub const DEFAULT_TRADE_PAGE_SIZE: u32 = 9999;
