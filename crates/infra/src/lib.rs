//! # AptMap Infrastructure
//!
//! Impure code for the pipeline: HTTP access, response decoding, pagination,
//! the concrete API integrations, and configuration loading.
//!
//! ## Architecture
//! - Composes the generic primitives from `aptmap-common` (rate limiter,
//!   token cache, retry budget) into concrete endpoint clients
//! - Every client call flows limiter → (token) → HTTP → decoder → envelope
//!   classifier → pagination driver
//! - Depends on `aptmap-domain` for the error taxonomy

pub mod config;
pub mod http;
pub mod integrations;

// Re-export commonly used items
pub use http::HttpClient;
pub use integrations::datagokr::DatagokrClient;
pub use integrations::sgis::{LowSearch, SgisClient};
