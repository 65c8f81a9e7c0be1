//! Statistical-geography service integration
//!
//! Token-authenticated access to the boundary and geocoding endpoints. The
//! service exchanges a consumer key/secret for a bearer token with an
//! absolute expiry; every data call carries that token as a query parameter.
//!
//! # Usage
//!
//! ```no_run
//! use aptmap_domain::SgisCredentials;
//! use aptmap_infra::integrations::sgis::{LowSearch, SgisClient};
//!
//! # async fn example() -> aptmap_domain::Result<()> {
//! let client = SgisClient::new(SgisCredentials::new("consumer-key", "consumer-secret")?)?;
//!
//! // District boundaries for one province, re-projected to WGS84
//! let geojson = client.boundary(Some("11"), LowSearch::Children, "2023").await?;
//!
//! // Address lookup (known-flaky upstream, bounded retry inside)
//! let hits = client.geocode("세종대로 110", 0, 5).await?;
//! println!("{} bytes of boundaries, {} hits", geojson.len(), hits.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! - Empty credentials: fails fast at construction with `Config`
//! - `errCd == -401`: `Auth` (stale/invalid token); the token cache
//!   re-authenticates exactly once, the geocode loop re-authenticates
//!   between attempts
//! - Other non-zero `errCd`: `Api` with the upstream code and message

pub mod auth;
pub mod client;
pub(crate) mod envelope;
pub(crate) mod geo;

pub use auth::SgisAuthenticator;
pub use client::{LowSearch, SgisClient};
