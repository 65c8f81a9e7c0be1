//! Administrative-registry and apartment-trade API integration
//!
//! Two endpoint families behind one service key:
//! - the administrative-code registry (JSON, `StanReginCd`/`RESULT` envelope)
//! - the apartment-trade record services (XML, `header.resultCode` envelope)
//!
//! # Usage
//!
//! ```no_run
//! use aptmap_domain::DatagoCredentials;
//! use aptmap_infra::integrations::datagokr::DatagokrClient;
//!
//! # async fn example() -> aptmap_domain::Result<()> {
//! let client = DatagokrClient::new(DatagoCredentials::new("service-key")?)?;
//!
//! // District codes for one province
//! let codes = client.lookup_codes(Some("서울특별시"), 1000).await?;
//!
//! // One district's trades for one contract month
//! let trades = client.lookup_trades("11110", "202403", 9999).await?;
//! println!("{} codes, {} trades", codes.len(), trades.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! - Empty service key: fails fast at construction with `Config`
//! - Non-success envelopes: `Api` carrying the upstream code and message
//! - Unrecognized envelopes: `MalformedResponse`, never an empty success

pub mod client;
pub(crate) mod envelope;

pub use client::DatagokrClient;
