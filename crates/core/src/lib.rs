//! # AptMap Core
//!
//! Pure dataset-assembly logic: turning the opaque records the API clients
//! return into typed rows, price-per-area statistics, and the merged
//! choropleth feature collection.
//!
//! ## Architecture
//! - No I/O and no async: every function here is a plain transformation
//! - Record parsing is tolerant: rows the upstream ships with missing or
//!   unparsable fields are skipped, not fatal

pub mod merge;
pub mod pricing;
pub mod region;
pub mod trade;

pub use merge::merge_prices_into_boundaries;
pub use pricing::{average_by_region, join_with_regions, DistrictPrice, RegionAverage};
pub use region::RegionCode;
pub use trade::TradeRecord;
