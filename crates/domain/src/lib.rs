//! # AptMap Domain
//!
//! Shared domain types for the aptmap workspace.
//!
//! This crate contains:
//! - The application-wide error taxonomy (`AptMapError`)
//! - Configuration and credential types consumed by the loaders and clients
//!
//! ## Architecture
//! - Depends on nothing but serde/thiserror
//! - Every other crate in the workspace depends on it

pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use constants::*;
pub use errors::{AptMapError, Result};
pub use types::*;
