//! HTTP access layer: client, body decoding, pagination driver

pub mod client;
pub mod decode;
pub mod paging;

pub use client::{HttpClient, HttpClientBuilder};
pub use decode::decode_response;
pub use paging::{fetch_all, Page, Termination};
