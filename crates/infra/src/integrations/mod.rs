//! External service integrations
//!
//! One module per upstream API family. Each integration keeps its envelope
//! parsing in an `envelope` submodule so the success/failure shapes stay in
//! one auditable place, selected by endpoint rather than by duck-typing at
//! call sites.

pub mod datagokr;
pub mod sgis;

pub(crate) mod value_util;
