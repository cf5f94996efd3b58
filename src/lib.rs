//! StintFlow - basketball stint derivation and aggregation
//!
//! Library half of the crate; the `stint_query` binary is a thin shell over
//! [`service::StintQueryEngine`].

pub mod config;
pub mod error;
pub mod lineup_core;
pub mod service;
pub mod sqlite_pragma;
pub mod store;

pub use error::{StintError, StintResult};
