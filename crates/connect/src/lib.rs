//! Recurra Connect - REST adapter for the bill engine.
//!
//! This crate implements the bill, loan payment and savings goal service
//! traits of `recurra-core` against the Recurra HTTP API.

pub mod client;

// Re-export commonly used types
pub use client::{RecurraApiClient, DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS};
