//! Shared test utilities for the Key Vault crates.
//!
//! This crate provides:
//! - Proptest generators for vault names, secret names and secret values
//! - A mock secret source that records every resolution
//! - Key Vault and token endpoint response fixtures

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod mocks;

pub use generators::*;
