//! Bazaar Core - Shared types library.
//!
//! This crate provides common types used across all Bazaar components:
//! - `catalog` - catalog/cart state engine over the Fake Store API
//! - `integration-tests` - end-to-end tests against a mock API
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps
//! it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe entity ids

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
