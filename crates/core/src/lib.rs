//! Emporium Core - Shared value types for the store data model.
//!
//! This crate provides the types used across all Emporium components:
//! - `store` - Schema repositories and the playground web server
//! - `cli` - Command-line tools for migrations and demo data
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP.
//! Database encode/decode support is gated behind the `postgres` feature so the
//! types can be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, quantities, emails
//!   and the single-character choice enums

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
