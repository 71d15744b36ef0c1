//! Emporium store library.
//!
//! Typed models and repositories for the `store` schema, plus the playground
//! HTTP surface. Exposed as a library so the CLI and integration tests share
//! the same queries as the server.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
