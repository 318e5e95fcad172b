//! Upload handler library.
//!
//! Multipart decoding, validation, collision-free storage and report
//! rendering for the upload service, plus the HTTP surface wiring them up.

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;
