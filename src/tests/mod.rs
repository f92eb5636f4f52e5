//! Integration tests for the Schnipsel application.
//!
//! These drive the fully assembled router (all pipeline stages in their
//! production order) through `tower::ServiceExt::oneshot`, with counting
//! mock stores and an in-memory SQLite session store.
//!
//! ## Test Modules
//!
//! - **pipeline_tests**: stage ordering, security headers, health exemption
//! - **csrf_tests**: token binding and unsafe-method rejection
//! - **auth_tests**: authentication resolution and the authorization gate
//! - **handlers_tests**: handler behavior, validation, flash messages
//! - **db_tests**: SQLite store implementations against a real database
//! - **config_tests**: configuration loading and validation
//! - **error_tests**: error-to-status mapping
//!
//! Run with `cargo test`, or a single module via e.g. `cargo test csrf_tests`.

pub mod testutils;

pub mod auth_tests;
pub mod db_tests;
