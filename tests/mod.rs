//! Integration tests for mflix
//!
//! Tests are organized by component:
//! - api_test: Mflix API client tests (request shape, parsing, error mapping)
//! - controller_test: list/detail/edit controller scenarios and properties
//! - auth_test: login, registration and session persistence
//! - cli_test: argument parsing, command runs and output formatting
//! - ui_test: rendering onto a TestBackend
//! - e2e_test: End-to-end flows (Login -> List -> Detail -> Edit)

// Note: Each test file is a separate integration test crate
// Tests are run individually by cargo, not via mod.rs
