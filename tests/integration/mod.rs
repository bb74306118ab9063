//! Integration tests for campaign-audit.
//!
//! These tests drive the full audit against the mock data source.

pub mod check_tests;
pub mod full_run_tests;
pub mod sink_tests;
