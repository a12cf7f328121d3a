//! Integration tests for AMV Harvest
//!
//! These tests use wiremock to stand in for the news site and exercise the
//! discovery and acquisition pipeline end-to-end against a real database.

mod acquisition_tests;
mod common;
mod crawl_tests;
mod pipeline_tests;
