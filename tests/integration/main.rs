//! Integration tests for the harvester
//!
//! The crawl core is driven through in-memory fetch and sink fakes; the HTTP
//! fetcher and seed loader are exercised against wiremock servers.

mod common;
mod executor_tests;
mod harvest_tests;
mod scheduler_tests;
