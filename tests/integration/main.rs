//! Integration tests for the campus HTTP API.
//!
//! Every test runs the full router against the in-memory backends.

mod helpers;

mod attachment_test;
mod notification_test;
mod resource_test;
mod workflow_test;
