//! Shared test utilities for n2rss integration tests.
//!
//! This module provides:
//! - In-memory fakes for the mailbox, ticket tracker and stores
//! - Builders for emails, publications and handlers

pub mod builders;
pub mod fakes;

pub use builders::*;
pub use fakes::*;
