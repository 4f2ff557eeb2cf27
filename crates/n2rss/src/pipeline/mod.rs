//! Email ingestion: fetch, route, extract, persist, advance mailbox state.

pub mod runner;

pub use runner::EmailIngestionPipeline;
