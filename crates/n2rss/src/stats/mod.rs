//! Publication cadence statistics and lateness monitoring.

pub mod lateness;
pub mod publication;

use thiserror::Error;

use crate::db::DatabaseError;

pub use lateness::LatenessDetector;
pub use publication::{articles_per_publication, periodicity, NewsletterStats, PublicationStatistics};

#[derive(Error, Debug)]
pub enum StatsError {
    /// Averages over publication history need at least two samples.
    #[error("At least 2 publications are required, got {0}")]
    InsufficientSamples(usize),

    #[error("Sample size must be at least {min}, got {got}")]
    InvalidSampleSize { min: usize, got: usize },

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

pub type Result<T> = std::result::Result<T, StatsError>;
