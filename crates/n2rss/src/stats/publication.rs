use std::sync::Arc;

use chrono::NaiveDate;

use crate::db::PublicationStore;
use crate::model::{Newsletter, Publication};

use super::{Result, StatsError};

/// Number of recent publications sampled by default.
pub const DEFAULT_SAMPLE_SIZE: usize = 10;

/// Smallest sample a periodicity can be computed from.
pub const MIN_SAMPLE_SIZE: usize = 2;

/// What a newsletter's publication history tells about it. Computed on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewsletterStats {
    NoPublication,
    SinglePublication {
        starting_date: NaiveDate,
    },
    MultiplePublications {
        /// Earliest publication ever, outside the sample window.
        starting_date: NaiveDate,
        publication_count: u64,
        /// Rounded mean gap in days between sampled publications.
        periodicity: i64,
        articles_per_publication: usize,
        last_publication_date: NaiveDate,
    },
}

pub struct PublicationStatistics {
    store: Arc<dyn PublicationStore>,
    sample_size: usize,
}

impl PublicationStatistics {
    pub fn new(store: Arc<dyn PublicationStore>) -> Self {
        Self {
            store,
            sample_size: DEFAULT_SAMPLE_SIZE,
        }
    }

    /// Samples the `sample_size` most recent publications of each newsletter.
    pub fn with_sample_size(store: Arc<dyn PublicationStore>, sample_size: usize) -> Result<Self> {
        if sample_size < MIN_SAMPLE_SIZE {
            return Err(StatsError::InvalidSampleSize {
                min: MIN_SAMPLE_SIZE,
                got: sample_size,
            });
        }
        Ok(Self { store, sample_size })
    }

    pub fn stats_for(&self, newsletter: &Newsletter) -> Result<NewsletterStats> {
        let code = newsletter.code.as_str();
        let count = self.store.count_by_newsletter(code)?;

        match count {
            0 => Ok(NewsletterStats::NoPublication),
            1 => {
                let starting_date = self.starting_date(code)?;
                Ok(NewsletterStats::SinglePublication { starting_date })
            }
            _ => {
                let mut sample = self.store.recent_by_newsletter(code, self.sample_size)?;
                sample.sort_by_key(|p| p.date);
                let dates: Vec<NaiveDate> = sample.iter().map(|p| p.date).collect();

                let periodicity = periodicity(&dates)?;
                let articles_per_publication = articles_per_publication(&sample)?;
                let last_publication_date = *dates.last().ok_or(StatsError::InsufficientSamples(0))?;

                Ok(NewsletterStats::MultiplePublications {
                    starting_date: self.starting_date(code)?,
                    publication_count: count,
                    periodicity,
                    articles_per_publication,
                    last_publication_date,
                })
            }
        }
    }

    fn starting_date(&self, code: &str) -> Result<NaiveDate> {
        self.store
            .earliest_by_newsletter(code)?
            .map(|p| p.date)
            .ok_or(StatsError::InsufficientSamples(0))
    }
}

/// Rounded mean of the gaps, in days, between consecutive ascending dates.
pub fn periodicity(dates: &[NaiveDate]) -> Result<i64> {
    if dates.len() < 2 {
        return Err(StatsError::InsufficientSamples(dates.len()));
    }

    let deltas: Vec<i64> = dates
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).num_days())
        .collect();
    let mean = deltas.iter().sum::<i64>() as f64 / deltas.len() as f64;
    Ok(mean.round() as i64)
}

/// Rounded mean article count of the sampled publications.
pub fn articles_per_publication(publications: &[Publication]) -> Result<usize> {
    if publications.len() < 2 {
        return Err(StatsError::InsufficientSamples(publications.len()));
    }

    let total: usize = publications.iter().map(|p| p.articles.len()).sum();
    Ok((total as f64 / publications.len() as f64).round() as usize)
}
