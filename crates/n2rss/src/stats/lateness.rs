use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use tracing::{debug, error, info, info_span, Instrument};

use crate::handler::HandlerRegistry;
use crate::notifier::IncidentNotifier;

use super::{NewsletterStats, PublicationStatistics};

/// Default grace period, in days, after the expected publication date.
pub const DEFAULT_TOLERANCE_DAYS: i64 = 2;

/// Flags newsletters that stopped publishing at their usual cadence.
///
/// Only the primary newsletter of each enabled handler is monitored;
/// secondary feeds share its schedule.
pub struct LatenessDetector {
    registry: Arc<HandlerRegistry>,
    statistics: PublicationStatistics,
    notifier: Arc<IncidentNotifier>,
    tolerance: Duration,
}

impl LatenessDetector {
    pub fn new(
        registry: Arc<HandlerRegistry>,
        statistics: PublicationStatistics,
        notifier: Arc<IncidentNotifier>,
        tolerance_days: i64,
    ) -> Self {
        Self {
            registry,
            statistics,
            notifier,
            tolerance: Duration::days(tolerance_days),
        }
    }

    pub async fn run(&self) {
        self.run_at(Utc::now().date_naive()).await;
    }

    /// Checks every monitored newsletter as of `today` and reports the late
    /// ones in a single notification.
    pub async fn run_at(&self, today: NaiveDate) {
        let span = info_span!("lateness_check", %today);
        async {
            let late = self.late_newsletters(today);
            if late.is_empty() {
                debug!("No late newsletter");
                return;
            }

            info!(count = late.len(), codes = ?late, "Late newsletters detected");
            self.notifier.notify_missing_publications(&late).await;
        }
        .instrument(span)
        .await
    }

    /// Codes of the monitored newsletters that are late on `today`.
    pub fn late_newsletters(&self, today: NaiveDate) -> Vec<String> {
        let mut late = Vec::new();

        for handler in self.registry.enabled_handlers() {
            let Some(newsletter) = handler.primary_newsletter() else {
                continue;
            };

            let stats = match self.statistics.stats_for(newsletter) {
                Ok(stats) => stats,
                Err(e) => {
                    error!(code = %newsletter.code, "Failed to compute statistics: {}", e);
                    continue;
                }
            };

            if let NewsletterStats::MultiplePublications {
                periodicity,
                last_publication_date,
                ..
            } = stats
            {
                let expected_next = last_publication_date + Duration::days(periodicity);
                if today > expected_next + self.tolerance {
                    late.push(newsletter.code.clone());
                }
            }
        }
        late
    }
}
