//! Periodic trigger for the ingestion and lateness jobs.
//!
//! Both jobs run on one background thread, so a run never overlaps
//! another. Manual runs are requested through a broadcast channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use tokio::sync::broadcast;

use crate::pipeline::EmailIngestionPipeline;
use crate::stats::LatenessDetector;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Job {
    Ingestion,
    Lateness,
}

pub struct JobScheduler {
    pipeline: Arc<EmailIngestionPipeline>,
    detector: Arc<LatenessDetector>,
    ingestion_interval: Duration,
    lateness_interval: Duration,
    shutdown: Arc<AtomicBool>,
}

impl JobScheduler {
    pub fn new(
        pipeline: Arc<EmailIngestionPipeline>,
        detector: Arc<LatenessDetector>,
        ingestion_interval: Duration,
        lateness_interval: Duration,
    ) -> Self {
        Self {
            pipeline,
            detector,
            ingestion_interval,
            lateness_interval,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start the job loop in a background thread.
    ///
    /// Ingestion runs right away; lateness is first checked after one
    /// full interval.
    pub fn start(&self, mut trigger_rx: broadcast::Receiver<Job>) -> JoinHandle<()> {
        let pipeline = Arc::clone(&self.pipeline);
        let detector = Arc::clone(&self.detector);
        let shutdown = Arc::clone(&self.shutdown);
        let ingestion_interval = self.ingestion_interval;
        let lateness_interval = self.lateness_interval;

        std::thread::spawn(move || {
            let rt = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    log::error!("Failed to start scheduler runtime: {}", e);
                    return;
                }
            };

            rt.block_on(async {
                let mut ingestion_timer = tokio::time::interval(ingestion_interval);
                let mut lateness_timer = tokio::time::interval(lateness_interval);
                lateness_timer.tick().await; // skip immediate first tick
                let mut triggers_open = true;

                loop {
                    if shutdown.load(Ordering::Acquire) {
                        break;
                    }

                    let job = tokio::select! {
                        _ = ingestion_timer.tick() => Job::Ingestion,
                        _ = lateness_timer.tick() => Job::Lateness,
                        received = trigger_rx.recv(), if triggers_open => match received {
                            Ok(job) => {
                                log::info!("Manual {:?} run triggered", job);
                                job
                            }
                            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                                log::warn!("Dropped {} manual triggers", skipped);
                                continue;
                            }
                            Err(broadcast::error::RecvError::Closed) => {
                                triggers_open = false;
                                continue;
                            }
                        },
                    };

                    if shutdown.load(Ordering::Acquire) {
                        break;
                    }

                    match job {
                        Job::Ingestion => pipeline.run().await,
                        Job::Lateness => detector.run().await,
                    }
                }
            });
        })
    }

    /// Signals the scheduler to stop.
    pub fn stop(&self) {
        self.shutdown.store(true, Ordering::Release);
    }
}
