use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::time::Duration;

use log::{error, info};
use tokio::sync::broadcast;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

use n2rss::config::{LogFormat, LoggingConfig};
use n2rss::{
    load_config, resolve_secret, Config, Database, EmailIngestionPipeline, GitHubTicketClient,
    HandlerRegistry, ImapMailbox, IncidentNotifier, Job, JobScheduler, LatenessDetector,
    MailboxClient, N2rssError, PublicationStatistics,
};

fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("n2rss={},warn", config.level)));

    let (text, json) = match config.format {
        LogFormat::Text => (Some(tracing_subscriber::fmt::layer().with_target(true)), None),
        LogFormat::Json => (None, Some(tracing_subscriber::fmt::layer().json())),
    };

    // `log` records are bridged here, so the subscriber is set without `init()`.
    if let Err(e) = tracing_log::LogTracer::init() {
        eprintln!("Failed to bridge log records: {}", e);
    }
    let subscriber = tracing_subscriber::registry().with(filter).with(text).with(json);
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to install tracing subscriber: {}", e);
    }
}

fn config_path() -> Option<PathBuf> {
    std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(n2rss::config::default_config_path)
}

fn run(config: Config) -> Result<(), N2rssError> {
    let db = Database::open_configured(&config.database)?;

    let registry = Arc::new(HandlerRegistry::from_config(&config.handlers)?);
    let synced = db.sync_newsletters(registry.newsletters())?;
    info!(
        "Loaded {} handler(s) serving {} newsletter(s)",
        registry.handlers().len(),
        synced
    );

    let mailbox_config = &config.mailbox;
    let password = resolve_secret(
        mailbox_config.password.as_deref(),
        mailbox_config.password_file.as_deref(),
        mailbox_config.password_env_var.as_deref(),
    )?;
    let tracker = &config.tracker;
    let token = resolve_secret(
        tracker.token.as_deref(),
        tracker.token_file.as_deref(),
        tracker.token_env_var.as_deref(),
    )?;

    let db = Arc::new(db);
    let mailbox = Arc::new(ImapMailbox::new(mailbox_config.clone(), password));
    let tickets = Arc::new(GitHubTicketClient::new(tracker, token)?);
    let notifier = Arc::new(IncidentNotifier::new(tickets, db.clone()));

    let mailbox_client: Arc<dyn MailboxClient> = mailbox.clone();
    let pipeline = Arc::new(EmailIngestionPipeline::new(
        mailbox_client,
        registry.clone(),
        db.clone(),
        notifier.clone(),
    ));
    let statistics = PublicationStatistics::with_sample_size(db, config.lateness.sample_size)?;
    let detector = Arc::new(LatenessDetector::new(
        registry,
        statistics,
        notifier,
        config.lateness.tolerance_days,
    ));

    let scheduler = JobScheduler::new(
        pipeline,
        detector,
        Duration::from_secs(config.schedule.ingestion_interval_secs),
        Duration::from_secs(config.schedule.lateness_interval_secs),
    );
    let (trigger_tx, trigger_rx) = broadcast::channel(16);
    let handle = scheduler.start(trigger_rx);
    info!("n2rss v{} started", env!("CARGO_PKG_VERSION"));

    let (stop_tx, stop_rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        let _ = stop_tx.send(());
    })
    .map_err(|e| N2rssError::Runtime(format!("cannot install signal handler: {}", e)))?;
    let _ = stop_rx.recv();

    info!("Shutting down");
    scheduler.stop();
    // Wakes the scheduler loop so it notices the shutdown flag.
    let _ = trigger_tx.send(Job::Lateness);
    if handle.join().is_err() {
        error!("Scheduler thread panicked");
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| N2rssError::Runtime(format!("cannot start runtime: {}", e)))?;
    runtime.block_on(mailbox.disconnect())?;
    Ok(())
}

fn main() {
    let Some(path) = config_path() else {
        eprintln!("No configuration file given and no home directory found");
        std::process::exit(2);
    };

    let config = match load_config(&path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration from {:?}: {}", path, e);
            std::process::exit(2);
        }
    };

    init_logging(&config.logging);
    info!("Using configuration {:?}", path);

    if let Err(e) = run(config) {
        error!("n2rss stopped: {}", e);
        std::process::exit(1);
    }
}
