use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use adapters::http::server::run_http_server;
use adapters::http::state::AppState;
use adapters::notify::webhook_notifier::WebhookNotifier;
use adapters::source::nws_feed::NwsFeedSource;
use adapters::storage::json_counter_store::JsonCounterStore;
use adapters::storage::json_dedupe_store::JsonDedupeStore;
use adapters::storage::json_retry_store::JsonRetryStore;
use adapters::storage::yaml_alert_log::YamlAlertLog;
use application::daily_summary::DailySummaryTask;
use application::delivery::{DeliveryService, RouteTable};
use application::error_reporter::ErrorReporter;
use application::health::HealthTask;
use application::poll_service::PollService;
use application::status::RuntimeStatus;
use domain::alert::classifier::Classifier;
use infrastructure::config::AgentConfig;
use infrastructure::logging::init_logging;
use ports::secondary::notifier::Notifier;
use tokio::sync::{mpsc, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cli::Cli;
use crate::shutdown::create_shutdown_token;

const STARTUP_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Run the agent startup sequence and block until shutdown.
#[allow(clippy::too_many_lines)] // startup is inherently sequential and long
pub async fn run(cli: &Cli) -> anyhow::Result<()> {
    // ── 1. Load config ──────────────────────────────────────────────
    let config = AgentConfig::load(Path::new(&cli.config))?;

    // ── 2. Initialize logging ───────────────────────────────────────
    // CLI flags take precedence over the config file
    let log_level = cli.log_level.unwrap_or(config.logging.level);
    let log_format = cli.log_format.unwrap_or(config.logging.format);
    init_logging(log_level, log_format);

    info!(
        config_path = %cli.config,
        log_level = log_level.as_str(),
        log_format = log_format.as_str(),
        "stormwatch agent starting"
    );

    // ── 3. Open persistent stores ───────────────────────────────────
    let dedupe = Arc::new(JsonDedupeStore::open(&config.storage.dedupe_file)?);
    let retry = Arc::new(JsonRetryStore::open(&config.storage.retry_file)?);
    let counters = Arc::new(JsonCounterStore::open(&config.storage.counter_file)?);
    let alert_log = Arc::new(YamlAlertLog::new(
        &config.storage.alert_log_file,
        &config.storage.text_log_dir,
    ));
    info!(
        dedupe_file = %config.storage.dedupe_file.display(),
        retry_file = %config.storage.retry_file.display(),
        "stores opened"
    );

    // ── 4. Outbound adapters ────────────────────────────────────────
    let notifier: Arc<dyn Notifier> = Arc::new(WebhookNotifier::new()?);
    let source = Arc::new(NwsFeedSource::new(
        config.feed.url.clone(),
        &config.feed.user_agent,
        config.winter_alerts_enabled,
    )?);
    let reporter = Arc::new(ErrorReporter::new(
        Arc::clone(&notifier),
        config.error_webhook_url.clone(),
    ));

    // ── 5. Routing and classification ───────────────────────────────
    let routes: RouteTable = Arc::new(RwLock::new(config.routes()));
    let classifier = Arc::new(RwLock::new(Classifier::new(
        config.winter_alerts_enabled,
        config.configured_categories(),
    )));
    info!(
        categories = config.webhooks.len(),
        winter_alerts = config.winter_alerts_enabled,
        "routing table built"
    );

    let probe_client = reqwest::Client::builder()
        .timeout(STARTUP_PROBE_TIMEOUT)
        .build()?;
    probe_webhooks(&probe_client, &config).await;

    // ── 6. Services ─────────────────────────────────────────────────
    let status = Arc::new(RuntimeStatus::new());
    let delivery = Arc::new(DeliveryService::new(
        Arc::clone(&notifier),
        dedupe.clone(),
        counters,
        alert_log.clone(),
        retry,
        Arc::clone(&reporter),
        Arc::clone(&routes),
    ));
    let poll = PollService::new(
        source.clone(),
        Arc::clone(&classifier),
        dedupe.clone(),
        delivery,
        Arc::clone(&reporter),
        Arc::clone(&status),
    );

    // ── 7. Background tasks ─────────────────────────────────────────
    let shutdown_token = create_shutdown_token();
    let (reload_tx, reload_rx) = mpsc::channel::<()>(4);

    let app_state = Arc::new(AppState {
        status: Arc::clone(&status),
        dedupe,
        alert_log: alert_log.clone(),
        routes: Arc::clone(&routes),
        reload_tx,
        probe_client,
        version: env!("CARGO_PKG_VERSION"),
    });
    let bind_address = config.http.bind_address.clone();
    let port = config.http.port;
    let http_shutdown = shutdown_token.clone().cancelled_owned();
    let http_handle = tokio::spawn(async move {
        if let Err(e) = run_http_server(app_state, &bind_address, port, http_shutdown).await {
            tracing::error!(error = %e, "status server failed");
        }
    });

    let summary = DailySummaryTask::new(
        alert_log,
        Arc::clone(&notifier),
        config.summary_webhook_url.clone(),
        Arc::clone(&reporter),
    );
    let summary_cancel = shutdown_token.clone();
    let summary_handle = tokio::spawn(async move { summary.run(summary_cancel).await });

    let health = HealthTask::new(Arc::clone(&notifier), config.error_webhook_url.clone());
    let health_cancel = shutdown_token.clone();
    let health_handle = tokio::spawn(async move { health.run(health_cancel).await });

    let reload_handle = spawn_reload_task(
        cli.config.clone(),
        Arc::clone(&classifier),
        Arc::clone(&routes),
        source,
        Arc::clone(&notifier),
        Arc::clone(&reporter),
        config.error_webhook_url.clone(),
        reload_rx,
        shutdown_token.clone(),
    );

    // ── 8. Poll until shutdown ──────────────────────────────────────
    poll.run(shutdown_token.clone()).await;

    info!("shutting down");
    if let Err(e) = notifier
        .publish_text(&config.error_webhook_url, "Shutting down gracefully.")
        .await
    {
        warn!(error = %e, "failed to publish shutdown notice");
    }

    for handle in [http_handle, summary_handle, health_handle, reload_handle] {
        if let Err(e) = handle.await {
            warn!(error = %e, "background task panicked");
        }
    }

    info!("stormwatch agent stopped");
    Ok(())
}

/// Probe every configured webhook once at startup. Failures are
/// logged but never abort startup; the destination may recover.
async fn probe_webhooks(client: &reqwest::Client, config: &AgentConfig) {
    let mut targets: Vec<(&str, &str)> = config
        .webhooks
        .iter()
        .map(|(name, url)| (name.as_str(), url.as_str()))
        .collect();
    targets.push(("error", &config.error_webhook_url));
    targets.push(("summary", &config.summary_webhook_url));

    for (name, url) in targets {
        match client.get(url).send().await {
            Ok(response) if response.status().is_success() => {
                info!(webhook = name, "webhook reachable");
            }
            Ok(response) => {
                warn!(webhook = name, status = %response.status(), "webhook probe failed");
            }
            Err(e) => {
                warn!(webhook = name, error = %e, "webhook unreachable");
            }
        }
    }
}

/// Apply config changes requested through the status API. Each trigger
/// re-reads the file from disk; a bad file leaves the running config
/// untouched.
#[allow(clippy::too_many_arguments)]
fn spawn_reload_task(
    config_path: String,
    classifier: Arc<RwLock<Classifier>>,
    routes: RouteTable,
    source: Arc<NwsFeedSource>,
    notifier: Arc<dyn Notifier>,
    reporter: Arc<ErrorReporter>,
    error_webhook_url: String,
    mut trigger: mpsc::Receiver<()>,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    info!("reload task stopping");
                    break;
                }
                received = trigger.recv() => {
                    if received.is_none() {
                        break;
                    }
                    match AgentConfig::load(Path::new(&config_path)) {
                        Ok(fresh) => {
                            classifier
                                .write()
                                .await
                                .reload(fresh.winter_alerts_enabled, fresh.configured_categories());
                            *routes.write().await = fresh.routes();
                            source.set_winter_enabled(fresh.winter_alerts_enabled);
                            info!(
                                categories = fresh.webhooks.len(),
                                winter_alerts = fresh.winter_alerts_enabled,
                                "configuration reloaded"
                            );
                            if let Err(e) = notifier
                                .publish_text(
                                    &error_webhook_url,
                                    "Configuration reloaded successfully via /reload_config endpoint",
                                )
                                .await
                            {
                                warn!(error = %e, "failed to publish reload notice");
                            }
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "configuration reload failed");
                            reporter
                                .report(&format!("Failed to reload configuration: {e}"))
                                .await;
                        }
                    }
                }
            }
        }
    })
}
