//! RDV Monitor - ANEM appointment monitoring and notification service
//!
//! Watches the ANEM pre-registration portal for open appointment slots,
//! falls back to simulation when the site is unreachable, and emails when
//! availability changes.

pub mod api;
pub mod browser;
pub mod check;
pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod io;
pub mod notifier;
pub mod probe;
pub mod session;
pub mod simulator;
pub mod web3forms;

pub use config::{load_config, MonitorConfig, ServiceConfig};
pub use error::{MonitorError, Result};

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::browser::{BrowserProbe, HeadlessChromeLauncher};
use crate::check::Checker;
use crate::classifier::Classifier;
use crate::engine::Engine;
use crate::fetch::FetchProbe;
use crate::io::ReqwestHttpClient;
use crate::notifier::Notifier;
use crate::probe::Probe;
use crate::web3forms::Web3FormsNotifier;

/// Run the monitor service with the given configuration
pub async fn run(config: ServiceConfig) -> Result<()> {
    let http: Arc<dyn io::HttpClient> = Arc::new(ReqwestHttpClient::default());
    let cancel = CancellationToken::new();

    // Build the probe chain: headless browser first (on demand only),
    // then the plain HTTP fetch
    let classifier = Classifier::default();
    let probes: Vec<Arc<dyn Probe>> = vec![
        Arc::new(BrowserProbe::new(
            Arc::new(HeadlessChromeLauncher),
            classifier.clone(),
        )),
        Arc::new(FetchProbe::new(Arc::clone(&http), classifier)),
    ];
    let checker = Arc::new(Checker::new(probes));

    // Build the notifier
    let notifier: Option<Arc<dyn Notifier>> =
        Web3FormsNotifier::from_env(Arc::clone(&http)).map(|n| Arc::new(n) as Arc<dyn Notifier>);

    // Build the engine
    let session = session::new_session_handle(config.history_size);
    let engine = Arc::new(Engine::new(
        checker,
        notifier,
        session,
        Duration::from_secs(config.check_interval_seconds),
        cancel.clone(),
    ));

    // Setup shutdown handler
    let cancel_for_signal = cancel.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to listen for ctrl-c");
        tracing::info!("Shutdown signal received");
        cancel_for_signal.cancel();
    });

    let router = api::build_router(engine);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Monitor API listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            cancel.cancelled().await;
        })
        .await?;

    tracing::info!("Monitor service stopped");
    Ok(())
}
