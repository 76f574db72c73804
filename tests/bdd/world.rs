//! BDD test world for the rdvmonitor service

use std::sync::Arc;
use std::time::Duration;

use cucumber::World;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use rdvmonitor::check::Checker;
use rdvmonitor::classifier::Classifier;
use rdvmonitor::config::MonitorConfig;
use rdvmonitor::engine::Engine;
use rdvmonitor::fetch::FetchProbe;
use rdvmonitor::io::{HttpClient, HttpResponse};
use rdvmonitor::notifier::{EmailOutcome, Notification, Notifier};
use rdvmonitor::probe::CheckResult;
use rdvmonitor::session::new_session_handle;
use rdvmonitor::MonitorError;

#[derive(Default, World)]
pub struct MonitorWorld {
    pub portal: Option<Arc<dyn HttpClient>>,
    pub notifier: Option<Arc<dyn Notifier>>,
    pub recording: Option<Arc<RecordingNotifier>>,
    pub engine: Option<Arc<Engine>>,
    pub config: Option<MonitorConfig>,
    pub last_result: Option<CheckResult>,
    pub last_outcome: Option<EmailOutcome>,
}

impl std::fmt::Debug for MonitorWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonitorWorld")
            .field("config", &self.config)
            .field("last_result", &self.last_result)
            .field("last_outcome", &self.last_outcome)
            .finish()
    }
}

impl MonitorWorld {
    /// Build the engine on first use, wired to the scripted portal and
    /// notifier. Later steps in the same scenario reuse it.
    pub fn ensure_engine(&mut self) -> Arc<Engine> {
        if let Some(engine) = &self.engine {
            return Arc::clone(engine);
        }

        let http = self
            .portal
            .clone()
            .unwrap_or_else(|| Arc::new(UnreachableClient));
        let probe = FetchProbe::new(http, Classifier::default());
        let checker = Arc::new(Checker::new(vec![Arc::new(probe)]));

        let engine = Arc::new(Engine::new(
            checker,
            self.notifier.clone(),
            new_session_handle(10),
            Duration::from_secs(3600),
            CancellationToken::new(),
        ));
        self.engine = Some(Arc::clone(&engine));
        engine
    }

    pub fn monitor_config(&self) -> MonitorConfig {
        self.config.clone().unwrap_or_else(|| MonitorConfig {
            work_card_number: "25019903".to_string(),
            national_id_number: "12345678".to_string(),
            email_to: Some("user@example.com".to_string()),
        })
    }
}

/// A portal page carrying the Arabic no-appointment banner
pub fn no_appointment_page() -> String {
    format!(
        "<html><body><div class=\"alert alert-danger\">{}</div><p>{}</p></body></html>",
        "نعتذر منكم ! لا يوجد أي موعد متاح حاليا",
        "Veuillez consulter la page ultérieurement pour suivre les nouvelles disponibilités."
    )
}

/// A portal page with the booking form and no blocking banner
pub fn open_form_page() -> String {
    concat!(
        "<html><body><h1>Prise de rendez-vous</h1>",
        "<form method=\"post\" action=\"/pre_inscription\">",
        "<input type=\"text\" name=\"numero_carte\" placeholder=\"Carte ANEM\">",
        "<input type=\"text\" name=\"national_id\">",
        "<button type=\"submit\">Valider</button>",
        "</form></body></html>"
    )
    .to_string()
}

/// HTTP client that serves one fixed page for every GET
pub struct FixedPageClient {
    body: String,
}

impl FixedPageClient {
    pub fn new(body: String) -> Self {
        Self { body }
    }
}

#[async_trait::async_trait]
impl HttpClient for FixedPageClient {
    async fn get(
        &self,
        _url: &str,
        _headers: &[(&'static str, &'static str)],
        _timeout: Duration,
    ) -> rdvmonitor::Result<HttpResponse> {
        Ok(HttpResponse {
            status: 200,
            body: self.body.clone(),
        })
    }

    async fn post_json(
        &self,
        _url: &str,
        _body: &serde_json::Value,
    ) -> rdvmonitor::Result<HttpResponse> {
        Ok(HttpResponse {
            status: 200,
            body: "{}".to_string(),
        })
    }
}

/// HTTP client that simulates network failure
pub struct UnreachableClient;

#[async_trait::async_trait]
impl HttpClient for UnreachableClient {
    async fn get(
        &self,
        _url: &str,
        _headers: &[(&'static str, &'static str)],
        _timeout: Duration,
    ) -> rdvmonitor::Result<HttpResponse> {
        Err(MonitorError::Http("connection refused".to_string()))
    }

    async fn post_json(
        &self,
        _url: &str,
        _body: &serde_json::Value,
    ) -> rdvmonitor::Result<HttpResponse> {
        Err(MonitorError::Http("connection refused".to_string()))
    }
}

/// An email notifier that records every delivery
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    records: Arc<RwLock<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    fn service_name(&self) -> &str {
        "recording"
    }

    async fn notify(&self, notification: &Notification) -> rdvmonitor::Result<()> {
        self.records.write().await.push(notification.clone());
        Ok(())
    }
}

/// An email notifier that always fails
#[derive(Debug)]
pub struct FailingNotifier;

#[async_trait::async_trait]
impl Notifier for FailingNotifier {
    fn service_name(&self) -> &str {
        "failing"
    }

    async fn notify(&self, _notification: &Notification) -> rdvmonitor::Result<()> {
        Err(MonitorError::Notifier("test failure".to_string()))
    }
}
