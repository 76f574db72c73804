//! Engine: orchestrates check passes, change detection, and email dispatch

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::check::Checker;
use crate::config::MonitorConfig;
use crate::notifier::{EmailOutcome, Notification, NotificationRecord, Notifier};
use crate::probe::CheckResult;
use crate::session::{SessionHandle, TimerHandle};
use crate::web3forms::ACCESS_KEY_ENV;

/// Outcome of starting the monitoring loop
#[derive(Debug)]
pub struct StartReport {
    pub email_configured: bool,
    pub initial_result: CheckResult,
}

/// The engine runs check passes and notifies when availability changes
pub struct Engine {
    checker: Arc<Checker>,
    notifier: Option<Arc<dyn Notifier>>,
    session: SessionHandle,
    pass_lock: Arc<Mutex<()>>,
    check_interval: Duration,
    shutdown: CancellationToken,
}

impl Engine {
    pub fn new(
        checker: Arc<Checker>,
        notifier: Option<Arc<dyn Notifier>>,
        session: SessionHandle,
        check_interval: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            checker,
            notifier,
            session,
            pass_lock: Arc::new(Mutex::new(())),
            check_interval,
            shutdown,
        }
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub fn check_interval(&self) -> Duration {
        self.check_interval
    }

    pub fn has_notifier(&self) -> bool {
        self.notifier.is_some()
    }

    fn email_configured(&self, config: &MonitorConfig) -> bool {
        self.notifier.is_some() && config.email_to.as_deref().is_some_and(|to| !to.is_empty())
    }

    /// Start monitoring: run one pass immediately, then arm the repeating
    /// timer. Any previously armed timer is stopped first.
    pub async fn start(&self, config: MonitorConfig) -> StartReport {
        self.session.write().await.disarm_timer();

        let email_configured = self.email_configured(&config);
        if !email_configured {
            tracing::warn!("Starting monitoring without email notifications");
        }

        let initial_result = run_pass(
            &self.checker,
            self.notifier.as_ref(),
            &self.session,
            &self.pass_lock,
            &config,
            false,
        )
        .await;

        let token = self.shutdown.child_token();
        let task = tokio::spawn(check_loop(
            Arc::clone(&self.checker),
            self.notifier.clone(),
            Arc::clone(&self.session),
            Arc::clone(&self.pass_lock),
            config,
            self.check_interval,
            token.clone(),
        ));
        self.session
            .write()
            .await
            .arm_timer(TimerHandle::new(token, task));

        tracing::info!(
            "Monitoring started, next check in {}s",
            self.check_interval.as_secs()
        );
        StartReport {
            email_configured,
            initial_result,
        }
    }

    /// Stop monitoring and forget the last known status, so a later start
    /// notifies again on its first pass.
    pub async fn stop(&self) {
        let mut session = self.session.write().await;
        session.disarm_timer();
        session.reset_last_status();
        tracing::info!("Monitoring stopped");
    }

    /// Run a single pass without touching the timer
    pub async fn check_once(&self, config: &MonitorConfig, include_on_demand: bool) -> CheckResult {
        run_pass(
            &self.checker,
            self.notifier.as_ref(),
            &self.session,
            &self.pass_lock,
            config,
            include_on_demand,
        )
        .await
    }

    /// Send an availability email to the given address, bypassing change
    /// detection
    pub async fn test_notification(&self, email_to: &str) -> EmailOutcome {
        dispatch_email(
            self.notifier.as_ref(),
            &self.session,
            Some(email_to),
            true,
        )
        .await
    }
}

async fn check_loop(
    checker: Arc<Checker>,
    notifier: Option<Arc<dyn Notifier>>,
    session: SessionHandle,
    pass_lock: Arc<Mutex<()>>,
    config: MonitorConfig,
    interval: Duration,
    token: CancellationToken,
) {
    loop {
        // Wait for the next tick or cancellation
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = token.cancelled() => {
                tracing::debug!("Check loop cancelled");
                break;
            }
        }

        run_pass(
            &checker,
            notifier.as_ref(),
            &session,
            &pass_lock,
            &config,
            false,
        )
        .await;
    }
}

/// Run one full pass: check, compare against the last known status, email
/// on change, and record the result. Passes are serialized by the lock.
pub async fn run_pass(
    checker: &Checker,
    notifier: Option<&Arc<dyn Notifier>>,
    session: &SessionHandle,
    pass_lock: &Mutex<()>,
    config: &MonitorConfig,
    include_on_demand: bool,
) -> CheckResult {
    let _guard = pass_lock.lock().await;

    let mut result = checker.run_check(config, include_on_demand).await;

    if result.success {
        let previous = session.read().await.last_status;
        let changed = previous != Some(result.appointment_available);

        if changed {
            tracing::info!(
                "Availability changed ({:?} -> {}), dispatching email",
                previous,
                result.appointment_available
            );
            let outcome = dispatch_email(
                notifier,
                session,
                config.email_to.as_deref(),
                result.appointment_available,
            )
            .await;
            session
                .write()
                .await
                .set_last_status(result.appointment_available);

            result.email_sent = Some(outcome.success);
            if outcome.success {
                result.email_message = outcome.message;
            } else {
                result.email_error = outcome.error;
                result.email_message = Some(outcome.message.unwrap_or_else(|| {
                    "Email non configuré - surveillance continue".to_string()
                }));
            }
        } else {
            result.email_sent = Some(false);
            result.email_message = Some("Statut inchangé, pas d'email envoyé".to_string());
        }
    } else {
        result.email_sent = Some(false);
        result.email_message =
            Some("Pas d'email en raison de l'erreur de vérification".to_string());
    }

    session.write().await.record_result(result.clone());
    result
}

/// Send an availability email and record the attempt in history. Every
/// outcome leaves the monitoring loop running.
pub async fn dispatch_email(
    notifier: Option<&Arc<dyn Notifier>>,
    session: &SessionHandle,
    email_to: Option<&str>,
    available: bool,
) -> EmailOutcome {
    let Some(to) = email_to.filter(|to| !to.is_empty()) else {
        return EmailOutcome {
            success: false,
            message: None,
            error: Some("Email de destination manquant".to_string()),
            service: None,
            can_continue: true,
        };
    };

    let Some(notifier) = notifier else {
        tracing::warn!("{} not set, emails are disabled", ACCESS_KEY_ENV);
        return EmailOutcome {
            success: false,
            message: Some(
                "Surveillance active mais emails désactivés (configurez WEB3FORMS_ACCESS_KEY pour activer)"
                    .to_string(),
            ),
            error: Some("Web3Forms non configuré".to_string()),
            service: Some("none".to_string()),
            can_continue: true,
        };
    };

    let notification = Notification::for_status(available, to);
    let delivery = notifier.notify(&notification).await;

    let record = NotificationRecord {
        subject: notification.subject.clone(),
        to: notification.to.clone(),
        success: delivery.is_ok(),
        error: delivery.as_ref().err().map(|e| e.to_string()),
        timestamp: chrono::Utc::now().to_rfc3339(),
    };
    session.write().await.add_notification(record);

    match delivery {
        Ok(()) => EmailOutcome {
            success: true,
            message: Some("Email envoyé avec succès".to_string()),
            error: None,
            service: Some(notifier.service_name().to_string()),
            can_continue: true,
        },
        Err(e) => {
            tracing::warn!("Email delivery failed: {}", e);
            let service = if matches!(e, crate::MonitorError::Notifier(_)) {
                notifier.service_name().to_string()
            } else {
                "error".to_string()
            };
            EmailOutcome {
                success: false,
                message: Some("Surveillance continue malgré l'erreur email".to_string()),
                error: Some(e.to_string()),
                service: Some(service),
                can_continue: true,
            }
        }
    }
}
