//! Web3Forms email client

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::MonitorError;
use crate::io::HttpClient;
use crate::notifier::{Notification, Notifier};

const WEB3FORMS_API_URL: &str = "https://api.web3forms.com/submit";

/// Environment variable holding the Web3Forms access key
pub const ACCESS_KEY_ENV: &str = "WEB3FORMS_ACCESS_KEY";

const FROM_NAME: &str = "Moniteur ANEM";
const TO_NAME: &str = "Utilisateur ANEM";

/// Web3Forms email sender
pub struct Web3FormsNotifier {
    access_key: String,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for Web3FormsNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Web3FormsNotifier").finish()
    }
}

impl Web3FormsNotifier {
    pub fn new(access_key: String, http: Arc<dyn HttpClient>) -> Self {
        Self { access_key, http }
    }

    /// Build from the environment. None means email is disabled and
    /// monitoring runs without notifications.
    pub fn from_env(http: Arc<dyn HttpClient>) -> Option<Self> {
        match std::env::var(ACCESS_KEY_ENV) {
            Ok(key) if !key.trim().is_empty() => Some(Self::new(key, http)),
            _ => {
                tracing::warn!("{} not set, email notifications disabled", ACCESS_KEY_ENV);
                None
            }
        }
    }
}

#[async_trait]
impl Notifier for Web3FormsNotifier {
    fn service_name(&self) -> &str {
        "Web3Forms"
    }

    async fn notify(&self, notification: &Notification) -> crate::Result<()> {
        let payload = serde_json::json!({
            "access_key": self.access_key,
            "subject": notification.subject,
            "email": notification.to,
            "message": notification.message,
            "from_name": FROM_NAME,
            "to_name": TO_NAME,
        });

        tracing::debug!("Sending Web3Forms email: subject='{}'", notification.subject);

        let response = self.http.post_json(WEB3FORMS_API_URL, &payload).await?;

        if response.status != 200 {
            return Err(MonitorError::Notifier(format!(
                "Web3Forms API returned status {}: {}",
                response.status, response.body
            )));
        }

        tracing::debug!("Web3Forms email sent successfully");
        Ok(())
    }
}
