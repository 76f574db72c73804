//! Notification content and the delivery seam

use async_trait::async_trait;
use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::classifier::NO_APPOINTMENT_PHRASES;
use crate::fetch::PORTAL_HOME_URL;

/// A rendered notification ready for delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub to: String,
    pub subject: String,
    pub message: String,
}

impl Notification {
    /// Render the email announcing the new availability status
    pub fn for_status(available: bool, to: &str) -> Self {
        let checked_at = Local::now().format("%d/%m/%Y %H:%M:%S");
        let (subject, message) = if available {
            (
                "ANEM - Rendez-vous disponible!".to_string(),
                format!(
                    "BONNE NOUVELLE !\n\n\
                     Des rendez-vous sont maintenant DISPONIBLES sur le site ANEM.\n\n\
                     Connectez-vous rapidement : {PORTAL_HOME_URL}\n\n\
                     Vérification effectuée le : {checked_at}\n\n\
                     ---\n\
                     Moniteur ANEM - Surveillance automatique"
                ),
            )
        } else {
            (
                "ANEM - Aucun rendez-vous disponible".to_string(),
                format!(
                    "Aucun rendez-vous disponible\n\n\
                     Le message \"{}\" est toujours présent sur le site ANEM.\n\n\
                     La surveillance continue automatiquement...\n\n\
                     Vérification effectuée le : {checked_at}\n\n\
                     ---\n\
                     Moniteur ANEM - Surveillance automatique",
                    NO_APPOINTMENT_PHRASES[0]
                ),
            )
        };

        Self {
            to: to.to_string(),
            subject,
            message,
        }
    }
}

/// One delivery attempt kept in the session history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRecord {
    pub subject: String,
    pub to: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: String,
}

/// How an email dispatch went, in the shape clients consume.
/// `can_continue` is always true: email failures never stop monitoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    pub can_continue: bool,
}

/// Delivers rendered notifications
#[async_trait]
pub trait Notifier: Send + Sync + std::fmt::Debug {
    /// Service label reported in email outcomes
    fn service_name(&self) -> &str;

    async fn notify(&self, notification: &Notification) -> crate::Result<()>;
}
