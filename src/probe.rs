//! Check outcome types and the probe abstraction
//!
//! A [`Probe`] is one way of answering "is an appointment slot available
//! right now". Probes are tried in order by the checker; each returns a
//! full [`CheckResult`] on success or an error that tells the checker how
//! to escalate.

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::{MonitorConfig, ValidationFailure};

/// Diagnostic detail attached to every check result. All fields are
/// optional; each probe fills in whatever it actually observed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub found_no_appointment_message: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_token: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_form: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_submit_button: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_input_fields: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provided_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_passed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simulated_result: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempts_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_error: Option<String>,
}

/// Outcome of one availability check, in the shape clients consume
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    pub success: bool,
    pub appointment_available: bool,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_sent: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_error: Option<String>,
    #[serde(default)]
    pub debug_info: DebugInfo,
}

impl CheckResult {
    /// Empty result stamped with the current time
    pub fn new(success: bool, appointment_available: bool) -> Self {
        Self {
            success,
            appointment_available,
            timestamp: Utc::now().to_rfc3339(),
            url: None,
            message: None,
            error: None,
            email_sent: None,
            email_message: None,
            email_error: None,
            debug_info: DebugInfo::default(),
        }
    }

    /// Rejection for a config that failed identity-field validation
    pub fn validation_failure(failure: &ValidationFailure) -> Self {
        let mut result = Self::new(false, false);
        result.error = Some(failure.field.invalid_message().to_string());
        result.debug_info.validation_error = Some(failure.field.wire_name().to_string());
        result.debug_info.provided_length = Some(failure.provided_length);
        result
    }
}

/// One way of checking the portal for an available slot
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait Probe: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &str;

    /// Probes that are too heavy for the repeating timer opt out of
    /// scheduled passes and only run when a check explicitly asks.
    fn on_demand_only(&self) -> bool {
        false
    }

    async fn check(&self, config: &MonitorConfig) -> crate::Result<CheckResult>;
}
