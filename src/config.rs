//! Configuration types for the rdvmonitor service

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Minimum accepted length for both ANEM identity fields
pub const MIN_FIELD_LENGTH: usize = 8;

/// Per-check identity data, supplied fresh on every request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorConfig {
    pub work_card_number: String,
    pub national_id_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_to: Option<String>,
}

/// The identity field that failed validation, named by its wire-format key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityField {
    WorkCardNumber,
    NationalIdNumber,
}

impl IdentityField {
    pub fn wire_name(self) -> &'static str {
        match self {
            IdentityField::WorkCardNumber => "workCardNumber",
            IdentityField::NationalIdNumber => "nationalIdNumber",
        }
    }

    pub fn invalid_message(self) -> &'static str {
        match self {
            IdentityField::WorkCardNumber => {
                "Numéro de carte de travail invalide (minimum 8 caractères)"
            }
            IdentityField::NationalIdNumber => {
                "Numéro d'identification nationale invalide (minimum 8 caractères)"
            }
        }
    }
}

/// A rejected check request. Terminal: never retried, never simulated away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    pub field: IdentityField,
    pub provided_length: usize,
}

impl MonitorConfig {
    /// Validate the identity fields. Both the real probes and the simulator
    /// go through this, so the two paths cannot disagree on what is valid.
    pub fn validate(&self) -> std::result::Result<(), ValidationFailure> {
        let work_len = self.work_card_number.chars().count();
        if work_len < MIN_FIELD_LENGTH {
            return Err(ValidationFailure {
                field: IdentityField::WorkCardNumber,
                provided_length: work_len,
            });
        }

        let national_len = self.national_id_number.chars().count();
        if national_len < MIN_FIELD_LENGTH {
            return Err(ValidationFailure {
                field: IdentityField::NationalIdNumber,
                provided_length: national_len,
            });
        }

        Ok(())
    }
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_check_interval")]
    pub check_interval_seconds: u64,
    #[serde(default = "default_history_size")]
    pub history_size: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            check_interval_seconds: default_check_interval(),
            history_size: default_history_size(),
        }
    }
}

fn default_port() -> u16 {
    3000
}

fn default_check_interval() -> u64 {
    600
}

fn default_history_size() -> usize {
    100
}

/// Load service configuration from a JSON file
pub fn load_config(path: &Path) -> crate::Result<ServiceConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        crate::MonitorError::Config(format!("Failed to read config file {:?}: {}", path, e))
    })?;
    let config: ServiceConfig = serde_json::from_str(&content)?;
    Ok(config)
}
