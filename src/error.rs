//! Error types for the rdvmonitor service

/// Errors that can occur in the rdvmonitor service
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Near-empty response from {url} (status {status})")]
    Blocked { url: String, status: u16 },

    #[error("Browser probe failed: {0}")]
    Browser(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Notifier error: {0}")]
    Notifier(String),
}

/// Result type alias for rdvmonitor operations
pub type Result<T> = std::result::Result<T, MonitorError>;
