use thiserror::Error;

/// Failures surfaced by the service layer.
#[derive(Error, Debug)]
pub enum TaskMapError {
    #[error("Request to {endpoint} failed: {source}")]
    Http {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} answered with HTTP {status}")]
    ApiStatus { endpoint: String, status: u16 },

    #[error("Could not decode response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    #[error("Operation timed out after {duration_ms} ms")]
    Timeout { duration_ms: u64 },

    #[error("Location unavailable: {reason}")]
    Geolocation { reason: String },

    #[error("Local storage error: {0}")]
    Storage(#[from] anyhow::Error),

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Shown for every listing failure; causes are only logged.
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load tasks. Change a filter or pull to refresh.";

pub type Result<T> = std::result::Result<T, TaskMapError>;

impl TaskMapError {
    pub fn http(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        let endpoint = endpoint.into();
        if source.is_decode() {
            TaskMapError::Decode {
                endpoint,
                message: source.to_string(),
            }
        } else {
            TaskMapError::Http { endpoint, source }
        }
    }

    /// What the list view shows. Identical for every cause.
    pub fn user_message(&self) -> &'static str {
        LOAD_FAILED_MESSAGE
    }
}
