//! Tracking client error types.

/// Sentinel status reported for a fetch that was cancelled before it
/// settled. Never produced by the endpoint itself.
pub const CANCELLED_STATUS: u16 = 499;

/// Message shown when the fallback text of a transport error is empty.
pub const GENERIC_FAILURE: &str = "Failed to load tracking.";

/// Errors from a tracking fetch.
#[derive(Debug, thiserror::Error)]
pub enum TrackingError {
    /// HTTP transport error (connection, TLS, timeout, body read).
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The endpoint answered with a body that is not JSON. Usually the app
    /// proxy redirected to a login or password page.
    #[error(
        "Non-JSON response (possible redirect). Check App Proxy, CORS/OPTIONS, and storefront password."
    )]
    NonJson {
        endpoint: String,
        status: u16,
        source: serde_json::Error,
    },
    /// The activation was cancelled before the fetch settled.
    #[error("tracking fetch cancelled")]
    Cancelled,
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl TrackingError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// HTTP status associated with the failure, if any.
    ///
    /// [`TrackingError::Cancelled`] reports [`CANCELLED_STATUS`].
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { source, .. } => source.status().map(|s| s.as_u16()),
            Self::NonJson { status, .. } => Some(*status),
            Self::Cancelled => Some(CANCELLED_STATUS),
            Self::Config(_) => None,
        }
    }

    /// Text to show in place of tracking details.
    pub fn user_message(&self) -> String {
        let message = match self {
            Self::Http { source, .. } => source.to_string(),
            other => other.to_string(),
        };
        or_generic(message)
    }
}

fn or_generic(message: String) -> String {
    if message.trim().is_empty() {
        GENERIC_FAILURE.to_string()
    } else {
        message
    }
}
