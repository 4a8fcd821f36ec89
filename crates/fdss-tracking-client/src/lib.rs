//! # fdss-tracking-client — Typed client for the FedEx status app proxy
//!
//! Resolves delivery tracking for one order by posting its id to the
//! storefront app-proxy endpoint:
//!
//! ```text
//! POST {origin}/apps/fedex-status/tracking?_fd=0&pb=0
//! Content-Type: application/json
//!
//! {"orderId":"gid://shopify/Order/123","shipDateBegin":"2024-01-05"}
//! ```
//!
//! ## Behaviour
//!
//! - One request, plus a single retry when the endpoint answers 429 (see
//!   [`retry`]). No retry on transport errors or other statuses.
//! - Any response that is not retried goes to the JSON step, whatever its
//!   status. The parsed body is returned verbatim.
//! - A body that is not JSON yields [`TrackingError::NonJson`].
//! - Every await races the caller's [`CancelToken`]; a cancelled fetch
//!   resolves to [`TrackingError::Cancelled`] instead of a transport error.

pub mod cancel;
pub mod config;
pub mod error;
pub mod retry;

pub use cancel::CancelToken;
pub use config::{ConfigError, ConfigFile, TrackingConfig};
pub use error::{TrackingError, CANCELLED_STATUS};
pub use retry::RetryPolicy;

use std::future::Future;
use std::time::Duration;

use fdss_core::{TrackingPayload, TrackingRequest};

use crate::retry::SendFailure;

/// Anything that can resolve tracking for a request.
///
/// [`TrackingClient`] is the HTTP implementation; the status view is generic
/// over this trait.
pub trait TrackingSource: Send + Sync + 'static {
    fn fetch_tracking(
        &self,
        request: &TrackingRequest,
        cancel: &CancelToken,
    ) -> impl Future<Output = Result<TrackingPayload, TrackingError>> + Send;
}

/// HTTP client for the tracking endpoint.
#[derive(Debug, Clone)]
pub struct TrackingClient {
    http: reqwest::Client,
    endpoint: url::Url,
    retry: RetryPolicy,
}

impl TrackingClient {
    /// Create a new tracking client from configuration.
    pub fn new(config: TrackingConfig) -> Result<Self, TrackingError> {
        let endpoint = config.endpoint()?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                headers.insert(
                    reqwest::header::CONTENT_TYPE,
                    reqwest::header::HeaderValue::from_static("application/json"),
                );
                headers
            })
            .build()
            .map_err(|e| TrackingError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        Ok(Self {
            http,
            endpoint,
            retry: config.retry,
        })
    }

    /// Full endpoint URL, flags included.
    pub fn endpoint(&self) -> &url::Url {
        &self.endpoint
    }

    /// Resolve tracking for one order.
    ///
    /// Calls `POST {origin}{path}?{flags}` with `request` as the JSON body.
    pub async fn fetch_tracking(
        &self,
        request: &TrackingRequest,
        cancel: &CancelToken,
    ) -> Result<TrackingPayload, TrackingError> {
        let endpoint = format!("POST {}", self.endpoint.path());

        let resp = crate::retry::send_with_retry(&self.retry, cancel, || {
            self.http.post(self.endpoint.clone()).json(request).send()
        })
        .await
        .map_err(|failure| match failure {
            SendFailure::Cancelled => TrackingError::Cancelled,
            SendFailure::Transport(source) => TrackingError::Http {
                endpoint: endpoint.clone(),
                source,
            },
        })?;

        let status = resp.status().as_u16();
        let bytes = match cancel.run(resp.bytes()).await {
            None => return Err(TrackingError::Cancelled),
            Some(Err(_)) if cancel.is_cancelled() => return Err(TrackingError::Cancelled),
            Some(Err(source)) => return Err(TrackingError::Http { endpoint, source }),
            Some(Ok(bytes)) => bytes,
        };

        let body = serde_json::from_slice(&bytes).map_err(|source| {
            tracing::warn!(status, bytes = bytes.len(), "tracking endpoint returned non-JSON body");
            TrackingError::NonJson {
                endpoint: endpoint.clone(),
                status,
                source,
            }
        })?;

        tracing::debug!(status, order_id = %request.order_id, "tracking payload received");
        Ok(TrackingPayload::new(status, body))
    }
}

impl TrackingSource for TrackingClient {
    fn fetch_tracking(
        &self,
        request: &TrackingRequest,
        cancel: &CancelToken,
    ) -> impl Future<Output = Result<TrackingPayload, TrackingError>> + Send {
        TrackingClient::fetch_tracking(self, request, cancel)
    }
}
