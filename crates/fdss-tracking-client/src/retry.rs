//! Bounded rate-limit retry for the tracking endpoint.
//!
//! Retries only when the endpoint answers `429 Too Many Requests`, after a
//! fixed delay. Transport errors and every other status are returned as-is.
//! Once the budget is spent, a still-429 response is handed back to the
//! caller like any other response.
//!
//! The send and the delay both race the activation's [`CancelToken`].

use std::future::Future;
use std::time::Duration;

use reqwest::StatusCode;

use crate::cancel::CancelToken;

/// Retry budget for rate-limited responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the initial request. Default: 1.
    pub max_retries: u32,
    /// Fixed delay before each retry. Default: 600 ms.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 1,
            delay: Duration::from_millis(600),
        }
    }
}

/// Why [`send_with_retry`] produced no response.
#[derive(Debug)]
pub(crate) enum SendFailure {
    Transport(reqwest::Error),
    Cancelled,
}

/// Send a request, retrying on 429 up to `policy.max_retries` times.
///
/// The closure `f` is called at most `policy.max_retries + 1` times. A
/// transport error observed after the token was cancelled is reported as
/// [`SendFailure::Cancelled`].
pub(crate) async fn send_with_retry<F, Fut>(
    policy: &RetryPolicy,
    cancel: &CancelToken,
    f: F,
) -> Result<reqwest::Response, SendFailure>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<reqwest::Response, reqwest::Error>>,
{
    let mut attempt: u32 = 0;
    loop {
        let resp = match cancel.run(f()).await {
            None => return Err(SendFailure::Cancelled),
            Some(Err(_)) if cancel.is_cancelled() => return Err(SendFailure::Cancelled),
            Some(Err(e)) => return Err(SendFailure::Transport(e)),
            Some(Ok(resp)) => resp,
        };

        if resp.status() != StatusCode::TOO_MANY_REQUESTS || attempt >= policy.max_retries {
            return Ok(resp);
        }

        attempt += 1;
        tracing::warn!(
            attempt,
            max_retries = policy.max_retries,
            "tracking endpoint rate-limited, retrying in {:?}",
            policy.delay
        );
        if cancel.run(tokio::time::sleep(policy.delay)).await.is_none() {
            return Err(SendFailure::Cancelled);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn transport_failure_is_not_retried() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = call_count.clone();
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(200))
            .build()
            .unwrap();

        let result = send_with_retry(&RetryPolicy::default(), &CancelToken::new(), || {
            cc.fetch_add(1, Ordering::SeqCst);
            // Request to a guaranteed-closed port → connection refused.
            client.post("http://127.0.0.1:1/").send()
        })
        .await;

        assert!(matches!(result, Err(SendFailure::Transport(_))));
        assert_eq!(call_count.load(Ordering::SeqCst), 1, "no retry on transport errors");
    }

    #[tokio::test]
    async fn cancelled_token_sends_nothing() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = call_count.clone();
        let client = reqwest::Client::new();
        let cancel = CancelToken::new();
        cancel.cancel();

        let result = send_with_retry(&RetryPolicy::default(), &cancel, || {
            cc.fetch_add(1, Ordering::SeqCst);
            client.post("http://127.0.0.1:1/").send()
        })
        .await;

        assert!(matches!(result, Err(SendFailure::Cancelled)));
        // The closure builds the future, but it is never polled.
        assert!(call_count.load(Ordering::SeqCst) <= 1);
    }

    #[test]
    fn default_policy_is_one_retry_after_600ms() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 1);
        assert_eq!(policy.delay, Duration::from_millis(600));
    }
}
