//! Contract tests for TrackingClient against the app-proxy tracking endpoint.
//!
//! ## Behaviours Tested
//!
//! | Behaviour | Test |
//! |-----------|------|
//! | Path, flags, headers, body | `fetch_sends_*` |
//! | 429 retry budget | `rate_limited_*` |
//! | Status pass-through | `non_success_status_*` |
//! | Non-JSON body | `non_json_*`, `empty_body_*` |
//! | Transport failure | `unreachable_endpoint_*` |
//! | Cancellation | `cancel_*` |

use std::time::{Duration, Instant};

use fdss_core::{OrderId, OrderReference, TrackingRequest};
use fdss_tracking_client::{
    CancelToken, RetryPolicy, TrackingClient, TrackingConfig, TrackingError, CANCELLED_STATUS,
};
use wiremock::matchers::{body_json, body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TRACKING_PATH: &str = "/apps/fedex-status/tracking";

fn test_client(mock_server: &MockServer) -> TrackingClient {
    let config = TrackingConfig::local_mock(&mock_server.uri()).unwrap();
    TrackingClient::new(config).unwrap()
}

fn request(order_id: &str) -> TrackingRequest {
    TrackingRequest::new(OrderId::new(order_id).unwrap(), None)
}

async fn request_count(mock_server: &MockServer) -> usize {
    mock_server.received_requests().await.unwrap().len()
}

// ── Request shape ────────────────────────────────────────────────────

#[tokio::test]
async fn fetch_sends_post_with_flags_and_exact_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TRACKING_PATH))
        .and(query_param("_fd", "0"))
        .and(query_param("pb", "0"))
        .and(header("Content-Type", "application/json"))
        .and(body_string(
            r#"{"orderId":"gid://shopify/Order/123","shipDateBegin":"2024-01-05"}"#,
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "order": { "name": "#1001" },
            "fulfillmentSummaries": []
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let order = OrderReference {
        id: Some("gid://shopify/Order/123".into()),
        processed_at: Some("2024-01-05T10:00:00Z".into()),
        ..Default::default()
    };
    let req = TrackingRequest::for_order(&order).unwrap();

    let payload = test_client(&mock_server)
        .fetch_tracking(&req, &CancelToken::new())
        .await
        .unwrap();
    assert_eq!(payload.status, 200);
    assert_eq!(payload.order_name(), Some("#1001"));
}

#[tokio::test]
async fn fetch_sends_body_without_ship_date_when_unknown() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TRACKING_PATH))
        .and(body_json(serde_json::json!({ "orderId": "gid://shopify/Order/9" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&mock_server)
        .await;

    test_client(&mock_server)
        .fetch_tracking(&request("gid://shopify/Order/9"), &CancelToken::new())
        .await
        .unwrap();
}

#[tokio::test]
async fn payload_is_returned_verbatim() {
    let mock_server = MockServer::start().await;
    let body = serde_json::json!({
        "fulfillmentSummaries": [{ "fulfillmentId": "gid://shopify/Fulfillment/1", "extra": [1, 2] }],
        "unmodelled": { "nested": true }
    });

    Mock::given(method("POST"))
        .and(path(TRACKING_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
        .mount(&mock_server)
        .await;

    let payload = test_client(&mock_server)
        .fetch_tracking(&request("gid://shopify/Order/1"), &CancelToken::new())
        .await
        .unwrap();
    assert_eq!(payload.body, body);
}

// ── 429 retry ────────────────────────────────────────────────────────

#[tokio::test]
async fn rate_limited_once_then_succeeds_after_one_retry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TRACKING_PATH))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path(TRACKING_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ok": true })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let payload = test_client(&mock_server)
        .fetch_tracking(&request("gid://shopify/Order/1"), &CancelToken::new())
        .await
        .unwrap();
    assert_eq!(payload.body["ok"], true);
    assert_eq!(request_count(&mock_server).await, 2);
}

#[tokio::test]
async fn rate_limited_twice_is_final_with_no_third_attempt() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TRACKING_PATH))
        .respond_with(
            ResponseTemplate::new(429).set_body_json(serde_json::json!({ "error": "slow down" })),
        )
        .expect(2)
        .mount(&mock_server)
        .await;

    let payload = test_client(&mock_server)
        .fetch_tracking(&request("gid://shopify/Order/1"), &CancelToken::new())
        .await
        .unwrap();
    // The final 429 is passed through to the JSON step like any response.
    assert_eq!(payload.status, 429);
    assert_eq!(payload.body["error"], "slow down");
    assert_eq!(request_count(&mock_server).await, 2);
}

#[tokio::test]
async fn rate_limited_retry_waits_the_default_delay() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TRACKING_PATH))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path(TRACKING_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&mock_server)
        .await;

    let config = TrackingConfig {
        retry: RetryPolicy::default(),
        ..TrackingConfig::local_mock(&mock_server.uri()).unwrap()
    };
    let client = TrackingClient::new(config).unwrap();

    let started = Instant::now();
    client
        .fetch_tracking(&request("gid://shopify/Order/1"), &CancelToken::new())
        .await
        .unwrap();
    assert!(started.elapsed() >= Duration::from_millis(600));
}

#[tokio::test]
async fn rate_limit_budget_follows_configuration() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TRACKING_PATH))
        .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({})))
        .expect(4)
        .mount(&mock_server)
        .await;

    let config = TrackingConfig {
        retry: RetryPolicy {
            max_retries: 3,
            delay: Duration::from_millis(5),
        },
        ..TrackingConfig::local_mock(&mock_server.uri()).unwrap()
    };
    let payload = TrackingClient::new(config)
        .unwrap()
        .fetch_tracking(&request("gid://shopify/Order/1"), &CancelToken::new())
        .await
        .unwrap();
    assert_eq!(payload.status, 429);
}

// ── Status pass-through ──────────────────────────────────────────────

#[tokio::test]
async fn non_success_status_with_json_body_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TRACKING_PATH))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(serde_json::json!({ "error": "upstream" })),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let payload = test_client(&mock_server)
        .fetch_tracking(&request("gid://shopify/Order/1"), &CancelToken::new())
        .await
        .unwrap();
    assert_eq!(payload.status, 500);
    assert_eq!(payload.body["error"], "upstream");
}

// ── Non-JSON bodies ──────────────────────────────────────────────────

#[tokio::test]
async fn non_json_body_yields_proxy_hint() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TRACKING_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<html><body>Password required</body></html>"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = test_client(&mock_server)
        .fetch_tracking(&request("gid://shopify/Order/1"), &CancelToken::new())
        .await
        .unwrap_err();
    match &err {
        TrackingError::NonJson { status, .. } => assert_eq!(*status, 200),
        other => panic!("expected NonJson, got: {other:?}"),
    }
    let msg = err.user_message();
    assert!(msg.contains("redirect"));
    assert!(msg.contains("CORS"));
}

#[tokio::test]
async fn empty_body_is_non_json() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TRACKING_PATH))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let err = test_client(&mock_server)
        .fetch_tracking(&request("gid://shopify/Order/1"), &CancelToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, TrackingError::NonJson { .. }), "got: {err:?}");
}

// ── Transport failure ────────────────────────────────────────────────

#[tokio::test]
async fn unreachable_endpoint_is_http_error() {
    let config = TrackingConfig::local_mock("http://127.0.0.1:1").unwrap();
    let err = TrackingClient::new(config)
        .unwrap()
        .fetch_tracking(&request("gid://shopify/Order/1"), &CancelToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, TrackingError::Http { .. }), "got: {err:?}");
    assert!(!err.user_message().is_empty());
}

// ── Cancellation ─────────────────────────────────────────────────────

#[tokio::test]
async fn cancel_before_start_sends_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TRACKING_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(0)
        .mount(&mock_server)
        .await;

    let cancel = CancelToken::new();
    cancel.cancel();
    let err = test_client(&mock_server)
        .fetch_tracking(&request("gid://shopify/Order/1"), &cancel)
        .await
        .unwrap_err();
    assert!(err.is_cancelled());
    assert_eq!(err.status(), Some(CANCELLED_STATUS));
}

#[tokio::test]
async fn cancel_aborts_in_flight_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TRACKING_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let cancel = CancelToken::new();
    let remote = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        remote.cancel();
    });

    let started = Instant::now();
    let err = client
        .fetch_tracking(&request("gid://shopify/Order/1"), &cancel)
        .await
        .unwrap_err();
    assert!(err.is_cancelled(), "got: {err:?}");
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn cancel_during_retry_delay_skips_the_retry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TRACKING_PATH))
        .respond_with(ResponseTemplate::new(429))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = TrackingConfig {
        retry: RetryPolicy {
            max_retries: 1,
            delay: Duration::from_secs(5),
        },
        ..TrackingConfig::local_mock(&mock_server.uri()).unwrap()
    };
    let client = TrackingClient::new(config).unwrap();
    let cancel = CancelToken::new();
    let remote = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        remote.cancel();
    });

    let err = client
        .fetch_tracking(&request("gid://shopify/Order/1"), &cancel)
        .await
        .unwrap_err();
    assert!(err.is_cancelled());
    assert_eq!(request_count(&mock_server).await, 1);
}
