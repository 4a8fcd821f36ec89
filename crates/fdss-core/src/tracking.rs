//! # Tracking Payload
//!
//! The tracking endpoint's response body is external data. It is kept
//! verbatim as a [`serde_json::Value`]; nothing beyond "is JSON" is checked
//! when it arrives.
//!
//! Rendering needs a typed view of it, which is extracted on demand and
//! tolerates a drifting shape:
//!
//! ```json
//! {
//!   "order": { "name": "#1001" },
//!   "fulfillmentSummaries": [
//!     {
//!       "fulfillmentId": "gid://shopify/Fulfillment/456",
//!       "allDelivered": false,
//!       "tracks": [
//!         { "number": "7712...", "statusDesc": "In transit", "estimatedDelivery": "2024-01-08T20:00:00Z" }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! Non-array lists read as empty, non-object elements are skipped and
//! numeric identifiers are shown as their decimal text.

use serde::Serialize;
use serde_json::Value;

/// Parsed response of the tracking endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackingPayload {
    /// HTTP status the body arrived with.
    pub status: u16,
    /// Response body, unmodified.
    pub body: Value,
}

impl TrackingPayload {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// Whether the body carries anything to render. `null`, `false`, `0` and
    /// `""` do not.
    pub fn has_body(&self) -> bool {
        truthy(&self.body)
    }

    /// `order.name` from the payload, if present and non-empty.
    pub fn order_name(&self) -> Option<&str> {
        self.body
            .get("order")
            .and_then(|o| o.get("name"))
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
    }

    /// Per-fulfillment tracking summaries, in payload order.
    pub fn fulfillment_summaries(&self) -> Vec<FulfillmentSummary> {
        self.body
            .get("fulfillmentSummaries")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(FulfillmentSummary::from_value).collect())
            .unwrap_or_default()
    }
}

/// Delivery status of one fulfillment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FulfillmentSummary {
    pub fulfillment_id: String,
    pub all_delivered: bool,
    pub tracks: Vec<Track>,
}

impl FulfillmentSummary {
    fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let tracks = obj
            .get("tracks")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Track::from_value).collect())
            .unwrap_or_default();
        Some(Self {
            fulfillment_id: obj.get("fulfillmentId").and_then(text).unwrap_or_default(),
            all_delivered: obj.get("allDelivered").is_some_and(truthy),
            tracks,
        })
    }

    /// Last `/`-separated segment of the fulfillment id.
    ///
    /// `gid://shopify/Fulfillment/456` becomes `456`.
    pub fn short_id(&self) -> &str {
        self.fulfillment_id
            .rsplit('/')
            .next()
            .unwrap_or(&self.fulfillment_id)
    }
}

/// One carrier tracking number and what the carrier says about it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub number: String,
    pub status_desc: Option<String>,
    pub estimated_delivery: Option<String>,
}

impl Track {
    fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        Some(Self {
            number: obj.get("number").and_then(text).unwrap_or_default(),
            status_desc: obj.get("statusDesc").and_then(text),
            estimated_delivery: obj.get("estimatedDelivery").and_then(text),
        })
    }
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
