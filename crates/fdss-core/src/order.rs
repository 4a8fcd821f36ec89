//! # Host Order Reference
//!
//! The order object the admin host exposes to the extension. It is supplied
//! fresh on every render pass and is never mutated here.
//!
//! Two values are derived from it:
//!
//! - `fully_delivered`: the fulfillment list is non-empty and every entry
//!   reports `DELIVERED`. A fully delivered order is never looked up.
//! - `ship_date_begin`: the date part of `processedAt` (everything before the
//!   first `T`), forwarded to the tracking endpoint as a search hint.
//!
//! The host payload is loosely typed, so deserialization is forgiving: a
//! missing or non-array `fulfillments` is an empty list, and a fulfillment
//! whose status is missing or not a string simply has no status.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ValidationError;

/// Identifier of a host order, e.g. `gid://shopify/Order/123`.
///
/// # Validation
///
/// - Must not be empty. Whitespace is kept as-is; the host owns the format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl<'de> Deserialize<'de> for OrderId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

impl OrderId {
    /// Create an order id, rejecting empty values.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyOrderId`] if the value is empty.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if s.is_empty() {
            return Err(ValidationError::EmptyOrderId);
        }
        Ok(Self(s))
    }

    /// Access the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Display status of a fulfillment as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FulfillmentStatus {
    AttemptedDelivery,
    Canceled,
    Confirmed,
    Delivered,
    Failure,
    Fulfilled,
    InTransit,
    LabelPrinted,
    LabelPurchased,
    LabelVoided,
    MarkedAsFulfilled,
    NotDelivered,
    OutForDelivery,
    PickedUp,
    ReadyForPickup,
    Submitted,
    /// Forward-compatible catch-all for statuses the host adds later.
    #[serde(other)]
    Unknown,
}

/// One shipped subset of an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fulfillment {
    #[serde(default, deserialize_with = "lenient_status")]
    pub status: Option<FulfillmentStatus>,
}

impl Fulfillment {
    /// Fulfillment with the given status.
    pub fn with_status(status: FulfillmentStatus) -> Self {
        Self {
            status: Some(status),
        }
    }

    /// Whether this fulfillment has reached the delivered state.
    pub fn is_delivered(&self) -> bool {
        self.status == Some(FulfillmentStatus::Delivered)
    }
}

/// Read-only order reference supplied by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReference {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub processed_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_fulfillments")]
    pub fulfillments: Vec<Fulfillment>,
}

impl OrderReference {
    /// Validated order id, or `None` when the host has not supplied one yet.
    pub fn order_id(&self) -> Option<OrderId> {
        self.id.as_deref().and_then(|id| OrderId::new(id).ok())
    }

    /// True when there is at least one fulfillment and all are delivered.
    ///
    /// An order with no fulfillments is never considered delivered.
    pub fn fully_delivered(&self) -> bool {
        !self.fulfillments.is_empty() && self.fulfillments.iter().all(Fulfillment::is_delivered)
    }

    /// Date portion of `processedAt`, if it has one.
    ///
    /// `"2024-01-05T10:00:00Z"` yields `"2024-01-05"`. A value without a `T`,
    /// or with nothing before it, yields `None`.
    pub fn ship_date_begin(&self) -> Option<String> {
        let processed_at = self.processed_at.as_deref()?;
        let (date, _) = processed_at.split_once('T')?;
        if date.is_empty() {
            return None;
        }
        Some(date.to_string())
    }
}

fn lenient_status<'de, D>(deserializer: D) -> Result<Option<FulfillmentStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(raw).ok())
}

fn lenient_fulfillments<'de, D>(deserializer: D) -> Result<Vec<Fulfillment>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    let serde_json::Value::Array(items) = raw else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .map(|item| Fulfillment {
            status: item
                .get("status")
                .and_then(|s| serde_json::from_value(s.clone()).ok()),
        })
        .collect())
}
