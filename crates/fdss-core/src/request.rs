//! # Tracking Request Body
//!
//! The JSON body posted to the tracking endpoint:
//! `{"orderId": ..., "shipDateBegin"?: ...}`. Field order is fixed and
//! `shipDateBegin` is omitted entirely when unknown.

use serde::{Deserialize, Serialize};

use crate::order::{OrderId, OrderReference};

/// Body of one tracking lookup. Built once per fetch and never modified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingRequest {
    pub order_id: OrderId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ship_date_begin: Option<String>,
}

impl TrackingRequest {
    pub fn new(order_id: OrderId, ship_date_begin: Option<String>) -> Self {
        Self {
            order_id,
            ship_date_begin,
        }
    }

    /// Build the request for a host order, or `None` if it has no usable id.
    ///
    /// Does not look at delivery state; skipping delivered orders is the
    /// caller's decision.
    pub fn for_order(order: &OrderReference) -> Option<Self> {
        Some(Self::new(order.order_id()?, order.ship_date_begin()))
    }
}
