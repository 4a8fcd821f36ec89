//! # Status Banner
//!
//! Turns a [`ViewState`] into the banner the host displays. The banner is a
//! plain data model; [`Display`](std::fmt::Display) renders it as text.
//!
//! ## Layout
//!
//! ```text
//! [success] FedEx Delivery Status Sync
//! FedEx Tracking Information:
//! Order: #1001
//! Fulfillment: 456 — In transit
//!   Tracking: 794612345678
//!   Status: On FedEx vehicle for delivery
//!   ETA: 1/8/2024, 8:00:00 PM
//! ```

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use serde::Serialize;

use fdss_core::TrackingPayload;

use crate::state::ViewState;

pub const HEADING: &str = "FedEx Delivery Status Sync";
pub const SUCCESS_MESSAGE: &str = "FedEx Tracking Information:";
pub const NO_TRACKING: &str = "No tracking yet.";
pub const DELIVERED_NOTICE: &str =
    "This order is already marked delivered. No status check needed.";

/// Banner tone. Critical on error, info while loading, success otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Critical,
    Info,
    Success,
}

impl std::fmt::Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Critical => "critical",
            Self::Info => "info",
            Self::Success => "success",
        };
        f.write_str(s)
    }
}

/// One tracking number within a fulfillment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackEntry {
    pub number: String,
    pub status: Option<String>,
    pub eta: Option<String>,
}

/// One fulfillment and its tracking numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FulfillmentEntry {
    pub heading: String,
    pub tracks: Vec<TrackEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum BannerItem {
    Text(String),
    Fulfillment(FulfillmentEntry),
}

/// Rendered status banner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Banner {
    pub heading: String,
    pub tone: Tone,
    pub items: Vec<BannerItem>,
}

impl Banner {
    /// Build the banner for `state`.
    ///
    /// `order_name` is the host's order name, used while loading. ETAs are
    /// shown in `offset`.
    pub fn render(order_name: Option<&str>, state: &ViewState, offset: &FixedOffset) -> Self {
        let tone = match state {
            ViewState::Error(_) => Tone::Critical,
            ViewState::Loading => Tone::Info,
            ViewState::Idle | ViewState::Success(_) => Tone::Success,
        };

        let mut items = Vec::new();
        items.push(BannerItem::Text(match state {
            ViewState::Loading => {
                format!("Fetching tracking for {}…", order_name.unwrap_or("this order"))
            }
            ViewState::Error(reason) => reason.clone(),
            ViewState::Idle | ViewState::Success(_) => SUCCESS_MESSAGE.to_string(),
        }));

        match state {
            ViewState::Success(payload) => items.extend(payload_items(payload, offset)),
            ViewState::Idle => items.push(BannerItem::Text(DELIVERED_NOTICE.to_string())),
            ViewState::Loading | ViewState::Error(_) => {}
        }

        Self {
            heading: HEADING.to_string(),
            tone,
            items,
        }
    }

    pub fn fulfillments(&self) -> impl Iterator<Item = &FulfillmentEntry> {
        self.items.iter().filter_map(|item| match item {
            BannerItem::Fulfillment(entry) => Some(entry),
            BannerItem::Text(_) => None,
        })
    }
}

fn payload_items(payload: &TrackingPayload, offset: &FixedOffset) -> Vec<BannerItem> {
    let mut items = Vec::new();
    if !payload.has_body() {
        return items;
    }
    if let Some(name) = payload.order_name() {
        items.push(BannerItem::Text(format!("Order: {name}")));
    }

    let summaries = payload.fulfillment_summaries();
    if summaries.is_empty() {
        items.push(BannerItem::Text(NO_TRACKING.to_string()));
        return items;
    }

    for summary in summaries {
        let progress = if summary.all_delivered { "Delivered" } else { "In transit" };
        items.push(BannerItem::Fulfillment(FulfillmentEntry {
            heading: format!("Fulfillment: {} — {progress}", summary.short_id()),
            tracks: summary
                .tracks
                .into_iter()
                .map(|track| TrackEntry {
                    eta: track.estimated_delivery.map(|raw| format_eta(&raw, offset)),
                    status: track.status_desc,
                    number: track.number,
                })
                .collect(),
        }));
    }
    items
}

/// Format an estimated-delivery timestamp as `M/D/YYYY, h:mm:ss AM`.
///
/// Accepted inputs:
///
/// - RFC 3339 (`2024-01-08T20:00:00Z`), converted to `offset`;
/// - a date-time without offset (`2024-01-08T20:00:00`), read as wall time
///   in `offset`;
/// - a bare date (`2024-01-08`), read as UTC midnight.
///
/// Anything else is returned unchanged.
pub fn format_eta(raw: &str, offset: &FixedOffset) -> String {
    match parse_eta(raw.trim(), offset) {
        Some(at) => at.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string(),
        None => raw.to_string(),
    }
}

fn parse_eta(raw: &str, offset: &FixedOffset) -> Option<DateTime<FixedOffset>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(offset));
    }
    let wall = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"));
    if let Ok(wall) = wall {
        return offset.from_local_datetime(&wall).single();
    }
    let midnight = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?.and_hms_opt(0, 0, 0)?;
    Some(midnight.and_utc().with_timezone(offset))
}

impl std::fmt::Display for Banner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "[{}] {}", self.tone, self.heading)?;
        for item in &self.items {
            match item {
                BannerItem::Text(text) => writeln!(f, "{text}")?,
                BannerItem::Fulfillment(entry) => {
                    writeln!(f, "{}", entry.heading)?;
                    for track in &entry.tracks {
                        writeln!(f, "  Tracking: {}", track.number)?;
                        if let Some(status) = &track.status {
                            writeln!(f, "  Status: {status}")?;
                        }
                        if let Some(eta) = &track.eta {
                            writeln!(f, "  ETA: {eta}")?;
                        }
                    }
                }
            }
        }
        Ok(())
    }
}
