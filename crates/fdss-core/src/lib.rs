//! # fdss-core — Foundational Types for FedEx Delivery Status Sync
//!
//! Defines the data the tracking fetcher and the status view agree on:
//!
//! - [`OrderReference`]: the read-only order handed over by the host admin
//!   surface, and the two values derived from it (`fully_delivered`,
//!   `ship_date_begin`).
//! - [`OrderId`]: validated order identifier. No fetch is possible without one.
//! - [`TrackingRequest`]: the JSON body posted to the tracking endpoint.
//! - [`TrackingPayload`]: the endpoint's JSON response, kept verbatim, plus a
//!   lenient typed view used only for rendering.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `fdss-*` crates.
//! - No I/O. Everything here is a pure function of its inputs.
//! - No `.unwrap()` outside tests.

pub mod error;
pub mod order;
pub mod request;
pub mod tracking;

pub use error::ValidationError;
pub use order::{Fulfillment, FulfillmentStatus, OrderId, OrderReference};
pub use request::TrackingRequest;
pub use tracking::{FulfillmentSummary, Track, TrackingPayload};
