//! # fdss-status — Order Status View
//!
//! The view half of FedEx Delivery Status Sync. Given the host's order
//! reference it decides whether a tracking fetch is needed, runs at most one
//! fetch per activation, and exposes the outcome as a banner.
//!
//! ## Modules
//!
//! - **State** (`state.rs`): `Idle`, `Loading → Success | Error`, and the
//!   folding of fetch outcomes into that machine.
//! - **View** (`view.rs`): activation lifecycle, cancellation on input change
//!   and on teardown, last-activation-wins writes.
//! - **Banner** (`banner.rs`): tone and text of the rendered banner.

pub mod banner;
pub mod state;
pub mod view;

pub use banner::{Banner, BannerItem, FulfillmentEntry, Tone, TrackEntry};
pub use state::{TrackingResult, ViewState};
pub use view::{ActivationId, StatusView};
