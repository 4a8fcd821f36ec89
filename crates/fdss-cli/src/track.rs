//! # Track Subcommand
//!
//! Runs one status-view activation for an order and prints the banner.
//!
//! The order comes either from a JSON/YAML file shaped like the host's order
//! object (`--order`) or from individual flags. A fully delivered order is
//! reported without contacting the endpoint.
//!
//! ## Exit codes
//!
//! - `0`: tracking shown, or order already delivered.
//! - `1`: the lookup failed (error banner).
//! - `2`: the order has no id, so nothing could be looked up.
//! - `130`: interrupted; the in-flight fetch was cancelled.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::FixedOffset;
use clap::Args;
use serde::Serialize;

use fdss_core::{Fulfillment, FulfillmentStatus, OrderReference, TrackingRequest};
use fdss_status::{Banner, StatusView, ViewState};
use fdss_tracking_client::TrackingClient;

use crate::config::{resolve_config, ClientOverrides};

/// Arguments for the `fdss track` subcommand.
#[derive(Args, Debug)]
pub struct TrackArgs {
    /// Host order object as JSON or YAML (`id`, `name`, `processedAt`,
    /// `fulfillments[].status`).
    #[arg(long, conflicts_with_all = ["order_id", "name", "processed_at", "fulfillment_status"])]
    pub order: Option<PathBuf>,

    /// Order id, e.g. `gid://shopify/Order/123`.
    #[arg(long)]
    pub order_id: Option<String>,

    /// Order name shown while loading, e.g. `#1001`.
    #[arg(long)]
    pub name: Option<String>,

    /// Order processed-at timestamp; its date part is sent as `shipDateBegin`.
    #[arg(long)]
    pub processed_at: Option<String>,

    /// Status of one fulfillment (repeatable), e.g. `DELIVERED`, `IN_TRANSIT`.
    #[arg(long = "fulfillment-status", value_parser = parse_status)]
    pub fulfillment_status: Vec<FulfillmentStatus>,

    #[command(flatten)]
    pub client: ClientOverrides,

    /// Print the view state and banner as JSON.
    #[arg(long)]
    pub json: bool,

    /// Show estimated delivery times in UTC instead of local time.
    #[arg(long)]
    pub utc: bool,

    /// Print the request that would be sent, without sending it.
    #[arg(long)]
    pub dry_run: bool,
}

/// JSON output of `fdss track --json`.
#[derive(Debug, Serialize)]
struct TrackReport<'a> {
    view: &'a ViewState,
    banner: &'a Banner,
}

/// Execute the track subcommand.
pub async fn run_track(args: &TrackArgs, config_path: Option<&Path>) -> Result<u8> {
    let order = build_order(args)?;
    let config = resolve_config(config_path, &args.client)?;

    if args.dry_run {
        print_dry_run(&order, &config.endpoint()?)?;
        return Ok(0);
    }

    let client = TrackingClient::new(config).context("failed to build tracking client")?;
    tracing::info!(endpoint = %client.endpoint(), "tracking client ready");

    let mut view = StatusView::new(Arc::new(client));
    view.update(&order);

    let interrupted = tokio::select! {
        _ = view.settled() => false,
        _ = tokio::signal::ctrl_c() => true,
    };
    if interrupted {
        tracing::warn!("interrupted, cancelling tracking fetch");
        view.teardown();
        return Ok(130);
    }

    let state = view.state();
    let offset = if args.utc { utc() } else { local_offset() };
    let banner = view.banner(&offset);

    if args.json {
        let report = TrackReport {
            view: &state,
            banner: &banner,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{banner}");
    }

    Ok(exit_code(&state))
}

fn exit_code(state: &ViewState) -> u8 {
    match state {
        ViewState::Idle | ViewState::Success(_) => 0,
        ViewState::Error(_) => 1,
        ViewState::Loading => {
            tracing::warn!("order has no id; nothing was looked up");
            2
        }
    }
}

/// Build the host order reference from `--order` or the individual flags.
pub fn build_order(args: &TrackArgs) -> Result<OrderReference> {
    if let Some(path) = &args.order {
        return crate::load_document(path);
    }
    Ok(OrderReference {
        id: args.order_id.clone(),
        name: args.name.clone(),
        processed_at: args.processed_at.clone(),
        fulfillments: args
            .fulfillment_status
            .iter()
            .copied()
            .map(Fulfillment::with_status)
            .collect(),
    })
}

fn print_dry_run(order: &OrderReference, endpoint: &url::Url) -> Result<()> {
    if order.fully_delivered() {
        println!("order is fully delivered; no request would be sent");
        return Ok(());
    }
    let Some(request) = TrackingRequest::for_order(order) else {
        println!("order has no id; no request would be sent");
        return Ok(());
    };
    println!("POST {endpoint}");
    println!("Content-Type: application/json");
    println!();
    println!("{}", serde_json::to_string(&request)?);
    Ok(())
}

fn parse_status(raw: &str) -> Result<FulfillmentStatus, String> {
    let normalized = raw.trim().to_ascii_uppercase().replace('-', "_");
    match serde_json::from_value(serde_json::Value::String(normalized)) {
        Ok(FulfillmentStatus::Unknown) | Err(_) => Err(format!("unknown fulfillment status: {raw}")),
        Ok(status) => Ok(status),
    }
}

fn utc() -> FixedOffset {
    FixedOffset::east_opt(0).unwrap_or_else(|| unreachable!("zero offset is always valid"))
}

fn local_offset() -> FixedOffset {
    *chrono::Local::now().offset()
}
