//! # Status View
//!
//! Owns the visible [`ViewState`] and the single activation that may write
//! to it.
//!
//! ## Activations
//!
//! An activation is keyed by `(order id, ship date, fully delivered)`.
//! [`StatusView::update`] is called on every render pass with the host's
//! current order:
//!
//! - same key: nothing happens;
//! - new key: the previous activation's [`CancelToken`] is cancelled, the
//!   state resets and, if the order has an id and is not fully delivered, a
//!   fetch task is spawned.
//!
//! The fetch task re-checks its own token while holding the state lock
//! before writing, so a late response from a superseded activation is
//! dropped no matter when it arrives.
//!
//! [`StatusView::teardown`] (also run on drop) cancels the current
//! activation. Nothing writes to the state after that.

use std::sync::Arc;

use chrono::FixedOffset;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::Instrument;
use uuid::Uuid;

use fdss_core::{OrderId, OrderReference, TrackingRequest};
use fdss_tracking_client::{CancelToken, TrackingSource};

use crate::banner::Banner;
use crate::state::{TrackingResult, ViewState};

/// Identifier of one activation, recorded on its tracing span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActivationId(Uuid);

impl ActivationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ActivationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ActivationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ActivationKey {
    order_id: Option<OrderId>,
    ship_date_begin: Option<String>,
    fully_delivered: bool,
}

impl ActivationKey {
    fn for_order(order: &OrderReference) -> Self {
        Self {
            order_id: order.order_id(),
            ship_date_begin: order.ship_date_begin(),
            fully_delivered: order.fully_delivered(),
        }
    }
}

#[derive(Debug)]
struct Activation {
    id: ActivationId,
    key: ActivationKey,
    cancel: CancelToken,
    task: Option<JoinHandle<()>>,
}

/// Status view driven by a [`TrackingSource`].
///
/// [`update`](Self::update) spawns onto the current Tokio runtime and must
/// be called from within one.
#[derive(Debug)]
pub struct StatusView<S: TrackingSource> {
    source: Arc<S>,
    state: Arc<Mutex<ViewState>>,
    order_name: Option<String>,
    activation: Option<Activation>,
}

impl<S: TrackingSource> StatusView<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            state: Arc::new(Mutex::new(ViewState::Loading)),
            order_name: None,
            activation: None,
        }
    }

    /// Feed the host's current order into the view.
    pub fn update(&mut self, order: &OrderReference) {
        self.order_name = order.name.clone();

        let key = ActivationKey::for_order(order);
        if self.activation.as_ref().is_some_and(|a| a.key == key) {
            return;
        }
        self.teardown();

        let id = ActivationId::new();
        let cancel = CancelToken::new();
        *self.state.lock() = if key.fully_delivered {
            ViewState::Idle
        } else {
            ViewState::Loading
        };

        let task = match (&key.order_id, key.fully_delivered) {
            (_, true) => {
                tracing::info!(activation = %id, "order fully delivered, skipping tracking fetch");
                None
            }
            (None, false) => {
                tracing::debug!(activation = %id, "no order id yet, waiting");
                None
            }
            (Some(order_id), false) => Some(self.spawn_fetch(
                id,
                TrackingRequest::new(order_id.clone(), key.ship_date_begin.clone()),
                cancel.clone(),
            )),
        };

        self.activation = Some(Activation {
            id,
            key,
            cancel,
            task,
        });
    }

    fn spawn_fetch(
        &self,
        id: ActivationId,
        request: TrackingRequest,
        cancel: CancelToken,
    ) -> JoinHandle<()> {
        let source = Arc::clone(&self.source);
        let state = Arc::clone(&self.state);
        let span = tracing::info_span!("activation", activation = %id, order_id = %request.order_id);

        tokio::spawn(
            async move {
                tracing::debug!(ship_date_begin = ?request.ship_date_begin, "fetching tracking");
                let outcome = source.fetch_tracking(&request, &cancel).await;
                let result = TrackingResult::from(outcome);

                let mut guard = state.lock();
                if cancel.is_cancelled() {
                    tracing::debug!("activation superseded, discarding result");
                    return;
                }
                guard.apply(result);
                tracing::info!(state = %*guard, "tracking settled");
            }
            .instrument(span),
        )
    }

    /// Cancel the current activation, if any.
    ///
    /// The state keeps its last value. A later [`update`](Self::update)
    /// starts a fresh activation even for the same order.
    pub fn teardown(&mut self) {
        if let Some(activation) = self.activation.take() {
            if !activation.cancel.is_cancelled() {
                tracing::debug!(activation = %activation.id, "cancelling activation");
            }
            activation.cancel.cancel();
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> ViewState {
        self.state.lock().clone()
    }

    /// Wait for the current activation's fetch to finish, then snapshot.
    ///
    /// Returns immediately when there is nothing in flight.
    pub async fn settled(&mut self) -> ViewState {
        let task = self.activation.as_mut().and_then(|a| a.task.take());
        if let Some(task) = task {
            if let Err(e) = task.await {
                tracing::warn!("tracking task failed: {e}");
            }
        }
        self.state()
    }

    /// Banner for the current state.
    pub fn banner(&self, offset: &FixedOffset) -> Banner {
        Banner::render(self.order_name.as_deref(), &self.state(), offset)
    }
}

impl<S: TrackingSource> Drop for StatusView<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}
