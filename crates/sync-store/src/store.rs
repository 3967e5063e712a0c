//! # Window Store
//!
//! One [`Store`] per window. The handle is cheap to clone; every clone sees
//! the same state.
//!
//! ## Dispatch pipeline
//!
//! ```text
//! dispatch(d) ─► middleware chain ─► RootState::reduce ─► revision += 1
//!                      │
//!                      └─► Absorbed (no state change)
//! ```
//!
//! Reducer errors are logged and leave state unchanged. They never reach the
//! caller as a panic or an `Err`.

use parking_lot::{RwLock, RwLockUpgradableReadGuard};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use sync_telemetry::{metric_inc, DISPATCHES_ABSORBED, DISPATCHES_APPLIED};
use sync_types::{Action, Context, Dispatch, WindowId};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::actions::ui;
use crate::domain::{
    Bucket, ContextSlices, Entity, Lead, Metric, RootState, SliceState, StoreError, Team, Vault,
};
use crate::middleware::{BroadcastMiddleware, Flow, LoggingMiddleware, Middleware};
use crate::policy::ReplicationPolicy;
use crate::ports::{
    DispatchApi, DispatchOutcome, KeyValueStore, RelaySender, SystemTimeSource, TimeSource,
};

/// Key under which metric visibility is persisted.
pub const METRIC_VISIBILITY_KEY: &str = "metricVisibility";

struct StoreInner {
    window: WindowId,
    state: RwLock<RootState>,
    middleware: Vec<Arc<dyn Middleware>>,
    clock: Arc<dyn TimeSource>,
    policy: Arc<ReplicationPolicy>,
    revision: watch::Sender<u64>,
    listener_armed: AtomicBool,
    kv: Option<Arc<dyn KeyValueStore>>,
}

/// Handle to one window's state.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

/// Builder for [`Store`].
pub struct StoreBuilder {
    window: WindowId,
    clock: Arc<dyn TimeSource>,
    policy: Arc<ReplicationPolicy>,
    relay: Option<Arc<dyn RelaySender>>,
    middleware: Vec<Arc<dyn Middleware>>,
    kv: Option<Arc<dyn KeyValueStore>>,
}

impl StoreBuilder {
    pub fn new(window: impl Into<WindowId>) -> Self {
        Self {
            window: window.into(),
            clock: Arc::new(SystemTimeSource),
            policy: Arc::new(ReplicationPolicy::standard()),
            relay: None,
            middleware: Vec::new(),
            kv: None,
        }
    }

    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn TimeSource>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn policy(mut self, policy: ReplicationPolicy) -> Self {
        self.policy = Arc::new(policy);
        self
    }

    /// Connect the store to the relay. Without one, replicate intents
    /// degrade to local apply.
    #[must_use]
    pub fn relay(mut self, sender: Arc<dyn RelaySender>) -> Self {
        self.relay = Some(sender);
        self
    }

    /// Append a middleware. Custom links run after logging and before
    /// broadcast.
    #[must_use]
    pub fn middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middleware.push(middleware);
        self
    }

    #[must_use]
    pub fn key_value_store(mut self, kv: Arc<dyn KeyValueStore>) -> Self {
        self.kv = Some(kv);
        self
    }

    pub fn build(self) -> Store {
        let mut chain: Vec<Arc<dyn Middleware>> =
            vec![Arc::new(LoggingMiddleware::new(self.window.clone()))];
        chain.extend(self.middleware);

        match self.relay {
            Some(sender) => chain.push(Arc::new(BroadcastMiddleware::new(
                self.window.clone(),
                self.policy.clone(),
                sender,
                self.clock.clone(),
            ))),
            None => warn!(window_id = %self.window, "Store built without relay, replication disabled"),
        }

        let (revision, _) = watch::channel(0);
        info!(
            window_id = %self.window,
            middleware = ?chain.iter().map(|m| m.name()).collect::<Vec<_>>(),
            replicated_types = self.policy.len(),
            "Store created"
        );

        Store {
            inner: Arc::new(StoreInner {
                window: self.window,
                state: RwLock::new(RootState::default()),
                middleware: chain,
                clock: self.clock,
                policy: self.policy,
                revision,
                listener_armed: AtomicBool::new(false),
                kv: self.kv,
            }),
        }
    }
}

impl Store {
    pub fn builder(window: impl Into<WindowId>) -> StoreBuilder {
        StoreBuilder::new(window)
    }

    /// Run a dispatch through the middleware chain and the reducers.
    pub fn dispatch(&self, dispatch: impl Into<Dispatch>) -> DispatchOutcome {
        let mut current = dispatch.into();
        let action_type = current.action_type().clone();

        for link in &self.inner.middleware {
            match link.handle(current) {
                Flow::Continue(next) => current = next,
                Flow::Absorbed => {
                    metric_inc!(DISPATCHES_ABSORBED, &[action_type.as_str()]);
                    debug!(
                        window_id = %self.inner.window,
                        action_type = %action_type,
                        middleware = link.name(),
                        "Dispatch absorbed"
                    );
                    return DispatchOutcome::Absorbed;
                }
            }
        }

        self.apply(&current.action)
    }

    fn apply(&self, action: &Action) -> DispatchOutcome {
        let now = self.inner.clock.now();
        let result = self.inner.state.write().reduce(action, now);

        match result {
            Ok(changed) => {
                metric_inc!(DISPATCHES_APPLIED, &[action.action_type.as_str()]);
                if !changed {
                    return DispatchOutcome::Unchanged;
                }
                self.inner.revision.send_modify(|revision| *revision += 1);
                self.after_apply(action);
                DispatchOutcome::Applied
            }
            Err(e) => {
                warn!(
                    window_id = %self.inner.window,
                    action_type = %action.action_type,
                    error = %e,
                    "Action rejected by reducer"
                );
                DispatchOutcome::Unchanged
            }
        }
    }

    fn after_apply(&self, action: &Action) {
        if action.action_type != ui::SET_METRIC_VISIBILITY {
            return;
        }
        if let Err(e) = self.persist_metric_visibility() {
            warn!(
                window_id = %self.inner.window,
                error = %e,
                "Could not persist metric visibility"
            );
        }
    }

    fn persist_metric_visibility(&self) -> Result<(), StoreError> {
        let Some(kv) = &self.inner.kv else {
            return Ok(());
        };
        let encoded = serde_json::to_string(&self.inner.state.read().ui.metric_visibility)
            .map_err(|e| StoreError::Persistence(e.to_string()))?;
        kv.set(METRIC_VISIBILITY_KEY, encoded)
    }

    /// Reload window-local UI flags from the key-value store.
    ///
    /// Returns whether anything was found.
    pub fn restore_ui(&self) -> Result<bool, StoreError> {
        let Some(kv) = &self.inner.kv else {
            return Ok(false);
        };
        let Some(raw) = kv.get(METRIC_VISIBILITY_KEY)? else {
            return Ok(false);
        };
        let visibility: BTreeMap<String, bool> = serde_json::from_str(&raw).map_err(|e| {
            StoreError::Persistence(format!("corrupt {METRIC_VISIBILITY_KEY}: {e}"))
        })?;

        debug!(
            window_id = %self.inner.window,
            entries = visibility.len(),
            "Restoring metric visibility"
        );
        self.dispatch(ui::load_metric_visibility(&visibility));
        Ok(true)
    }

    /// Read state under the lock.
    pub fn with_state<R>(&self, f: impl FnOnce(&RootState) -> R) -> R {
        f(&self.inner.state.read())
    }

    /// Owned copy of the whole state.
    #[must_use]
    pub fn snapshot(&self) -> RootState {
        self.inner.state.read().clone()
    }

    /// State as JSON, the shape a renderer reads.
    #[must_use]
    pub fn snapshot_json(&self) -> Value {
        serde_json::to_value(&*self.inner.state.read()).unwrap_or(Value::Null)
    }

    /// Buckets of `context`. Referencing a context creates it.
    pub fn buckets(&self, context: &Context) -> SliceState<Bucket> {
        self.referenced(context, |state| &state.buckets, |state| &mut state.buckets)
    }

    /// Leads of `context`. Referencing a context creates it.
    pub fn leads(&self, context: &Context) -> SliceState<Lead> {
        self.referenced(context, |state| &state.leads, |state| &mut state.leads)
    }

    /// Metrics of `context`. Referencing a context creates it.
    pub fn metrics(&self, context: &Context) -> SliceState<Metric> {
        self.referenced(context, |state| &state.metrics, |state| &mut state.metrics)
    }

    /// Read a context sub-tree, inserting the canonical empty shape the first
    /// time the context is referenced. The write lock is only taken then.
    fn referenced<E: Entity>(
        &self,
        context: &Context,
        select: fn(&RootState) -> &ContextSlices<E>,
        select_mut: fn(&mut RootState) -> &mut ContextSlices<E>,
    ) -> SliceState<E> {
        let state = self.inner.state.upgradable_read();
        if let Some(slice) = select(&state).get(context) {
            return slice.clone();
        }

        let mut state = RwLockUpgradableReadGuard::upgrade(state);
        let (slice, _) = select_mut(&mut state).reference(context);
        debug!(window_id = %self.inner.window, context = %context, "Context created on read");
        slice.clone()
    }

    #[must_use]
    pub fn vaults(&self) -> SliceState<Vault> {
        self.with_state(|state| state.vaults.clone())
    }

    #[must_use]
    pub fn teams(&self) -> SliceState<Team> {
        self.with_state(|state| state.teams.clone())
    }

    /// Revision counter, bumped on every dispatch that changes state.
    ///
    /// A context created by a read does not bump it: the reader already holds
    /// the canonical empty shape.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    #[must_use]
    pub fn revision(&self) -> u64 {
        *self.inner.revision.borrow()
    }

    #[must_use]
    pub fn window(&self) -> &WindowId {
        &self.inner.window
    }

    #[must_use]
    pub fn policy(&self) -> &ReplicationPolicy {
        &self.inner.policy
    }

    /// Claim the single inbound listener slot. `false` if already taken.
    pub(crate) fn claim_listener(&self) -> bool {
        !self.inner.listener_armed.swap(true, Ordering::SeqCst)
    }

    #[must_use]
    pub fn listener_armed(&self) -> bool {
        self.inner.listener_armed.load(Ordering::SeqCst)
    }
}

impl DispatchApi for Store {
    fn dispatch(&self, dispatch: Dispatch) -> DispatchOutcome {
        Store::dispatch(self, dispatch)
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("window", &self.inner.window)
            .field("revision", &self.revision())
            .field("listener_armed", &self.listener_armed())
            .finish_non_exhaustive()
    }
}
