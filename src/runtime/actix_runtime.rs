use actix::{Actor, Arbiter, ArbiterHandle, AsyncContext, System};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::marker::PhantomData;
use std::sync::{mpsc, Arc, OnceLock};
use std::thread::{self, ThreadId};
use tokio::sync::broadcast;

use super::ActorRuntime;
use crate::actors::core::{Payload, Recipe};
use crate::actors::infrastructure::host::HostActor;
use crate::actors::infrastructure::{ActorContext, ActorHandle};
use crate::error::RuntimeError;
use crate::metrics::RegistryMetrics;
use crate::models::{ActorId, CreationFailure};

const FAILURE_CHANNEL_CAPACITY: usize = 64;

// ============================================================================
// Actix Runtime Adapter
// ============================================================================
//
// Hosts managed actors on one actix arbiter.
//
// - Either binds the arbiter of the calling thread or owns a dedicated one
// - Reserves runtime-level names for live actors
// - Publishes construction failures on a broadcast channel
//
// ============================================================================

pub struct ActixRuntime<M: Payload> {
    name: String,
    arbiter: ArbiterHandle,
    owned: Mutex<Option<(Arbiter, Option<ThreadId>)>>,
    shared: Arc<RuntimeShared>,
    _message: PhantomData<fn() -> M>,
}

impl<M: Payload> ActixRuntime<M> {
    /// Bind to the arbiter of the calling thread.
    pub fn current(name: impl Into<String>) -> Result<Self, RuntimeError> {
        let arbiter = Arbiter::try_current().ok_or(RuntimeError::NotRunning)?;
        Ok(Self::with_arbiter(name, arbiter))
    }

    /// Spawn and own a dedicated arbiter thread. Needs a running actix
    /// `System`.
    pub fn dedicated(name: impl Into<String>) -> Result<Self, RuntimeError> {
        if System::try_current().is_none() {
            return Err(RuntimeError::NotRunning);
        }
        let arbiter = Arbiter::new();
        let (tx, rx) = mpsc::sync_channel(1);
        arbiter.spawn_fn(move || {
            let _ = tx.send(thread::current().id());
        });
        let arbiter_thread = rx.recv().ok();

        let runtime = Self::with_arbiter(name, arbiter.handle());
        *runtime.owned.lock() = Some((arbiter, arbiter_thread));
        Ok(runtime)
    }

    pub fn with_arbiter(name: impl Into<String>, arbiter: ArbiterHandle) -> Self {
        let (failures, _) = broadcast::channel(FAILURE_CHANNEL_CAPACITY);
        Self {
            name: name.into(),
            arbiter,
            owned: Mutex::new(None),
            shared: Arc::new(RuntimeShared {
                names: DashMap::new(),
                failures,
                metrics: OnceLock::new(),
            }),
            _message: PhantomData,
        }
    }

    /// Count construction failures on `metrics`. Only the first call has
    /// an effect.
    pub fn with_metrics(self, metrics: Arc<RegistryMetrics>) -> Self {
        let _ = self.shared.metrics.set(metrics);
        self
    }

    /// Receive every construction failure reported after this call.
    pub fn subscribe_failures(&self) -> broadcast::Receiver<CreationFailure> {
        self.shared.failures.subscribe()
    }

    /// Number of names currently reserved by live actors.
    pub fn reserved_names(&self) -> usize {
        self.shared.names.len()
    }

    /// Stop the owned arbiter, if any, and wait for its thread to exit.
    /// Actors hosted on it stop with it. Called from the arbiter's own
    /// thread, it only requests the stop.
    pub fn terminate(&self) {
        let Some((arbiter, arbiter_thread)) = self.owned.lock().take() else {
            return;
        };
        tracing::info!(runtime = %self.name, "Stopping dedicated arbiter");
        arbiter.stop();

        if arbiter_thread == Some(thread::current().id()) {
            tracing::warn!(runtime = %self.name, "Terminated from its own arbiter, not joining");
            return;
        }
        if arbiter.join().is_err() {
            tracing::error!(runtime = %self.name, "Dedicated arbiter thread panicked");
        }
    }
}

impl<M: Payload> Drop for ActixRuntime<M> {
    fn drop(&mut self) {
        self.terminate();
    }
}

impl<M: Payload> ActorRuntime for ActixRuntime<M> {
    type Message = M;
    type Handle = ActorHandle<M>;
    type Context = ActorContext<M>;

    fn name(&self) -> &str {
        &self.name
    }

    fn create(&self, recipe: Recipe<M>, name: &str) -> Result<ActorHandle<M>, RuntimeError> {
        let id = ActorId::new();
        match self.shared.names.entry(name.to_string()) {
            Entry::Occupied(_) => return Err(RuntimeError::NameTaken(name.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(id);
            }
        }

        let actor_type = recipe.actor_type();
        let actor_name: Arc<str> = Arc::from(name);
        let shared = Arc::clone(&self.shared);
        let addr = HostActor::start_in_arbiter(&self.arbiter, move |ctx| {
            let myself = ActorHandle::new(id, actor_name, ctx.address());
            HostActor::new(myself, recipe, shared)
        });

        // A dead arbiter drops the start closure, closing the mailbox at once.
        if !addr.connected() {
            self.shared.release_name(name, id);
            return Err(RuntimeError::NotRunning);
        }

        tracing::info!(
            runtime = %self.name,
            actor = %name,
            id = %id,
            actor_type,
            "Actor created"
        );
        Ok(ActorHandle::new(id, Arc::from(name), addr))
    }

    fn stop(&self, handle: &ActorHandle<M>) -> Result<(), RuntimeError> {
        self.shared.release_name(handle.name(), handle.id());
        if !handle.is_alive() {
            return Err(RuntimeError::ActorGone(handle.name().to_string()));
        }
        tracing::debug!(runtime = %self.name, actor = %handle, "Stop requested");
        handle.stop();
        Ok(())
    }

    fn is_alive(&self, handle: &ActorHandle<M>) -> bool {
        handle.is_alive()
    }

    fn tell(&self, handle: &ActorHandle<M>, msg: M, sender: Option<&ActorHandle<M>>) {
        tracing::trace!(actor = %handle, message = ?msg, "Tell");
        handle.tell(msg, sender);
    }

    fn forward(&self, handle: &ActorHandle<M>, msg: M, ctx: &ActorContext<M>) {
        tracing::trace!(actor = %handle, message = ?msg, via = %ctx.myself(), "Forward");
        handle.tell(msg, ctx.sender());
    }

    fn watch(&self, ctx: &ActorContext<M>, handle: &ActorHandle<M>) {
        ctx.watch(handle);
    }

    fn unwatch(&self, ctx: &ActorContext<M>, handle: &ActorHandle<M>) {
        ctx.unwatch(handle);
    }
}

// ============================================================================
// State shared with hosted actors
// ============================================================================

pub(crate) struct RuntimeShared {
    names: DashMap<String, ActorId>,
    failures: broadcast::Sender<CreationFailure>,
    metrics: OnceLock<Arc<RegistryMetrics>>,
}

impl RuntimeShared {
    pub(crate) fn report_failure(&self, failure: CreationFailure) {
        tracing::error!(
            actor = %failure.name,
            id = %failure.actor_id,
            actor_type = %failure.actor_type,
            error = %failure.error,
            "Actor construction failed"
        );
        if let Some(metrics) = self.metrics.get() {
            metrics.record_construction_failure();
        }
        // No subscribers is fine: the error log above is the record.
        let _ = self.failures.send(failure);
    }

    /// Release `name` if it is still reserved by actor `id`.
    pub(crate) fn release_name(&self, name: &str, id: ActorId) {
        self.names.remove_if(name, |_, owner| *owner == id);
    }
}
