use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

use crate::actors::core::{
    ComponentHealth, HealthCheckable, HealthStatus, ManagedActor, Recipe, StopReason,
};
use crate::error::{ConstructionError, RegistryError, Result};
use crate::injection::{BindingCache, DependencyResolver, Injectable, InjectedActorFactory};
use crate::metrics::RegistryMetrics;
use crate::models::validate_name;
use crate::runtime::ActorRuntime;

const COMPONENT_NAME: &str = "actor_registry";

// ============================================================================
// Actor Registry
// ============================================================================
//
// Concurrent name -> handle map bound to one actor runtime.
//
// Every mutation of a name goes through the map's per-key entry lock, so
// creating, replacing and removing the actor behind one name is atomic
// while operations on names in other shards proceed in parallel. An old
// actor is always asked to stop before its replacement is published.
//
// Lookups, deliveries and enumeration clone what they need out of the map
// and talk to the runtime only after the map lock is released.
//
// ============================================================================

pub struct ActorRegistry<R: ActorRuntime> {
    runtime: Arc<R>,
    actors: DashMap<String, R::Handle>,
    resolver: Option<Arc<dyn DependencyResolver>>,
    bindings: BindingCache,
    metrics: Option<Arc<RegistryMetrics>>,
}

impl<R: ActorRuntime> ActorRegistry<R> {
    pub fn new(runtime: Arc<R>) -> Self {
        Self::from_map(runtime, DashMap::new())
    }

    /// Pre-size the name map for about `capacity` actors.
    pub fn with_capacity(runtime: Arc<R>, capacity: usize) -> Self {
        Self::from_map(runtime, DashMap::with_capacity(capacity))
    }

    /// Start from an existing name -> handle mapping. The handles must
    /// belong to `runtime`.
    pub fn with_entries<I>(runtime: Arc<R>, entries: I) -> Self
    where
        I: IntoIterator<Item = (String, R::Handle)>,
    {
        Self::from_map(runtime, entries.into_iter().collect())
    }

    fn from_map(runtime: Arc<R>, actors: DashMap<String, R::Handle>) -> Self {
        Self {
            runtime,
            actors,
            resolver: None,
            bindings: BindingCache::new(),
            metrics: None,
        }
    }

    /// Resolver used by `inject_of`. Without one, injected actors are
    /// built in degraded mode.
    pub fn with_resolver(mut self, resolver: Arc<dyn DependencyResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<RegistryMetrics>) -> Self {
        metrics.set_actor_count(self.actors.len());
        self.metrics = Some(metrics);
        self
    }

    /// The runtime this registry creates actors on.
    pub fn runtime(&self) -> &Arc<R> {
        &self.runtime
    }

    pub fn resolver(&self) -> Option<&Arc<dyn DependencyResolver>> {
        self.resolver.as_ref()
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Create an actor from `recipe` and register it under `name`.
    ///
    /// An actor already registered under `name` is stopped first and
    /// replaced. If the runtime then fails to create the new actor, the
    /// name is left unregistered.
    pub fn actor_of(&self, name: &str, recipe: Recipe<R::Message>) -> Result<R::Handle> {
        validate_name(name)?;
        let actor_type = recipe.actor_type();

        let outcome = match self.actors.entry(name.to_string()) {
            Entry::Occupied(mut entry) => {
                let previous = entry.get().clone();
                self.stop_handle(&previous, StopReason::Replaced);
                match self.runtime.create(recipe, name) {
                    Ok(handle) => {
                        entry.insert(handle.clone());
                        Ok((handle, Some(previous)))
                    }
                    Err(source) => {
                        entry.remove();
                        Err(source)
                    }
                }
            }
            Entry::Vacant(entry) => self.runtime.create(recipe, name).map(|handle| {
                entry.insert(handle.clone());
                (handle, None)
            }),
        };
        self.update_gauge();

        match outcome {
            Ok((handle, previous)) => {
                if let Some(metrics) = &self.metrics {
                    metrics.record_created();
                }
                match previous {
                    Some(previous) => tracing::info!(
                        runtime = %self.runtime.name(),
                        actor = %name,
                        actor_type,
                        previous = ?previous,
                        "Actor replaced"
                    ),
                    None => tracing::info!(
                        runtime = %self.runtime.name(),
                        actor = %name,
                        actor_type,
                        "Actor registered"
                    ),
                }
                Ok(handle)
            }
            Err(source) => {
                tracing::error!(
                    runtime = %self.runtime.name(),
                    actor = %name,
                    actor_type,
                    error = %source,
                    "Failed to create actor"
                );
                Err(RegistryError::Spawn {
                    name: name.to_string(),
                    source,
                })
            }
        }
    }

    /// Create a default-constructed `B`, inject its dependencies, and
    /// register it under `name`.
    pub fn inject_of<B>(&self, name: &str) -> Result<R::Handle>
    where
        B: Injectable + ManagedActor<R::Message> + Default,
    {
        self.actor_of(name, self.injector::<B>().recipe())
    }

    /// Like `inject_of`, building the instance with `constructor`.
    pub fn inject_of_with<B, F>(&self, name: &str, constructor: F) -> Result<R::Handle>
    where
        B: Injectable + ManagedActor<R::Message>,
        F: FnOnce() -> B + Send + 'static,
    {
        self.actor_of(name, self.injector::<B>().recipe_with(constructor))
    }

    /// Like `inject_of_with`, for constructors that can fail.
    pub fn try_inject_of_with<B, F>(&self, name: &str, constructor: F) -> Result<R::Handle>
    where
        B: Injectable + ManagedActor<R::Message>,
        F: FnOnce() -> std::result::Result<B, ConstructionError> + Send + 'static,
    {
        self.actor_of(name, self.injector::<B>().try_recipe_with(constructor))
    }

    /// Factory for `B` bound to this registry's resolver, with `B`'s
    /// bindings cached per registry.
    pub fn injector<B: Injectable>(&self) -> InjectedActorFactory<B> {
        InjectedActorFactory::with_bindings(self.resolver.clone(), self.bindings.get::<B>())
    }

    /// Unregister and stop the actor under `name`.
    pub fn remove(&self, name: &str) -> Option<R::Handle> {
        let removed = match self.actors.entry(name.to_string()) {
            Entry::Occupied(entry) => {
                self.stop_handle(entry.get(), StopReason::Removed);
                Some(entry.remove())
            }
            Entry::Vacant(_) => None,
        };

        match &removed {
            Some(handle) => {
                self.update_gauge();
                tracing::info!(
                    runtime = %self.runtime.name(),
                    actor = %name,
                    handle = ?handle,
                    "Actor removed"
                );
            }
            None => self.report_missing("remove", name),
        }
        removed
    }

    /// Unregister every name bound to `handle`, then stop it.
    ///
    /// Scans the whole map; meant for termination cleanup where only the
    /// handle is known. Names re-registered concurrently to a different
    /// handle are left alone. Returns the number of names removed.
    pub fn forget(&self, handle: &R::Handle) -> usize {
        let mut removed = 0;
        self.actors.retain(|_, registered| {
            if registered == handle {
                removed += 1;
                false
            } else {
                true
            }
        });
        self.stop_handle(handle, StopReason::Forgotten);

        if removed > 0 {
            self.update_gauge();
        }
        tracing::debug!(
            runtime = %self.runtime.name(),
            handle = ?handle,
            removed,
            "Actor forgotten"
        );
        removed
    }

    /// Stop and unregister every actor. Returns the number of entries
    /// removed, each of which was sent one stop request.
    ///
    /// Names registered while `clear` runs may survive it.
    pub fn clear(&self) -> usize {
        let names: Vec<String> = self.actors.iter().map(|entry| entry.key().clone()).collect();

        let mut cleared = 0;
        for name in names {
            if let Entry::Occupied(entry) = self.actors.entry(name) {
                self.stop_handle(entry.get(), StopReason::Cleared);
                entry.remove();
                cleared += 1;
            }
        }
        self.update_gauge();

        tracing::info!(
            runtime = %self.runtime.name(),
            cleared,
            remaining = self.actors.len(),
            "Registry cleared"
        );
        cleared
    }

    // ========================================================================
    // Messaging
    // ========================================================================

    /// Enqueue `msg` for the actor under `name`. Returns the handle it was
    /// sent to, or `None` when the name is not registered.
    pub fn tell(
        &self,
        name: &str,
        msg: R::Message,
        sender: Option<&R::Handle>,
    ) -> Option<R::Handle> {
        let handle = self.lookup(name, "tell")?;
        self.runtime.tell(&handle, msg, sender);
        self.record_messages("tell", 1);
        Some(handle)
    }

    /// Enqueue `msg` for the actor under `name`, keeping the sender of the
    /// message `ctx` is processing.
    pub fn forward(&self, name: &str, msg: R::Message, ctx: &R::Context) -> Option<R::Handle> {
        let handle = self.lookup(name, "forward")?;
        self.runtime.forward(&handle, msg, ctx);
        self.record_messages("forward", 1);
        Some(handle)
    }

    /// Subscribe the actor owning `ctx` to termination of the actor under
    /// `name`.
    pub fn watch(&self, name: &str, ctx: &R::Context) -> Option<R::Handle> {
        let handle = self.lookup(name, "watch")?;
        self.runtime.watch(ctx, &handle);
        Some(handle)
    }

    pub fn unwatch(&self, name: &str, ctx: &R::Context) -> Option<R::Handle> {
        let handle = self.lookup(name, "unwatch")?;
        self.runtime.unwatch(ctx, &handle);
        Some(handle)
    }

    /// Send `msg` to every actor registered when the call starts. Returns
    /// the number of delivery attempts.
    pub fn broadcast(&self, msg: R::Message, sender: Option<&R::Handle>) -> usize {
        let handles = self.handles();
        for handle in &handles {
            self.runtime.tell(handle, msg.clone(), sender);
        }
        self.record_messages("broadcast", handles.len());

        tracing::debug!(
            runtime = %self.runtime.name(),
            recipients = handles.len(),
            message = ?msg,
            "Broadcast sent"
        );
        handles.len()
    }

    // ========================================================================
    // Lookup & enumeration
    // ========================================================================

    pub fn get(&self, name: &str) -> Option<R::Handle> {
        let handle = self.actors.get(name).map(|entry| entry.value().clone());
        if handle.is_none() {
            tracing::debug!(runtime = %self.runtime.name(), actor = %name, "Actor not registered");
        }
        handle
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.actors.contains_key(name)
    }

    pub fn contains_handle(&self, handle: &R::Handle) -> bool {
        self.actors.iter().any(|entry| entry.value() == handle)
    }

    pub fn names(&self) -> Vec<String> {
        self.actors.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn handles(&self) -> Vec<R::Handle> {
        self.actors.iter().map(|entry| entry.value().clone()).collect()
    }

    pub fn entries(&self) -> Vec<(String, R::Handle)> {
        self.actors
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Call `f` for each entry of a snapshot. `f` may use the registry.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&str, &R::Handle),
    {
        for (name, handle) in self.entries() {
            f(&name, &handle);
        }
    }

    /// `Degraded` while registered handles point at stopped actors.
    pub fn health(&self) -> HealthStatus {
        let mut dead: Vec<String> = self
            .entries()
            .into_iter()
            .filter(|(_, handle)| !self.runtime.is_alive(handle))
            .map(|(name, _)| name)
            .collect();

        if dead.is_empty() {
            HealthStatus::Healthy
        } else {
            dead.sort();
            HealthStatus::Degraded(format!("stopped actors still registered: {}", dead.join(", ")))
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn lookup(&self, name: &str, operation: &'static str) -> Option<R::Handle> {
        let handle = self.actors.get(name).map(|entry| entry.value().clone());
        if handle.is_none() {
            self.report_missing(operation, name);
        }
        handle
    }

    fn report_missing(&self, operation: &'static str, name: &str) {
        tracing::warn!(
            runtime = %self.runtime.name(),
            actor = %name,
            operation,
            "No actor registered under name"
        );
        if let Some(metrics) = &self.metrics {
            metrics.record_missing(operation);
        }
    }

    fn stop_handle(&self, handle: &R::Handle, reason: StopReason) {
        match self.runtime.stop(handle) {
            Ok(()) => {
                if let Some(metrics) = &self.metrics {
                    metrics.record_stopped(reason);
                }
            }
            Err(error) => tracing::debug!(
                runtime = %self.runtime.name(),
                handle = ?handle,
                %reason,
                %error,
                "Stop request not delivered"
            ),
        }
    }

    fn record_messages(&self, kind: &str, count: usize) {
        if let Some(metrics) = &self.metrics {
            metrics.record_messages(kind, count);
        }
    }

    // Never call while holding an entry guard: `len` locks every shard.
    fn update_gauge(&self) {
        if let Some(metrics) = &self.metrics {
            metrics.set_actor_count(self.actors.len());
        }
    }
}

impl<R: ActorRuntime> HealthCheckable for ActorRegistry<R> {
    fn check_health(&self) -> ComponentHealth {
        ComponentHealth::new(COMPONENT_NAME, self.health())
            .with_details(format!("{} actors registered", self.len()))
    }

    fn component_name(&self) -> &str {
        COMPONENT_NAME
    }
}
