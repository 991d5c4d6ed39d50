use std::collections::HashSet;
use std::sync::Weak;

use super::context::ActorContext;
use super::handle::ActorHandle;
use crate::actors::core::{ManagedActor, Payload};
use crate::models::ActorId;
use crate::registry::ActorRegistry;
use crate::runtime::ActixRuntime;

// ============================================================================
// Registry Janitor - Unregisters actors that stop on their own
// ============================================================================
//
// Responsibilities:
// - Watches every actor registered when it starts or receives a message
// - Calls `forget` on the registry for each actor that terminates
//
// Any message triggers a re-sync with the registry, so callers can
// broadcast after registering new actors to bring them under watch.
//
// ============================================================================

pub struct RegistryJanitor<M: Payload> {
    registry: Weak<ActorRegistry<ActixRuntime<M>>>,
    watched: HashSet<ActorId>,
}

impl<M: Payload> RegistryJanitor<M> {
    /// Holds the registry weakly so a registered janitor does not keep it
    /// alive.
    pub fn new(registry: Weak<ActorRegistry<ActixRuntime<M>>>) -> Self {
        Self {
            registry,
            watched: HashSet::new(),
        }
    }

    fn sync(&mut self, ctx: &ActorContext<M>) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };

        let mut added = 0;
        for (_, handle) in registry.entries() {
            if handle == *ctx.myself() || !self.watched.insert(handle.id()) {
                continue;
            }
            ctx.watch(&handle);
            added += 1;
        }

        if added > 0 {
            tracing::debug!(
                janitor = %ctx.myself(),
                added,
                watched = self.watched.len(),
                "Janitor watching new actors"
            );
        }
    }
}

impl<M: Payload> ManagedActor<M> for RegistryJanitor<M> {
    fn handle(&mut self, _msg: M, ctx: &mut ActorContext<M>) {
        self.sync(ctx);
    }

    fn started(&mut self, ctx: &mut ActorContext<M>) {
        self.sync(ctx);
    }

    fn terminated(&mut self, actor: &ActorHandle<M>, _ctx: &mut ActorContext<M>) {
        self.watched.remove(&actor.id());
        let Some(registry) = self.registry.upgrade() else {
            return;
        };

        let removed = registry.forget(actor);
        if removed > 0 {
            tracing::info!(actor = %actor, removed, "Terminated actor unregistered");
        }
    }
}
