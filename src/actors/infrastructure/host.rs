use actix::prelude::*;
use actix::ActorContext as _;
use std::sync::Arc;

use super::context::ActorContext;
use super::handle::ActorHandle;
use crate::actors::core::{ManagedActor, Payload, Recipe};
use crate::models::{ActorId, CreationFailure};
use crate::runtime::actix_runtime::RuntimeShared;

// ============================================================================
// Host Actor - actix actor wrapping one managed behaviour
// ============================================================================
//
// Responsibilities:
// - Runs the recipe on its arbiter thread before any message is handled
// - Drops into a stopped state when construction fails
// - Delivers user messages together with their sender
// - Keeps the death-watch list and notifies watchers on stop
// - Releases its runtime-level name reservation when it stops
//
// ============================================================================

pub(crate) struct HostActor<M: Payload> {
    myself: ActorHandle<M>,
    actor_type: &'static str,
    behavior: Option<Box<dyn ManagedActor<M>>>,
    watchers: Vec<ActorHandle<M>>,
    shared: Arc<RuntimeShared>,
}

impl<M: Payload> HostActor<M> {
    pub(crate) fn new(myself: ActorHandle<M>, recipe: Recipe<M>, shared: Arc<RuntimeShared>) -> Self {
        let actor_type = recipe.actor_type();
        let behavior = match recipe.build() {
            Ok(behavior) => Some(behavior),
            Err(error) => {
                shared.report_failure(CreationFailure::new(
                    myself.name(),
                    myself.id(),
                    actor_type,
                    &error,
                ));
                None
            }
        };

        Self {
            myself,
            actor_type,
            behavior,
            watchers: Vec::new(),
            shared,
        }
    }

    fn run_hook<F>(&mut self, ctx: &mut Context<Self>, sender: Option<ActorHandle<M>>, hook: F)
    where
        F: FnOnce(&mut dyn ManagedActor<M>, &mut ActorContext<M>),
    {
        let Some(behavior) = self.behavior.as_mut() else {
            return;
        };
        let mut actor_ctx = ActorContext::new(self.myself.clone(), sender);
        hook(&mut **behavior, &mut actor_ctx);
        if actor_ctx.stop_requested() {
            ctx.stop();
        }
    }
}

impl<M: Payload> Actor for HostActor<M> {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        if self.behavior.is_none() {
            ctx.stop();
            return;
        }

        tracing::debug!(
            actor = %self.myself.name(),
            id = %self.myself.id(),
            actor_type = self.actor_type,
            "Actor started"
        );
        self.run_hook(ctx, None, |behavior, actor_ctx| behavior.started(actor_ctx));
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        if let Some(behavior) = self.behavior.as_mut() {
            let mut actor_ctx = ActorContext::new(self.myself.clone(), None);
            behavior.stopped(&mut actor_ctx);
        }

        self.shared.release_name(self.myself.name(), self.myself.id());

        for watcher in self.watchers.drain(..) {
            watcher.addr().do_send(Terminated {
                actor: self.myself.clone(),
            });
        }

        tracing::info!(
            actor = %self.myself.name(),
            id = %self.myself.id(),
            "Actor stopped"
        );
    }
}

// ============================================================================
// Messages
// ============================================================================

/// User payload plus the sender it was sent (or forwarded) with.
pub(crate) struct Deliver<M: Payload> {
    pub payload: M,
    pub sender: Option<ActorHandle<M>>,
}

impl<M: Payload> Message for Deliver<M> {
    type Result = ();
}

/// Message to stop the hosted actor
#[derive(Message)]
#[rtype(result = "()")]
pub(crate) struct Stop;

/// Subscribe `watcher` to this actor's termination.
pub(crate) struct Watch<M: Payload> {
    pub watcher: ActorHandle<M>,
}

impl<M: Payload> Message for Watch<M> {
    type Result = ();
}

#[derive(Message)]
#[rtype(result = "()")]
pub(crate) struct Unwatch {
    pub watcher: ActorId,
}

/// Sent to a watcher once the watched actor has stopped.
pub(crate) struct Terminated<M: Payload> {
    pub actor: ActorHandle<M>,
}

impl<M: Payload> Message for Terminated<M> {
    type Result = ();
}

// ============================================================================
// Handlers
// ============================================================================

impl<M: Payload> Handler<Deliver<M>> for HostActor<M> {
    type Result = ();

    fn handle(&mut self, msg: Deliver<M>, ctx: &mut Self::Context) {
        if self.behavior.is_none() {
            tracing::debug!(actor = %self.myself.name(), "Dropping message for failed actor");
            return;
        }

        let Deliver { payload, sender } = msg;
        self.run_hook(ctx, sender, move |behavior, actor_ctx| behavior.handle(payload, actor_ctx));
    }
}

impl<M: Payload> Handler<Stop> for HostActor<M> {
    type Result = ();

    fn handle(&mut self, _: Stop, ctx: &mut Self::Context) {
        tracing::debug!(actor = %self.myself.name(), "Actor received stop signal");
        ctx.stop();
    }
}

impl<M: Payload> Handler<Watch<M>> for HostActor<M> {
    type Result = ();

    fn handle(&mut self, msg: Watch<M>, _: &mut Self::Context) {
        if msg.watcher == self.myself || self.watchers.contains(&msg.watcher) {
            return;
        }
        tracing::debug!(
            actor = %self.myself.name(),
            watcher = %msg.watcher.name(),
            "Watcher registered"
        );
        self.watchers.push(msg.watcher);
    }
}

impl<M: Payload> Handler<Unwatch> for HostActor<M> {
    type Result = ();

    fn handle(&mut self, msg: Unwatch, _: &mut Self::Context) {
        self.watchers.retain(|watcher| watcher.id() != msg.watcher);
    }
}

impl<M: Payload> Handler<Terminated<M>> for HostActor<M> {
    type Result = ();

    fn handle(&mut self, msg: Terminated<M>, ctx: &mut Self::Context) {
        let actor = msg.actor;
        tracing::debug!(
            actor = %self.myself.name(),
            terminated = %actor,
            "Watched actor terminated"
        );
        self.run_hook(ctx, None, move |behavior, actor_ctx| behavior.terminated(&actor, actor_ctx));
    }
}
