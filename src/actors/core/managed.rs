use std::fmt;

use crate::actors::infrastructure::{ActorContext, ActorHandle};

// ============================================================================
// Managed Actor Trait
// ============================================================================
//
// The behaviour side of a registered actor. The runtime hosts every
// behaviour inside its own actix actor, so user code never implements
// `actix::Actor` directly; it only reacts to messages and lifecycle hooks.
//
// ============================================================================

/// Bound shared by every message type a registry can carry.
///
/// `Clone` is required by broadcast, `Debug` by delivery logging.
pub trait Payload: Clone + fmt::Debug + Send + 'static {}

impl<T> Payload for T where T: Clone + fmt::Debug + Send + 'static {}

/// Behaviour of an actor hosted by the runtime.
///
/// All hooks run on the actor's arbiter thread, one at a time.
pub trait ManagedActor<M: Payload>: Send + 'static {
    /// Handle one message. `ctx.sender()` is the sender attached by
    /// `tell`, or the original sender when the message was forwarded.
    fn handle(&mut self, msg: M, ctx: &mut ActorContext<M>);

    /// Called once before the first message is handled.
    fn started(&mut self, _ctx: &mut ActorContext<M>) {
        // Default: do nothing
    }

    /// Called after the actor stopped processing messages.
    fn stopped(&mut self, _ctx: &mut ActorContext<M>) {
        // Default: do nothing
    }

    /// Called when an actor this one watches has terminated.
    fn terminated(&mut self, _actor: &ActorHandle<M>, _ctx: &mut ActorContext<M>) {
        // Default: do nothing
    }
}

/// Why the registry asked the runtime to stop a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Another actor took over the name.
    Replaced,
    /// Explicit `remove(name)`.
    Removed,
    /// `forget(handle)` cleanup.
    Forgotten,
    /// Teardown via `clear()`.
    Cleared,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            StopReason::Replaced => "replaced",
            StopReason::Removed => "removed",
            StopReason::Forgotten => "forgotten",
            StopReason::Cleared => "cleared",
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
