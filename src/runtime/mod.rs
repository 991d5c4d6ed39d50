use std::fmt;

use crate::actors::core::{Payload, Recipe};
use crate::error::RuntimeError;

pub mod actix_runtime;

pub use actix_runtime::ActixRuntime;

// ============================================================================
// Actor Runtime Contract
// ============================================================================
//
// The narrow surface the registry needs from whatever actually schedules
// actors. `ActixRuntime` is the production implementation; tests drive the
// registry through an in-memory recorder instead.
//
// ============================================================================

pub trait ActorRuntime: Send + Sync + 'static {
    /// Message type every actor of this runtime accepts.
    type Message: Payload;

    /// Opaque actor reference with identity equality.
    type Handle: Clone + PartialEq + fmt::Debug + Send + Sync + 'static;

    /// Per-callback context of the actor currently handling a message.
    type Context;

    fn name(&self) -> &str;

    /// Start a new actor from `recipe` under the runtime-level `name`.
    ///
    /// The recipe is consumed once, when the runtime instantiates the
    /// actor. Fails with `NameTaken` while another live actor holds `name`.
    fn create(
        &self,
        recipe: Recipe<Self::Message>,
        name: &str,
    ) -> Result<Self::Handle, RuntimeError>;

    /// Request the actor to stop without waiting for it. The runtime-level
    /// name is released before this returns.
    fn stop(&self, handle: &Self::Handle) -> Result<(), RuntimeError>;

    fn is_alive(&self, handle: &Self::Handle) -> bool;

    /// Enqueue `msg` for `handle`. Deliveries to dead actors are dropped.
    fn tell(&self, handle: &Self::Handle, msg: Self::Message, sender: Option<&Self::Handle>);

    /// Enqueue `msg` for `handle`, keeping the sender of the message that
    /// `ctx` is currently processing.
    fn forward(&self, handle: &Self::Handle, msg: Self::Message, ctx: &Self::Context);

    /// Subscribe the actor owning `ctx` to termination of `handle`.
    fn watch(&self, ctx: &Self::Context, handle: &Self::Handle);

    fn unwatch(&self, ctx: &Self::Context, handle: &Self::Handle);
}
