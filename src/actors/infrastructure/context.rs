use actix::prelude::SendError;

use super::handle::ActorHandle;
use super::host::{Terminated, Unwatch, Watch};
use crate::actors::core::Payload;

/// Per-callback view of the hosting runtime, handed to every
/// `ManagedActor` hook.
pub struct ActorContext<M: Payload> {
    myself: ActorHandle<M>,
    sender: Option<ActorHandle<M>>,
    stop_requested: bool,
}

impl<M: Payload> ActorContext<M> {
    pub(crate) fn new(myself: ActorHandle<M>, sender: Option<ActorHandle<M>>) -> Self {
        Self {
            myself,
            sender,
            stop_requested: false,
        }
    }

    /// Handle of the actor currently running this hook.
    pub fn myself(&self) -> &ActorHandle<M> {
        &self.myself
    }

    /// Sender of the message being handled, if any.
    pub fn sender(&self) -> Option<&ActorHandle<M>> {
        self.sender.as_ref()
    }

    /// Send `msg` to `target` with this actor as the sender.
    pub fn tell(&self, target: &ActorHandle<M>, msg: M) {
        target.tell(msg, Some(&self.myself));
    }

    /// Send `msg` back to the sender. Returns false when there is none.
    pub fn reply(&self, msg: M) -> bool {
        match &self.sender {
            Some(sender) => {
                sender.tell(msg, Some(&self.myself));
                true
            }
            None => false,
        }
    }

    /// Subscribe to termination of `target`. Watching an actor that is
    /// already dead yields an immediate termination notice.
    pub fn watch(&self, target: &ActorHandle<M>) {
        if target == &self.myself {
            return;
        }
        let watch = Watch {
            watcher: self.myself.clone(),
        };
        match target.addr().try_send(watch) {
            Ok(()) => {}
            Err(SendError::Full(watch)) => target.addr().do_send(watch),
            Err(SendError::Closed(_)) => {
                self.myself.addr().do_send(Terminated {
                    actor: target.clone(),
                });
            }
        }
    }

    pub fn unwatch(&self, target: &ActorHandle<M>) {
        target.addr().do_send(Unwatch {
            watcher: self.myself.id(),
        });
    }

    /// Stop this actor once the current hook returns.
    pub fn stop(&mut self) {
        self.stop_requested = true;
    }

    pub(crate) fn stop_requested(&self) -> bool {
        self.stop_requested
    }
}
