use actix::Addr;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use super::host::{Deliver, HostActor, Stop};
use crate::actors::core::Payload;
use crate::models::ActorId;

// ============================================================================
// Actor Handle
// ============================================================================
//
// Opaque reference to one hosted actor. Equality is identity: a handle
// equals another only if both point at the same actor instance, even when
// a replacement was later registered under the same name.
//
// ============================================================================

pub struct ActorHandle<M: Payload> {
    id: ActorId,
    name: Arc<str>,
    addr: Addr<HostActor<M>>,
}

impl<M: Payload> ActorHandle<M> {
    pub(crate) fn new(id: ActorId, name: Arc<str>, addr: Addr<HostActor<M>>) -> Self {
        Self { id, name, addr }
    }

    pub fn id(&self) -> ActorId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// True while the hosted actor still accepts messages.
    pub fn is_alive(&self) -> bool {
        self.addr.connected()
    }

    /// Enqueue a message. Deliveries to a dead actor are dropped silently.
    pub fn tell(&self, msg: M, sender: Option<&ActorHandle<M>>) {
        self.addr.do_send(Deliver {
            payload: msg,
            sender: sender.cloned(),
        });
    }

    pub(crate) fn stop(&self) {
        self.addr.do_send(Stop);
    }

    pub(crate) fn addr(&self) -> &Addr<HostActor<M>> {
        &self.addr
    }
}

impl<M: Payload> Clone for ActorHandle<M> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            name: Arc::clone(&self.name),
            addr: self.addr.clone(),
        }
    }
}

impl<M: Payload> PartialEq for ActorHandle<M> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<M: Payload> Eq for ActorHandle<M> {}

impl<M: Payload> Hash for ActorHandle<M> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<M: Payload> fmt::Debug for ActorHandle<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorHandle")
            .field("name", &self.name)
            .field("id", &self.id)
            .finish()
    }
}

impl<M: Payload> fmt::Display for ActorHandle<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.id)
    }
}
