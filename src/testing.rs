use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use crate::actors::core::{ManagedActor, Recipe};
use crate::actors::infrastructure::{ActorContext, ActorHandle};
use crate::error::RuntimeError;
use crate::runtime::ActorRuntime;

// ============================================================================
// Test Support
// ============================================================================
//
// `RecordingRuntime` is a synchronous in-memory runtime that records every
// call the registry makes. `Probe` and friends are behaviours for tests
// that run on the real actix runtime.
//
// ============================================================================

const EVENT_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct TestHandle(pub u64);

/// Context handed to `forward`/`watch` on the recording runtime.
#[derive(Debug, Clone)]
pub(crate) struct TestContext {
    pub myself: TestHandle,
    pub sender: Option<TestHandle>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RuntimeCall {
    Create { name: String, handle: TestHandle, constructed: bool },
    Stop(TestHandle),
    Tell { to: TestHandle, msg: String, sender: Option<TestHandle> },
    Forward { to: TestHandle, msg: String, sender: Option<TestHandle> },
    Watch { watcher: TestHandle, target: TestHandle },
    Unwatch { watcher: TestHandle, target: TestHandle },
}

#[derive(Default)]
pub(crate) struct RecordingRuntime {
    next_id: AtomicU64,
    names: Mutex<HashMap<String, TestHandle>>,
    stopped: Mutex<HashSet<TestHandle>>,
    rejected: Mutex<HashSet<String>>,
    calls: Mutex<Vec<RuntimeCall>>,
}

impl RecordingRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later `create` for `name` fail with `NameTaken`.
    pub fn reject(&self, name: &str) {
        self.rejected.lock().insert(name.to_string());
    }

    /// Simulate an actor dying on its own, without a stop request.
    pub fn kill(&self, handle: TestHandle) {
        self.stopped.lock().insert(handle);
        self.names.lock().retain(|_, owner| *owner != handle);
    }

    pub fn calls(&self) -> Vec<RuntimeCall> {
        self.calls.lock().clone()
    }

    pub fn stops_of(&self, handle: TestHandle) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| **call == RuntimeCall::Stop(handle))
            .count()
    }

    pub fn stop_count(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| matches!(call, RuntimeCall::Stop(_)))
            .count()
    }

    pub fn created(&self) -> Vec<TestHandle> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                RuntimeCall::Create { handle, .. } => Some(*handle),
                _ => None,
            })
            .collect()
    }

    /// Messages delivered to `handle` through `tell`.
    pub fn told(&self, handle: TestHandle) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                RuntimeCall::Tell { to, msg, .. } if *to == handle => Some(msg.clone()),
                _ => None,
            })
            .collect()
    }
}

impl ActorRuntime for RecordingRuntime {
    type Message = String;
    type Handle = TestHandle;
    type Context = TestContext;

    fn name(&self) -> &str {
        "recording"
    }

    fn create(&self, recipe: Recipe<String>, name: &str) -> Result<TestHandle, RuntimeError> {
        if self.rejected.lock().contains(name) {
            return Err(RuntimeError::NameTaken(name.to_string()));
        }
        let handle = {
            let mut names = self.names.lock();
            if names.contains_key(name) {
                return Err(RuntimeError::NameTaken(name.to_string()));
            }
            let handle = TestHandle(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
            names.insert(name.to_string(), handle);
            handle
        };

        let constructed = recipe.build().is_ok();
        if !constructed {
            self.kill(handle);
        }
        self.calls.lock().push(RuntimeCall::Create {
            name: name.to_string(),
            handle,
            constructed,
        });
        Ok(handle)
    }

    fn stop(&self, handle: &TestHandle) -> Result<(), RuntimeError> {
        self.calls.lock().push(RuntimeCall::Stop(*handle));
        self.names.lock().retain(|_, owner| owner != handle);
        if !self.stopped.lock().insert(*handle) {
            return Err(RuntimeError::ActorGone(format!("{:?}", handle)));
        }
        Ok(())
    }

    fn is_alive(&self, handle: &TestHandle) -> bool {
        handle.0 <= self.next_id.load(Ordering::SeqCst) && !self.stopped.lock().contains(handle)
    }

    fn tell(&self, handle: &TestHandle, msg: String, sender: Option<&TestHandle>) {
        self.calls.lock().push(RuntimeCall::Tell {
            to: *handle,
            msg,
            sender: sender.copied(),
        });
    }

    fn forward(&self, handle: &TestHandle, msg: String, ctx: &TestContext) {
        self.calls.lock().push(RuntimeCall::Forward {
            to: *handle,
            msg,
            sender: ctx.sender,
        });
    }

    fn watch(&self, ctx: &TestContext, handle: &TestHandle) {
        self.calls.lock().push(RuntimeCall::Watch {
            watcher: ctx.myself,
            target: *handle,
        });
    }

    fn unwatch(&self, ctx: &TestContext, handle: &TestHandle) {
        self.calls.lock().push(RuntimeCall::Unwatch {
            watcher: ctx.myself,
            target: *handle,
        });
    }
}

// ============================================================================
// Behaviours for actix-backed tests
// ============================================================================

/// Does nothing with its messages.
#[derive(Default)]
pub(crate) struct Idle;

impl ManagedActor<String> for Idle {
    fn handle(&mut self, _msg: String, _ctx: &mut ActorContext<String>) {}
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ProbeEvent {
    Started(String),
    Received {
        actor: String,
        msg: String,
        sender: Option<String>,
    },
    Terminated {
        actor: String,
        watched: String,
    },
    Stopped(String),
}

/// Reports everything that happens to it on a channel. A `"stop"` message
/// stops it.
pub(crate) struct Probe {
    events: UnboundedSender<ProbeEvent>,
    watch: Vec<ActorHandle<String>>,
}

impl Probe {
    pub fn new(events: UnboundedSender<ProbeEvent>) -> Self {
        Self::watching(events, Vec::new())
    }

    /// Watch `targets` as soon as the probe starts.
    pub fn watching(events: UnboundedSender<ProbeEvent>, targets: Vec<ActorHandle<String>>) -> Self {
        Self {
            events,
            watch: targets,
        }
    }

    fn emit(&self, event: ProbeEvent) {
        let _ = self.events.send(event);
    }
}

impl ManagedActor<String> for Probe {
    fn handle(&mut self, msg: String, ctx: &mut ActorContext<String>) {
        let stop = msg == "stop";
        self.emit(ProbeEvent::Received {
            actor: ctx.myself().name().to_string(),
            msg,
            sender: ctx.sender().map(|sender| sender.name().to_string()),
        });
        if stop {
            ctx.stop();
        }
    }

    fn started(&mut self, ctx: &mut ActorContext<String>) {
        for target in &self.watch {
            ctx.watch(target);
        }
        self.emit(ProbeEvent::Started(ctx.myself().name().to_string()));
    }

    fn stopped(&mut self, ctx: &mut ActorContext<String>) {
        self.emit(ProbeEvent::Stopped(ctx.myself().name().to_string()));
    }

    fn terminated(&mut self, actor: &ActorHandle<String>, ctx: &mut ActorContext<String>) {
        self.emit(ProbeEvent::Terminated {
            actor: ctx.myself().name().to_string(),
            watched: actor.name().to_string(),
        });
    }
}

pub(crate) async fn next_event(rx: &mut UnboundedReceiver<ProbeEvent>) -> ProbeEvent {
    tokio::time::timeout(EVENT_TIMEOUT, rx.recv())
        .await
        .expect("timed out waiting for probe event")
        .expect("probe channel closed")
}

/// Skip events until one matches `predicate`.
pub(crate) async fn wait_for<F>(rx: &mut UnboundedReceiver<ProbeEvent>, predicate: F) -> ProbeEvent
where
    F: Fn(&ProbeEvent) -> bool,
{
    loop {
        let event = next_event(rx).await;
        if predicate(&event) {
            return event;
        }
    }
}

/// Collect every event that arrives within `window`.
pub(crate) async fn drain_events(
    rx: &mut UnboundedReceiver<ProbeEvent>,
    window: Duration,
) -> Vec<ProbeEvent> {
    let mut events = Vec::new();
    while let Ok(Some(event)) = tokio::time::timeout(window, rx.recv()).await {
        events.push(event);
    }
    events
}

pub(crate) async fn wait_until_dead(handle: &ActorHandle<String>) {
    let deadline = tokio::time::Instant::now() + EVENT_TIMEOUT;
    while handle.is_alive() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "actor {} still alive",
            handle
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
