use std::sync::Arc;

use crate::actors::core::Payload;
use crate::config::{ExecutorMode, RuntimeConfig};
use crate::injection::DependencyResolver;
use crate::metrics::RegistryMetrics;
use crate::registry::ActorRegistry;
use crate::runtime::{ActixRuntime, ActorRuntime};

// ============================================================================
// Runtime Bootstrap
// ============================================================================
//
// Builds the actor runtime from configuration and binds exactly one
// registry to it. Shutdown runs in the reverse order: the registry stops
// everything it still holds, then the runtime goes away.
//
// ============================================================================

pub struct Bootstrapped<M: Payload> {
    pub runtime: Arc<ActixRuntime<M>>,
    pub registry: Arc<ActorRegistry<ActixRuntime<M>>>,
    pub metrics: Arc<RegistryMetrics>,
    pub config: RuntimeConfig,
}

/// Start the runtime described by `config`. Must run inside an actix
/// `System`.
pub fn start<M: Payload>(
    config: &RuntimeConfig,
    resolver: Option<Arc<dyn DependencyResolver>>,
) -> anyhow::Result<Bootstrapped<M>> {
    let metrics = Arc::new(RegistryMetrics::new()?);

    let runtime = match config.executor {
        ExecutorMode::Current => ActixRuntime::current(config.name.as_str()),
        ExecutorMode::Dedicated => ActixRuntime::dedicated(config.name.as_str()),
    }?;
    let runtime = Arc::new(runtime.with_metrics(metrics.clone()));

    let mut registry = match config.registry_capacity {
        Some(capacity) => ActorRegistry::with_capacity(runtime.clone(), capacity),
        None => ActorRegistry::new(runtime.clone()),
    };
    if let Some(resolver) = resolver {
        registry = registry.with_resolver(resolver);
    }
    let registry = Arc::new(registry.with_metrics(metrics.clone()));

    tracing::info!(
        runtime = %config.name,
        executor = ?config.executor,
        capacity = ?config.registry_capacity,
        injection = registry.resolver().is_some(),
        "Actor runtime started"
    );
    for (key, value) in &config.settings {
        tracing::info!(runtime = %config.name, %key, %value, "Runtime setting");
    }

    Ok(Bootstrapped {
        runtime,
        registry,
        metrics,
        config: config.clone(),
    })
}

impl<M: Payload> Bootstrapped<M> {
    /// Stop every registered actor, then the runtime. Returns the number of
    /// actors stopped.
    pub fn shutdown(&self) -> usize {
        let stopped = self.registry.clear();
        self.runtime.terminate();
        tracing::info!(runtime = %self.runtime.name(), stopped, "Actor runtime shut down");
        stopped
    }
}
