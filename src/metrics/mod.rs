// Private module declaration
mod server;

use prometheus::{IntCounter, IntCounterVec, IntGauge, Opts, Registry};

use crate::actors::core::StopReason;

// Re-export for public API
pub use server::start_metrics_server;

// ============================================================================
// Metrics Module - Prometheus metrics for the actor registry
// ============================================================================
//
// Provides metrics for:
// - Registered actor count
// - Actors created and stopped (by reason)
// - Messages routed through the registry (tell, forward, broadcast)
// - Operations on unregistered names
// - Actor construction failures
//
// All metrics are registered with Prometheus and can be scraped via /metrics
// ============================================================================

/// Registry and runtime metrics
pub struct RegistryMetrics {
    registry: Registry,

    pub actors: IntGauge,
    pub actors_created: IntCounter,
    pub actors_stopped: IntCounterVec,
    pub messages: IntCounterVec,
    pub missing: IntCounterVec,
    pub construction_failures: IntCounter,
}

impl RegistryMetrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let actors = IntGauge::new("registry_actors", "Actors currently registered by name")?;
        registry.register(Box::new(actors.clone()))?;

        let actors_created = IntCounter::new(
            "registry_actors_created_total",
            "Total actors created through the registry",
        )?;
        registry.register(Box::new(actors_created.clone()))?;

        let actors_stopped = IntCounterVec::new(
            Opts::new("registry_actors_stopped_total", "Total stop requests issued by the registry"),
            &["reason"],
        )?;
        registry.register(Box::new(actors_stopped.clone()))?;

        let messages = IntCounterVec::new(
            Opts::new("registry_messages_total", "Total messages enqueued through the registry"),
            &["kind"],
        )?;
        registry.register(Box::new(messages.clone()))?;

        let missing = IntCounterVec::new(
            Opts::new("registry_missing_total", "Operations on names that are not registered"),
            &["operation"],
        )?;
        registry.register(Box::new(missing.clone()))?;

        let construction_failures = IntCounter::new(
            "registry_construction_failures_total",
            "Total actors whose construction failed",
        )?;
        registry.register(Box::new(construction_failures.clone()))?;

        Ok(Self {
            registry,
            actors,
            actors_created,
            actors_stopped,
            messages,
            missing,
            construction_failures,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn set_actor_count(&self, count: usize) {
        self.actors.set(count as i64);
    }

    pub fn record_created(&self) {
        self.actors_created.inc();
    }

    pub fn record_stopped(&self, reason: StopReason) {
        self.actors_stopped.with_label_values(&[reason.as_str()]).inc();
    }

    /// Helper to record `count` messages of one kind
    pub fn record_messages(&self, kind: &str, count: usize) {
        self.messages.with_label_values(&[kind]).inc_by(count as u64);
    }

    pub fn record_missing(&self, operation: &str) {
        self.missing.with_label_values(&[operation]).inc();
    }

    pub fn record_construction_failure(&self) {
        self.construction_failures.inc();
    }

    pub fn construction_failures(&self) -> u64 {
        self.construction_failures.get()
    }
}
