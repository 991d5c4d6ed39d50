use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use actor_registry::actors::HealthCheckable;
use actor_registry::bootstrap::{self, Bootstrapped};
use actor_registry::injection::Bindings;
use actor_registry::metrics;
use actor_registry::{
    ActorContext, Injectable, ManagedActor, Recipe, RegistryJanitor, RuntimeConfig,
    ServiceContainer,
};

// ============================================================================
// Demo services and actors
// ============================================================================

#[derive(Debug, Clone)]
enum DemoMessage {
    Greet(String),
    Sync,
    Shutdown,
}

/// Injected greeting text
struct Greetings {
    salutation: String,
}

/// Injected counter shared by every greeter
#[derive(Default)]
struct AuditTrail {
    greetings: AtomicU64,
}

#[derive(Default)]
struct Greeter {
    language: Option<&'static str>,
    greetings: Option<Arc<Greetings>>,
    audit: Option<Arc<AuditTrail>>,
}

impl Greeter {
    fn speaking(language: &'static str) -> Self {
        Self {
            language: Some(language),
            ..Self::default()
        }
    }
}

impl Injectable for Greeter {
    fn bindings() -> Bindings<Self> {
        Bindings::<Self>::new()
            .bind::<Greetings>("greetings", |greeter, greetings| greeter.greetings = Some(greetings))
            .bind::<AuditTrail>("audit", |greeter, audit| greeter.audit = Some(audit))
    }
}

impl ManagedActor<DemoMessage> for Greeter {
    fn handle(&mut self, msg: DemoMessage, ctx: &mut ActorContext<DemoMessage>) {
        match msg {
            DemoMessage::Greet(who) => {
                let salutation = self
                    .greetings
                    .as_ref()
                    .map(|greetings| greetings.salutation.as_str())
                    .unwrap_or("Hi");
                let total = self
                    .audit
                    .as_ref()
                    .map(|audit| audit.greetings.fetch_add(1, Ordering::SeqCst) + 1)
                    .unwrap_or_default();
                tracing::info!(
                    actor = %ctx.myself().name(),
                    language = self.language.unwrap_or("en"),
                    total,
                    "👋 {}, {}!",
                    salutation,
                    who
                );
            }
            DemoMessage::Shutdown => ctx.stop(),
            DemoMessage::Sync => {}
        }
    }
}

// ============================================================================
// Main
// ============================================================================

#[actix::main]
async fn main() -> anyhow::Result<()> {
    let config = RuntimeConfig::load()?;

    // Initialize structured logging with environment-based filtering
    // RUST_LOG wins over the configured filter
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .init();

    tracing::info!("🚀 Starting actor registry demo");

    // === 1. Dependency container ===
    let container = Arc::new(ServiceContainer::new());
    container
        .provide(Greetings {
            salutation: "Hello".to_string(),
        })
        .provide(AuditTrail::default());
    container.start();

    // === 2. Runtime + registry ===
    let system = bootstrap::start::<DemoMessage>(&config, Some(container.clone()))?;

    // === 3. Metrics server in background thread ===
    if config.metrics.enabled {
        let metrics_registry = Arc::new(system.metrics.registry().clone());
        let health: Arc<dyn HealthCheckable + Send + Sync> = system.registry.clone();
        let port = config.metrics.port;
        std::thread::spawn(move || {
            let rt = match tokio::runtime::Runtime::new() {
                Ok(rt) => rt,
                Err(e) => {
                    tracing::error!("Failed to start metrics runtime: {}", e);
                    return;
                }
            };
            rt.block_on(async {
                if let Err(e) = metrics::start_metrics_server(metrics_registry, health, port).await {
                    tracing::error!("Metrics server error: {}", e);
                }
            });
        });
    }

    // === 4. Demo, interruptible with Ctrl-C ===
    tokio::select! {
        result = run_demo(&system) => result?,
        _ = tokio::signal::ctrl_c() => tracing::info!("Ctrl-C received, shutting down"),
    }

    let stopped = system.shutdown();
    container.shutdown();
    tracing::info!(stopped, "🎉 Demo complete!");
    Ok(())
}

async fn run_demo(system: &Bootstrapped<DemoMessage>) -> anyhow::Result<()> {
    let registry = &system.registry;

    // Janitor unregisters actors that stop by themselves
    let weak = Arc::downgrade(registry);
    registry.actor_of("janitor", Recipe::from_fn(move || RegistryJanitor::new(weak)))?;

    tracing::info!("📝 Creating injected actors");
    registry.inject_of::<Greeter>("greeter-en")?;
    registry.inject_of_with("greeter-fr", || Greeter::speaking("fr"))?;
    registry.tell("janitor", DemoMessage::Sync, None);

    let recipients = registry.broadcast(DemoMessage::Greet("world".to_string()), None);
    tracing::info!(recipients, "📣 Broadcast sent");
    tokio::time::sleep(Duration::from_millis(200)).await;

    tracing::info!("🔁 Replacing greeter-en");
    registry.inject_of_with("greeter-en", || Greeter::speaking("en-GB"))?;
    registry.tell("janitor", DemoMessage::Sync, None);
    registry.tell("greeter-en", DemoMessage::Greet("again".to_string()), None);

    tracing::info!("🧹 Removing greeter-fr");
    registry.remove("greeter-fr");
    registry.remove("greeter-de");

    tracing::info!("🛑 Asking greeter-en to stop itself");
    registry.tell("greeter-en", DemoMessage::Shutdown, None);
    tokio::time::sleep(Duration::from_millis(200)).await;

    let health = registry.check_health();
    tracing::info!(
        actors = ?registry.names(),
        status = ?health.status,
        "📊 Registry state"
    );
    Ok(())
}
