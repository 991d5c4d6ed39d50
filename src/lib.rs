// ============================================================================
// actor_registry
// ============================================================================
//
// Named actor registry and dependency-aware actor factory on top of actix.
//
// Structure:
// - actors/     - Behaviour trait, recipes, handles, the actix host actor
// - runtime/    - Runtime contract and its actix implementation
// - registry    - Concurrent name -> handle registry
// - injection/  - Dependency resolver, binding plans, injected factory
// - bootstrap   - Runtime + registry wiring from configuration
// - metrics/    - Prometheus metrics and scrape endpoint
//
// ============================================================================

pub mod actors;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod injection;
pub mod metrics;
pub mod models;
pub mod registry;
pub mod runtime;

#[cfg(test)]
pub(crate) mod testing;

pub use actors::{ActorContext, ActorHandle, ManagedActor, Recipe, RegistryJanitor};
pub use bootstrap::Bootstrapped;
pub use config::RuntimeConfig;
pub use error::{ConstructionError, RegistryError, RuntimeError};
pub use injection::{DependencyResolver, Injectable, InjectedActorFactory, ServiceContainer};
pub use registry::ActorRegistry;
pub use runtime::{ActixRuntime, ActorRuntime};
