// ============================================================================
// Actors Module
// ============================================================================
//
// Structure:
// - core/           - Runtime-agnostic traits and types (ManagedActor, Recipe, health)
// - infrastructure/ - actix hosting: handles, contexts, host actor, janitor
//
// ============================================================================

pub mod core;
pub mod infrastructure;

// Re-export the types most callers need
pub use self::core::{
    ComponentHealth, HealthCheckable, HealthStatus, ManagedActor, Payload, Recipe, StopReason,
};
pub use infrastructure::{ActorContext, ActorHandle, RegistryJanitor};
