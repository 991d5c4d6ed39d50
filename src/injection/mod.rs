// ============================================================================
// Dependency Injection
// ============================================================================
//
// Field-level injection for actors: a resolver contract, per-type binding
// plans, and the factory that turns both into actor recipes.
//
// ============================================================================

pub mod bindings;
pub mod factory;
pub mod resolver;

pub use bindings::{BindingCache, Bindings, Injectable};
pub use factory::InjectedActorFactory;
pub use resolver::{resolve_typed, Capability, Dependency, DependencyResolver, ServiceContainer};
