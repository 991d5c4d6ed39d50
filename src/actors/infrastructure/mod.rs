// ============================================================================
// Infrastructure Actors
// ============================================================================
//
// The actix side of the runtime:
// - Host actor wrapping each managed behaviour
// - Handles and per-callback contexts exposed to user code
// - Registry janitor cleaning up actors that stop on their own
//
// ============================================================================

// Private module declarations
mod context;
mod handle;
pub(crate) mod host;
mod janitor;

// Re-export for public API
pub use context::ActorContext;
pub use handle::ActorHandle;
pub use janitor::RegistryJanitor;
