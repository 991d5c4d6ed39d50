// ============================================================================
// Error Types
// ============================================================================
//
// NotFound is never an error here: lookups on unknown names return `None`
// and leave a warning in the log. The enums below cover the failures that
// callers actually have to act on.
//
// ============================================================================

/// Failures reported by the actor runtime adapter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuntimeError {
    #[error("Actor name is already taken by a live actor: {0}")]
    NameTaken(String),

    #[error("Actor is no longer running: {0}")]
    ActorGone(String),

    #[error("Actor runtime is not running")]
    NotRunning,
}

/// Failures reported by registry mutation operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Invalid actor name: {0:?}")]
    InvalidName(String),

    #[error("Failed to spawn actor [{name}]: {source}")]
    Spawn {
        name: String,
        #[source]
        source: RuntimeError,
    },
}

/// Failures while constructing an actor instance from its recipe.
///
/// These are fatal to the single actor being created: it never processes
/// a message, and the failure is published on the runtime's creation
/// failure channel.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConstructionError {
    #[error("No dependency available for field [{field}] of type {capability}")]
    Unresolved {
        field: &'static str,
        capability: &'static str,
    },

    #[error("Constructor of actor {actor_type} failed: {reason}")]
    Constructor {
        actor_type: &'static str,
        reason: String,
    },

    #[error("Constructor of actor {actor_type} panicked: {reason}")]
    Panicked {
        actor_type: &'static str,
        reason: String,
    },
}

/// Failures while loading the runtime configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RegistryError>;
