use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use std::fmt;

use crate::error::RegistryError;

// ============================================================================
// Shared Models
// ============================================================================

/// Identity of one running actor instance.
///
/// Two handles denote the same actor iff their ids are equal; a replacement
/// under the same name always gets a fresh id.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ActorId(Uuid);

impl ActorId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ActorId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validate a registry key. Names must be non-empty and free of
/// surrounding whitespace.
pub fn validate_name(name: &str) -> Result<(), RegistryError> {
    if name.is_empty() || name.trim() != name {
        return Err(RegistryError::InvalidName(name.to_string()));
    }
    Ok(())
}

// ============================================================================
// Runtime Events
// ============================================================================

/// Published by the runtime when a recipe fails to produce an actor.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CreationFailure {
    pub name: String,
    pub actor_id: ActorId,
    pub actor_type: String,
    pub error: String,
    pub failed_at: DateTime<Utc>,
}

impl CreationFailure {
    pub fn new(
        name: impl Into<String>,
        actor_id: ActorId,
        actor_type: impl Into<String>,
        error: impl fmt::Display,
    ) -> Self {
        Self {
            name: name.into(),
            actor_id,
            actor_type: actor_type.into(),
            error: error.to_string(),
            failed_at: Utc::now(),
        }
    }
}
