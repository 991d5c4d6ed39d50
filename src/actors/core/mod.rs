// ============================================================================
// Core Actor Abstractions
// ============================================================================
//
// Runtime-agnostic actor traits and types: the behaviour trait, deferred
// construction recipes, and health reporting.
//
// ============================================================================

pub mod health;
pub mod managed;
pub mod recipe;

// Re-export core types
pub use health::*;
pub use managed::*;
pub use recipe::Recipe;
