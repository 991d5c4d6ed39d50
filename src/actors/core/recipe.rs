use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use super::managed::{ManagedActor, Payload};
use crate::error::ConstructionError;

// ============================================================================
// Actor Recipe
// ============================================================================
//
// A deferred construction closure. The runtime consumes it exactly once,
// on the arbiter thread that will host the actor, before the actor can
// receive its first message.
//
// ============================================================================

type Construct<M> =
    Box<dyn FnOnce() -> Result<Box<dyn ManagedActor<M>>, ConstructionError> + Send>;

pub struct Recipe<M: Payload> {
    actor_type: &'static str,
    construct: Construct<M>,
}

impl<M: Payload> Recipe<M> {
    /// Construct via `Default`.
    pub fn of<A>() -> Self
    where
        A: ManagedActor<M> + Default,
    {
        Self::from_fn(A::default)
    }

    /// Construct via a caller-supplied constructor.
    pub fn from_fn<A, F>(constructor: F) -> Self
    where
        A: ManagedActor<M>,
        F: FnOnce() -> A + Send + 'static,
    {
        Self::try_from_fn(move || Ok(constructor()))
    }

    /// Construct via a fallible constructor. An `Err` is fatal to the actor.
    pub fn try_from_fn<A, F>(constructor: F) -> Self
    where
        A: ManagedActor<M>,
        F: FnOnce() -> Result<A, ConstructionError> + Send + 'static,
    {
        Self {
            actor_type: std::any::type_name::<A>(),
            construct: Box::new(move || {
                constructor().map(|actor| Box::new(actor) as Box<dyn ManagedActor<M>>)
            }),
        }
    }

    /// Type name of the actor this recipe produces.
    pub fn actor_type(&self) -> &'static str {
        self.actor_type
    }

    /// Run the construction closure. A panicking constructor is reported as
    /// `ConstructionError::Panicked` instead of unwinding into the runtime.
    pub fn build(self) -> Result<Box<dyn ManagedActor<M>>, ConstructionError> {
        let actor_type = self.actor_type;
        match panic::catch_unwind(AssertUnwindSafe(self.construct)) {
            Ok(result) => result,
            Err(payload) => Err(ConstructionError::Panicked {
                actor_type,
                reason: panic_reason(payload.as_ref()),
            }),
        }
    }
}

impl<M: Payload> fmt::Debug for Recipe<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recipe")
            .field("actor_type", &self.actor_type)
            .finish_non_exhaustive()
    }
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(reason) = payload.downcast_ref::<&str>() {
        (*reason).to_string()
    } else if let Some(reason) = payload.downcast_ref::<String>() {
        reason.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actors::infrastructure::ActorContext;

    #[derive(Default)]
    struct Noop;

    impl ManagedActor<String> for Noop {
        fn handle(&mut self, _msg: String, _ctx: &mut ActorContext<String>) {}
    }

    #[test]
    fn test_default_recipe_builds() {
        let recipe = Recipe::<String>::of::<Noop>();
        assert!(recipe.actor_type().ends_with("Noop"));
        assert!(recipe.build().is_ok());
    }

    #[test]
    fn test_constructor_error_is_returned() {
        let recipe = Recipe::<String>::try_from_fn(|| -> Result<Noop, _> {
            Err(ConstructionError::Constructor {
                actor_type: "Noop",
                reason: "no config".to_string(),
            })
        });
        let err = recipe.build().err().expect("constructor fails");
        assert!(matches!(err, ConstructionError::Constructor { .. }));
    }

    #[test]
    fn test_constructor_panic_is_caught() {
        let recipe = Recipe::<String>::from_fn(|| -> Noop { panic!("constructor exploded") });
        match recipe.build() {
            Err(ConstructionError::Panicked { reason, .. }) => {
                assert_eq!(reason, "constructor exploded");
            }
            _ => panic!("expected a panicked construction"),
        }
    }
}
