use std::sync::Arc;

use super::bindings::{Bindings, Injectable};
use super::resolver::DependencyResolver;
use crate::actors::core::{ManagedActor, Payload, Recipe};
use crate::error::ConstructionError;

// ============================================================================
// Injected Actor Factory
// ============================================================================
//
// Turns an `Injectable` actor type into recipes. Each recipe constructs the
// actor (default or caller-supplied constructor) and then injects every
// binding before the runtime lets the actor see a message.
//
// Without a resolver, or while the resolver reports itself unavailable,
// actors are built with no injection at all.
//
// ============================================================================

pub struct InjectedActorFactory<B> {
    resolver: Option<Arc<dyn DependencyResolver>>,
    bindings: Arc<Bindings<B>>,
}

impl<B: Injectable> InjectedActorFactory<B> {
    pub fn new(resolver: Option<Arc<dyn DependencyResolver>>) -> Self {
        Self::with_bindings(resolver, Arc::new(B::bindings()))
    }

    /// Reuse an already built (usually cached) binding plan.
    pub fn with_bindings(
        resolver: Option<Arc<dyn DependencyResolver>>,
        bindings: Arc<Bindings<B>>,
    ) -> Self {
        Self { resolver, bindings }
    }

    pub fn bindings(&self) -> &Bindings<B> {
        &self.bindings
    }

    /// Build one instance now, on the calling thread.
    pub fn construct<F>(&self, constructor: F) -> Result<B, ConstructionError>
    where
        F: FnOnce() -> Result<B, ConstructionError>,
    {
        let mut actor = constructor()?;
        let actor_type = std::any::type_name::<B>();

        match self.resolver.as_deref().filter(|resolver| resolver.is_available()) {
            Some(resolver) => {
                let injected = self.bindings.inject(&mut actor, resolver)?;
                tracing::debug!(actor_type, injected, "Dependencies injected");
            }
            None => {
                tracing::debug!(
                    actor_type,
                    "Dependency resolver unavailable, constructing without injection"
                );
            }
        }
        Ok(actor)
    }

    /// Recipe that default-constructs `B`.
    pub fn recipe<M>(&self) -> Recipe<M>
    where
        M: Payload,
        B: ManagedActor<M> + Default,
    {
        self.recipe_with(B::default)
    }

    pub fn recipe_with<M, F>(&self, constructor: F) -> Recipe<M>
    where
        M: Payload,
        B: ManagedActor<M>,
        F: FnOnce() -> B + Send + 'static,
    {
        self.try_recipe_with(move || Ok(constructor()))
    }

    pub fn try_recipe_with<M, F>(&self, constructor: F) -> Recipe<M>
    where
        M: Payload,
        B: ManagedActor<M>,
        F: FnOnce() -> Result<B, ConstructionError> + Send + 'static,
    {
        let factory = self.clone();
        Recipe::try_from_fn(move || factory.construct(constructor))
    }
}

impl<B> Clone for InjectedActorFactory<B> {
    fn clone(&self) -> Self {
        Self {
            resolver: self.resolver.clone(),
            bindings: Arc::clone(&self.bindings),
        }
    }
}
