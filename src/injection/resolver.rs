use dashmap::DashMap;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// ============================================================================
// Dependency Resolver
// ============================================================================
//
// The single operation the factory needs from a dependency container:
// "give me an instance of this type, if you have one". `ServiceContainer`
// is a small in-process implementation used by the binary and tests.
//
// ============================================================================

/// Type-erased dependency instance.
pub type Dependency = Arc<dyn Any + Send + Sync>;

/// Identifier of a requested dependency type.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Capability {
    id: TypeId,
    name: &'static str,
}

impl Capability {
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Capability({})", self.name)
    }
}

pub trait DependencyResolver: Send + Sync {
    /// False while the backing container is not running. The factory then
    /// constructs actors without injection.
    fn is_available(&self) -> bool;

    /// Look up an instance of `capability`.
    fn resolve(&self, capability: &Capability) -> Option<Dependency>;
}

/// Typed lookup on top of `DependencyResolver::resolve`.
pub fn resolve_typed<T>(resolver: &dyn DependencyResolver) -> Option<Arc<T>>
where
    T: Any + Send + Sync,
{
    resolver
        .resolve(&Capability::of::<T>())
        .and_then(|dependency| dependency.downcast::<T>().ok())
}

// ============================================================================
// Service Container
// ============================================================================

/// In-process resolver keyed by type. Starts stopped.
#[derive(Default)]
pub struct ServiceContainer {
    services: DashMap<TypeId, Dependency>,
    running: AtomicBool,
}

impl ServiceContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `service`, replacing any earlier instance of the same type.
    pub fn provide<T>(&self, service: T) -> &Self
    where
        T: Any + Send + Sync,
    {
        self.provide_arc(Arc::new(service))
    }

    pub fn provide_arc<T>(&self, service: Arc<T>) -> &Self
    where
        T: Any + Send + Sync,
    {
        tracing::debug!(service = std::any::type_name::<T>(), "Service registered");
        self.services.insert(TypeId::of::<T>(), service);
        self
    }

    pub fn start(&self) {
        self.running.store(true, Ordering::SeqCst);
        tracing::info!(services = self.services.len(), "Service container started");
    }

    pub fn shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
        tracing::info!("Service container stopped");
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl DependencyResolver for ServiceContainer {
    fn is_available(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn resolve(&self, capability: &Capability) -> Option<Dependency> {
        self.services
            .get(&capability.id())
            .map(|service| Arc::clone(service.value()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Clock(u64);

    #[test]
    fn test_container_starts_unavailable() {
        let container = ServiceContainer::new();
        assert!(!container.is_available());
        container.start();
        assert!(container.is_available());
        container.shutdown();
        assert!(!container.is_available());
    }

    #[test]
    fn test_resolve_typed() {
        let container = ServiceContainer::new();
        container.provide(Clock(42)).provide("config".to_string());

        let clock = resolve_typed::<Clock>(&container).unwrap();
        assert_eq!(*clock, Clock(42));
        assert_eq!(*resolve_typed::<String>(&container).unwrap(), "config");
        assert!(resolve_typed::<u32>(&container).is_none());
        assert_eq!(container.len(), 2);
    }

    #[test]
    fn test_provide_replaces_same_type() {
        let container = ServiceContainer::new();
        container.provide(Clock(1));
        container.provide(Clock(2));
        assert_eq!(container.len(), 1);
        assert_eq!(*resolve_typed::<Clock>(&container).unwrap(), Clock(2));
    }

    #[test]
    fn test_capability_names_type() {
        let capability = Capability::of::<Clock>();
        assert!(capability.name().ends_with("Clock"));
        assert_eq!(capability, Capability::of::<Clock>());
        assert_ne!(capability, Capability::of::<String>());
    }
}
