use dashmap::DashMap;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use super::resolver::{Capability, Dependency, DependencyResolver};
use crate::error::ConstructionError;

// ============================================================================
// Dependency Bindings
// ============================================================================
//
// A binding is one injectable slot of an actor type: the field it fills and
// the capability it needs. Actor types declare their bindings once through
// `Injectable`; bindings of an embedded parent are pulled in with
// `inherit` and run after the type's own.
//
// ============================================================================

type Apply<B> = Arc<dyn Fn(&mut B, Dependency) + Send + Sync>;

struct Binding<B> {
    field: &'static str,
    capability: Capability,
    accepts: fn(&(dyn Any + Send + Sync)) -> bool,
    apply: Apply<B>,
}

/// Ordered injection plan for actor type `B`.
///
/// Name the target type on `new`, so the setters of a chain of `bind`
/// calls know what they write to:
///
/// ```
/// use std::sync::Arc;
/// use actor_registry::injection::Bindings;
/// use actor_registry::Injectable;
///
/// struct Store;
/// struct Clock;
///
/// #[derive(Default)]
/// struct Worker {
///     store: Option<Arc<Store>>,
///     clock: Option<Arc<Clock>>,
/// }
///
/// impl Injectable for Worker {
///     fn bindings() -> Bindings<Self> {
///         Bindings::<Self>::new()
///             .bind::<Store>("store", |worker, store| worker.store = Some(store))
///             .bind::<Clock>("clock", |worker, clock| worker.clock = Some(clock))
///     }
/// }
///
/// assert_eq!(Worker::bindings().fields(), vec!["store", "clock"]);
/// ```
pub struct Bindings<B> {
    bindings: Vec<Binding<B>>,
}

impl<B: 'static> Bindings<B> {
    pub fn new() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    /// Declare that `field` receives an instance of `T` through `set`.
    pub fn bind<T>(mut self, field: &'static str, set: fn(&mut B, Arc<T>)) -> Self
    where
        T: Any + Send + Sync,
    {
        self.bindings.push(Binding {
            field,
            capability: Capability::of::<T>(),
            accepts: |dependency: &(dyn Any + Send + Sync)| dependency.is::<T>(),
            apply: Arc::new(move |target: &mut B, dependency: Dependency| {
                if let Ok(value) = dependency.downcast::<T>() {
                    set(target, value);
                }
            }),
        });
        self
    }

    /// Append the bindings of the embedded parent type `P`, reached
    /// through `project`.
    pub fn inherit<P>(mut self, project: fn(&mut B) -> &mut P) -> Self
    where
        P: Injectable,
    {
        for parent in P::bindings().bindings {
            let apply = parent.apply;
            self.bindings.push(Binding {
                field: parent.field,
                capability: parent.capability,
                accepts: parent.accepts,
                apply: Arc::new(move |target: &mut B, dependency: Dependency| {
                    apply(project(target), dependency)
                }),
            });
        }
        self
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Field names in injection order.
    pub fn fields(&self) -> Vec<&'static str> {
        self.bindings.iter().map(|binding| binding.field).collect()
    }

    /// Resolve every binding, then set them all on `target`.
    ///
    /// Nothing is written unless every capability resolves to a value of
    /// the expected type. Returns the number of fields set.
    pub fn inject(
        &self,
        target: &mut B,
        resolver: &dyn DependencyResolver,
    ) -> Result<usize, ConstructionError> {
        let mut resolved = Vec::with_capacity(self.bindings.len());
        for binding in &self.bindings {
            let dependency = resolver
                .resolve(&binding.capability)
                .filter(|dependency| (binding.accepts)(&**dependency))
                .ok_or(ConstructionError::Unresolved {
                    field: binding.field,
                    capability: binding.capability.name(),
                })?;
            resolved.push(dependency);
        }

        for (binding, dependency) in self.bindings.iter().zip(resolved) {
            (binding.apply)(target, dependency);
        }
        Ok(self.bindings.len())
    }
}

impl<B: 'static> Default for Bindings<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B> fmt::Debug for Bindings<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(
                self.bindings
                    .iter()
                    .map(|binding| (binding.field, binding.capability.name())),
            )
            .finish()
    }
}

/// Actor types that declare injectable fields.
pub trait Injectable: Sized + 'static {
    fn bindings() -> Bindings<Self>;
}

// ============================================================================
// Binding Cache
// ============================================================================

/// Per-type cache of `Injectable::bindings`, so each type's plan is built
/// once no matter how many actors of it are created.
#[derive(Default)]
pub struct BindingCache {
    plans: DashMap<TypeId, Dependency>,
}

impl BindingCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get<B: Injectable>(&self) -> Arc<Bindings<B>> {
        let erased = {
            let plan = self
                .plans
                .entry(TypeId::of::<B>())
                .or_insert_with(|| Arc::new(B::bindings()) as Dependency);
            Arc::clone(plan.value())
        };
        // Keys are the TypeId of `B`, so the downcast cannot miss.
        erased
            .downcast::<Bindings<B>>()
            .unwrap_or_else(|_| Arc::new(B::bindings()))
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::injection::resolver::ServiceContainer;

    #[derive(Debug, PartialEq)]
    struct Store(&'static str);

    #[derive(Debug, PartialEq)]
    struct Clock(u64);

    #[derive(Debug, PartialEq)]
    struct AuditLog;

    #[derive(Default)]
    struct Base {
        audit: Option<Arc<AuditLog>>,
    }

    impl Injectable for Base {
        fn bindings() -> Bindings<Self> {
            Bindings::<Self>::new()
                .bind::<AuditLog>("audit", |base, audit| base.audit = Some(audit))
        }
    }

    #[derive(Default)]
    struct Worker {
        store: Option<Arc<Store>>,
        clock: Option<Arc<Clock>>,
        base: Base,
    }

    impl Injectable for Worker {
        fn bindings() -> Bindings<Self> {
            Bindings::<Self>::new()
                .bind::<Store>("store", |worker, store| worker.store = Some(store))
                .bind::<Clock>("clock", |worker, clock| worker.clock = Some(clock))
                .inherit::<Base>(|worker| &mut worker.base)
        }
    }

    fn full_container() -> ServiceContainer {
        let container = ServiceContainer::new();
        container
            .provide(Store("orders"))
            .provide(Clock(7))
            .provide(AuditLog);
        container
    }

    #[test]
    fn test_parent_bindings_follow_own() {
        let bindings = Worker::bindings();
        assert_eq!(bindings.fields(), vec!["store", "clock", "audit"]);
        assert_eq!(bindings.len(), 3);
    }

    #[test]
    fn test_inject_sets_every_field() {
        let container = full_container();
        let mut worker = Worker::default();

        let injected = Worker::bindings().inject(&mut worker, &container).unwrap();

        assert_eq!(injected, 3);
        assert_eq!(worker.store.as_deref(), Some(&Store("orders")));
        assert_eq!(worker.clock.as_deref(), Some(&Clock(7)));
        assert_eq!(worker.base.audit.as_deref(), Some(&AuditLog));
    }

    #[test]
    fn test_missing_dependency_sets_nothing() {
        let container = ServiceContainer::new();
        container.provide(Store("orders")).provide(AuditLog);
        let mut worker = Worker::default();

        let err = Worker::bindings().inject(&mut worker, &container).unwrap_err();

        assert!(matches!(err, ConstructionError::Unresolved { field: "clock", .. }));
        assert!(worker.store.is_none());
        assert!(worker.clock.is_none());
        assert!(worker.base.audit.is_none());
    }

    #[test]
    fn test_cache_builds_plan_once_per_type() {
        let cache = BindingCache::new();
        let first = cache.get::<Worker>();
        let second = cache.get::<Worker>();
        assert!(Arc::ptr_eq(&first, &second));

        cache.get::<Base>();
        assert_eq!(cache.len(), 2);
    }
}
