// Dependency injection container

use crate::error::RegistryError;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use tracing::{debug, trace};

/// Trait for types that can be provided by the DI container.
pub trait Provider: Send + Sync + 'static {}

type AnyProvider = Arc<dyn Any + Send + Sync>;
type ScopedFactory = Arc<dyn Fn(&Container) -> Result<AnyProvider, RegistryError> + Send + Sync>;

/// The dependency injection container.
///
/// Providers registered with [`Container::register`] are singletons shared by
/// every resolver. Providers registered with [`Container::register_scoped`]
/// are created once per [`Scope`]. Registering the same type twice replaces
/// the earlier registration.
#[derive(Clone, Default)]
pub struct Container {
    providers: Arc<RwLock<HashMap<TypeId, AnyProvider>>>,
    scoped: Arc<RwLock<HashMap<TypeId, ScopedFactory>>>,
}

impl Container {
    pub fn new() -> Self {
        debug!("creating DI container");
        Self::default()
    }

    /// Register a singleton provider instance.
    pub fn register<T: Provider>(&self, instance: T) {
        let type_name = std::any::type_name::<T>();
        let mut providers = self.providers.write().unwrap();
        providers.insert(TypeId::of::<T>(), Arc::new(instance));
        debug!(provider = type_name, "provider registered");
    }

    /// Register a singleton provider built by a factory function.
    pub fn register_factory<T: Provider, F>(&self, factory: F)
    where
        F: FnOnce() -> T,
    {
        self.register(factory());
    }

    /// Register a scoped provider: one instance is created per [`Scope`],
    /// the first time the type is resolved from that scope.
    pub fn register_scoped<T, F>(&self, factory: F)
    where
        T: Provider,
        F: Fn(&Container) -> Result<T, RegistryError> + Send + Sync + 'static,
    {
        let type_name = std::any::type_name::<T>();
        let erased: ScopedFactory =
            Arc::new(move |container| factory(container).map(|instance| Arc::new(instance) as AnyProvider));
        let mut scoped = self.scoped.write().unwrap();
        scoped.insert(TypeId::of::<T>(), erased);
        debug!(provider = type_name, "scoped provider registered");
    }

    /// Resolve a singleton provider by type.
    pub fn resolve<T: Provider>(&self) -> Result<Arc<T>, RegistryError> {
        let type_name = std::any::type_name::<T>();
        trace!(provider = type_name, "resolving provider");

        let providers = self.providers.read().unwrap();
        providers
            .get(&TypeId::of::<T>())
            .and_then(|any| any.clone().downcast::<T>().ok())
            .ok_or_else(|| RegistryError::ProviderNotFound(type_name.to_string()))
    }

    /// Check whether a singleton provider is registered.
    pub fn has<T: Provider>(&self) -> bool {
        self.providers
            .read()
            .unwrap()
            .contains_key(&TypeId::of::<T>())
    }

    /// Check whether a scoped factory is registered for the type.
    pub fn has_scoped<T: Provider>(&self) -> bool {
        self.scoped.read().unwrap().contains_key(&TypeId::of::<T>())
    }

    /// Open a new resolution scope.
    pub fn create_scope(&self) -> Scope {
        Scope {
            container: self.clone(),
            instances: Mutex::new(HashMap::new()),
        }
    }

    fn scoped_factory(&self, type_id: TypeId) -> Option<ScopedFactory> {
        self.scoped.read().unwrap().get(&type_id).cloned()
    }
}

/// A resolution scope: scoped providers resolve to one instance per scope,
/// everything else falls through to the parent container's singletons.
pub struct Scope {
    container: Container,
    instances: Mutex<HashMap<TypeId, AnyProvider>>,
}

impl Scope {
    /// Resolve a provider within this scope.
    pub fn resolve<T: Provider>(&self) -> Result<Arc<T>, RegistryError> {
        let type_id = TypeId::of::<T>();
        let type_name = std::any::type_name::<T>();

        {
            let instances = self.instances.lock().unwrap();
            if let Some(existing) = instances.get(&type_id) {
                return existing
                    .clone()
                    .downcast::<T>()
                    .map_err(|_| RegistryError::ProviderNotFound(type_name.to_string()));
            }
        }

        if let Some(factory) = self.container.scoped_factory(type_id) {
            let instance = factory(&self.container)?;
            let mut instances = self.instances.lock().unwrap();
            let entry = instances.entry(type_id).or_insert(instance);
            trace!(provider = type_name, "scoped instance created");
            return entry
                .clone()
                .downcast::<T>()
                .map_err(|_| RegistryError::ProviderNotFound(type_name.to_string()));
        }

        self.container.resolve::<T>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct Config {
        name: &'static str,
    }

    impl Provider for Config {}

    struct Counter {
        value: AtomicU32,
    }

    impl Provider for Counter {}

    #[test]
    fn registers_and_resolves_singletons() {
        let container = Container::new();
        container.register(Config { name: "app" });

        assert!(container.has::<Config>());
        let config = container.resolve::<Config>().unwrap();
        assert_eq!(config.name, "app");
    }

    #[test]
    fn missing_provider_is_an_error() {
        let container = Container::new();
        let result = container.resolve::<Config>();
        assert!(matches!(result, Err(RegistryError::ProviderNotFound(_))));
    }

    #[test]
    fn singletons_are_shared_across_scopes() {
        let container = Container::new();
        container.register(Config { name: "app" });

        let first = container.create_scope().resolve::<Config>().unwrap();
        let second = container.create_scope().resolve::<Config>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn scoped_providers_are_per_scope() {
        let container = Container::new();
        container.register_scoped(|_: &Container| {
            Ok(Counter {
                value: AtomicU32::new(0),
            })
        });

        let scope = container.create_scope();
        let first = scope.resolve::<Counter>().unwrap();
        first.value.fetch_add(1, Ordering::SeqCst);
        let again = scope.resolve::<Counter>().unwrap();
        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!(again.value.load(Ordering::SeqCst), 1);

        let other_scope = container.create_scope();
        let other = other_scope.resolve::<Counter>().unwrap();
        assert!(!Arc::ptr_eq(&first, &other));
        assert_eq!(other.value.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn scoped_factory_failures_propagate() {
        let container = Container::new();
        container.register_scoped(|container: &Container| {
            // Depends on a provider that was never registered.
            container.resolve::<Config>().map(|_| Counter {
                value: AtomicU32::new(0),
            })
        });

        let scope = container.create_scope();
        assert!(matches!(
            scope.resolve::<Counter>(),
            Err(RegistryError::ProviderNotFound(_))
        ));
    }

    #[test]
    fn factory_registration() {
        let container = Container::new();
        container.register_factory(|| Config { name: "built" });
        assert_eq!(container.resolve::<Config>().unwrap().name, "built");
    }
}
