//! Module descriptors: the compile-time registry of contract implementers.
//!
//! An application is organized into modules. Each module declares which
//! contract shapes its types implement (commands, queries, handlers,
//! validators, domain-event handlers) through a fluent builder. The
//! declarations replace runtime type scanning: discovery and registration
//! operate purely on these descriptors.

use crate::container::Container;
use crate::error::RegistryError;
use relay_cqrs::{Command, CommandBus, CommandHandler, Query, QueryBus, QueryHandler};
use relay_events::{Event, EventBus, EventHandler};
use relay_validation::{CommandValidator, QueryValidator, ValidatorRegistry};
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

/// Contract shapes used as search keys when scanning module registrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Contract {
    /// Command without a result payload.
    Command,
    /// Command producing a result payload.
    CommandWithResult,
    Query,
    CommandHandler,
    CommandHandlerWithResult,
    QueryHandler,
    /// Validator bound to a command without a result payload.
    CommandValidator,
    /// Validator bound to a result-producing command.
    CommandValidatorWithResult,
    QueryValidator,
    DomainEventHandler,
}

impl Contract {
    /// Shapes installed into the dispatch runtime.
    pub fn is_handler(&self) -> bool {
        matches!(
            self,
            Contract::CommandHandler
                | Contract::CommandHandlerWithResult
                | Contract::QueryHandler
                | Contract::DomainEventHandler
        )
    }

    /// Shapes installed into the validator registry.
    pub fn is_validator(&self) -> bool {
        matches!(
            self,
            Contract::CommandValidator
                | Contract::CommandValidatorWithResult
                | Contract::QueryValidator
        )
    }

    /// Pure marker shapes with nothing to install.
    pub fn is_marker(&self) -> bool {
        matches!(
            self,
            Contract::Command | Contract::CommandWithResult | Contract::Query
        )
    }
}

type InstallFn = Arc<dyn Fn(&Container) -> Result<(), RegistryError> + Send + Sync>;

/// One declared (contract, implementer) pair.
///
/// Carries the implementer's type identity and an installer that wires the
/// implementer into the container-held runtime. Marker declarations install
/// nothing; they exist so discovery can find the modules that contain them.
#[derive(Clone)]
pub struct TypeRegistration {
    type_id: TypeId,
    type_name: &'static str,
    contract: Contract,
    install: InstallFn,
}

impl TypeRegistration {
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn contract(&self) -> Contract {
        self.contract
    }

    pub(crate) fn install(&self, container: &Container) -> Result<(), RegistryError> {
        (self.install)(container)
    }
}

impl std::fmt::Debug for TypeRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistration")
            .field("type_name", &self.type_name)
            .field("contract", &self.contract)
            .finish()
    }
}

fn no_install() -> InstallFn {
    Arc::new(|_| Ok(()))
}

/// A named unit of declared registrations.
///
/// The builder is the author-facing surface: one line per declared type, no
/// per-handler container calls anywhere else.
#[derive(Clone, Debug, Default)]
pub struct ModuleDescriptor {
    name: &'static str,
    registrations: Vec<TypeRegistration>,
}

impl ModuleDescriptor {
    /// Create a descriptor with the given module name. Names identify
    /// modules; two descriptors with the same name are the same module.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            registrations: Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn registrations(&self) -> &[TypeRegistration] {
        &self.registrations
    }

    /// Whether any declared registration satisfies the contract shape.
    pub fn implements(&self, contract: Contract) -> bool {
        self.registrations
            .iter()
            .any(|registration| registration.contract == contract)
    }

    fn declare<T: 'static>(mut self, contract: Contract, install: InstallFn) -> Self {
        self.registrations.push(TypeRegistration {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            contract,
            install,
        });
        self
    }

    /// Declare a command without a result payload.
    pub fn command<C>(self) -> Self
    where
        C: Command<Result = ()>,
    {
        self.declare::<C>(Contract::Command, no_install())
    }

    /// Declare a result-producing command.
    pub fn command_with_result<C: Command>(self) -> Self {
        self.declare::<C>(Contract::CommandWithResult, no_install())
    }

    /// Declare a query.
    pub fn query<Q: Query>(self) -> Self {
        self.declare::<Q>(Contract::Query, no_install())
    }

    /// Declare the handler for a command without a result payload.
    pub fn command_handler<C, H, F>(self, factory: F) -> Self
    where
        C: Command<Result = ()>,
        H: CommandHandler<C> + 'static,
        F: Fn(&Container) -> Result<H, RegistryError> + Send + Sync + 'static,
    {
        let install: InstallFn = Arc::new(move |container| {
            let bus = container.resolve::<CommandBus>()?;
            bus.register::<C, H>(factory(container)?);
            Ok(())
        });
        self.declare::<H>(Contract::CommandHandler, install)
    }

    /// Declare the handler for a result-producing command.
    pub fn command_handler_with_result<C, H, F>(self, factory: F) -> Self
    where
        C: Command,
        H: CommandHandler<C> + 'static,
        F: Fn(&Container) -> Result<H, RegistryError> + Send + Sync + 'static,
    {
        let install: InstallFn = Arc::new(move |container| {
            let bus = container.resolve::<CommandBus>()?;
            bus.register::<C, H>(factory(container)?);
            Ok(())
        });
        self.declare::<H>(Contract::CommandHandlerWithResult, install)
    }

    /// Declare the handler for a query.
    pub fn query_handler<Q, H, F>(self, factory: F) -> Self
    where
        Q: Query,
        H: QueryHandler<Q> + 'static,
        F: Fn(&Container) -> Result<H, RegistryError> + Send + Sync + 'static,
    {
        let install: InstallFn = Arc::new(move |container| {
            let bus = container.resolve::<QueryBus>()?;
            bus.register::<Q, H>(factory(container)?);
            Ok(())
        });
        self.declare::<H>(Contract::QueryHandler, install)
    }

    /// Declare a validator bound to a command without a result payload.
    pub fn command_validator<C, V, F>(self, factory: F) -> Self
    where
        C: Command<Result = ()>,
        V: CommandValidator<C>,
        F: Fn(&Container) -> Result<V, RegistryError> + Send + Sync + 'static,
    {
        let install: InstallFn = Arc::new(move |container| {
            let registry = container.resolve::<ValidatorRegistry>()?;
            registry.register_command_validator::<C, V>(factory(container)?);
            Ok(())
        });
        self.declare::<V>(Contract::CommandValidator, install)
    }

    /// Declare a validator bound to a result-producing command.
    pub fn command_validator_with_result<C, V, F>(self, factory: F) -> Self
    where
        C: Command,
        V: CommandValidator<C>,
        F: Fn(&Container) -> Result<V, RegistryError> + Send + Sync + 'static,
    {
        let install: InstallFn = Arc::new(move |container| {
            let registry = container.resolve::<ValidatorRegistry>()?;
            registry.register_command_validator::<C, V>(factory(container)?);
            Ok(())
        });
        self.declare::<V>(Contract::CommandValidatorWithResult, install)
    }

    /// Declare a validator bound to a query.
    pub fn query_validator<Q, V, F>(self, factory: F) -> Self
    where
        Q: Query,
        V: QueryValidator<Q>,
        F: Fn(&Container) -> Result<V, RegistryError> + Send + Sync + 'static,
    {
        let install: InstallFn = Arc::new(move |container| {
            let registry = container.resolve::<ValidatorRegistry>()?;
            registry.register_query_validator::<Q, V>(factory(container)?);
            Ok(())
        });
        self.declare::<V>(Contract::QueryValidator, install)
    }

    /// Declare a handler for a domain-event type.
    pub fn domain_event_handler<E, H, F>(self, factory: F) -> Self
    where
        E: Event,
        H: EventHandler<E> + 'static,
        F: Fn(&Container) -> Result<H, RegistryError> + Send + Sync + 'static,
    {
        let install: InstallFn = Arc::new(move |container| {
            let bus = container.resolve::<EventBus>()?;
            bus.subscribe::<E, H>(factory(container)?);
            Ok(())
        });
        self.declare::<H>(Contract::DomainEventHandler, install)
    }
}

/// De-duplicated, order-insensitive collection of modules keyed by name.
///
/// A module appears at most once regardless of how many of its registrations
/// satisfy any given contract.
#[derive(Clone, Debug, Default)]
pub struct ModuleSet {
    modules: HashMap<&'static str, ModuleDescriptor>,
}

impl ModuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a module. Returns `false` (and keeps the existing entry) when a
    /// module with the same name is already present.
    pub fn insert(&mut self, module: ModuleDescriptor) -> bool {
        if self.modules.contains_key(module.name()) {
            return false;
        }
        self.modules.insert(module.name(), module);
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&ModuleDescriptor> {
        self.modules.get(name)
    }

    /// Set union, de-duplicated by module name.
    pub fn union(&self, other: &ModuleSet) -> ModuleSet {
        let mut merged = self.clone();
        for module in other.iter() {
            merged.insert(module.clone());
        }
        merged
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModuleDescriptor> {
        self.modules.values()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl FromIterator<ModuleDescriptor> for ModuleSet {
    fn from_iter<I: IntoIterator<Item = ModuleDescriptor>>(iter: I) -> Self {
        let mut set = ModuleSet::new();
        for module in iter {
            set.insert(module);
        }
        set
    }
}
