//! Application service registration.
//!
//! [`register_application_services`] is the single bootstrap entry point: it
//! takes a container and the discovered module set, registers every validator
//! and handler the modules declare, and registers the dispatcher abstraction
//! with scoped lifetime. Callers never register handlers one by one.

use crate::container::{Container, Provider};
use crate::discover::find_modules_implementing;
use crate::error::RegistryError;
use crate::module::{Contract, ModuleSet};
use relay_cqrs::{CommandBus, DispatchPipeline, Dispatcher, QueryBus};
use relay_events::EventBus;
use relay_validation::ValidatorRegistry;
use tracing::debug;

impl Provider for CommandBus {}
impl Provider for QueryBus {}
impl Provider for EventBus {}
impl Provider for ValidatorRegistry {}
impl Provider for DispatchPipeline {}
impl Provider for Dispatcher {}

/// Shapes that bind a validator to a request type.
const VALIDATOR_CONTRACTS: [Contract; 3] = [
    Contract::CommandValidator,
    Contract::CommandValidatorWithResult,
    Contract::QueryValidator,
];

/// Shapes whose presence marks a module as part of the dispatch runtime's
/// scan set.
const CORE_CONTRACTS: [Contract; 7] = [
    Contract::Command,
    Contract::CommandWithResult,
    Contract::Query,
    Contract::CommandHandler,
    Contract::CommandHandlerWithResult,
    Contract::QueryHandler,
    Contract::DomainEventHandler,
];

fn modules_satisfying(modules: &ModuleSet, contracts: &[Contract]) -> ModuleSet {
    contracts.iter().fold(ModuleSet::new(), |set, contract| {
        set.union(&find_modules_implementing(modules, *contract))
    })
}

/// Register every application service the module set declares.
///
/// In order: validators from modules declaring any validator shape, then the
/// dispatch runtime (buses plus every declared handler), then the dispatcher
/// abstraction with scoped lifetime. Returns the container for chaining.
///
/// Installer failures propagate: a module whose declarations cannot be
/// installed is a startup configuration error, not a condition to mask.
/// Registering into two containers yields independent, equivalent results;
/// registering twice into the same container follows the container's own
/// duplicate policy.
pub fn register_application_services<'a>(
    container: &'a Container,
    modules: &ModuleSet,
) -> Result<&'a Container, RegistryError> {
    let validator_modules = modules_satisfying(modules, &VALIDATOR_CONTRACTS);
    if !validator_modules.is_empty() {
        register_validators(container, &validator_modules)?;
    }

    let core_modules = modules_satisfying(modules, &CORE_CONTRACTS);
    register_dispatch_runtime(container, &core_modules)?;

    container.register_scoped(|container: &Container| {
        let commands = container.resolve::<CommandBus>()?;
        let queries = container.resolve::<QueryBus>()?;
        let pipeline = container
            .resolve::<DispatchPipeline>()
            .map(|pipeline| (*pipeline).clone())
            .unwrap_or_default();
        Ok(Dispatcher::new(commands, queries).with_pipeline(pipeline))
    });

    Ok(container)
}

fn register_validators(container: &Container, modules: &ModuleSet) -> Result<(), RegistryError> {
    if !container.has::<ValidatorRegistry>() {
        container.register(ValidatorRegistry::new());
    }

    for module in modules.iter() {
        for registration in module
            .registrations()
            .iter()
            .filter(|registration| registration.contract().is_validator())
        {
            registration.install(container)?;
            debug!(
                module = module.name(),
                validator = registration.type_name(),
                "validator registered"
            );
        }
    }
    Ok(())
}

fn register_dispatch_runtime(container: &Container, hint: &ModuleSet) -> Result<(), RegistryError> {
    if !container.has::<CommandBus>() {
        container.register(CommandBus::new());
    }
    if !container.has::<QueryBus>() {
        container.register(QueryBus::new());
    }
    if !container.has::<EventBus>() {
        container.register(EventBus::new());
    }

    // The runtime performs its own scan over the hinted modules and installs
    // every handler-shaped registration it finds.
    for module in hint.iter() {
        for registration in module
            .registrations()
            .iter()
            .filter(|registration| registration.contract().is_handler())
        {
            registration.install(container)?;
            debug!(
                module = module.name(),
                handler = registration.type_name(),
                "handler registered"
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discover::{discover_modules, ModuleSource};
    use crate::module::ModuleDescriptor;
    use async_trait::async_trait;
    use relay_cqrs::{Command, CommandError, CommandHandler};

    struct Touch;
    impl Command for Touch {
        type Result = ();
    }

    struct TouchHandler;
    #[async_trait]
    impl CommandHandler<Touch> for TouchHandler {
        async fn handle(&self, _command: Touch) -> Result<(), CommandError> {
            Ok(())
        }
    }

    fn touch_module() -> ModuleDescriptor {
        ModuleDescriptor::new("touch")
            .command::<Touch>()
            .command_handler::<Touch, _, _>(|_: &Container| Ok(TouchHandler))
    }

    #[test]
    fn validator_registry_is_only_registered_when_needed() {
        let container = Container::new();
        let modules = discover_modules([ModuleSource::loaded(touch_module())]);

        register_application_services(&container, &modules).unwrap();

        // No module declared a validator shape, so no registry was created.
        assert!(!container.has::<ValidatorRegistry>());
        assert!(container.has::<CommandBus>());
        assert!(container.has::<QueryBus>());
        assert!(container.has::<EventBus>());
        assert!(container.has_scoped::<Dispatcher>());
    }

    #[test]
    fn handler_installation_failures_are_fatal() {
        struct Broken;
        impl Command for Broken {
            type Result = ();
        }
        struct BrokenHandler;
        #[async_trait]
        impl CommandHandler<Broken> for BrokenHandler {
            async fn handle(&self, _command: Broken) -> Result<(), CommandError> {
                Ok(())
            }
        }

        let module = ModuleDescriptor::new("broken").command_handler::<Broken, BrokenHandler, _>(
            |_: &Container| {
                Err(RegistryError::Installation(
                    "missing repository".to_string(),
                ))
            },
        );
        let container = Container::new();
        let modules = discover_modules([ModuleSource::loaded(module)]);

        let result = register_application_services(&container, &modules);
        assert!(matches!(result, Err(RegistryError::Installation(_))));
    }

    #[tokio::test]
    async fn registrations_on_two_containers_are_independent() {
        let modules = discover_modules([ModuleSource::loaded(touch_module())]);

        let first = Container::new();
        let second = Container::new();
        register_application_services(&first, &modules).unwrap();
        register_application_services(&second, &modules).unwrap();

        let bus_a = first.resolve::<CommandBus>().unwrap();
        let bus_b = second.resolve::<CommandBus>().unwrap();
        assert!(!std::sync::Arc::ptr_eq(&bus_a, &bus_b));

        bus_a.execute(Touch).await.unwrap();
        bus_b.execute(Touch).await.unwrap();
    }
}
