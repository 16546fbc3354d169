// Relay - a CQRS mediator for Rust
//
// This library provides command/query dispatch through a typed handler
// registry, pipeline behaviors around every dispatch, request validation,
// and module-based handler registration.

// Re-export the dispatch runtime at the crate root
pub use relay_cqrs::*;

// Re-export companion crates
pub use relay_behaviors;
pub use relay_events;
pub use relay_registry;
pub use relay_validation;

// Prelude for common imports
pub mod prelude {
    pub use async_trait::async_trait;

    pub use relay_behaviors::LoggingBehavior;
    pub use relay_cqrs::{
        Command, CommandBus, CommandError, CommandHandler, DispatchBehavior, DispatchContext,
        DispatchError, DispatchPipeline, DispatchResult, Dispatcher, Next, Outcome, Query,
        QueryBus, QueryError, QueryHandler, RequestKind,
    };
    pub use relay_events::{DomainEvent, Event, EventBus, EventHandler, EventMetadata};
    pub use relay_registry::{
        discover_modules, find_modules_implementing, register_application_services, Container,
        Contract, ModuleDescriptor, ModuleSet, ModuleSource, Provider, RegistryError, Scope,
    };
    pub use relay_validation::{
        CommandValidator, QueryValidator, ValidationError, ValidationErrors, ValidatorRegistry,
    };
}
