//! Module discovery, contract search, and service registration for Relay.
//!
//! Applications declare their commands, queries, handlers, and validators in
//! [`ModuleDescriptor`]s, an explicit compile-time registry in place of
//! runtime type scanning. At startup the host passes its module sources to
//! [`discover_modules`] and hands the result to
//! [`register_application_services`], which populates the container so that
//! every declared handler and validator is usable with no per-handler wiring.
//!
//! ```rust,ignore
//! use relay_registry::*;
//!
//! let modules = discover_modules([
//!     ModuleSource::loaded(orders_module()),
//!     ModuleSource::deferred("billing", load_billing_module),
//! ]);
//!
//! let container = Container::new();
//! register_application_services(&container, &modules)?;
//!
//! let scope = container.create_scope();
//! let dispatcher = scope.resolve::<relay_cqrs::Dispatcher>()?;
//! ```

pub mod bootstrap;
pub mod container;
pub mod discover;
pub mod error;
pub mod module;

pub use bootstrap::register_application_services;
pub use container::{Container, Provider, Scope};
pub use discover::{discover_modules, find_modules_implementing, ModuleSource};
pub use error::RegistryError;
pub use module::{Contract, ModuleDescriptor, ModuleSet, TypeRegistration};
