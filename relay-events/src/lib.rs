//! Domain events and the in-process event bus for Relay.
//!
//! Events are multicast: any number of handlers may subscribe to one event
//! type, in contrast to the single-handler rule on the command and query
//! side. The bus is populated at startup through module descriptors and the
//! bootstrap entry point in `relay-registry`.

pub mod bus;
pub mod event;

pub use bus::{EventBus, EventBusError};
pub use event::{DomainEvent, Event, EventHandler, EventHandlerError, EventMetadata};
