//! In-process event bus.

use crate::event::{Event, EventHandler, EventHandlerError};
use async_trait::async_trait;
use dashmap::DashMap;
use std::any::TypeId;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error};

#[async_trait]
trait ErasedEventHandler: Send + Sync {
    async fn handle_erased(&self, event: &dyn Event) -> Result<(), EventHandlerError>;
}

struct HandlerAdapter<E, H> {
    handler: H,
    _marker: std::marker::PhantomData<fn(E)>,
}

#[async_trait]
impl<E: Event, H: EventHandler<E>> ErasedEventHandler for HandlerAdapter<E, H> {
    async fn handle_erased(&self, event: &dyn Event) -> Result<(), EventHandlerError> {
        let event = event
            .as_any()
            .downcast_ref::<E>()
            .ok_or_else(|| EventHandlerError::Processing("event type mismatch".into()))?;
        self.handler.handle(event).await
    }
}

/// Errors surfaced by [`EventBus::publish`].
#[derive(Debug, Error)]
pub enum EventBusError {
    #[error("{} event handler(s) failed", .0.len())]
    HandlersFailed(Vec<EventHandlerError>),
}

/// Multicast registry from event type to its subscribed handlers.
///
/// Publishing runs every subscriber sequentially; a failing subscriber never
/// prevents the remaining ones from running.
pub struct EventBus {
    handlers: DashMap<TypeId, Vec<Arc<dyn ErasedEventHandler>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            handlers: DashMap::new(),
        }
    }

    /// Subscribe a handler to an event type.
    pub fn subscribe<E, H>(&self, handler: H)
    where
        E: Event,
        H: EventHandler<E> + 'static,
    {
        let adapter: Arc<dyn ErasedEventHandler> = Arc::new(HandlerAdapter::<E, H> {
            handler,
            _marker: std::marker::PhantomData,
        });
        self.handlers
            .entry(TypeId::of::<E>())
            .or_default()
            .push(adapter);
        debug!(event = std::any::type_name::<E>(), "event handler subscribed");
    }

    /// Publish an event to every subscribed handler.
    ///
    /// Failures are collected and returned together once all handlers have
    /// run. Publishing an event with no subscribers is not an error.
    pub async fn publish<E: Event>(&self, event: E) -> Result<(), EventBusError> {
        // Clone the subscriber list out so the map shard is not held across
        // handler awaits.
        let handlers: Vec<Arc<dyn ErasedEventHandler>> =
            match self.handlers.get(&TypeId::of::<E>()) {
                Some(entry) => entry.clone(),
                None => {
                    debug!(event = event.event_name(), "no handlers subscribed");
                    return Ok(());
                }
            };

        let mut failures = Vec::new();
        for handler in handlers {
            if let Err(failure) = handler.handle_erased(&event).await {
                error!(
                    event = event.event_name(),
                    error = %failure,
                    "event handler failed"
                );
                failures.push(failure);
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(EventBusError::HandlersFailed(failures))
        }
    }

    /// Number of handlers subscribed to an event type.
    pub fn handler_count<E: Event>(&self) -> usize {
        self.handlers
            .get(&TypeId::of::<E>())
            .map(|entry| entry.len())
            .unwrap_or(0)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
