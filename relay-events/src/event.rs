//! Event definitions and the domain-event handler contract.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt::Debug;
use thiserror::Error;
use uuid::Uuid;

/// An event published through the bus.
pub trait Event: Send + Sync + Debug + 'static {
    /// Event name, stable across process runs.
    fn event_name(&self) -> &str;

    /// Unique id of this occurrence.
    fn event_id(&self) -> Uuid;

    /// When the event occurred.
    fn timestamp(&self) -> DateTime<Utc>;

    /// Cast to `Any` so erased handlers can recover the concrete type.
    fn as_any(&self) -> &dyn Any;
}

/// Identity and causality metadata carried by every event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMetadata {
    pub id: Uuid,
    pub name: String,
    pub timestamp: DateTime<Utc>,

    /// Correlates events belonging to one logical operation.
    pub correlation_id: Option<Uuid>,

    /// Id of the event that caused this one.
    pub causation_id: Option<Uuid>,
}

impl EventMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            timestamp: Utc::now(),
            correlation_id: None,
            causation_id: None,
        }
    }

    pub fn with_correlation_id(mut self, id: Uuid) -> Self {
        self.correlation_id = Some(id);
        self
    }

    pub fn with_causation_id(mut self, id: Uuid) -> Self {
        self.causation_id = Some(id);
        self
    }
}

/// Generic domain-event envelope for aggregates that do not define their own
/// event structs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub aggregate_id: String,
    pub aggregate_type: String,

    /// Schema version of the payload.
    pub version: u32,

    pub payload: serde_json::Value,
}

impl DomainEvent {
    pub fn new(
        event_name: impl Into<String>,
        aggregate_id: impl Into<String>,
        aggregate_type: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            metadata: EventMetadata::new(event_name),
            aggregate_id: aggregate_id.into(),
            aggregate_type: aggregate_type.into(),
            version: 1,
            payload,
        }
    }
}

impl Event for DomainEvent {
    fn event_name(&self) -> &str {
        &self.metadata.name
    }

    fn event_id(&self) -> Uuid {
        self.metadata.id
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.metadata.timestamp
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Handler contract for one domain-event type.
///
/// Unlike command and query handlers, any number of event handlers may be
/// subscribed to the same event type.
#[async_trait]
pub trait EventHandler<E: Event>: Send + Sync {
    async fn handle(&self, event: &E) -> Result<(), EventHandlerError>;
}

/// Errors raised by individual event handlers.
#[derive(Debug, Error)]
pub enum EventHandlerError {
    #[error("handler failed: {0}")]
    HandlerFailed(String),

    #[error("event processing error: {0}")]
    Processing(String),
}
