//! Command contracts and the command bus.

use async_trait::async_trait;
use dashmap::DashMap;
use std::any::{Any, TypeId};
use std::sync::Arc;
use thiserror::Error;

/// Marker contract for write requests.
///
/// A command expresses an intent to change state. Commands that produce no
/// payload use `()` as their result type.
pub trait Command: Send + Sync + 'static {
    /// Value produced by a successful execution.
    type Result: Send + 'static;
}

/// Handler contract for a single command type.
///
/// Exactly one handler serves each command type; the last registration wins
/// if a type is registered twice.
#[async_trait]
pub trait CommandHandler<C: Command>: Send + Sync {
    /// Execute the command.
    async fn handle(&self, command: C) -> Result<C::Result, CommandError>;
}

/// Command-side dispatch and execution errors.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("no handler registered for command")]
    HandlerNotFound,

    #[error("command execution failed: {0}")]
    ExecutionFailed(String),

    #[error("command rejected: {0}")]
    Rejected(String),
}

#[async_trait]
trait ErasedCommandHandler: Send + Sync {
    async fn handle_erased(
        &self,
        command: Box<dyn Any + Send>,
    ) -> Result<Box<dyn Any + Send>, CommandError>;
}

struct HandlerAdapter<C, H> {
    handler: H,
    _marker: std::marker::PhantomData<fn(C)>,
}

#[async_trait]
impl<C: Command, H: CommandHandler<C>> ErasedCommandHandler for HandlerAdapter<C, H> {
    async fn handle_erased(
        &self,
        command: Box<dyn Any + Send>,
    ) -> Result<Box<dyn Any + Send>, CommandError> {
        let command = command
            .downcast::<C>()
            .map_err(|_| CommandError::ExecutionFailed("command type mismatch".into()))?;
        let result = self.handler.handle(*command).await?;
        Ok(Box::new(result))
    }
}

/// Typed registry mapping each command type to its registered handler.
pub struct CommandBus {
    handlers: DashMap<TypeId, Arc<dyn ErasedCommandHandler>>,
}

impl CommandBus {
    /// Create an empty command bus.
    pub fn new() -> Self {
        Self {
            handlers: DashMap::new(),
        }
    }

    /// Register the handler for a command type, replacing any previous one.
    pub fn register<C, H>(&self, handler: H)
    where
        C: Command,
        H: CommandHandler<C> + 'static,
    {
        let adapter = HandlerAdapter::<C, H> {
            handler,
            _marker: std::marker::PhantomData,
        };
        self.handlers.insert(TypeId::of::<C>(), Arc::new(adapter));
    }

    /// Whether a handler is registered for the command type.
    pub fn is_registered<C: Command>(&self) -> bool {
        self.handlers.contains_key(&TypeId::of::<C>())
    }

    /// Number of command types with a registered handler.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Execute a command against its registered handler.
    pub async fn execute<C: Command>(&self, command: C) -> Result<C::Result, CommandError> {
        let result = self
            .execute_erased(TypeId::of::<C>(), Box::new(command))
            .await?;
        result
            .downcast::<C::Result>()
            .map(|result| *result)
            .map_err(|_| CommandError::ExecutionFailed("result type mismatch".into()))
    }

    pub(crate) async fn execute_erased(
        &self,
        type_id: TypeId,
        command: Box<dyn Any + Send>,
    ) -> Result<Box<dyn Any + Send>, CommandError> {
        // Clone the handler out so the map shard is not held across the await.
        let handler = self
            .handlers
            .get(&type_id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(CommandError::HandlerNotFound)?;
        handler.handle_erased(command).await
    }
}

impl Default for CommandBus {
    fn default() -> Self {
        Self::new()
    }
}
