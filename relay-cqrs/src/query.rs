//! Query contracts and the query bus.

use async_trait::async_trait;
use dashmap::DashMap;
use std::any::{Any, TypeId};
use std::sync::Arc;
use thiserror::Error;

/// Marker contract for read requests. A query always produces a result value.
pub trait Query: Send + Sync + 'static {
    /// Value produced by a successful execution.
    type Result: Send + 'static;
}

/// Handler contract for a single query type.
#[async_trait]
pub trait QueryHandler<Q: Query>: Send + Sync {
    /// Execute the query.
    async fn handle(&self, query: Q) -> Result<Q::Result, QueryError>;
}

/// Query-side dispatch and execution errors.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("no handler registered for query")]
    HandlerNotFound,

    #[error("query execution failed: {0}")]
    ExecutionFailed(String),

    #[error("not found: {0}")]
    NotFound(String),
}

#[async_trait]
trait ErasedQueryHandler: Send + Sync {
    async fn handle_erased(
        &self,
        query: Box<dyn Any + Send>,
    ) -> Result<Box<dyn Any + Send>, QueryError>;
}

struct HandlerAdapter<Q, H> {
    handler: H,
    _marker: std::marker::PhantomData<fn(Q)>,
}

#[async_trait]
impl<Q: Query, H: QueryHandler<Q>> ErasedQueryHandler for HandlerAdapter<Q, H> {
    async fn handle_erased(
        &self,
        query: Box<dyn Any + Send>,
    ) -> Result<Box<dyn Any + Send>, QueryError> {
        let query = query
            .downcast::<Q>()
            .map_err(|_| QueryError::ExecutionFailed("query type mismatch".into()))?;
        let result = self.handler.handle(*query).await?;
        Ok(Box::new(result))
    }
}

/// Typed registry mapping each query type to its registered handler.
pub struct QueryBus {
    handlers: DashMap<TypeId, Arc<dyn ErasedQueryHandler>>,
}

impl QueryBus {
    /// Create an empty query bus.
    pub fn new() -> Self {
        Self {
            handlers: DashMap::new(),
        }
    }

    /// Register the handler for a query type, replacing any previous one.
    pub fn register<Q, H>(&self, handler: H)
    where
        Q: Query,
        H: QueryHandler<Q> + 'static,
    {
        let adapter = HandlerAdapter::<Q, H> {
            handler,
            _marker: std::marker::PhantomData,
        };
        self.handlers.insert(TypeId::of::<Q>(), Arc::new(adapter));
    }

    /// Whether a handler is registered for the query type.
    pub fn is_registered<Q: Query>(&self) -> bool {
        self.handlers.contains_key(&TypeId::of::<Q>())
    }

    /// Number of query types with a registered handler.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Execute a query against its registered handler.
    pub async fn execute<Q: Query>(&self, query: Q) -> Result<Q::Result, QueryError> {
        let result = self
            .execute_erased(TypeId::of::<Q>(), Box::new(query))
            .await?;
        result
            .downcast::<Q::Result>()
            .map(|result| *result)
            .map_err(|_| QueryError::ExecutionFailed("result type mismatch".into()))
    }

    pub(crate) async fn execute_erased(
        &self,
        type_id: TypeId,
        query: Box<dyn Any + Send>,
    ) -> Result<Box<dyn Any + Send>, QueryError> {
        let handler = self
            .handlers
            .get(&type_id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(QueryError::HandlerNotFound)?;
        handler.handle_erased(query).await
    }
}

impl Default for QueryBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    struct GetUserQuery {
        user_id: String,
    }

    impl Query for GetUserQuery {
        type Result = User;
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct User {
        id: String,
        email: String,
    }

    struct GetUserHandler;

    #[async_trait]
    impl QueryHandler<GetUserQuery> for GetUserHandler {
        async fn handle(&self, query: GetUserQuery) -> Result<User, QueryError> {
            if query.user_id.is_empty() {
                return Err(QueryError::NotFound("empty user id".to_string()));
            }
            Ok(User {
                email: format!("{}@example.com", query.user_id),
                id: query.user_id,
            })
        }
    }

    #[tokio::test]
    async fn executes_registered_handler() {
        let bus = QueryBus::new();
        bus.register::<GetUserQuery, _>(GetUserHandler);

        let user = bus
            .execute(GetUserQuery {
                user_id: "user-123".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(user.id, "user-123");
        assert_eq!(user.email, "user-123@example.com");
    }

    #[tokio::test]
    async fn missing_handler_is_an_error() {
        let bus = QueryBus::new();
        let result = bus
            .execute(GetUserQuery {
                user_id: "user-123".to_string(),
            })
            .await;
        assert!(matches!(result, Err(QueryError::HandlerNotFound)));
    }

    #[tokio::test]
    async fn handler_errors_propagate() {
        let bus = QueryBus::new();
        bus.register::<GetUserQuery, _>(GetUserHandler);

        let result = bus
            .execute(GetUserQuery {
                user_id: String::new(),
            })
            .await;
        assert!(matches!(result, Err(QueryError::NotFound(_))));
    }
}
