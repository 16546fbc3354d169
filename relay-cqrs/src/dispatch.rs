//! The command/query dispatcher.
//!
//! The dispatcher is the single entry point request callers use. It looks up
//! the registered handler by request type, runs the dispatch pipeline around
//! the call, and returns the typed result.

use crate::command::{Command, CommandBus};
use crate::pipeline::{DispatchContext, DispatchPipeline, Next, RequestKind};
use crate::query::{Query, QueryBus};
use std::any::TypeId;
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced by the dispatcher.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Command(#[from] crate::command::CommandError),

    #[error(transparent)]
    Query(#[from] crate::query::QueryError),

    #[error("dispatched result had an unexpected type")]
    ResultType,
}

/// Unqualified name of a request type, used to tag pipeline log entries.
pub(crate) fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

/// Routes each request to its single registered handler.
///
/// One dispatcher is intended per logical request scope; the underlying buses
/// are shared and cheap to clone into as many dispatchers as needed.
pub struct Dispatcher {
    commands: Arc<CommandBus>,
    queries: Arc<QueryBus>,
    pipeline: DispatchPipeline,
}

impl Dispatcher {
    pub fn new(commands: Arc<CommandBus>, queries: Arc<QueryBus>) -> Self {
        Self {
            commands,
            queries,
            pipeline: DispatchPipeline::default(),
        }
    }

    /// Attach the pipeline stages wrapped around every dispatch.
    pub fn with_pipeline(mut self, pipeline: DispatchPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Dispatch a command through the pipeline to its registered handler.
    pub async fn send_command<C: Command>(&self, command: C) -> Result<C::Result, DispatchError> {
        let context = DispatchContext {
            request_name: short_type_name::<C>(),
            kind: RequestKind::Command,
        };

        let bus = Arc::clone(&self.commands);
        let core: Next = Box::pin(async move {
            bus.execute_erased(TypeId::of::<C>(), Box::new(command))
                .await
                .map_err(DispatchError::from)
        });

        let result = self.pipeline.wrap(context, core).await?;
        result
            .downcast::<C::Result>()
            .map(|result| *result)
            .map_err(|_| DispatchError::ResultType)
    }

    /// Dispatch a query through the pipeline to its registered handler.
    pub async fn send_query<Q: Query>(&self, query: Q) -> Result<Q::Result, DispatchError> {
        let context = DispatchContext {
            request_name: short_type_name::<Q>(),
            kind: RequestKind::Query,
        };

        let bus = Arc::clone(&self.queries);
        let core: Next = Box::pin(async move {
            bus.execute_erased(TypeId::of::<Q>(), Box::new(query))
                .await
                .map_err(DispatchError::from)
        });

        let result = self.pipeline.wrap(context, core).await?;
        result
            .downcast::<Q::Result>()
            .map(|result| *result)
            .map_err(|_| DispatchError::ResultType)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{CommandError, CommandHandler};
    use crate::pipeline::{DispatchBehavior, DispatchResult, Outcome};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RenameCommand {
        name: String,
    }

    impl Command for RenameCommand {
        type Result = String;
    }

    struct RenameHandler;

    #[async_trait]
    impl CommandHandler<RenameCommand> for RenameHandler {
        async fn handle(&self, command: RenameCommand) -> Result<String, CommandError> {
            if command.name.is_empty() {
                return Err(CommandError::Rejected("name must not be empty".into()));
            }
            Ok(command.name.to_lowercase())
        }
    }

    struct CountQuery;

    impl Query for CountQuery {
        type Result = usize;
    }

    struct CountHandler;

    #[async_trait]
    impl crate::query::QueryHandler<CountQuery> for CountHandler {
        async fn handle(&self, _query: CountQuery) -> Result<usize, crate::query::QueryError> {
            Ok(42)
        }
    }

    fn dispatcher() -> Dispatcher {
        let commands = Arc::new(CommandBus::new());
        let queries = Arc::new(QueryBus::new());
        commands.register::<RenameCommand, _>(RenameHandler);
        queries.register::<CountQuery, _>(CountHandler);
        Dispatcher::new(commands, queries)
    }

    #[tokio::test]
    async fn dispatches_commands_and_queries() {
        let dispatcher = dispatcher();

        let renamed = dispatcher
            .send_command(RenameCommand {
                name: "Widget".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(renamed, "widget");

        let count = dispatcher.send_query(CountQuery).await.unwrap();
        assert_eq!(count, 42);
    }

    #[tokio::test]
    async fn missing_handler_surfaces_as_dispatch_error() {
        struct Unregistered;
        impl Command for Unregistered {
            type Result = ();
        }

        let dispatcher = dispatcher();
        let result = dispatcher.send_command(Unregistered).await;
        assert!(matches!(
            result,
            Err(DispatchError::Command(CommandError::HandlerNotFound))
        ));
    }

    #[tokio::test]
    async fn pipeline_observes_both_outcomes() {
        struct Observer {
            outcomes: Arc<Mutex<Vec<bool>>>,
        }

        #[async_trait]
        impl DispatchBehavior for Observer {
            async fn around(&self, _context: DispatchContext, next: Next) -> DispatchResult {
                let result = next.await;
                self.outcomes.lock().unwrap().push(result.succeeded());
                result
            }
        }

        let outcomes = Arc::new(Mutex::new(Vec::new()));
        let dispatcher = dispatcher().with_pipeline(DispatchPipeline::new().with(Observer {
            outcomes: Arc::clone(&outcomes),
        }));

        dispatcher
            .send_command(RenameCommand {
                name: "Widget".to_string(),
            })
            .await
            .unwrap();
        let rejected = dispatcher
            .send_command(RenameCommand {
                name: String::new(),
            })
            .await;
        assert!(rejected.is_err());

        assert_eq!(*outcomes.lock().unwrap(), vec![true, false]);
    }

    #[test]
    fn short_names_drop_the_module_path() {
        assert_eq!(short_type_name::<RenameCommand>(), "RenameCommand");
        assert_eq!(short_type_name::<String>(), "String");
    }
}
