//! Dispatch pipeline behaviors for Relay.

use async_trait::async_trait;
use relay_cqrs::{DispatchBehavior, DispatchContext, DispatchResult, Next, Outcome};
use std::time::Instant;
use tracing::{error, info};

/// Result-aware logging stage.
///
/// Logs every dispatch before the handler runs, then records the outcome:
/// info when the dispatch succeeded, error when it did not. Entries are
/// tagged with the request's type name and the elapsed time.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingBehavior;

#[async_trait]
impl DispatchBehavior for LoggingBehavior {
    async fn around(&self, context: DispatchContext, next: Next) -> DispatchResult {
        let started = Instant::now();
        info!(
            request = context.request_name,
            kind = context.kind.as_str(),
            "processing request"
        );

        let result = next.await;

        let elapsed = started.elapsed();
        if result.succeeded() {
            info!(
                request = context.request_name,
                elapsed = ?elapsed,
                "completed request"
            );
        } else {
            error!(
                request = context.request_name,
                elapsed = ?elapsed,
                "completed request with error"
            );
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_cqrs::{
        Command, CommandBus, CommandError, CommandHandler, DispatchError, DispatchPipeline,
        Dispatcher, QueryBus,
    };
    use std::sync::Arc;

    struct PingCommand {
        fail: bool,
    }

    impl Command for PingCommand {
        type Result = &'static str;
    }

    struct PingHandler;

    #[async_trait]
    impl CommandHandler<PingCommand> for PingHandler {
        async fn handle(&self, command: PingCommand) -> Result<&'static str, CommandError> {
            if command.fail {
                Err(CommandError::ExecutionFailed("ping failed".into()))
            } else {
                Ok("pong")
            }
        }
    }

    fn dispatcher() -> Dispatcher {
        let commands = Arc::new(CommandBus::new());
        commands.register::<PingCommand, _>(PingHandler);
        Dispatcher::new(commands, Arc::new(QueryBus::new()))
            .with_pipeline(DispatchPipeline::new().with(LoggingBehavior))
    }

    #[tokio::test]
    async fn passes_successful_results_through() {
        let result = dispatcher()
            .send_command(PingCommand { fail: false })
            .await
            .unwrap();
        assert_eq!(result, "pong");
    }

    #[tokio::test]
    async fn passes_failures_through_unchanged() {
        let result = dispatcher().send_command(PingCommand { fail: true }).await;
        assert!(matches!(
            result,
            Err(DispatchError::Command(CommandError::ExecutionFailed(_)))
        ));
    }
}
