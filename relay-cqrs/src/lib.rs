//! Command/query contracts and the typed dispatch runtime for Relay.
//!
//! Commands and queries are plain structs tagged with a marker trait naming
//! their result type. Each request type is served by exactly one handler,
//! held in a typed registry (`CommandBus`/`QueryBus`) keyed by request type
//! identity. The `Dispatcher` wraps every dispatch in an ordered pipeline of
//! behavior stages.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use relay_cqrs::*;
//! use async_trait::async_trait;
//!
//! struct CreateUserCommand {
//!     email: String,
//! }
//!
//! impl Command for CreateUserCommand {
//!     type Result = String; // user id
//! }
//!
//! struct CreateUserHandler;
//!
//! #[async_trait]
//! impl CommandHandler<CreateUserCommand> for CreateUserHandler {
//!     async fn handle(&self, command: CreateUserCommand) -> Result<String, CommandError> {
//!         Ok(format!("user-{}", command.email))
//!     }
//! }
//!
//! # async fn demo() -> Result<(), DispatchError> {
//! let commands = std::sync::Arc::new(CommandBus::new());
//! let queries = std::sync::Arc::new(QueryBus::new());
//! commands.register::<CreateUserCommand, _>(CreateUserHandler);
//!
//! let dispatcher = Dispatcher::new(commands, queries);
//! let user_id = dispatcher
//!     .send_command(CreateUserCommand { email: "alice@example.com".into() })
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! Handlers are normally registered through module descriptors and the
//! bootstrap entry point in `relay-registry`, not by calling the buses
//! directly.

pub mod command;
pub mod dispatch;
pub mod pipeline;
pub mod query;

pub use command::{Command, CommandBus, CommandError, CommandHandler};
pub use dispatch::{DispatchError, Dispatcher};
pub use pipeline::{
    DispatchBehavior, DispatchContext, DispatchPipeline, DispatchResult, Next, Outcome,
    RequestKind,
};
pub use query::{Query, QueryBus, QueryError, QueryHandler};
