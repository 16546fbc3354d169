//! Dispatch pipeline: behavior stages wrapped around every request dispatch.

use crate::dispatch::DispatchError;
use async_trait::async_trait;
use std::any::Any;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Kind of request travelling through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Command,
    Query,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::Command => "command",
            RequestKind::Query => "query",
        }
    }
}

/// Context handed to each behavior stage.
#[derive(Debug, Clone, Copy)]
pub struct DispatchContext {
    /// Unqualified type name of the request being dispatched.
    pub request_name: &'static str,
    pub kind: RequestKind,
}

/// Type-erased result travelling through the pipeline.
pub type DispatchResult = Result<Box<dyn Any + Send>, DispatchError>;

/// Remainder of the pipeline, ending at the registered handler.
pub type Next = Pin<Box<dyn Future<Output = DispatchResult> + Send>>;

/// Outcome-indicating wrapper consulted by result-aware stages.
pub trait Outcome {
    /// Whether the dispatch succeeded.
    fn succeeded(&self) -> bool;
}

impl<T, E> Outcome for Result<T, E> {
    fn succeeded(&self) -> bool {
        self.is_ok()
    }
}

/// A stage wrapped around every dispatch.
///
/// Stages run before and after the rest of the chain by awaiting `next` in
/// the middle of their own logic.
#[async_trait]
pub trait DispatchBehavior: Send + Sync {
    async fn around(&self, context: DispatchContext, next: Next) -> DispatchResult;
}

/// Ordered collection of behavior stages.
///
/// The first stage added is the outermost wrapper around the handler call.
#[derive(Clone, Default)]
pub struct DispatchPipeline {
    stages: Vec<Arc<dyn DispatchBehavior>>,
}

impl DispatchPipeline {
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Append a stage to the pipeline.
    pub fn with<B>(mut self, stage: B) -> Self
    where
        B: DispatchBehavior + 'static,
    {
        self.stages.push(Arc::new(stage));
        self
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Wrap the core dispatch future in every stage, innermost-last.
    pub(crate) fn wrap(&self, context: DispatchContext, core: Next) -> Next {
        let mut next = core;
        for stage in self.stages.iter().rev() {
            let stage = Arc::clone(stage);
            next = Box::pin(async move { stage.around(context, next).await });
        }
        next
    }
}

impl std::fmt::Debug for DispatchPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchPipeline")
            .field("stages", &self.stages.len())
            .finish()
    }
}
