//! Ordered middleware pipeline.
//!
//! A [`Pipeline`] owns an append-only sequence of middlewares. Each call to
//! [`Pipeline::execute`] hands one borrowed context to position 0; every
//! further position is reached through the [`Next`](crate::Next)
//! continuation of the one before it.
//!
//! Continuations look the following middleware up by index in the shared
//! stack, so no chain of closures is built ahead of a run. Downstream work
//! runs inside the caller's `next.run(ctx).await`, which means polling
//! nests one level per middleware that is waiting on its continuation.

use crate::error::PipelineResult;
use crate::middleware::{dispatch, sync_fn, BoxedMiddleware, Cursor, Flow, Middleware};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::Instrument;

/// Level of the event emitted each time a middleware is dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepLogging {
    /// No per-step events.
    Off,
    /// `TRACE` events.
    #[default]
    Trace,
    /// `DEBUG` events.
    Debug,
    /// `INFO` events.
    Info,
}

impl StepLogging {
    pub(crate) fn dispatching(self, index: usize, middleware: &str) {
        match self {
            Self::Off => {}
            Self::Trace => tracing::trace!(index, middleware, "dispatching middleware"),
            Self::Debug => tracing::debug!(index, middleware, "dispatching middleware"),
            Self::Info => tracing::info!(index, middleware, "dispatching middleware"),
        }
    }
}

/// Settings that shape how a pipeline reports its runs.
///
/// Deserializes from a `[pipeline]` configuration table; missing keys keep
/// their defaults and unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineSettings {
    /// Name recorded on the `pipeline.execute` span.
    pub name: String,

    /// Level of the per-step "dispatching middleware" event.
    pub step_logging: StepLogging,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            name: "pipeline".to_string(),
            step_logging: StepLogging::default(),
        }
    }
}

/// Summary of a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionReport {
    /// Number of middlewares that were invoked.
    pub invoked: usize,

    /// `true` if a continuation ran past the last middleware, `false` if a
    /// middleware short-circuited the chain.
    pub completed: bool,
}

/// An append-only chain of middlewares over a context of type `C`.
///
/// # Example
///
/// ```
/// use conveyor_pipeline::{from_fn, Context, Flow, Pipeline, PipelineError};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> conveyor_pipeline::PipelineResult<()> {
/// let mut pipeline = Pipeline::<Context>::new();
/// pipeline.push(from_fn(|ctx: &mut Context, next| {
///     Box::pin(async move {
///         next.run(ctx).await?;
///         let value = ctx.get_i64("value").unwrap_or(0);
///         ctx.set("seen", value);
///         Ok::<(), PipelineError>(())
///     })
/// }));
/// pipeline.push_fn(|ctx| {
///     let value = ctx.get_i64("value").unwrap_or(0);
///     ctx.set("value", value + 21);
///     Ok(Flow::Continue)
/// });
/// pipeline.push_fn(|ctx| {
///     let value = ctx.get_i64("value").unwrap_or(0);
///     ctx.set("value", value * 2);
///     Ok(Flow::Continue)
/// });
///
/// let mut ctx = Context::new().with("value", 0);
/// pipeline.execute(&mut ctx).await?;
/// assert_eq!(ctx.get_i64("seen"), Some(42));
/// # Ok(())
/// # }
/// ```
pub struct Pipeline<C> {
    stack: Vec<BoxedMiddleware<C>>,
    settings: PipelineSettings,
}

impl<C: Send + 'static> Pipeline<C> {
    /// Creates an empty pipeline with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_settings(PipelineSettings::default())
    }

    /// Creates an empty pipeline with the given settings.
    #[must_use]
    pub fn with_settings(settings: PipelineSettings) -> Self {
        Self {
            stack: Vec::new(),
            settings,
        }
    }

    /// Creates a pipeline holding an initial sequence of middlewares.
    pub fn from_middlewares<I>(middlewares: I) -> Self
    where
        I: IntoIterator<Item = BoxedMiddleware<C>>,
    {
        let mut pipeline = Self::new();
        pipeline.push_all(middlewares);
        pipeline
    }

    /// Appends a middleware to the end of the chain.
    pub fn push<M: Middleware<C>>(&mut self, middleware: M) -> &mut Self {
        self.stack.push(Arc::new(middleware));
        self
    }

    /// Appends already boxed middlewares in iteration order.
    pub fn push_all<I>(&mut self, middlewares: I) -> &mut Self
    where
        I: IntoIterator<Item = BoxedMiddleware<C>>,
    {
        self.stack.extend(middlewares);
        self
    }

    /// Appends a synchronous closure as a middleware.
    ///
    /// The closure runs before the rest of the chain and returns whether the
    /// chain continues.
    pub fn push_fn<F>(&mut self, func: F) -> &mut Self
    where
        F: Fn(&mut C) -> PipelineResult<Flow> + Send + Sync + 'static,
    {
        self.push(sync_fn(func))
    }

    /// Builder-style [`push`](Self::push).
    #[must_use]
    pub fn with<M: Middleware<C>>(mut self, middleware: M) -> Self {
        self.push(middleware);
        self
    }

    /// Returns the number of middlewares.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// Returns `true` if no middleware was pushed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Returns the names of all middlewares in order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.stack.iter().map(|m| m.name()).collect()
    }

    /// Returns the pipeline settings.
    #[must_use]
    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Runs the chain over `ctx`.
    ///
    /// Resolves once the first middleware has finished, which includes every
    /// downstream middleware it ran through its continuation.
    ///
    /// # Errors
    ///
    /// - Whatever error reaches the first middleware's result, unchanged.
    ///   A downstream error travels up through each upstream `next.run`
    ///   until some middleware handles it.
    /// - [`PipelineError::DuplicateAdvance`](crate::PipelineError::DuplicateAdvance)
    ///   if a middleware ran its continuation more than once, even when that
    ///   middleware ignored the error.
    pub async fn execute(&self, ctx: &mut C) -> PipelineResult<()> {
        self.execute_with_report(ctx).await.map(|_| ())
    }

    /// Runs the chain over `ctx` and reports how far it got.
    pub async fn execute_with_report(&self, ctx: &mut C) -> PipelineResult<ExecutionReport> {
        let span = tracing::debug_span!(
            "pipeline.execute",
            pipeline = %self.settings.name,
            middlewares = self.stack.len()
        );
        self.run(ctx).instrument(span).await
    }

    async fn run(&self, ctx: &mut C) -> PipelineResult<ExecutionReport> {
        let cursor = Mutex::new(Cursor::default());
        cursor.lock().claim(0);

        let result = dispatch(&self.stack, &cursor, self.settings.step_logging, 0, ctx).await;

        let mut cursor = cursor.into_inner();
        result?;
        if let Some(fault) = cursor.take_fault() {
            return Err(fault);
        }

        let report = ExecutionReport {
            invoked: cursor.invoked(),
            completed: cursor.reached_end(),
        };
        if report.completed {
            tracing::debug!(invoked = report.invoked, "pipeline completed");
        } else {
            tracing::debug!(invoked = report.invoked, "pipeline short-circuited");
        }
        Ok(report)
    }
}

impl<C: Send + 'static> Default for Pipeline<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Send + 'static> FromIterator<BoxedMiddleware<C>> for Pipeline<C> {
    fn from_iter<I: IntoIterator<Item = BoxedMiddleware<C>>>(iter: I) -> Self {
        Self::from_middlewares(iter)
    }
}

impl<C: Send + 'static> Extend<BoxedMiddleware<C>> for Pipeline<C> {
    fn extend<I: IntoIterator<Item = BoxedMiddleware<C>>>(&mut self, iter: I) {
        self.push_all(iter);
    }
}

impl<C: Send + 'static> std::fmt::Debug for Pipeline<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("settings", &self.settings)
            .field("middlewares", &self.names())
            .finish()
    }
}
