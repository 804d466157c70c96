//! Core middleware trait and the continuation handed to each middleware.
//!
//! A middleware receives the shared context and a [`Next`] handle. Awaiting
//! [`Next::run`] dispatches the rest of the chain and resolves once it has
//! finished, so code after the await sees every downstream mutation. Not
//! calling it short-circuits the chain.
//!
//! # Example
//!
//! ```
//! use conveyor_pipeline::{BoxFuture, Middleware, Next, PipelineError, PipelineResult};
//!
//! struct Counter {
//!     hits: u32,
//!     after: u32,
//! }
//!
//! struct CountHits;
//!
//! impl Middleware<Counter> for CountHits {
//!     fn name(&self) -> &str {
//!         "count-hits"
//!     }
//!
//!     fn handle<'a>(
//!         &'a self,
//!         ctx: &'a mut Counter,
//!         next: Next<'a, Counter>,
//!     ) -> BoxFuture<'a, PipelineResult<()>> {
//!         Box::pin(async move {
//!             ctx.hits += 1;
//!             next.run(ctx).await?;
//!             ctx.after = ctx.hits;
//!             Ok::<(), PipelineError>(())
//!         })
//!     }
//! }
//! ```

use crate::error::{PipelineError, PipelineResult};
use crate::pipeline::StepLogging;
use parking_lot::Mutex;
use std::future::{ready, Future};
use std::pin::Pin;
use std::sync::Arc;

/// A boxed future returned by middleware.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A type-erased middleware that can be stored in a vector.
///
/// `C` must be `'static` because [`Middleware`] is.
pub type BoxedMiddleware<C> = Arc<dyn Middleware<C>>;

/// The core middleware trait.
///
/// # Invariants
///
/// - A middleware runs the rest of the chain at most once. A second call to
///   [`Next::run`] fails the whole run with [`PipelineError::DuplicateAdvance`].
/// - The context is borrowed for the duration of `handle` only.
/// - Work the middleware awaits before calling [`Next::run`] finishes before
///   the following middleware starts.
pub trait Middleware<C>: Send + Sync + 'static {
    /// Name used in logs and errors.
    fn name(&self) -> &str {
        "anonymous"
    }

    /// Process the context, optionally running the rest of the chain.
    fn handle<'a>(
        &'a self,
        ctx: &'a mut C,
        next: Next<'a, C>,
    ) -> BoxFuture<'a, PipelineResult<()>>;
}

impl<C, M> Middleware<C> for Arc<M>
where
    M: Middleware<C> + ?Sized,
{
    fn name(&self) -> &str {
        (**self).name()
    }

    fn handle<'a>(
        &'a self,
        ctx: &'a mut C,
        next: Next<'a, C>,
    ) -> BoxFuture<'a, PipelineResult<()>> {
        (**self).handle(ctx, next)
    }
}

/// Per-run execution cursor.
///
/// Shared by every continuation of one run. Positions are claimed in
/// increasing order only, so a continuation asking again for a position the
/// run already reached is a repeated call.
#[derive(Debug, Default)]
pub(crate) struct Cursor {
    last_dispatched: Option<usize>,
    invoked: usize,
    reached_end: bool,
    fault: Option<(usize, String)>,
}

impl Cursor {
    /// Claims `index`, returning `false` if the run already got that far.
    pub(crate) fn claim(&mut self, index: usize) -> bool {
        if self.last_dispatched.is_some_and(|last| index <= last) {
            return false;
        }
        self.last_dispatched = Some(index);
        true
    }

    fn record_fault(&mut self, index: usize, middleware: &str) {
        if self.fault.is_none() {
            self.fault = Some((index, middleware.to_string()));
        }
    }

    /// Number of middlewares handed the context so far.
    pub(crate) fn invoked(&self) -> usize {
        self.invoked
    }

    /// `true` once a continuation ran past the last middleware.
    pub(crate) fn reached_end(&self) -> bool {
        self.reached_end
    }

    /// The first repeated continuation call of the run, if any.
    pub(crate) fn take_fault(&mut self) -> Option<PipelineError> {
        self.fault
            .take()
            .map(|(index, middleware)| PipelineError::DuplicateAdvance { index, middleware })
    }
}

/// Hands `ctx` to the middleware at `index`, or finishes the run if there is
/// none. The caller must already hold the claim on `index`.
pub(crate) fn dispatch<'a, C: 'static>(
    stack: &'a [BoxedMiddleware<C>],
    cursor: &'a Mutex<Cursor>,
    steps: StepLogging,
    index: usize,
    ctx: &'a mut C,
) -> BoxFuture<'a, PipelineResult<()>> {
    let Some(middleware) = stack.get(index) else {
        cursor.lock().reached_end = true;
        return Box::pin(ready(Ok(())));
    };

    cursor.lock().invoked += 1;
    steps.dispatching(index, middleware.name());
    middleware.handle(
        ctx,
        Next {
            stack,
            cursor,
            steps,
            index,
        },
    )
}

/// Continuation for the middleware at a given position.
///
/// `Next` borrows the run's middleware stack and cursor, so it cannot
/// outlive the invocation it was handed to.
pub struct Next<'a, C> {
    stack: &'a [BoxedMiddleware<C>],
    cursor: &'a Mutex<Cursor>,
    steps: StepLogging,
    index: usize,
}

impl<'a, C: 'static> Next<'a, C> {
    /// Runs the rest of the chain over `ctx`.
    ///
    /// Resolves after every downstream middleware has finished, with the
    /// first downstream error if there was one. Running past the last
    /// middleware resolves immediately with `Ok(())`.
    ///
    /// `run` borrows the continuation so that a second call can be detected:
    /// it returns [`PipelineError::DuplicateAdvance`] without dispatching
    /// anything, and the run fails even if the caller discards that error.
    pub fn run<'b>(&'b self, ctx: &'b mut C) -> BoxFuture<'b, PipelineResult<()>> {
        let position = self.index + 1;

        let mut cursor = self.cursor.lock();
        if !cursor.claim(position) {
            let middleware = self.name();
            cursor.record_fault(self.index, middleware);
            drop(cursor);

            tracing::warn!(
                index = self.index,
                middleware,
                "next() called multiple times"
            );
            return Box::pin(ready(Err(PipelineError::DuplicateAdvance {
                index: self.index,
                middleware: middleware.to_string(),
            })));
        }
        drop(cursor);

        dispatch(self.stack, self.cursor, self.steps, position, ctx)
    }

    /// Position of the middleware this continuation belongs to.
    #[must_use]
    pub fn position(&self) -> usize {
        self.index
    }

    /// `true` if no middleware follows this one.
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.index + 1 >= self.stack.len()
    }

    fn name(&self) -> &'a str {
        self.stack
            .get(self.index)
            .map_or("anonymous", |middleware| middleware.name())
    }
}

impl<C: 'static> std::fmt::Debug for Next<'_, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Next")
            .field("index", &self.index)
            .field("middleware", &self.name())
            .field("remaining", &self.stack.len().saturating_sub(self.index + 1))
            .finish()
    }
}

/// A middleware built from an async closure.
///
/// Created with [`from_fn`].
pub struct FnMiddleware<F> {
    name: &'static str,
    func: F,
}

impl<F> FnMiddleware<F> {
    /// Renames the middleware.
    #[must_use]
    pub fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }
}

/// Creates a middleware from a closure returning a boxed future.
///
/// # Example
///
/// ```
/// use conveyor_pipeline::{from_fn, Context, Pipeline};
///
/// let mut pipeline = Pipeline::<Context>::new();
/// pipeline.push(from_fn(|ctx: &mut Context, next| {
///     Box::pin(async move {
///         ctx.set("seen", true);
///         next.run(ctx).await
///     })
/// }));
/// ```
pub fn from_fn<C, F>(func: F) -> FnMiddleware<F>
where
    F: for<'a> Fn(&'a mut C, Next<'a, C>) -> BoxFuture<'a, PipelineResult<()>>
        + Send
        + Sync
        + 'static,
{
    FnMiddleware {
        name: "anonymous",
        func,
    }
}

impl<C, F> Middleware<C> for FnMiddleware<F>
where
    F: for<'a> Fn(&'a mut C, Next<'a, C>) -> BoxFuture<'a, PipelineResult<()>>
        + Send
        + Sync
        + 'static,
{
    fn name(&self) -> &str {
        self.name
    }

    fn handle<'a>(
        &'a self,
        ctx: &'a mut C,
        next: Next<'a, C>,
    ) -> BoxFuture<'a, PipelineResult<()>> {
        (self.func)(ctx, next)
    }
}

/// What a synchronous middleware wants to happen after it returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Run the rest of the chain.
    Continue,
    /// End the run here.
    Stop,
}

/// A middleware built from a synchronous closure.
///
/// The closure runs before the rest of the chain. Created with [`sync_fn`]
/// or [`Pipeline::push_fn`](crate::Pipeline::push_fn).
pub struct SyncMiddleware<F> {
    name: &'static str,
    func: F,
}

impl<F> SyncMiddleware<F> {
    /// Renames the middleware.
    #[must_use]
    pub fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }
}

/// Creates a middleware from a synchronous closure.
///
/// # Example
///
/// ```
/// use conveyor_pipeline::{sync_fn, Flow, Pipeline};
///
/// let pipeline = Pipeline::<Vec<String>>::new()
///     .with(sync_fn(|log: &mut Vec<String>| {
///         log.push("checked".to_string());
///         Ok(Flow::Continue)
///     }));
/// assert_eq!(pipeline.len(), 1);
/// ```
pub fn sync_fn<C, F>(func: F) -> SyncMiddleware<F>
where
    F: Fn(&mut C) -> PipelineResult<Flow> + Send + Sync + 'static,
{
    SyncMiddleware {
        name: "anonymous",
        func,
    }
}

impl<C, F> Middleware<C> for SyncMiddleware<F>
where
    C: Send + 'static,
    F: Fn(&mut C) -> PipelineResult<Flow> + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        self.name
    }

    fn handle<'a>(
        &'a self,
        ctx: &'a mut C,
        next: Next<'a, C>,
    ) -> BoxFuture<'a, PipelineResult<()>> {
        Box::pin(async move {
            match (self.func)(ctx)? {
                Flow::Continue => next.run(ctx).await,
                Flow::Stop => Ok(()),
            }
        })
    }
}
