//! # Conveyor Pipeline
//!
//! An ordered middleware pipeline with explicit continuations.
//!
//! A [`Pipeline`] holds middlewares in insertion order. [`Pipeline::execute`]
//! hands a single borrowed context to the first one; each middleware decides
//! whether the chain continues by awaiting [`Next::run`], and any code after
//! that await sees what the downstream middlewares did.
//!
//! ```text
//! execute(ctx) ─► m0 ─run─► m1 ─run─► m2 ─(no run)─╳ m3
//!                 m0 ◄───── m1 ◄───── m2
//!                 └──────── same &mut ctx ─────────┘
//! ```
//!
//! ## Guarantees
//!
//! - **Ordering**: middleware *i* starts before *i+1*, and work it awaits
//!   before calling its continuation has finished by then.
//! - **Nesting**: `next.run(ctx).await` resolves after every downstream
//!   middleware, with the first downstream error.
//! - **At most once**: a continuation run twice fails the run with
//!   [`PipelineError::DuplicateAdvance`].
//! - **Short-circuit**: a middleware that never runs its continuation ends the
//!   run cleanly.
//! - **Past the end**: running the continuation of the last middleware is a
//!   clean finish.
//!
//! ## Example
//!
//! ```
//! use conveyor_pipeline::{from_fn, Flow, Pipeline, PipelineError, PipelineResult};
//!
//! struct Value {
//!     value: i64,
//!     seen: Option<i64>,
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> PipelineResult<()> {
//! let mut pipeline = Pipeline::<Value>::new();
//! pipeline.push(from_fn(|ctx: &mut Value, next| {
//!     Box::pin(async move {
//!         next.run(ctx).await?;
//!         ctx.seen = Some(ctx.value);
//!         Ok::<(), PipelineError>(())
//!     })
//! }));
//! pipeline.push_fn(|ctx: &mut Value| {
//!     ctx.value += 1;
//!     Ok(Flow::Continue)
//! });
//! pipeline.push_fn(|ctx: &mut Value| {
//!     ctx.value *= 10;
//!     Ok(Flow::Stop)
//! });
//! pipeline.push_fn(|_ctx: &mut Value| unreachable!("short-circuited"));
//!
//! let mut ctx = Value { value: 2, seen: None };
//! pipeline.execute(&mut ctx).await?;
//! assert_eq!(ctx.value, 30);
//! assert_eq!(ctx.seen, Some(30));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod context;
pub mod error;
pub mod middleware;
pub mod pipeline;

// Re-export main types at crate root
pub use context::Context;
pub use error::{BoxError, PipelineError, PipelineResult};
pub use middleware::{
    from_fn, sync_fn, BoxFuture, BoxedMiddleware, Flow, FnMiddleware, Middleware, Next,
    SyncMiddleware,
};
pub use pipeline::{ExecutionReport, Pipeline, PipelineSettings, StepLogging};
