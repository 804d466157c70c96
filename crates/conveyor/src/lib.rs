//! # Conveyor
//!
//! Ordered async middleware pipelines over a shared context.
//!
//! - [`pipeline`]: the [`Pipeline`](pipeline::Pipeline) runner, middleware
//!   trait and continuation handle
//! - [`config`]: layered TOML/JSON/env configuration
//! - [`telemetry`]: `tracing` subscriber setup
//! - [`mediator`]: a chat room mediator that routes messages between members
//!
//! ## Quick Start
//!
//! ```
//! use conveyor::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> PipelineResult<()> {
//! let mut pipeline = Pipeline::<Context>::new();
//! pipeline.push(from_fn(|ctx: &mut Context, next| {
//!     Box::pin(async move {
//!         next.run(ctx).await?;
//!         let result = ctx.get_i64("value").unwrap_or_default();
//!         ctx.set("result", result);
//!         Ok::<(), PipelineError>(())
//!     })
//! }));
//! pipeline.push_fn(|ctx: &mut Context| {
//!     let value = ctx.get_i64("value").unwrap_or_default();
//!     ctx.set("value", value + 21);
//!     Ok(Flow::Continue)
//! });
//! pipeline.push_fn(|ctx: &mut Context| {
//!     let value = ctx.get_i64("value").unwrap_or_default();
//!     ctx.set("value", value * 2);
//!     Ok(Flow::Continue)
//! });
//!
//! let mut ctx = Context::new().with("value", 0);
//! pipeline.execute(&mut ctx).await?;
//! assert_eq!(ctx.get_i64("result"), Some(42));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub use conveyor_config as config;
pub use conveyor_mediator as mediator;
pub use conveyor_pipeline as pipeline;
pub use conveyor_telemetry as telemetry;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use conveyor_pipeline::{
        from_fn, sync_fn, BoxFuture, BoxedMiddleware, Context, ExecutionReport, Flow, Middleware,
        Next, Pipeline, PipelineError, PipelineResult, PipelineSettings, StepLogging,
    };

    pub use conveyor_config::{ConfigLoader, ConveyorConfig};

    pub use conveyor_telemetry::{init_logging, LogConfig, LogFormat};

    pub use conveyor_mediator::{ChatRoom, MediatorError, MediatorResult, Message};
}
