//! Builds a five-stage pipeline over a counter.
//!
//! Run with `cargo run -p conveyor --example basic`. Expected log lines:
//! `context=Counter { value: 0 }` followed by `context=Counter { value: 42 }`,
//! then the first middleware reports the final value once the chain unwinds.
//! The fifth middleware is never reached because the fourth stops the chain.

use conveyor::prelude::*;
use tracing::info;

#[derive(Debug, Default)]
struct Counter {
    value: i64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ConfigLoader::new()
        .with_defaults()
        .with_optional_file("conveyor.toml")?
        .with_env_prefix("CONVEYOR")
        .load()?;
    init_logging(&config.logging)?;

    let mut pipeline = config.build_pipeline::<Counter>();

    pipeline.push(
        from_fn(|ctx: &mut Counter, next| {
            Box::pin(async move {
                info!(context = ?ctx, "received");
                next.run(ctx).await?;
                info!(value = ctx.value, "chain finished");
                Ok::<(), PipelineError>(())
            })
        })
        .named("log-input"),
    );

    pipeline
        .push(
            sync_fn(|ctx: &mut Counter| {
                ctx.value += 21;
                Ok(Flow::Continue)
            })
            .named("add-21"),
        )
        .push(
            from_fn(|ctx: &mut Counter, next| {
                Box::pin(async move {
                    tokio::task::yield_now().await;
                    ctx.value *= 2;
                    next.run(ctx).await
                })
            })
            .named("double"),
        );

    pipeline.push(
        sync_fn(|ctx: &mut Counter| {
            info!(context = ?ctx, "result");
            Ok(Flow::Stop)
        })
        .named("log-result"),
    );

    pipeline.push(
        sync_fn(|_ctx: &mut Counter| {
            info!("this will not be logged");
            Ok(Flow::Continue)
        })
        .named("unreachable"),
    );

    let mut ctx = Counter::default();
    let report = pipeline.execute_with_report(&mut ctx).await?;

    info!(
        invoked = report.invoked,
        completed = report.completed,
        value = ctx.value,
        "done"
    );
    Ok(())
}
