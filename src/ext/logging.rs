use crate::handler::{Context, HandlerResult, Middleware, Next};
use async_trait::async_trait;
use log::{info, warn};
use std::time::Instant;

/// Middleware that logs each request once the rest of the chain has run.
///
/// Logs the method, matched route pattern, final status and elapsed time.
///
/// Example log output:
/// ```text
/// GET /user/{id} 200 (0.21 ms)
/// ```
#[derive(Debug, Clone)]
pub struct LoggingMiddleware;

#[async_trait]
impl Middleware for LoggingMiddleware {
    async fn call(&self, ctx: &mut Context, next: Next<'_>) -> HandlerResult {
        let start = Instant::now();
        let result = next.run(ctx).await;
        let elapsed = start.elapsed().as_secs_f64() * 1000.0;

        match &result {
            Ok(_) => info!(
                "{} {} {} ({:.2} ms)",
                ctx.method(),
                ctx.route_pattern(),
                ctx.response().sent_status().as_u16(),
                elapsed
            ),
            Err(err) => warn!(
                "{} {} {} ({:.2} ms): {}",
                ctx.method(),
                ctx.route_pattern(),
                err.status().as_u16(),
                elapsed,
                err
            ),
        }

        result
    }
}
