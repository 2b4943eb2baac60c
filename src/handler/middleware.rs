use super::{Context, HandlerResult, Next};
use async_trait::async_trait;
use futures_util::future::BoxFuture;

/// Trait for middleware handlers.
///
/// A middleware sees the request before the rest of the chain and decides
/// whether the rest runs at all: it continues by awaiting `next.run(ctx)` and
/// short-circuits by returning without doing so.
#[async_trait]
pub trait Middleware: Send + Sync + 'static {
    async fn call(&self, ctx: &mut Context, next: Next<'_>) -> HandlerResult;
}

/// Middleware built from a closure, see [`from_fn`].
#[derive(Clone)]
pub struct MiddlewareFn<F>(F);

#[async_trait]
impl<F> Middleware for MiddlewareFn<F>
where
    F: for<'a> Fn(&'a mut Context, Next<'a>) -> BoxFuture<'a, HandlerResult>
        + Send
        + Sync
        + 'static,
{
    async fn call(&self, ctx: &mut Context, next: Next<'_>) -> HandlerResult {
        (self.0)(ctx, next).await
    }
}

/// Wraps a closure as middleware.
///
/// ```ignore
/// app.use_with(from_fn(|ctx, next| Box::pin(async move {
///     ctx.set("seen", true);
///     next.run(ctx).await
/// })));
/// ```
pub fn from_fn<F>(f: F) -> MiddlewareFn<F>
where
    F: for<'a> Fn(&'a mut Context, Next<'a>) -> BoxFuture<'a, HandlerResult>
        + Send
        + Sync
        + 'static,
{
    MiddlewareFn(f)
}
