use async_trait::async_trait;
use futures_util::future::BoxFuture;

mod context;
pub mod middleware;
mod next;
pub mod request;
pub mod response;
mod state;

pub use context::Context;
pub use middleware::{Middleware, MiddlewareFn, from_fn};
pub use next::Next;
pub use request::{AcceptLanguage, LanguageTag, RouteParams};
pub use response::Response;
pub use state::{State, StateKey};

/// How a link of the chain finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// The link completed; the response built so far is emitted.
    Continue,
    /// The link already wrote its response (status, redirect) and the rest of
    /// the chain must not run. Not an error, nothing is logged.
    Cancelled,
}

impl Flow {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Flow::Cancelled)
    }
}

pub type HandlerResult = crate::Result<Flow>;

pub fn done() -> HandlerResult {
    Ok(Flow::Continue)
}

pub fn cancelled() -> HandlerResult {
    Ok(Flow::Cancelled)
}

/// Terminal handler of a route.
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    async fn call(&self, ctx: &mut Context) -> HandlerResult;
}

/// HandlerFn wrapper for closures
#[derive(Clone)]
pub struct HandlerFn<F> {
    f: F,
}

#[async_trait]
impl<F> Handler for HandlerFn<F>
where
    F: for<'a> Fn(&'a mut Context) -> BoxFuture<'a, HandlerResult> + Send + Sync + 'static,
{
    async fn call(&self, ctx: &mut Context) -> HandlerResult {
        (self.f)(ctx).await
    }
}

pub fn from_async_handler<F>(f: F) -> HandlerFn<F>
where
    F: for<'a> Fn(&'a mut Context) -> BoxFuture<'a, HandlerResult> + Send + Sync + 'static,
{
    HandlerFn { f }
}
