use super::{Context, Handler, HandlerResult, Middleware};
use std::sync::Arc;

/// The remainder of a middleware chain.
///
/// Handed to every [`Middleware`]; calling [`Next::run`] executes the next
/// middleware, or the route handler once the stack is exhausted. Dropping it
/// without running stops the chain.
pub struct Next<'a> {
    stack: &'a [Arc<dyn Middleware>],
    endpoint: &'a dyn Handler,
}

impl<'a> Next<'a> {
    pub fn new(stack: &'a [Arc<dyn Middleware>], endpoint: &'a dyn Handler) -> Self {
        Self { stack, endpoint }
    }

    pub async fn run(self, ctx: &mut Context) -> HandlerResult {
        match self.stack.split_first() {
            Some((current, rest)) => {
                let next = Next {
                    stack: rest,
                    endpoint: self.endpoint,
                };
                current.call(ctx, next).await
            }
            None => self.endpoint.call(ctx).await,
        }
    }

    /// Number of middleware left before the handler.
    pub fn remaining(&self) -> usize {
        self.stack.len()
    }
}
