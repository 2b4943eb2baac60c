use crate::handler::{Context, HandlerResult, Middleware, Next, StateKey};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Identity attached to a request that presented a usable session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// The token value itself, e.g. the email the user signed in with.
    pub subject: String,
    /// When this request established the session: the login time for a
    /// freshly issued cookie, the arrival time for one read back. The cookie
    /// carries no issue time of its own.
    pub loaded_at: DateTime<Utc>,
}

impl Session {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            loaded_at: Utc::now(),
        }
    }
}

/// Where the session lives in request state.
pub const SESSION_KEY: StateKey<Session> = StateKey::new("Session");

/// Public extension trait for accessing the session of a request.
pub trait SessionExt {
    fn session(&self) -> Option<&Session>;
}

impl SessionExt for Context {
    fn session(&self) -> Option<&Session> {
        self.typed(&SESSION_KEY)
    }
}

/// Copies a non-empty session cookie into request state.
///
/// Never rejects a request; gating is [`AuthMiddleware`](super::AuthMiddleware)'s job.
#[derive(Debug, Clone)]
pub struct LoadSession {
    cookie_name: String,
}

impl LoadSession {
    pub fn new(cookie_name: impl Into<String>) -> Self {
        Self {
            cookie_name: cookie_name.into(),
        }
    }
}

impl Default for LoadSession {
    fn default() -> Self {
        Self::new("session")
    }
}

#[async_trait]
impl Middleware for LoadSession {
    async fn call(&self, ctx: &mut Context, next: Next<'_>) -> HandlerResult {
        if let Some(subject) = ctx.cookie(&self.cookie_name).filter(|value| !value.is_empty()) {
            ctx.set_typed(&SESSION_KEY, Session::new(subject));
        }

        next.run(ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{done, from_async_handler};
    use bytes::Bytes;
    use hyper::Request;
    use std::sync::Arc;

    async fn load(cookie: Option<&str>) -> Option<Session> {
        let mut builder = Request::builder().uri("/");
        if let Some(cookie) = cookie {
            builder = builder.header("Cookie", cookie);
        }
        let mut ctx = Context::new(builder.body(Bytes::new()).unwrap());

        let stack: Vec<Arc<dyn Middleware>> = vec![Arc::new(LoadSession::default())];
        let endpoint = from_async_handler(|_ctx| Box::pin(async move { done() }));
        Next::new(&stack, &endpoint).run(&mut ctx).await.unwrap();

        ctx.session().cloned()
    }

    #[tokio::test]
    async fn test_loads_cookie_into_state() {
        let before = Utc::now();
        let session = load(Some("session=xun@example.com")).await.unwrap();
        assert_eq!(session.subject, "xun@example.com");
        assert!(session.loaded_at >= before);
    }

    #[tokio::test]
    async fn test_missing_or_empty_cookie_loads_nothing() {
        assert!(load(None).await.is_none());
        assert!(load(Some("session=")).await.is_none());
        assert!(load(Some("other=1")).await.is_none());
    }
}
