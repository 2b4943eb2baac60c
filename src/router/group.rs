use super::{Router, ScopeId, generate_methods};
use crate::handler::{Handler, Middleware};
use hyper::Method;
use std::sync::Arc;

/// Registration handle for a routing scope, see [`App::group`](crate::App::group).
///
/// Middleware added here runs after the parent scope's middleware and only
/// for routes declared in this group or its sub-groups.
pub struct Group<'r> {
    router: &'r mut Router,
    scope: ScopeId,
}

impl<'r> Group<'r> {
    pub(crate) fn new(router: &'r mut Router, scope: ScopeId) -> Self {
        Self { router, scope }
    }

    pub fn prefix(&self) -> &str {
        self.router.prefix(self.scope)
    }

    pub fn use_with<M: Middleware>(&mut self, middleware: M) -> &mut Self {
        self.router.use_with(self.scope, Arc::new(middleware));
        self
    }

    /// Nested group, its prefix appended to this one's.
    pub fn group(&mut self, prefix: &str) -> Group<'_> {
        let scope = self.router.scope(self.scope, prefix);
        Group::new(&mut *self.router, scope)
    }

    pub fn route<H: Handler>(&mut self, method: Method, path: &str, handler: H) -> &mut Self {
        self.router
            .route(self.scope, method, path, Arc::new(handler));
        self
    }
}

generate_methods! {
    Group<'_> => [get => GET, post => POST, put => PUT, delete => DELETE, patch => PATCH]
}
