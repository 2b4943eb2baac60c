use super::ScopeId;
use crate::handler::Handler;
use std::sync::Arc;

/// A handler bound to one method of a route, remembering the scope whose
/// middleware wraps it.
#[derive(Clone)]
pub struct Layer {
    handler: Arc<dyn Handler>,
    scope: ScopeId,
}

impl Layer {
    pub fn new(handler: Arc<dyn Handler>, scope: ScopeId) -> Self {
        Self { handler, scope }
    }

    pub fn handler(&self) -> &Arc<dyn Handler> {
        &self.handler
    }

    pub fn scope(&self) -> ScopeId {
        self.scope
    }
}

impl std::fmt::Debug for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Layer").field("scope", &self.scope).finish()
    }
}
