use crate::handler::{Handler, Middleware, RouteParams};
use hyper::Method;
use matchit::Router as MatchitRouter;
use rustc_hash::FxHashMap;
use std::sync::Arc;

mod group;
mod layer;
mod route;

pub use group::Group;
pub use layer::Layer;
pub use route::Route;

/// Index of a routing scope inside a [`Router`].
pub type ScopeId = usize;

/// The scope every router starts with, prefix `""`.
pub const ROOT: ScopeId = 0;

/// A path prefix with its own middleware, nested in a parent scope.
#[derive(Clone)]
struct Scope {
    prefix: String,
    parent: Option<ScopeId>,
    stack: Vec<Arc<dyn Middleware>>,
}

/// Route table plus the middleware scopes routes belong to.
///
/// Chains are not frozen at registration: the middleware of a route is
/// collected from its scope and every ancestor when the route is dispatched.
#[derive(Clone)]
pub struct Router {
    scopes: Vec<Scope>,
    routes: Vec<Route>,
    patterns: FxHashMap<String, usize>,
    matcher: MatchitRouter<usize>,
}

impl Default for Router {
    fn default() -> Self {
        Self {
            scopes: vec![Scope {
                prefix: String::new(),
                parent: None,
                stack: Vec::new(),
            }],
            routes: Vec::new(),
            patterns: FxHashMap::default(),
            matcher: MatchitRouter::new(),
        }
    }
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a child scope of `parent` under `prefix`.
    pub fn scope(&mut self, parent: ScopeId, prefix: &str) -> ScopeId {
        let prefix = join(&self.scopes[parent].prefix, prefix);
        let prefix = if prefix == "/" { String::new() } else { prefix };

        self.scopes.push(Scope {
            prefix,
            parent: Some(parent),
            stack: Vec::new(),
        });
        self.scopes.len() - 1
    }

    pub fn prefix(&self, scope: ScopeId) -> &str {
        &self.scopes[scope].prefix
    }

    /// Appends `middleware` to the chain of `scope`.
    pub fn use_with(&mut self, scope: ScopeId, middleware: Arc<dyn Middleware>) {
        self.scopes[scope].stack.push(middleware);
    }

    /// Registers `handler` for `method` on `path`, relative to `scope`.
    ///
    /// Registering the same method and pattern twice replaces the handler.
    ///
    /// # Panics
    ///
    /// Panics if the path is not a valid route pattern or conflicts with an
    /// existing one, e.g. `/user/{id}` next to `/user/{name}`.
    pub fn route(
        &mut self,
        scope: ScopeId,
        method: Method,
        path: &str,
        handler: Arc<dyn Handler>,
    ) -> &mut Route {
        let pattern = join(&self.scopes[scope].prefix, path);

        let index = match self.patterns.get(&pattern) {
            Some(&index) => index,
            None => {
                let index = self.routes.len();
                if let Err(err) = self.matcher.insert(pattern.clone(), index) {
                    panic!("invalid route `{pattern}`: {err}");
                }
                self.routes.push(Route::new(pattern.as_str()));
                self.patterns.insert(pattern, index);
                index
            }
        };

        let route = &mut self.routes[index];
        route.insert(method, Layer::new(handler, scope));
        route
    }

    /// Route matching `path`, with the captured parameters.
    pub fn at(&self, path: &str) -> Option<(&Route, RouteParams)> {
        let matched = self.matcher.at(path).ok()?;
        let params = RouteParams::from_matched(&matched.params);
        Some((&self.routes[*matched.value], params))
    }

    /// Middleware of `scope`, outermost (root) first.
    pub fn stack_for(&self, scope: ScopeId) -> Vec<Arc<dyn Middleware>> {
        let mut lineage = Vec::new();
        let mut current = Some(scope);
        while let Some(id) = current {
            lineage.push(id);
            current = self.scopes[id].parent;
        }

        lineage
            .into_iter()
            .rev()
            .flat_map(|id| self.scopes[id].stack.iter().cloned())
            .collect()
    }

    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("scopes", &self.scopes.len())
            .field("routes", &self.routes)
            .finish()
    }
}

/// Joins a scope prefix and a route path: `("/admin", "/")` is `/admin`.
fn join(prefix: &str, path: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    match (prefix.is_empty(), path.is_empty()) {
        (true, _) => format!("/{path}"),
        (false, true) => prefix.to_owned(),
        (false, false) => format!("{prefix}/{path}"),
    }
}

macro_rules! generate_methods {
    (
        $target:ty => [$($method:ident => $verb:ident),* $(,)?]
    ) => {
        impl $target {
            $(
                #[doc = concat!("Registers a `", stringify!($verb), "` handler for `path`.")]
                pub fn $method<F>(&mut self, path: &str, handler: F) -> &mut Self
                where
                    F: for<'a> Fn(
                            &'a mut $crate::handler::Context,
                        ) -> futures_util::future::BoxFuture<'a, $crate::handler::HandlerResult>
                        + Send
                        + Sync
                        + 'static,
                {
                    self.route(
                        hyper::Method::$verb,
                        path,
                        $crate::handler::from_async_handler(handler),
                    )
                }
            )*
        }
    };
}

pub(crate) use generate_methods;
