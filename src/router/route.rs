use super::layer::Layer;
use hyper::Method;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// One path pattern and the handlers registered on it, per method.
#[derive(Debug, Clone)]
pub struct Route {
    pattern: Arc<str>,
    layers: FxHashMap<Method, Layer>,
}

impl Route {
    pub fn new(pattern: impl Into<Arc<str>>) -> Self {
        Self {
            pattern: pattern.into(),
            layers: FxHashMap::default(),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub(crate) fn pattern_arc(&self) -> Arc<str> {
        Arc::clone(&self.pattern)
    }

    pub(crate) fn insert(&mut self, method: Method, layer: Layer) {
        self.layers.insert(method, layer);
    }

    pub fn layer(&self, method: &Method) -> Option<&Layer> {
        self.layers.get(method)
    }

    /// Value of the `Allow` header for this route, e.g. `GET, POST`.
    pub fn allowed(&self) -> String {
        let mut methods: Vec<&str> = self.layers.keys().map(Method::as_str).collect();
        methods.sort_unstable();
        methods.join(", ")
    }
}
