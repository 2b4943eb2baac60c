//! View resolution.
//!
//! A [`ViewSet`] maps route patterns to page templates and names to
//! standalone views. Rendering a page for a partial request yields the bare
//! fragment, any other request gets the fragment wrapped in the layout. Both
//! paths receive the same serialized data.

use crate::ext::htmx;
use hyper::http::request::Parts;
use rustc_hash::FxHashMap;
use serde_json::Value;
use std::{fmt, sync::Arc};
use thiserror::Error;

pub mod html;
mod store;

pub use store::ViewStore;

/// Renders view data into a fragment.
pub type Template = Arc<dyn Fn(&Value) -> Result<String, ViewError> + Send + Sync>;

/// Wraps a rendered fragment into a full document.
pub type Layout = Arc<dyn Fn(&str, &Value) -> Result<String, ViewError> + Send + Sync>;

/// Decides whether a request wants a fragment rather than a full page.
pub type Negotiator = fn(&Parts) -> bool;

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("no view registered for `{0}`")]
    NotFound(String),

    #[error("failed to serialize view data: {0}")]
    Data(#[from] serde_json::Error),

    #[error("failed to render `{name}`: {reason}")]
    Render { name: String, reason: String },
}

/// Output of a render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub content_type: String,
    pub body: String,
    pub partial: bool,
}

const HTML: &str = "text/html; charset=utf-8";

#[derive(Clone)]
pub struct ViewSet {
    pages: FxHashMap<String, Template>,
    named: FxHashMap<String, Template>,
    layout: Option<Layout>,
    negotiator: Negotiator,
}

impl Default for ViewSet {
    fn default() -> Self {
        Self {
            pages: FxHashMap::default(),
            named: FxHashMap::default(),
            layout: None,
            negotiator: htmx::is_htmx_request,
        }
    }
}

impl ViewSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the fragment template of the route `pattern`.
    pub fn page<F>(mut self, pattern: impl Into<String>, template: F) -> Self
    where
        F: Fn(&Value) -> Result<String, ViewError> + Send + Sync + 'static,
    {
        self.pages.insert(pattern.into(), Arc::new(template));
        self
    }

    /// Registers a view rendered by name, e.g. `text/sitemap.xml`.
    pub fn named<F>(mut self, name: impl Into<String>, template: F) -> Self
    where
        F: Fn(&Value) -> Result<String, ViewError> + Send + Sync + 'static,
    {
        self.named.insert(name.into(), Arc::new(template));
        self
    }

    pub fn layout<F>(mut self, layout: F) -> Self
    where
        F: Fn(&str, &Value) -> Result<String, ViewError> + Send + Sync + 'static,
    {
        self.layout = Some(Arc::new(layout));
        self
    }

    pub fn negotiator(mut self, negotiator: Negotiator) -> Self {
        self.negotiator = negotiator;
        self
    }

    pub fn is_partial(&self, request: &Parts) -> bool {
        (self.negotiator)(request)
    }

    pub fn render_page(
        &self,
        pattern: &str,
        data: &Value,
        partial: bool,
    ) -> Result<Rendered, ViewError> {
        let template = self
            .pages
            .get(pattern)
            .ok_or_else(|| ViewError::NotFound(pattern.to_owned()))?;

        let fragment = template(data)?;
        let body = match (&self.layout, partial) {
            (Some(layout), false) => layout(&fragment, data)?,
            _ => fragment,
        };

        Ok(Rendered {
            content_type: HTML.to_owned(),
            body,
            partial,
        })
    }

    pub fn render_named(&self, name: &str, data: &Value) -> Result<Rendered, ViewError> {
        let template = self
            .named
            .get(name)
            .ok_or_else(|| ViewError::NotFound(name.to_owned()))?;

        Ok(Rendered {
            content_type: content_type_for(name),
            body: template(data)?,
            partial: false,
        })
    }
}

impl fmt::Debug for ViewSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewSet")
            .field("pages", &self.pages.keys().collect::<Vec<_>>())
            .field("named", &self.named.keys().collect::<Vec<_>>())
            .field("layout", &self.layout.is_some())
            .finish()
    }
}

fn content_type_for(name: &str) -> String {
    let mime = mime_guess::from_path(name).first_or_text_plain();
    if mime.type_() == mime_guess::mime::TEXT {
        format!("{}; charset=utf-8", mime.essence_str())
    } else {
        mime.essence_str().to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::Request;
    use serde_json::json;

    fn views() -> ViewSet {
        ViewSet::new()
            .layout(|fragment, _| Ok(format!("<html><main>{fragment}</main></html>")))
            .page("/", |data| Ok(format!("<h1>{}</h1>", html::text(data, "Name"))))
            .named("text/sitemap.xml", |data| {
                Ok(format!("<lastmod>{}</lastmod>", html::text(data, "LastMod")))
            })
    }

    fn parts(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_full_page_wraps_fragment() {
        let data = json!({ "Name": "viewchain" });
        let views = views();

        let fragment = views.render_page("/", &data, true).unwrap();
        let page = views.render_page("/", &data, false).unwrap();

        assert_eq!(fragment.body, "<h1>viewchain</h1>");
        assert_eq!(page.body, "<html><main><h1>viewchain</h1></main></html>");
        assert!(fragment.partial);
        assert_eq!(page.content_type, HTML);
    }

    #[test]
    fn test_without_layout_full_page_is_fragment() {
        let views = ViewSet::new().page("/", |_| Ok("<p>hi</p>".to_owned()));
        let page = views.render_page("/", &Value::Null, false).unwrap();

        assert_eq!(page.body, "<p>hi</p>");
    }

    #[test]
    fn test_named_view_content_type_follows_extension() {
        let rendered = views()
            .render_named("text/sitemap.xml", &json!({ "LastMod": "2024-01-01" }))
            .unwrap();

        assert!(rendered.content_type.contains("xml"));
        assert_eq!(rendered.body, "<lastmod>2024-01-01</lastmod>");
    }

    #[test]
    fn test_missing_views() {
        let views = views();

        assert!(matches!(
            views.render_page("/nope", &Value::Null, false),
            Err(ViewError::NotFound(name)) if name == "/nope"
        ));
        assert!(views.render_named("text/robots.txt", &Value::Null).is_err());
    }

    #[test]
    fn test_default_negotiation_uses_hx_request() {
        let views = views();

        assert!(views.is_partial(&parts(&[("HX-Request", "true")])));
        assert!(!views.is_partial(&parts(&[("HX-Request", "false")])));
        assert!(!views.is_partial(&parts(&[])));
    }

    #[test]
    fn test_negotiator_is_replaceable() {
        fn by_query(request: &Parts) -> bool {
            request.uri.query() == Some("fragment")
        }

        let views = views().negotiator(by_query);
        let request = Request::builder()
            .uri("/?fragment")
            .body(())
            .unwrap()
            .into_parts()
            .0;

        assert!(views.is_partial(&request));
        assert!(!views.is_partial(&parts(&[("HX-Request", "true")])));
    }
}
