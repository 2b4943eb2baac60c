use super::{
    AcceptLanguage, Flow, HandlerResult, Response, RouteParams, State, StateKey,
    response::error::ResponseError,
};
use crate::{
    ext::{auth::cookies::CookieHandler, htmx},
    view::{Rendered, ViewError, ViewSet},
};
use bytes::Bytes;
use cookie::Cookie;
use hyper::{
    HeaderMap, Method, Request, StatusCode, Uri,
    header::{self, AsHeaderName, HeaderName, HeaderValue},
    http::request::Parts,
};
use serde::Serialize;
use std::{any::Any, sync::Arc};

/// Everything one request carries through its middleware chain.
///
/// Owns the request head and buffered body, the response under construction
/// and a [`State`] bag for values handed from middleware to handlers. A new
/// context is built for every request and dropped once the response has been
/// produced, so nothing stored here leaks into another request.
pub struct Context {
    request: Parts,
    body: Bytes,
    params: RouteParams,
    pattern: Arc<str>,
    state: State,
    response: Response,
    views: Arc<ViewSet>,
}

impl Context {
    pub fn new(request: Request<Bytes>) -> Self {
        let (request, body) = request.into_parts();
        let pattern = Arc::from(request.uri.path());

        Self {
            request,
            body,
            params: RouteParams::default(),
            pattern,
            state: State::new(),
            response: Response::new(),
            views: Arc::new(ViewSet::new()),
        }
    }

    pub fn with_params(mut self, params: RouteParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_route_pattern(mut self, pattern: impl Into<Arc<str>>) -> Self {
        self.pattern = pattern.into();
        self
    }

    pub fn with_views(mut self, views: Arc<ViewSet>) -> Self {
        self.views = views;
        self
    }

    pub fn request(&self) -> &Parts {
        &self.request
    }

    pub fn method(&self) -> &Method {
        &self.request.method
    }

    pub fn uri(&self) -> &Uri {
        &self.request.uri
    }

    pub fn path(&self) -> &str {
        self.request.uri.path()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.request.headers
    }

    /// Header value as a string, `None` if absent or not visible ASCII.
    pub fn header<K: AsHeaderName>(&self, name: K) -> Option<&str> {
        self.request
            .headers
            .get(name)
            .and_then(|value| value.to_str().ok())
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    pub fn params(&self) -> &RouteParams {
        &self.params
    }

    /// The route pattern that matched, e.g. `/user/{id}`.
    pub fn route_pattern(&self) -> &str {
        &self.pattern
    }

    /// First value of `key` in the query string, percent-decoded.
    pub fn query(&self, key: &str) -> Option<String> {
        let query = self.request.uri.query()?;
        form_urlencoded::parse(query.as_bytes())
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.into_owned())
    }

    pub fn cookie(&self, name: &str) -> Option<String> {
        CookieHandler::get_cookie_value(&self.request.headers, name)
            .ok()
            .flatten()
    }

    pub fn referer(&self) -> Option<&str> {
        self.header(header::REFERER)
    }

    /// Client language preferences, parsed from `Accept-Language` on demand.
    pub fn accept_language(&self) -> AcceptLanguage {
        AcceptLanguage::parse(self.header(header::ACCEPT_LANGUAGE).unwrap_or_default())
    }

    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.state.get(key)
    }

    pub fn set<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) {
        self.state.set(key, value);
    }

    pub fn remove(&mut self, key: &str) -> bool {
        self.state.remove(key)
    }

    pub fn typed<T: Any>(&self, key: &StateKey<T>) -> Option<&T> {
        self.state.typed(key)
    }

    pub fn set_typed<T: Any + Send + Sync>(&mut self, key: &StateKey<T>, value: T) {
        self.state.set_typed(key, value);
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut State {
        &mut self.state
    }

    pub fn response(&self) -> &Response {
        &self.response
    }

    pub fn response_mut(&mut self) -> &mut Response {
        &mut self.response
    }

    /// See [`Response::write_status`].
    pub fn write_status(&mut self, status: StatusCode) -> bool {
        self.response.write_status(status)
    }

    /// Writes a `302 Found` to `location`.
    ///
    /// The caller still returns [`cancelled()`](super::cancelled) (or
    /// `done()`) so no later link writes a body.
    pub fn redirect(&mut self, location: &str) -> crate::Result<()> {
        self.response.redirect(location)?;
        Ok(())
    }

    pub fn set_header(&mut self, name: HeaderName, value: &str) -> crate::Result<()> {
        let value = HeaderValue::from_str(value).map_err(ResponseError::from)?;
        self.response.set(name, value);
        Ok(())
    }

    pub fn set_cookie(&mut self, cookie: &Cookie<'_>) -> crate::Result<()> {
        self.response.set_cookie(cookie)?;
        Ok(())
    }

    /// Whether the client asked for a fragment instead of a full page.
    pub fn is_partial(&self) -> bool {
        self.views.is_partial(&self.request)
    }

    /// Renders the view registered for the matched route.
    ///
    /// Partial requests get the bare fragment, everything else the fragment
    /// wrapped in the layout. `data` is serialized once and handed to
    /// whichever template is chosen.
    pub fn view<T: Serialize + ?Sized>(&mut self, data: &T) -> HandlerResult {
        let data = serde_json::to_value(data).map_err(ViewError::from)?;
        let partial = self.is_partial();
        let rendered = self.views.render_page(&self.pattern, &data, partial)?;

        self.response.append(
            header::VARY,
            HeaderValue::from_static(htmx::HX_REQUEST_HEADER),
        );
        self.emit(rendered)
    }

    /// Renders the named view, bypassing negotiation. The content type
    /// follows the name's extension (`text/sitemap.xml` is served as XML).
    pub fn view_as<T: Serialize + ?Sized>(&mut self, data: &T, name: &str) -> HandlerResult {
        let data = serde_json::to_value(data).map_err(ViewError::from)?;
        let rendered = self.views.render_named(name, &data)?;
        self.emit(rendered)
    }

    fn emit(&mut self, rendered: Rendered) -> HandlerResult {
        self.response.r#type(&rendered.content_type)?;
        self.response.write(rendered.body);
        Ok(Flow::Continue)
    }

    pub(crate) fn into_response(self) -> Response {
        self.response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(uri: &str, headers: &[(&str, &str)]) -> Context {
        let mut builder = Request::builder().uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        Context::new(builder.body(Bytes::new()).unwrap())
    }

    #[test]
    fn test_query_decodes_values() {
        let ctx = context("/login?return=%2Fadmin%2Fusers&x=1", &[]);

        assert_eq!(ctx.query("return").as_deref(), Some("/admin/users"));
        assert_eq!(ctx.query("missing"), None);
        assert_eq!(ctx.path(), "/login");
    }

    #[test]
    fn test_cookie_lookup() {
        let ctx = context("/", &[("Cookie", "theme=dark; session=alice@example.com")]);

        assert_eq!(ctx.cookie("session").as_deref(), Some("alice@example.com"));
        assert_eq!(ctx.cookie("other"), None);
    }

    #[test]
    fn test_accept_language() {
        let ctx = context("/", &[("Accept-Language", "fr;q=0.8, de")]);
        let tags: Vec<String> = ctx
            .accept_language()
            .into_iter()
            .map(|tag| tag.as_str().to_owned())
            .collect();

        assert_eq!(tags, ["de", "fr"]);
        assert!(context("/", &[]).accept_language().is_empty());
    }

    #[test]
    fn test_state_is_per_context() {
        let mut first = context("/", &[]);
        first.set("user", String::from("alice"));

        let second = context("/", &[]);

        assert_eq!(first.get::<String>("user").map(String::as_str), Some("alice"));
        assert!(second.get::<String>("user").is_none());
    }

    #[test]
    fn test_redirect_sets_location() {
        let mut ctx = context("/admin", &[]);
        ctx.redirect("/login?return=%2Fadmin").unwrap();

        let res = ctx.into_response();
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(
            res.get(header::LOCATION).unwrap(),
            "/login?return=%2Fadmin"
        );
    }
}
