use crate::Error;
use crate::form::DecodeError;
use crate::handler::{Context, Handler, Middleware, Next, Response};
use crate::router::{Group, ROOT, Router, generate_methods};
use crate::server::Server;
use crate::view::{ViewSet, ViewStore};
use bytes::Bytes;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Incoming};
use hyper::service::Service;
use hyper::{Method, Request, StatusCode, header};
use log::{error, warn};
use std::any::Any;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// Server settings.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub addr: SocketAddr,
    /// Bodies above this size are answered with 413 before dispatch.
    pub max_body_bytes: usize,
}

pub const DEFAULT_PORT: u16 = 8080;

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            max_body_bytes: 1024 * 1024,
        }
    }
}

impl AppConfig {
    /// Defaults, with the port taken from `PORT` when it parses.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(port) = std::env::var("PORT").ok().and_then(|p| p.parse().ok()) {
            config.addr.set_port(port);
        }
        config
    }
}

#[derive(Debug, Default)]
pub struct App {
    router: Router,
    views: Arc<ViewStore>,
    config: AppConfig,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn with_views(mut self, views: ViewSet) -> Self {
        self.views = Arc::new(ViewStore::new(views));
        self
    }

    /// Shared handle on the active views, for swapping them at runtime.
    pub fn views(&self) -> Arc<ViewStore> {
        Arc::clone(&self.views)
    }

    /// Adds middleware to the root scope; it wraps every route.
    pub fn use_with<M: Middleware>(&mut self, middleware: M) -> &mut Self {
        self.router.use_with(ROOT, Arc::new(middleware));
        self
    }

    pub fn group(&mut self, prefix: &str) -> Group<'_> {
        let scope = self.router.scope(ROOT, prefix);
        Group::new(&mut self.router, scope)
    }

    pub fn route<H: Handler>(&mut self, method: Method, path: &str, handler: H) -> &mut Self {
        self.router.route(ROOT, method, path, Arc::new(handler));
        self
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Runs one buffered request through routing and its middleware chain.
    ///
    /// Never fails: errors and panics raised by the chain are logged and
    /// turned into a bare status response.
    pub async fn handle(&self, req: Request<Bytes>) -> hyper::Response<Full<Bytes>> {
        let Some((route, params)) = self.router.at(req.uri().path()) else {
            return Response::error(StatusCode::NOT_FOUND).into_hyper();
        };

        let Some(layer) = route.layer(req.method()) else {
            let mut res = Response::error(StatusCode::METHOD_NOT_ALLOWED);
            if let Ok(allow) = header::HeaderValue::from_str(&route.allowed()) {
                res.set(header::ALLOW, allow);
            }
            return res.into_hyper();
        };

        let stack = self.router.stack_for(layer.scope());
        let endpoint = Arc::clone(layer.handler());

        let mut ctx = Context::new(req)
            .with_params(params)
            .with_route_pattern(route.pattern_arc())
            .with_views(self.views.snapshot());

        let outcome = AssertUnwindSafe(Next::new(&stack, endpoint.as_ref()).run(&mut ctx))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(_)) => ctx.into_response().into_hyper(),
            Ok(Err(err)) => {
                let status = err.status();
                if status.is_client_error() {
                    warn!("{} {} rejected: {}", ctx.method(), ctx.route_pattern(), err);
                } else {
                    error!("{} {} failed: {}", ctx.method(), ctx.route_pattern(), err);
                }
                Response::error(status).into_hyper()
            }
            Err(panic) => {
                error!(
                    "{} {} panicked: {}",
                    ctx.method(),
                    ctx.route_pattern(),
                    panic_message(panic.as_ref())
                );
                Response::internal_error().into_hyper()
            }
        }
    }

    /// Collects `req`'s body under `max_body_bytes`, then dispatches it.
    ///
    /// An oversized body is answered with 413 and an unreadable one with 400;
    /// neither reaches the middleware chain.
    pub async fn serve<B>(&self, req: Request<B>) -> hyper::Response<Full<Bytes>>
    where
        B: Body,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let (parts, body) = req.into_parts();
        let limit = self.config.max_body_bytes;

        let body = match Limited::new(body, limit).collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(err) if err.downcast_ref::<LengthLimitError>().is_some() => {
                let err = Error::from(DecodeError::PayloadTooLarge { limit });
                warn!("{} {} rejected: {}", parts.method, parts.uri, err);
                return Response::error(err.status()).into_hyper();
            }
            Err(err) => {
                warn!("{} {} failed to read body: {}", parts.method, parts.uri, err);
                return Response::error(StatusCode::BAD_REQUEST).into_hyper();
            }
        };

        self.handle(Request::from_parts(parts, body)).await
    }

    /// Serves the app until Ctrl-C. `callback` runs once the address is known.
    pub async fn listen<F: FnOnce(SocketAddr)>(self, callback: F) -> std::io::Result<()> {
        let addr = self.config.addr;
        let service = AppService::new(self);

        callback(addr);
        Server::bind(addr, service).await
    }
}

generate_methods! {
    App => [get => GET, post => POST, put => PUT, delete => DELETE, patch => PATCH]
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

/// hyper service handing each connection's requests to [`App::serve`].
#[derive(Clone)]
pub struct AppService(Arc<App>);

impl AppService {
    pub fn new(app: App) -> Self {
        Self(Arc::new(app))
    }
}

impl Service<Request<Incoming>> for AppService {
    type Response = hyper::Response<Full<Bytes>>;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let app = Arc::clone(&self.0);

        Box::pin(async move { Ok(app.serve(req).await) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{cancelled, done, from_fn};
    use crate::{Flow, HandlerResult};
    use http_body_util::StreamBody;
    use hyper::body::Frame;

    fn request(method: Method, uri: &str) -> Request<Bytes> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Bytes::new())
            .unwrap()
    }

    async fn body(res: hyper::Response<Full<Bytes>>) -> String {
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn explode() -> HandlerResult {
        panic!("kaboom")
    }

    fn app() -> App {
        let mut app = App::default();
        app.get("/hello/{name}", |ctx| {
            Box::pin(async move {
                let name = ctx.param("name").unwrap_or_default().to_owned();
                ctx.response_mut().send(format!("hello {name}"));
                done()
            })
        });
        app.get("/boom", |_ctx| Box::pin(async move { explode() }));
        app.get("/fail", |_ctx| {
            Box::pin(async move { Err(Error::internal("database is on fire")) })
        });
        app
    }

    #[tokio::test]
    async fn test_dispatch_with_params() {
        let res = app().handle(request(Method::GET, "/hello/xun")).await;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body(res).await, "hello xun");
    }

    #[tokio::test]
    async fn test_not_found_and_method_not_allowed() {
        let app = app();

        let res = app.handle(request(Method::GET, "/nope")).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(body(res).await, "Not Found");

        let res = app.handle(request(Method::POST, "/hello/xun")).await;
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(res.headers()[header::ALLOW], "GET");
    }

    #[tokio::test]
    async fn test_panic_becomes_generic_500() {
        let res = app().handle(request(Method::GET, "/boom")).await;

        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body(res).await, "Internal Server Error");
    }

    #[tokio::test]
    async fn test_error_body_hides_details() {
        let res = app().handle(request(Method::GET, "/fail")).await;

        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body(res).await.contains("fire"));
    }

    fn limited_app() -> App {
        let mut app = App::new(AppConfig {
            max_body_bytes: 8,
            ..AppConfig::default()
        });
        app.post("/echo", |ctx| {
            Box::pin(async move {
                let echoed = ctx.body().clone();
                ctx.response_mut().send(echoed);
                done()
            })
        });
        app
    }

    fn post(body: impl Into<Bytes>) -> Request<Full<Bytes>> {
        Request::builder()
            .method(Method::POST)
            .uri("/echo")
            .body(Full::new(body.into()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_body_within_limit_is_dispatched() {
        let res = limited_app().serve(post("12345678")).await;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body(res).await, "12345678");
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected_before_dispatch() {
        let res = limited_app().serve(post("123456789")).await;

        assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body(res).await, "Payload Too Large");
    }

    #[tokio::test]
    async fn test_unreadable_body_is_bad_request() {
        let frames = futures_util::stream::iter([Err::<Frame<Bytes>, _>(std::io::Error::other(
            "connection reset",
        ))]);
        let req = Request::builder()
            .method(Method::POST)
            .uri("/echo")
            .body(StreamBody::new(frames))
            .unwrap();

        let res = limited_app().serve(req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body(res).await, "Bad Request");
    }

    #[tokio::test]
    async fn test_group_middleware_is_scoped() {
        let mut app = App::default();
        app.use_with(from_fn(|ctx, next| {
            Box::pin(async move {
                ctx.set("root", true);
                next.run(ctx).await
            })
        }));
        app.get("/open", |ctx| {
            Box::pin(async move {
                let root = ctx.get::<bool>("root").copied().unwrap_or(false);
                ctx.response_mut().send(format!("root={root}"));
                done()
            })
        });

        let mut admin = app.group("/admin");
        admin.use_with(from_fn(|ctx, _next| {
            Box::pin(async move {
                ctx.write_status(StatusCode::FORBIDDEN);
                cancelled()
            })
        }));
        admin.get("/", |ctx| {
            Box::pin(async move {
                ctx.response_mut().send("secret");
                Ok(Flow::Continue)
            })
        });

        let open = app.handle(request(Method::GET, "/open")).await;
        assert_eq!(body(open).await, "root=true");

        let gated = app.handle(request(Method::GET, "/admin")).await;
        assert_eq!(gated.status(), StatusCode::FORBIDDEN);
        assert!(!body(gated).await.contains("secret"));
    }
}
