//! The admin demo site: home, user lookup, sitemap, a gated admin page and
//! cookie login.

use crate::application::{App, AppConfig};
use crate::ext::auth::{AuthMiddleware, CookieAuthConfig, LoadSession};
use crate::ext::LoggingMiddleware;
use hyper::Method;

mod handlers;
mod views;

pub use handlers::{Login, LoginHandler, LogoutHandler, User, get_user_by_id};
pub use views::views;

#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub app: AppConfig,
    pub auth: CookieAuthConfig,
    /// The only account accepted by `POST /login`.
    pub demo_email: String,
    pub demo_password: String,
    /// Where a login without a usable `return` parameter lands.
    pub landing: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            app: AppConfig::default(),
            auth: CookieAuthConfig::default(),
            demo_email: "admin@example.com".to_string(),
            demo_password: "123".to_string(),
            landing: "/admin".to_string(),
        }
    }
}

pub fn app(config: SiteConfig) -> App {
    let mut app = App::new(config.app.clone()).with_views(views());

    app.use_with(LoggingMiddleware)
        .use_with(LoadSession::new(config.auth.cookie_name.clone()));

    app.get("/", handlers::home)
        .get("/user/{id}", handlers::user)
        .get("/sitemap.xml", handlers::sitemap)
        .get("/login", handlers::login_form)
        .route(Method::POST, "/login", LoginHandler::new(&config))
        .route(Method::POST, "/logout", LogoutHandler::new(config.auth.clone()));

    let mut admin = app.group("/admin");
    admin.use_with(
        AuthMiddleware::builder()
            .config(config.auth.clone())
            .build(),
    );
    admin.get("/", handlers::admin);

    app
}
