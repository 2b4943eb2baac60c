pub mod auth;
pub mod htmx;
mod logging;

pub use auth::{AuthMiddleware, LoadSession, Session, SessionExt};
pub use logging::LoggingMiddleware;
