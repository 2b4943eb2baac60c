//! Session gating.
//!
//! [`LoadSession`] reads the session cookie into request state,
//! [`AuthMiddleware`] turns requests without a usable session away, and
//! [`issuer`] hands out the cookie after a successful login.

pub mod config;
pub mod cookies;
pub mod error;
pub mod issuer;
pub mod middleware;
pub mod session;
pub mod validator;

pub use config::CookieAuthConfig;
pub use cookies::CookieHandler;
pub use error::{AuthError, AuthResult};
pub use issuer::{clear_session, issue_session, return_target};
pub use middleware::{AuthMiddleware, AuthMiddlewareBuilder, TokenSource};
pub use session::{LoadSession, SESSION_KEY, Session, SessionExt};
pub use validator::{IdentityValidator, TokenValidator};
