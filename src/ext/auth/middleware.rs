use super::{
    config::CookieAuthConfig,
    cookies::CookieHandler,
    error::{AuthError, AuthResult},
    session::{SESSION_KEY, Session, SessionExt},
    validator::{IdentityValidator, TokenValidator},
};
use crate::handler::{Context, HandlerResult, Middleware, Next, cancelled};
use async_trait::async_trait;
use hyper::{StatusCode, header};
use log::debug;
use std::sync::Arc;

mod builder;
pub use builder::AuthMiddlewareBuilder;

/// Where the gate looks for the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    /// Session cookie; rejected requests are redirected to the login page.
    Cookie,
    /// `Authorization: Bearer` header; rejected requests get a 401.
    Bearer,
}

/// Gate in front of every route of the scope it is registered in.
///
/// A request with a usable token gets its [`Session`] stored under
/// [`SESSION_KEY`] and continues down the chain. Anything else is answered
/// here and the chain is cancelled, so the protected handler never runs.
/// Nothing is remembered between requests.
#[derive(Clone)]
pub struct AuthMiddleware {
    config: CookieAuthConfig,
    source: TokenSource,
    token_validator: Arc<dyn TokenValidator>,
}

impl AuthMiddleware {
    /// Creates a new `AuthMiddleware` with custom token validator
    pub fn with_validator(
        config: CookieAuthConfig,
        source: TokenSource,
        validator: Arc<dyn TokenValidator>,
    ) -> Self {
        Self {
            config,
            source,
            token_validator: validator,
        }
    }

    /// Cookie gate with the default configuration
    pub fn cookie() -> Self {
        Self::builder().build()
    }

    /// Bearer-token gate with the default configuration
    pub fn bearer() -> Self {
        Self::builder().source(TokenSource::Bearer).build()
    }

    /// Builder pattern for easier configuration
    pub fn builder() -> AuthMiddlewareBuilder {
        AuthMiddlewareBuilder::new()
    }

    pub fn config(&self) -> &CookieAuthConfig {
        &self.config
    }

    /// Validates token length against configured limits
    fn validate_token_length(&self, token: &str) -> bool {
        let len = token.len();
        len >= self.config.min_token_length && len <= self.config.max_token_length
    }

    /// Pulls the raw token out of the request. Empty values count as absent.
    fn extract_token(&self, ctx: &Context) -> AuthResult<String> {
        let token = match self.source {
            TokenSource::Cookie => match ctx.session() {
                Some(session) => Some(session.subject.clone()),
                None => CookieHandler::get_cookie_value(ctx.headers(), &self.config.cookie_name)?,
            },
            TokenSource::Bearer => ctx
                .header(header::AUTHORIZATION)
                .and_then(bearer_token)
                .map(str::to_owned),
        };

        token
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::MissingToken)
    }

    async fn authenticate(&self, ctx: &Context) -> AuthResult<Session> {
        let token = self.extract_token(ctx)?;

        if !self.validate_token_length(&token) {
            return Err(AuthError::InvalidTokenLength);
        }

        self.token_validator.validate_token(&token).await
    }

    /// Answers a rejected request and cancels the chain.
    fn reject(&self, ctx: &mut Context) -> HandlerResult {
        match self.source {
            TokenSource::Cookie => {
                let location = self.config.login_location(ctx.path());
                ctx.redirect(&location)?;
            }
            TokenSource::Bearer => {
                ctx.write_status(StatusCode::UNAUTHORIZED);
                ctx.set_header(header::WWW_AUTHENTICATE, "Bearer")?;
            }
        }

        cancelled()
    }

    /// Logs authentication attempts if logging is enabled
    fn log_auth_attempt(&self, path: &str, result: &AuthResult<Session>) {
        if self.config.enable_logging {
            match result {
                Ok(session) => debug!("Auth success for path {}: {}", path, session.subject),
                Err(e) => debug!("Auth failed for path {}: {}", path, e),
            }
        }
    }
}

fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    scheme
        .eq_ignore_ascii_case("bearer")
        .then(|| token.trim())
}

impl std::fmt::Debug for AuthMiddleware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthMiddleware")
            .field("config", &self.config)
            .field("source", &self.source)
            .field("token_validator", &"<validator>")
            .finish()
    }
}

impl Default for AuthMiddleware {
    fn default() -> Self {
        Self::with_validator(
            CookieAuthConfig::default(),
            TokenSource::Cookie,
            Arc::new(IdentityValidator),
        )
    }
}

#[async_trait]
impl Middleware for AuthMiddleware {
    async fn call(&self, ctx: &mut Context, next: Next<'_>) -> HandlerResult {
        let result = self.authenticate(ctx).await;
        self.log_auth_attempt(ctx.path(), &result);

        match result {
            Ok(session) => {
                ctx.set_typed(&SESSION_KEY, session);
                next.run(ctx).await
            }
            Err(_) => self.reject(ctx),
        }
    }
}
