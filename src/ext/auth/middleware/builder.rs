use super::{AuthMiddleware, TokenSource};
use crate::ext::auth::{
    config::CookieAuthConfig,
    validator::{IdentityValidator, TokenValidator},
};
use std::sync::Arc;

/// Builder for creating AuthMiddleware instances
pub struct AuthMiddlewareBuilder {
    config: CookieAuthConfig,
    source: TokenSource,
    validator: Arc<dyn TokenValidator>,
}

impl AuthMiddlewareBuilder {
    pub fn new() -> Self {
        Self {
            config: CookieAuthConfig::default(),
            source: TokenSource::Cookie,
            validator: Arc::new(IdentityValidator),
        }
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: CookieAuthConfig) -> Self {
        self.config = config;
        self
    }

    pub fn source(mut self, source: TokenSource) -> Self {
        self.source = source;
        self
    }

    pub fn cookie_name(mut self, name: impl Into<String>) -> Self {
        self.config.cookie_name = name.into();
        self
    }

    pub fn login_path(mut self, path: impl Into<String>) -> Self {
        self.config.login_path = path.into();
        self
    }

    pub fn return_param(mut self, param: impl Into<String>) -> Self {
        self.config.return_param = param.into();
        self
    }

    pub fn secure_cookies(mut self, secure: bool) -> Self {
        self.config.secure_cookies = secure;
        self
    }

    pub fn cookie_domain(mut self, domain: impl Into<String>) -> Self {
        self.config.cookie_domain = Some(domain.into());
        self
    }

    pub fn cookie_path(mut self, path: impl Into<String>) -> Self {
        self.config.cookie_path = path.into();
        self
    }

    pub fn same_site(mut self, same_site: cookie::SameSite) -> Self {
        self.config.same_site = Some(same_site);
        self
    }

    pub fn token_length_limits(mut self, min: usize, max: usize) -> Self {
        self.config.min_token_length = min;
        self.config.max_token_length = max;
        self
    }

    pub fn enable_logging(mut self, enable: bool) -> Self {
        self.config.enable_logging = enable;
        self
    }

    pub fn validator(mut self, validator: Arc<dyn TokenValidator>) -> Self {
        self.validator = validator;
        self
    }

    pub fn build(self) -> AuthMiddleware {
        AuthMiddleware::with_validator(self.config, self.source, self.validator)
    }
}

impl Default for AuthMiddlewareBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AuthMiddlewareBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthMiddlewareBuilder")
            .field("config", &self.config)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides() {
        let gate = AuthMiddlewareBuilder::new()
            .cookie_name("sid")
            .login_path("/signin")
            .return_param("next")
            .secure_cookies(false)
            .build();

        let config = gate.config();
        assert_eq!(config.cookie_name, "sid");
        assert_eq!(config.login_path, "/signin");
        assert!(!config.secure_cookies);
        assert_eq!(config.login_location("/admin"), "/signin?next=%2Fadmin");
    }
}
