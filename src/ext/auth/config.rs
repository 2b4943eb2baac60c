use std::time::Duration;

/// Configuration for cookie authentication
#[derive(Debug, Clone)]
pub struct CookieAuthConfig {
    /// Name of the session cookie expected in the request
    pub cookie_name: String,
    /// The path to redirect unauthenticated users to
    pub login_path: String,
    /// Query parameter carrying the originally requested path
    pub return_param: String,
    /// Whether to use secure cookies (HTTPS only)
    pub secure_cookies: bool,
    /// Lifetime of an issued session cookie
    pub max_age: Duration,
    /// Maximum token length for security
    pub max_token_length: usize,
    /// Minimum token length for security
    pub min_token_length: usize,
    /// Whether to log authentication attempts
    pub enable_logging: bool,
    /// Cookie domain restriction
    pub cookie_domain: Option<String>,
    /// Cookie path restriction
    pub cookie_path: String,
    /// Cookie SameSite policy
    pub same_site: Option<cookie::SameSite>,
}

impl Default for CookieAuthConfig {
    fn default() -> Self {
        Self {
            cookie_name: "session".to_string(),
            login_path: "/login".to_string(),
            return_param: "return".to_string(),
            secure_cookies: true,
            max_age: Duration::from_secs(3600),
            max_token_length: 1024,
            min_token_length: 1,
            enable_logging: false,
            cookie_domain: None,
            cookie_path: "/".to_string(),
            same_site: Some(cookie::SameSite::Lax),
        }
    }
}

impl CookieAuthConfig {
    /// Where to send an unauthenticated request for `path`.
    pub fn login_location(&self, path: &str) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        query.append_pair(&self.return_param, path);
        format!("{}?{}", self.login_path, query.finish())
    }
}
