use super::{
    config::CookieAuthConfig,
    error::{AuthError, AuthResult},
};
use cookie::{Cookie, CookieJar};
use hyper::{HeaderMap, header::COOKIE};

/// Cookie handling utility using the cookie crate
#[derive(Debug, Clone)]
pub struct CookieHandler;

impl CookieHandler {
    /// Gets all cookies sent with the request
    pub fn get_all_cookies(headers: &HeaderMap) -> AuthResult<CookieJar> {
        let mut jar = CookieJar::new();

        for cookie_header in headers.get_all(COOKIE) {
            let cookie_str = cookie_header
                .to_str()
                .map_err(|_| AuthError::MalformedCookie)?;

            for cookie_str in cookie_str.split(';') {
                let cookie_str = cookie_str.trim();
                if cookie_str.is_empty() {
                    continue;
                }
                // Skip malformed individual cookies
                if let Ok(cookie) = Cookie::parse(cookie_str.to_owned()) {
                    jar.add_original(cookie);
                }
            }
        }

        Ok(jar)
    }

    /// Extracts a specific cookie value from the request
    pub fn get_cookie_value(headers: &HeaderMap, cookie_name: &str) -> AuthResult<Option<String>> {
        let jar = Self::get_all_cookies(headers)?;

        Ok(jar
            .get(cookie_name)
            .map(|cookie| cookie.value().to_string()))
    }

    /// Creates the session cookie carrying `value`
    pub fn create_session_cookie(config: &CookieAuthConfig, value: &str) -> Cookie<'static> {
        let max_age = cookie::time::Duration::seconds(config.max_age.as_secs() as i64);
        Self::base(config, value.to_owned()).max_age(max_age).build()
    }

    /// Creates a cookie that clears the session
    pub fn create_logout_cookie(config: &CookieAuthConfig) -> Cookie<'static> {
        Self::base(config, String::new())
            .max_age(cookie::time::Duration::seconds(0))
            .build()
    }

    fn base(config: &CookieAuthConfig, value: String) -> cookie::CookieBuilder<'static> {
        let mut cookie = Cookie::build((config.cookie_name.clone(), value))
            .path(config.cookie_path.clone())
            .secure(config.secure_cookies)
            .http_only(true);

        if let Some(domain) = &config.cookie_domain {
            cookie = cookie.domain(domain.clone());
        }

        if let Some(same_site) = config.same_site {
            cookie = cookie.same_site(same_site);
        }

        cookie
    }
}
