use super::{config::CookieAuthConfig, cookies::CookieHandler, session::Session};
use crate::handler::Context;
use hyper::Uri;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

/// Bytes escaped before a return target goes into `Location`; non-ASCII is
/// always escaped.
const LOCATION_UNSAFE: &AsciiSet = &CONTROLS.add(b' ').add(b'"').add(b'<').add(b'>');

/// Sets the session cookie for `subject` on the response.
pub fn issue_session(
    ctx: &mut Context,
    config: &CookieAuthConfig,
    subject: &str,
) -> crate::Result<Session> {
    let cookie = CookieHandler::create_session_cookie(config, subject);
    ctx.set_cookie(&cookie)?;
    Ok(Session::new(subject))
}

/// Overwrites the session cookie with an empty, already expired one.
pub fn clear_session(ctx: &mut Context, config: &CookieAuthConfig) -> crate::Result<()> {
    let cookie = CookieHandler::create_logout_cookie(config);
    ctx.set_cookie(&cookie)
}

/// Where to send the client after a successful login.
///
/// The return parameter is looked up in the request's own query, then in the
/// query of its `Referer`. Only local paths without control characters are
/// honoured; anything else (absent, empty, absolute URL, `//host`) yields
/// `fallback`. The result is percent-encoded and always a valid header value.
pub fn return_target(ctx: &Context, config: &CookieAuthConfig, fallback: &str) -> String {
    ctx.query(&config.return_param)
        .filter(|target| !target.is_empty())
        .or_else(|| {
            ctx.referer()
                .and_then(|referer| query_value(referer, &config.return_param))
        })
        .filter(|target| is_local_path(target) && !target.contains(char::is_control))
        .map(|target| utf8_percent_encode(&target, LOCATION_UNSAFE).to_string())
        .unwrap_or_else(|| fallback.to_owned())
}

fn query_value(url: &str, key: &str) -> Option<String> {
    let uri: Uri = url.parse().ok()?;
    form_urlencoded::parse(uri.query()?.as_bytes())
        .find(|(name, value)| name == key && !value.is_empty())
        .map(|(_, value)| value.into_owned())
}

fn is_local_path(target: &str) -> bool {
    target.starts_with('/') && !target.starts_with("//") && !target.starts_with("/\\")
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use hyper::{Request, header};

    fn context(uri: &str, referer: Option<&str>) -> Context {
        let mut builder = Request::builder().uri(uri);
        if let Some(referer) = referer {
            builder = builder.header(header::REFERER, referer);
        }
        Context::new(builder.body(Bytes::new()).unwrap())
    }

    fn target(uri: &str, referer: Option<&str>) -> String {
        return_target(&context(uri, referer), &CookieAuthConfig::default(), "/admin")
    }

    #[test]
    fn test_return_from_own_query() {
        assert_eq!(target("/login?return=%2Freports", None), "/reports");
    }

    #[test]
    fn test_return_from_referer() {
        assert_eq!(
            target(
                "/login",
                Some("http://localhost:8080/login?return=%2Fadmin%2Fusers")
            ),
            "/admin/users"
        );
    }

    #[test]
    fn test_own_query_wins_over_referer() {
        assert_eq!(
            target("/login?return=%2Fa", Some("http://localhost/login?return=%2Fb")),
            "/a"
        );
    }

    #[test]
    fn test_fallback() {
        assert_eq!(target("/login", None), "/admin");
        assert_eq!(target("/login?return=", None), "/admin");
        assert_eq!(target("/login", Some("http://localhost/login")), "/admin");
        assert_eq!(target("/login", Some("not a url")), "/admin");
    }

    #[test]
    fn test_rejects_non_local_targets() {
        assert_eq!(target("/login?return=https%3A%2F%2Fevil.test", None), "/admin");
        assert_eq!(target("/login?return=%2F%2Fevil.test", None), "/admin");
        assert_eq!(target("/login?return=admin", None), "/admin");
        assert_eq!(target("/login?return=%2Fadmin%0Ax", None), "/admin");
        assert_eq!(target("/login?return=%2Fadmin%0D%0ASet-Cookie:x", None), "/admin");
        assert_eq!(
            target("/login", Some("http://localhost/login?return=%2Fa%09b")),
            "/admin"
        );
    }

    #[test]
    fn test_non_ascii_target_is_encoded() {
        let location = target("/login?return=%2Fadmin%2F%C3%BC", None);

        assert_eq!(location, "/admin/%C3%BC");
        assert!(hyper::header::HeaderValue::from_str(&location).is_ok());
        assert_eq!(target("/login?return=%2Fa%20b%3Fq%3D1", None), "/a%20b?q=1");
    }

    #[test]
    fn test_issue_and_clear_cookies() {
        let config = CookieAuthConfig::default();
        let mut ctx = context("/login", None);

        let session = issue_session(&mut ctx, &config, "xun@example.com").unwrap();
        clear_session(&mut ctx, &config).unwrap();

        assert_eq!(session.subject, "xun@example.com");
        let cookies: Vec<&str> = ctx
            .response()
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|value| value.to_str().unwrap())
            .collect();
        assert_eq!(cookies.len(), 2);
        assert!(cookies[0].starts_with("session=xun@example.com"));
        assert!(cookies[0].contains("Max-Age=3600"));
        assert!(cookies[1].starts_with("session=;"));
        assert!(cookies[1].contains("Max-Age=0"));
    }
}
