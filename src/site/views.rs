use crate::view::{ViewError, ViewSet, html};
use serde_json::Value;

const HTMX: &str = "https://unpkg.com/htmx.org@2.0.4";

pub fn views() -> ViewSet {
    ViewSet::new()
        .layout(layout)
        .page("/", home)
        .page("/user/{id}", user)
        .page("/admin", admin)
        .page("/login", login)
        .named("text/sitemap.xml", sitemap)
}

fn layout(fragment: &str, _data: &Value) -> Result<String, ViewError> {
    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>viewchain admin</title>
<script src="{HTMX}"></script>
</head>
<body hx-boost="true">
<nav><a href="/">Home</a> <a href="/admin">Admin</a></nav>
<main id="main">{fragment}</main>
<script>
document.body.addEventListener("showMessage", function (evt) {{
  alert(evt.detail.value);
}});
</script>
</body>
</html>"#
    ))
}

fn home(data: &Value) -> Result<String, ViewError> {
    Ok(format!("<h1>Hello, {}</h1>", html::text(data, "Name")))
}

fn user(data: &Value) -> Result<String, ViewError> {
    Ok(format!(
        "<h1>{}</h1>\n<p>ID: {}</p>",
        html::text(data, "Name"),
        html::text(data, "ID")
    ))
}

fn admin(data: &Value) -> Result<String, ViewError> {
    Ok(format!(
        r#"<h1>Welcome, {}</h1>
<form method="post" action="/logout"><button type="submit">Sign out</button></form>"#,
        html::text(data, "Name")
    ))
}

fn login(data: &Value) -> Result<String, ViewError> {
    let messages: String = html::lookup(data, "messages")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .map(|message| format!("<p class=\"error\">{}</p>", html::escape(message)))
        .collect();

    let field_error = |field: &str| {
        let message = html::text(data, &format!("errors.{field}"));
        if message.is_empty() {
            String::new()
        } else {
            format!("<span class=\"error\">{message}</span>")
        }
    };

    Ok(format!(
        r#"<h1>Sign in</h1>
{messages}<form method="post">
<label>Email <input type="email" name="email" value="{email}"></label>{email_error}
<label>Password <input type="password" name="password"></label>{password_error}
<button type="submit">Sign in</button>
</form>"#,
        email = html::text(data, "values.email"),
        email_error = field_error("email"),
        password_error = field_error("password"),
    ))
}

fn sitemap(data: &Value) -> Result<String, ViewError> {
    Ok(format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
<url><loc>/</loc><lastmod>{}</lastmod></url>
</urlset>"#,
        html::text(data, "LastMod")
    ))
}
