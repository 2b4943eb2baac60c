use super::SiteConfig;
use crate::ext::auth::{CookieAuthConfig, SessionExt, clear_session, issue_session, return_target};
use crate::ext::htmx::{self, HxHeader};
use crate::form::{BoundForm, FieldSpec, FormSchema, FormView, Rule};
use crate::handler::{Context, Handler, HandlerResult, cancelled, done};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::future::BoxFuture;
use hyper::StatusCode;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::json;

pub const BAD_CREDENTIALS: &str = "Email or password is incorrect";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
}

/// Stand-in for a user store.
pub fn get_user_by_id(id: &str) -> User {
    User {
        id: id.to_owned(),
        name: "Yaitoo".to_owned(),
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Login {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl FormSchema for Login {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("email", "Email").rules(&[Rule::Required, Rule::Email]),
        FieldSpec::new("password", "Password")
            .rules(&[Rule::Required])
            .secret(),
    ];
}

#[derive(Serialize)]
struct Sitemap {
    #[serde(rename = "LastMod")]
    last_mod: DateTime<Utc>,
}

pub(super) fn home(ctx: &mut Context) -> BoxFuture<'_, HandlerResult> {
    Box::pin(async move { ctx.view(&json!({ "Name": "viewchain" })) })
}

pub(super) fn user(ctx: &mut Context) -> BoxFuture<'_, HandlerResult> {
    Box::pin(async move {
        let user = get_user_by_id(ctx.param("id").unwrap_or_default());
        ctx.view(&user)
    })
}

pub(super) fn sitemap(ctx: &mut Context) -> BoxFuture<'_, HandlerResult> {
    Box::pin(async move {
        let data = Sitemap {
            last_mod: Utc::now(),
        };
        ctx.view_as(&data, "text/sitemap.xml")
    })
}

pub(super) fn admin(ctx: &mut Context) -> BoxFuture<'_, HandlerResult> {
    Box::pin(async move {
        let name = ctx
            .session()
            .map(|session| session.subject.clone())
            .unwrap_or_default();

        ctx.view(&User {
            id: String::new(),
            name,
        })
    })
}

pub(super) fn login_form(ctx: &mut Context) -> BoxFuture<'_, HandlerResult> {
    Box::pin(async move { ctx.view(&FormView::default()) })
}

/// `POST /login`: checks the demo credentials and issues the session cookie.
#[derive(Debug, Clone)]
pub struct LoginHandler {
    auth: CookieAuthConfig,
    email: String,
    password: String,
    landing: String,
}

impl LoginHandler {
    pub fn new(config: &SiteConfig) -> Self {
        Self {
            auth: config.auth.clone(),
            email: config.demo_email.clone(),
            password: config.demo_password.clone(),
            landing: config.landing.clone(),
        }
    }

    fn accepts(&self, login: &Login) -> bool {
        login.email == self.email && login.password == self.password
    }
}

#[async_trait]
impl Handler for LoginHandler {
    async fn call(&self, ctx: &mut Context) -> HandlerResult {
        let mut form = BoundForm::<Login>::bind(ctx)?;

        let langs = ctx.accept_language();
        if !form.validate(langs.tags()) {
            ctx.write_status(StatusCode::BAD_REQUEST);
            return ctx.view(&form);
        }

        if !self.accepts(&form.data) {
            debug!("Rejected login for {}", form.data.email);
            form.add_error(BAD_CREDENTIALS);
            htmx::write_trigger(
                ctx,
                &HxHeader::from([("showMessage".to_owned(), BAD_CREDENTIALS)]),
            )?;
            ctx.write_status(StatusCode::BAD_REQUEST);
            return ctx.view(&form);
        }

        issue_session(ctx, &self.auth, &form.data.email)?;
        let target = return_target(ctx, &self.auth, &self.landing);
        info!("{} signed in, redirecting to {}", form.data.email, target);
        ctx.redirect(&target)?;

        done()
    }
}

/// `POST /logout`: expires the session cookie and goes home.
#[derive(Debug, Clone)]
pub struct LogoutHandler {
    auth: CookieAuthConfig,
}

impl LogoutHandler {
    pub fn new(auth: CookieAuthConfig) -> Self {
        Self { auth }
    }
}

#[async_trait]
impl Handler for LogoutHandler {
    async fn call(&self, ctx: &mut Context) -> HandlerResult {
        clear_session(ctx, &self.auth)?;
        ctx.redirect("/")?;
        cancelled()
    }
}
