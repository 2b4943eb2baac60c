pub mod application;
pub mod error;
pub mod ext;
pub mod form;
pub mod handler;
pub mod router;
mod server;
pub mod site;
pub mod view;

pub use application::{App, AppConfig, AppService};
pub use error::{Error, Result};
pub use handler::{Context, Flow, HandlerResult, Middleware, Next, cancelled, done};

pub fn app() -> App {
    App::default()
}
