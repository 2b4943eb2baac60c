use log::{error, info};
use viewchain::{
    AppConfig,
    site::{self, SiteConfig},
};

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let dev = std::env::args().skip(1).any(|arg| arg == "--dev");

    let config = SiteConfig {
        app: AppConfig::from_env(),
        ..SiteConfig::default()
    };
    let app = site::app(config);

    let served = app
        .listen(|addr| {
            if dev {
                info!("viewchain admin is running in development on http://{addr}");
            } else {
                info!("viewchain admin is running in production on http://{addr}");
            }
        })
        .await;

    if let Err(err) = served {
        error!("server error: {}", err);
        std::process::exit(1);
    }
}
