//! infobot - IRC channel directory bot.

use infobot::bot::{self, Bot};
use infobot::config::{Config, validation};
use infobot::directory::Directory;
use infobot::router::Router;
use infobot::{http, metrics, store, telemetry};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        eprintln!("Failed to load config {config_path}: {e}");
        e
    })?;

    telemetry::init(config.log.format);

    if let Err(errors) = validation::validate(&config) {
        for e in &errors {
            error!(path = %config_path, error = %e, "Invalid configuration");
        }
        anyhow::bail!("{} configuration error(s) in {config_path}", errors.len());
    }

    info!(
        server = %config.irc.address(),
        channel = %config.channel,
        nick = %config.irc.nick,
        "Starting infobot"
    );

    let backend = store::open(&config.store).map_err(|e| {
        error!(error = %e, "Failed to open info store");
        e
    })?;
    let directory = Directory::new(backend, config.store.timeout());
    let router = Router::new(directory, &config.channel);

    // metrics_port = 0 disables the HTTP endpoint.
    if config.metrics_port == 0 {
        info!("Metrics disabled");
    } else {
        metrics::init();
        info!("Metrics initialized");

        let port = config.metrics_port;
        tokio::spawn(async move {
            http::run_http_server(port).await;
        });
        info!(port, "Prometheus HTTP server started");
    }

    let mut bot = Bot::new(&config, router);
    let stream = bot::connect(&config.irc).await.map_err(|e| {
        error!(error = %e, code = e.error_code(), "Connection failed");
        e
    })?;

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    };

    match bot::run_session(stream, &mut bot, shutdown).await {
        Ok(()) => {
            info!("infobot stopped");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, code = e.error_code(), "Session ended");
            Err(e.into())
        }
    }
}
