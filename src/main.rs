use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use chat_relay::config::ServerConfig;
use chat_relay::connection;
use chat_relay::error::ChatError;
use chat_relay::server::Server;

#[tokio::main]
async fn main() -> Result<(), ChatError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "server.toml".to_string());

    let config = ServerConfig::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    let server = Arc::new(Server::new(config));
    let listener = TcpListener::bind(server.config.bind_addr()).await?;
    info!(
        addr = %listener.local_addr()?,
        banned_words = server.filter().len(),
        "Chat relay listening"
    );

    connection::serve(listener, server).await
}
