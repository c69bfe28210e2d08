use library_api::config::Config;
use library_api::http::{AppState, HttpServer, HttpServerConfig};
use library_api::service::BookService;
use library_api::sqlite::{Sqlite, establish_pool};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();

    let config = Config::from_env()?;

    let pool = establish_pool(config.database_url()).await?;
    let service = BookService::new(Sqlite::new(pool));
    let state = AppState::new(service);
    let server_config = HttpServerConfig::new(config.server_port());
    let http_server = HttpServer::new(state, server_config).await?;
    http_server.run().await
}
